use crate::model::{Task, TaskKind};
use serde::{Deserialize, Serialize};

/// Snapshot of a task taken at the moment it was completed.
///
/// Entries never point back at the live task list; editing or deleting the
/// source task later leaves the entry untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: i64,
    pub task_id: i64,
    pub task_text: String,
    pub task_type: TaskKind,
    pub completed_date: String,
}

impl HistoryEntry {
    pub fn snapshot(id: i64, task: &Task, completed_date: String) -> Self {
        Self {
            id,
            task_id: task.id,
            task_text: task.text.clone(),
            task_type: task.kind,
            completed_date,
        }
    }
}
