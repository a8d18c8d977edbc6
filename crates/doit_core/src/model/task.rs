use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    #[serde(default)]
    pub completed: bool,
    pub created_at: String,
}

/// Whether a task's check mark is cleared at the start of every calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Daily,
    Global,
}

impl TaskKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Global => "global",
        }
    }

    pub fn resets_daily(self) -> bool {
        matches!(self, Self::Daily)
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "daily" | "day" | "d" => Ok(Self::Daily),
            "global" | "once" | "g" => Ok(Self::Global),
            other => Err(format!("unknown task type '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Task, TaskKind};

    #[test]
    fn task_serializes_with_camel_case_keys() {
        let task = Task {
            id: 1_704_103_200_000,
            text: "Drink water".to_string(),
            kind: TaskKind::Daily,
            completed: false,
            created_at: "2024-01-01T10:00:00Z".to_string(),
        };

        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["id"], 1_704_103_200_000_i64);
        assert_eq!(value["type"], "daily");
        assert_eq!(value["completed"], false);
        assert_eq!(value["createdAt"], "2024-01-01T10:00:00Z");
    }

    #[test]
    fn task_without_completed_field_defaults_to_pending() {
        let content = r#"{"id":7,"text":"demo","type":"global","createdAt":"2024-01-01T10:00:00Z"}"#;
        let task: Task = serde_json::from_str(content).unwrap();

        assert_eq!(task.kind, TaskKind::Global);
        assert!(!task.completed);
    }

    #[test]
    fn task_kind_parses_aliases() {
        assert_eq!("Daily".parse::<TaskKind>(), Ok(TaskKind::Daily));
        assert_eq!(" global ".parse::<TaskKind>(), Ok(TaskKind::Global));
        assert_eq!("once".parse::<TaskKind>(), Ok(TaskKind::Global));
        assert!("weekly".parse::<TaskKind>().is_err());
    }

    #[test]
    fn only_daily_tasks_reset() {
        assert!(TaskKind::Daily.resets_daily());
        assert!(!TaskKind::Global.resets_daily());
    }
}
