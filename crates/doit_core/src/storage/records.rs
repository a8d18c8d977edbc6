//! The three persisted records: task list, history list and reset marker.
//!
//! Loads never fail. A missing key, an unreadable backend or a corrupt value
//! all come back as "empty" so the tracker stays usable; the cause is logged.
//! Saves return their error so the caller decides how loudly to report it.

use super::KeyValueStore;
use crate::clock::{format_day, parse_day};
use crate::error::AppError;
use crate::model::{HistoryEntry, Task};
use serde::Serialize;
use serde::de::DeserializeOwned;
use time::Date;
use tracing::warn;

pub const TASKS_KEY: &str = "tasks";
pub const HISTORY_KEY: &str = "history";
pub const LAST_RESET_KEY: &str = "lastReset";

pub fn read_tasks<S: KeyValueStore + ?Sized>(store: &S) -> Result<Vec<Task>, AppError> {
    read_list(store, TASKS_KEY)
}

pub fn read_history<S: KeyValueStore + ?Sized>(store: &S) -> Result<Vec<HistoryEntry>, AppError> {
    read_list(store, HISTORY_KEY)
}

pub fn read_last_reset<S: KeyValueStore + ?Sized>(store: &S) -> Result<Option<Date>, AppError> {
    match store.get(LAST_RESET_KEY)? {
        Some(raw) if !raw.trim().is_empty() => parse_day(&raw).map(Some),
        _ => Ok(None),
    }
}

pub fn load_tasks<S: KeyValueStore + ?Sized>(store: &S) -> Vec<Task> {
    read_tasks(store).unwrap_or_else(|err| {
        warn!(key = TASKS_KEY, error = %err, "discarding unreadable record");
        Vec::new()
    })
}

pub fn load_history<S: KeyValueStore + ?Sized>(store: &S) -> Vec<HistoryEntry> {
    read_history(store).unwrap_or_else(|err| {
        warn!(key = HISTORY_KEY, error = %err, "discarding unreadable record");
        Vec::new()
    })
}

/// An unparseable marker counts as never set, which only forces one extra reset.
pub fn load_last_reset<S: KeyValueStore + ?Sized>(store: &S) -> Option<Date> {
    read_last_reset(store).unwrap_or_else(|err| {
        warn!(key = LAST_RESET_KEY, error = %err, "discarding unreadable record");
        None
    })
}

pub fn save_tasks<S: KeyValueStore + ?Sized>(store: &mut S, tasks: &[Task]) -> Result<(), AppError> {
    write_list(store, TASKS_KEY, tasks)
}

pub fn save_history<S: KeyValueStore + ?Sized>(
    store: &mut S,
    history: &[HistoryEntry],
) -> Result<(), AppError> {
    write_list(store, HISTORY_KEY, history)
}

pub fn save_last_reset<S: KeyValueStore + ?Sized>(store: &mut S, day: Date) -> Result<(), AppError> {
    store.set(LAST_RESET_KEY, &format_day(day)?)
}

fn read_list<S, T>(store: &S, key: &str) -> Result<Vec<T>, AppError>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned,
{
    match store.get(key)? {
        Some(content) if !content.trim().is_empty() => serde_json::from_str(&content)
            .map_err(|err| AppError::invalid_data(format!("{key}: {err}"))),
        _ => Ok(Vec::new()),
    }
}

fn write_list<S, T>(store: &mut S, key: &str, items: &[T]) -> Result<(), AppError>
where
    S: KeyValueStore + ?Sized,
    T: Serialize,
{
    let content = serde_json::to_string(items)?;
    store.set(key, &content)
}

#[cfg(test)]
mod tests {
    use super::{
        HISTORY_KEY, LAST_RESET_KEY, TASKS_KEY, load_history, load_last_reset, load_tasks,
        read_tasks, save_history, save_last_reset, save_tasks,
    };
    use crate::error::AppError;
    use crate::model::{HistoryEntry, Task, TaskKind};
    use crate::storage::{KeyValueStore, MemoryStore};
    use time::macros::date;

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, AppError> {
            Err(AppError::io("disk unavailable"))
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), AppError> {
            Err(AppError::io("disk unavailable"))
        }
    }

    fn task(id: i64, text: &str, kind: TaskKind) -> Task {
        Task {
            id,
            text: text.to_string(),
            kind,
            completed: false,
            created_at: "2024-01-01T08:00:00Z".to_string(),
        }
    }

    #[test]
    fn empty_store_loads_as_empty() {
        let store = MemoryStore::new();

        assert!(load_tasks(&store).is_empty());
        assert!(load_history(&store).is_empty());
        assert_eq!(load_last_reset(&store), None);
    }

    #[test]
    fn saved_records_load_back() {
        let mut store = MemoryStore::new();
        let tasks = vec![task(1, "a", TaskKind::Daily), task(2, "b", TaskKind::Global)];
        let history = vec![HistoryEntry::snapshot(
            3,
            &tasks[0],
            "2024-01-01T09:00:00Z".to_string(),
        )];

        save_tasks(&mut store, &tasks).unwrap();
        save_history(&mut store, &history).unwrap();
        save_last_reset(&mut store, date!(2024 - 01 - 01)).unwrap();

        assert_eq!(load_tasks(&store), tasks);
        assert_eq!(load_history(&store), history);
        assert_eq!(load_last_reset(&store), Some(date!(2024 - 01 - 01)));
        assert_eq!(
            store.get(LAST_RESET_KEY).unwrap().as_deref(),
            Some("2024-01-01")
        );
    }

    #[test]
    fn corrupt_records_load_as_empty() {
        let store = MemoryStore::new()
            .with_entry(TASKS_KEY, "{ not json")
            .with_entry(HISTORY_KEY, "[{\"id\": \"x\"}]")
            .with_entry(LAST_RESET_KEY, "Mon Jan 01 2024");

        assert_eq!(read_tasks(&store).unwrap_err().code(), "invalid_data");
        assert!(load_tasks(&store).is_empty());
        assert!(load_history(&store).is_empty());
        assert_eq!(load_last_reset(&store), None);
    }

    #[test]
    fn unreadable_backend_loads_as_empty() {
        let store = BrokenStore;

        assert!(load_tasks(&store).is_empty());
        assert!(load_history(&store).is_empty());
        assert_eq!(load_last_reset(&store), None);
    }

    #[test]
    fn save_reports_backend_failure() {
        let mut store = BrokenStore;
        let err = save_tasks(&mut store, &[]).unwrap_err();

        assert_eq!(err.code(), "io_error");
    }
}
