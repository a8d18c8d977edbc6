pub mod clock;
pub mod config;
pub mod error;
pub mod model;
pub mod reset;
pub mod stats;
pub mod storage;
pub mod tracker;

pub use tracker::Tracker;

#[cfg(test)]
mod tests {
    use crate::error::AppError;
    use crate::model::{Task, TaskKind};

    #[test]
    fn task_has_required_fields() {
        let task = Task {
            id: 1,
            text: "demo".to_string(),
            kind: TaskKind::Global,
            completed: false,
            created_at: "2025-12-20T00:00:00Z".to_string(),
        };

        assert_eq!(task.id, 1);
        assert_eq!(task.text, "demo");
        assert_eq!(task.kind, TaskKind::Global);
        assert!(!task.completed);
        assert_eq!(task.created_at, "2025-12-20T00:00:00Z");
    }

    #[test]
    fn app_error_exposes_code() {
        let err = AppError::invalid_input("missing text");
        assert_eq!(err.code(), "invalid_input");
        assert_eq!(err.message(), "missing text");
        assert_eq!(err.to_string(), "invalid_input - missing text");
    }
}
