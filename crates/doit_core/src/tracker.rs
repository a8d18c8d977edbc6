use crate::clock::{Clock, format_timestamp};
use crate::model::{HistoryEntry, Task, TaskKind};
use crate::reset::{ResetOutcome, clear_daily_flags, reset_due};
use crate::stats::{self, DayCount, Summary};
use crate::storage::KeyValueStore;
use crate::storage::records;
use std::collections::HashSet;
use time::Date;
use tracing::{debug, info, warn};

/// Owns the task list, the history list and the reset marker, and writes each
/// record back to storage right after it changes.
///
/// Storage failures never escape: reads degrade to empty state and writes are
/// logged, so a tracker over a dead backend still works for the session.
pub struct Tracker<S, C> {
    store: S,
    clock: C,
    tasks: Vec<Task>,
    history: Vec<HistoryEntry>,
    last_reset: Option<Date>,
    last_id: i64,
}

impl<S: KeyValueStore, C: Clock> Tracker<S, C> {
    /// Loads all three records and applies the daily reset before returning.
    pub fn open(store: S, clock: C) -> Self {
        let tasks = records::load_tasks(&store);
        let history = records::load_history(&store);
        let last_reset = records::load_last_reset(&store);
        let last_id = tasks
            .iter()
            .map(|task| task.id)
            .chain(history.iter().map(|entry| entry.id))
            .max()
            .unwrap_or(0);

        debug!(
            tasks = tasks.len(),
            history = history.len(),
            "loaded tracker state"
        );

        let mut tracker = Self {
            store,
            clock,
            tasks,
            history,
            last_reset,
            last_id,
        };
        tracker.rekey_duplicate_tasks();
        tracker.run_daily_reset();
        tracker
    }

    pub fn run_daily_reset(&mut self) -> ResetOutcome {
        let today = self.clock.today();
        if !reset_due(self.last_reset, today) {
            return ResetOutcome::Skipped;
        }

        let cleared = clear_daily_flags(&mut self.tasks);
        self.last_reset = Some(today);
        self.persist_tasks();
        if let Err(err) = records::save_last_reset(&mut self.store, today) {
            warn!(error = %err, "failed to save reset marker");
        }

        info!(%today, cleared, "daily reset applied");
        ResetOutcome::Applied { cleared }
    }

    /// Blank or whitespace-only text is ignored.
    pub fn add(&mut self, text: &str, kind: TaskKind) -> Option<Task> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            debug!("ignoring task with blank text");
            return None;
        }

        let created_at = self.timestamp()?;
        let task = Task {
            id: self.next_id(),
            text: trimmed.to_string(),
            kind,
            completed: false,
            created_at,
        };

        self.tasks.push(task.clone());
        self.persist_tasks();
        debug!(id = task.id, %kind, "task added");
        Some(task)
    }

    /// Returns the flag's new value, or `None` when no task has `id`.
    pub fn toggle(&mut self, id: i64) -> Option<bool> {
        let task = self.tasks.iter_mut().find(|task| task.id == id)?;
        task.completed = !task.completed;
        let completed = task.completed;

        self.persist_tasks();
        Some(completed)
    }

    /// Moves the task into history.
    pub fn complete(&mut self, id: i64) -> Option<HistoryEntry> {
        let index = self.tasks.iter().position(|task| task.id == id)?;
        let completed_date = self.timestamp()?;
        let entry_id = self.next_id();

        let task = self.tasks.remove(index);
        let entry = HistoryEntry::snapshot(entry_id, &task, completed_date);
        self.history.push(entry.clone());

        // Task list first: losing the history write drops a record, the reverse
        // order could leave the task in both lists after a crash.
        self.persist_tasks();
        self.persist_history();
        debug!(id, entry = entry.id, "task completed");
        Some(entry)
    }

    pub fn delete(&mut self, id: i64) -> Option<Task> {
        let index = self.tasks.iter().position(|task| task.id == id)?;
        let removed = self.tasks.remove(index);

        self.persist_tasks();
        debug!(id, "task deleted");
        Some(removed)
    }

    pub fn delete_entry(&mut self, id: i64) -> Option<HistoryEntry> {
        let index = self.history.iter().position(|entry| entry.id == id)?;
        let removed = self.history.remove(index);

        self.persist_history();
        Some(removed)
    }

    /// Empties the history and returns how many entries were dropped.
    pub fn clear_all(&mut self) -> usize {
        let cleared = self.history.len();
        self.history.clear();

        self.persist_history();
        info!(cleared, "history cleared");
        cleared
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn tasks_of(&self, kind: TaskKind) -> Vec<&Task> {
        self.tasks.iter().filter(|task| task.kind == kind).collect()
    }

    pub fn task(&self, id: i64) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn history_newest_first(&self) -> Vec<&HistoryEntry> {
        self.history.iter().rev().collect()
    }

    pub fn last_reset(&self) -> Option<Date> {
        self.last_reset
    }

    pub fn today(&self) -> Date {
        self.clock.today()
    }

    pub fn completed_today(&self) -> usize {
        stats::completed_today(&self.history, self.clock.today(), self.clock.offset())
    }

    pub fn weekly_histogram(&self) -> Vec<DayCount> {
        stats::weekly_histogram(&self.history, self.clock.today(), self.clock.offset())
    }

    pub fn summary(&self) -> Summary {
        stats::summary(
            &self.tasks,
            &self.history,
            self.clock.today(),
            self.clock.offset(),
        )
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn timestamp(&self) -> Option<String> {
        match format_timestamp(self.clock.now()) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(error = %err, "clock produced an unformattable timestamp");
                None
            }
        }
    }

    /// Millisecond timestamp, bumped past the last issued id when the clock
    /// has not moved forward.
    fn next_id(&mut self) -> i64 {
        match self.last_id.checked_add(1) {
            Some(next) => {
                let id = self.clock.unix_millis().max(next);
                self.last_id = id;
                id
            }
            None => self.lowest_free_id(),
        }
    }

    /// Only reached once some stored id sits at `i64::MAX`.
    fn lowest_free_id(&self) -> i64 {
        let used: HashSet<i64> = self
            .tasks
            .iter()
            .map(|task| task.id)
            .chain(self.history.iter().map(|entry| entry.id))
            .collect();
        (1..i64::MAX).find(|id| !used.contains(id)).unwrap_or(0)
    }

    /// Later tasks sharing an earlier task's id get a fresh one.
    fn rekey_duplicate_tasks(&mut self) {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for (index, task) in self.tasks.iter().enumerate() {
            if !seen.insert(task.id) {
                duplicates.push(index);
            }
        }
        if duplicates.is_empty() {
            return;
        }

        for index in &duplicates {
            let id = self.next_id();
            warn!(old = self.tasks[*index].id, new = id, "re-keyed duplicate task id");
            self.tasks[*index].id = id;
        }
        self.persist_tasks();
    }

    fn persist_tasks(&mut self) {
        if let Err(err) = records::save_tasks(&mut self.store, &self.tasks) {
            warn!(error = %err, "failed to save tasks");
        }
    }

    fn persist_history(&mut self) {
        if let Err(err) = records::save_history(&mut self.store, &self.history) {
            warn!(error = %err, "failed to save history");
        }
    }
}
