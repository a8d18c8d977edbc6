use crate::model::Task;
use time::Date;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    /// The marker already pointed at today.
    Skipped,
    /// A new day began; `cleared` daily tasks lost their check mark.
    Applied { cleared: usize },
}

pub fn reset_due(last_reset: Option<Date>, today: Date) -> bool {
    last_reset != Some(today)
}

/// Unchecks every daily task, leaving global tasks untouched. Returns how many
/// flags actually flipped.
pub fn clear_daily_flags(tasks: &mut [Task]) -> usize {
    let mut cleared = 0;
    for task in tasks.iter_mut() {
        if task.kind.resets_daily() && task.completed {
            task.completed = false;
            cleared += 1;
        }
    }
    cleared
}
