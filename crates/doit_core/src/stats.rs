use crate::clock::calendar_day;
use crate::model::{HistoryEntry, Task, TaskKind};
use time::{Date, Duration, UtcOffset};

pub const HISTOGRAM_DAYS: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCount {
    pub date: Date,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub active: usize,
    pub daily: usize,
    pub global: usize,
    pub completed_total: usize,
    pub completed_today: usize,
}

fn completed_on(history: &[HistoryEntry], day: Date, offset: UtcOffset) -> usize {
    history
        .iter()
        .filter(|entry| {
            calendar_day(&entry.completed_date, offset)
                .map(|completed| completed == day)
                .unwrap_or(false)
        })
        .count()
}

pub fn completed_today(history: &[HistoryEntry], today: Date, offset: UtcOffset) -> usize {
    completed_on(history, today, offset)
}

/// Completions per day for the seven days ending at `today`, oldest first.
pub fn weekly_histogram(history: &[HistoryEntry], today: Date, offset: UtcOffset) -> Vec<DayCount> {
    (0..HISTOGRAM_DAYS)
        .rev()
        .map(|days_back| {
            let date = today - Duration::days(days_back as i64);
            DayCount {
                date,
                count: completed_on(history, date, offset),
            }
        })
        .collect()
}

pub fn summary(tasks: &[Task], history: &[HistoryEntry], today: Date, offset: UtcOffset) -> Summary {
    let daily = tasks
        .iter()
        .filter(|task| task.kind == TaskKind::Daily)
        .count();
    Summary {
        active: tasks.len(),
        daily,
        global: tasks.len() - daily,
        completed_total: history.len(),
        completed_today: completed_today(history, today, offset),
    }
}

#[cfg(test)]
mod tests {
    use super::{completed_today, summary, weekly_histogram};
    use crate::model::{HistoryEntry, Task, TaskKind};
    use time::macros::{date, offset};

    fn entry(id: i64, completed_date: &str) -> HistoryEntry {
        HistoryEntry {
            id,
            task_id: id * 10,
            task_text: format!("task {id}"),
            task_type: TaskKind::Daily,
            completed_date: completed_date.to_string(),
        }
    }

    #[test]
    fn completed_today_counts_by_calendar_day() {
        let history = vec![
            entry(1, "2024-01-01T10:00:00Z"),
            entry(2, "2024-01-01T23:00:00Z"),
            entry(3, "2023-12-31T23:59:00Z"),
        ];

        assert_eq!(completed_today(&history, date!(2024 - 01 - 01), offset!(UTC)), 2);
    }

    #[test]
    fn completed_today_respects_local_offset() {
        let history = vec![entry(1, "2024-01-01T23:30:00Z")];

        assert_eq!(completed_today(&history, date!(2024 - 01 - 02), offset!(+1)), 1);
        assert_eq!(completed_today(&history, date!(2024 - 01 - 01), offset!(+1)), 0);
    }

    #[test]
    fn unparseable_dates_are_ignored() {
        let history = vec![entry(1, "not a date"), entry(2, "2024-01-01T10:00:00Z")];

        assert_eq!(completed_today(&history, date!(2024 - 01 - 01), offset!(UTC)), 1);
    }

    #[test]
    fn weekly_histogram_spans_seven_days_oldest_first() {
        let history = vec![
            entry(1, "2024-01-07T08:00:00Z"),
            entry(2, "2024-01-07T09:00:00Z"),
            entry(3, "2024-01-01T12:00:00Z"),
            entry(4, "2023-12-31T12:00:00Z"),
            entry(5, "2024-01-04T12:00:00Z"),
        ];

        let histogram = weekly_histogram(&history, date!(2024 - 01 - 07), offset!(UTC));
        let counts: Vec<usize> = histogram.iter().map(|day| day.count).collect();

        assert_eq!(histogram.len(), 7);
        assert_eq!(histogram[0].date, date!(2024 - 01 - 01));
        assert_eq!(histogram[6].date, date!(2024 - 01 - 07));
        assert_eq!(counts, vec![1, 0, 0, 1, 0, 0, 2]);
    }

    #[test]
    fn weekly_histogram_crosses_month_boundary() {
        let history = vec![entry(1, "2024-02-28T12:00:00Z")];

        let histogram = weekly_histogram(&history, date!(2024 - 03 - 02), offset!(UTC));

        assert_eq!(histogram[0].date, date!(2024 - 02 - 25));
        assert_eq!(histogram[3].count, 1);
    }

    #[test]
    fn summary_splits_kinds() {
        let tasks = vec![
            Task {
                id: 1,
                text: "a".to_string(),
                kind: TaskKind::Daily,
                completed: false,
                created_at: "2024-01-01T08:00:00Z".to_string(),
            },
            Task {
                id: 2,
                text: "b".to_string(),
                kind: TaskKind::Global,
                completed: true,
                created_at: "2024-01-01T08:00:00Z".to_string(),
            },
        ];
        let history = vec![entry(1, "2024-01-01T10:00:00Z"), entry(2, "2023-12-01T10:00:00Z")];

        let summary = summary(&tasks, &history, date!(2024 - 01 - 01), offset!(UTC));

        assert_eq!(summary.active, 2);
        assert_eq!(summary.daily, 1);
        assert_eq!(summary.global, 1);
        assert_eq!(summary.completed_total, 2);
        assert_eq!(summary.completed_today, 1);
    }
}
