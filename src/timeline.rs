use crate::model::Task;
use chrono::NaiveDateTime;

/// One classification of the task set at a single instant.
///
/// Borrows from the store, so it cannot outlive a mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline<'a> {
    pub now: NaiveDateTime,
    pub current: Option<&'a Task>,
    pub current_progress: Option<f64>,
    pub upcoming: Vec<&'a Task>,
    pub previous: Vec<&'a Task>,
}

impl<'a> Timeline<'a> {
    /// Number of tasks placed in any of the three views.
    pub fn len(&self) -> usize {
        self.current.iter().count() + self.upcoming.len() + self.previous.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Splits `tasks` into current, upcoming and previous relative to `now`.
///
/// The current window is closed (`start <= now <= end`) while previous is
/// strictly before `end`. When several windows contain `now`, the earliest
/// start wins and the others appear in no list for that instant.
pub fn classify(tasks: &[Task], now: NaiveDateTime) -> Timeline<'_> {
    let mut sorted: Vec<&Task> = tasks.iter().collect();
    // stable: equal starts keep insertion order
    sorted.sort_by_key(|t| t.start());

    let current = sorted
        .iter()
        .copied()
        .find(|t| t.start() <= now && now <= t.end());
    let current_progress = current.map(|t| progress(t, now));
    let upcoming = sorted.iter().copied().filter(|t| t.start() > now).collect();
    let previous = sorted.iter().copied().filter(|t| t.end() < now).collect();

    Timeline {
        now,
        current,
        current_progress,
        upcoming,
        previous,
    }
}

/// Elapsed fraction of `task` at `now`, clamped to `[0, 1]`.
pub fn progress(task: &Task, now: NaiveDateTime) -> f64 {
    let total = (task.end() - task.start()).num_milliseconds();
    if total <= 0 {
        return 1.0;
    }
    let elapsed = (now - task.start()).num_milliseconds();
    (elapsed as f64 / total as f64).clamp(0.0, 1.0)
}
