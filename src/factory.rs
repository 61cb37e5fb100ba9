use crate::model::{Task, TaskColor, TaskError, TaskId};
use chrono::{Duration, NaiveDate, NaiveTime, Timelike};
use tracing::debug;

/// Builds validated tasks and hands out their ids.
#[derive(Debug)]
pub struct TaskFactory {
    next_id: u64,
}

impl Default for TaskFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskFactory {
    pub fn new() -> Self {
        TaskFactory { next_id: 1 }
    }

    /// Creates a task on `reference_date` from two wall-clock times.
    ///
    /// An end time that is not after the start time lands on the next day,
    /// so `22:00`-`02:00` spans midnight and equal times span a full day.
    pub fn create(
        &mut self,
        name: &str,
        color: &str,
        start_time: NaiveTime,
        end_time: NaiveTime,
        reference_date: NaiveDate,
    ) -> Result<Task, TaskError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TaskError::InvalidInput("name is required".into()));
        }
        let color: TaskColor = color.parse()?;

        let start = reference_date.and_time(truncate_to_minute(start_time));
        let mut end = reference_date.and_time(truncate_to_minute(end_time));
        if end <= start {
            end += Duration::days(1);
        }

        let id = TaskId(self.next_id);
        self.next_id += 1;
        debug!(%id, task = name, %color, %start, %end, "created task");
        Ok(Task::new(id, name.to_string(), color, start, end))
    }
}

/// Parses `HH:MM` as typed into a time field.
pub fn parse_time_of_day(input: &str) -> Result<NaiveTime, TaskError> {
    let trimmed = input.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .map_err(|_| TaskError::InvalidInput(format!("invalid time (use HH:MM): {}", trimmed)))
}

fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 6).unwrap()
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn same_day_span_keeps_reference_date() {
        let mut factory = TaskFactory::new();
        let task = factory
            .create("Frontend Work", "color-green", hm(10, 0), hm(13, 0), day())
            .unwrap();
        assert_eq!(task.start(), day().and_time(hm(10, 0)));
        assert_eq!(task.end(), day().and_time(hm(13, 0)));
        assert!(!task.completed());
        assert_eq!(task.color(), TaskColor::Green);
    }

    #[test]
    fn overnight_end_rolls_to_next_day() {
        let mut factory = TaskFactory::new();
        let task = factory
            .create("Night shift", "color-blue", hm(23, 0), hm(1, 0), day())
            .unwrap();
        assert_eq!(task.start(), day().and_time(hm(23, 0)));
        assert_eq!(task.end(), day().succ_opt().unwrap().and_time(hm(1, 0)));
    }

    #[test]
    fn equal_times_become_a_full_day() {
        // Boundary case: 13:00-13:00 is kept, not rejected.
        let mut factory = TaskFactory::new();
        let task = factory
            .create("Lunch", "color-blue", hm(13, 0), hm(13, 0), day())
            .unwrap();
        assert_eq!(task.start(), day().and_time(hm(13, 0)));
        assert_eq!(task.end(), day().succ_opt().unwrap().and_time(hm(13, 0)));
        assert_eq!(task.end() - task.start(), Duration::hours(24));
    }

    #[test]
    fn end_is_after_start_for_every_time_pair() {
        let mut factory = TaskFactory::new();
        for sh in 0..24 {
            for eh in 0..24 {
                for (sm, em) in [(0, 0), (15, 45), (59, 0), (30, 30)] {
                    let task = factory
                        .create("t", "red", hm(sh, sm), hm(eh, em), day())
                        .unwrap();
                    assert!(task.end() > task.start(), "{sh}:{sm} -> {eh}:{em}");
                    assert!(task.end() - task.start() <= Duration::hours(24));
                }
            }
        }
    }

    #[test]
    fn seconds_are_dropped() {
        let mut factory = TaskFactory::new();
        let start = NaiveTime::from_hms_opt(9, 15, 42).unwrap();
        let end = NaiveTime::from_hms_opt(9, 45, 7).unwrap();
        let task = factory.create("Standup", "orange", start, end, day()).unwrap();
        assert_eq!(task.start(), day().and_time(hm(9, 15)));
        assert_eq!(task.end(), day().and_time(hm(9, 45)));
    }

    #[test]
    fn name_is_trimmed_and_required() {
        let mut factory = TaskFactory::new();
        let task = factory
            .create("  Gym  ", "red", hm(7, 0), hm(8, 0), day())
            .unwrap();
        assert_eq!(task.name(), "Gym");

        for blank in ["", "   ", "\t\n"] {
            let err = factory
                .create(blank, "red", hm(7, 0), hm(8, 0), day())
                .unwrap_err();
            assert!(matches!(err, TaskError::InvalidInput(_)));
        }
    }

    #[test]
    fn unknown_color_is_rejected() {
        let mut factory = TaskFactory::new();
        let err = factory
            .create("Gym", "color-purple", hm(7, 0), hm(8, 0), day())
            .unwrap_err();
        assert!(matches!(err, TaskError::InvalidInput(_)));
    }

    #[test]
    fn ids_increase_and_failures_consume_none() {
        let mut factory = TaskFactory::new();
        let a = factory.create("a", "red", hm(7, 0), hm(8, 0), day()).unwrap();
        assert!(factory.create("", "red", hm(7, 0), hm(8, 0), day()).is_err());
        assert!(factory.create("b", "pink", hm(7, 0), hm(8, 0), day()).is_err());
        let b = factory.create("b", "red", hm(7, 0), hm(8, 0), day()).unwrap();
        assert!(b.id() > a.id());
        assert_eq!(b.id().0, a.id().0 + 1);
    }

    #[test]
    fn parses_time_fields() {
        assert_eq!(parse_time_of_day("09:05").unwrap(), hm(9, 5));
        assert_eq!(parse_time_of_day(" 23:59 ").unwrap(), hm(23, 59));
        assert!(parse_time_of_day("25:00").is_err());
        assert!(parse_time_of_day("noon").is_err());
        assert!(parse_time_of_day("").is_err());
    }
}
