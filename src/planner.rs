use crate::clock::TimeSource;
use crate::factory::{parse_time_of_day, TaskFactory};
use crate::format::format_input_field;
use crate::model::{TaskColor, TaskError, TaskId};
use crate::store::TaskStore;
use crate::timeline::{classify, Timeline};
use chrono::{Duration, NaiveDateTime, NaiveTime};
use tracing::{debug, info};

/// The engine as the UI sees it: a store, a factory and a clock.
pub struct Planner<C: TimeSource> {
    clock: C,
    factory: TaskFactory,
    store: TaskStore,
}

impl<C: TimeSource> Planner<C> {
    pub fn new(clock: C) -> Self {
        Planner {
            clock,
            factory: TaskFactory::new(),
            store: TaskStore::new(),
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    /// Adds a task for today. Nothing is inserted when validation fails.
    pub fn add_task(
        &mut self,
        name: &str,
        color: &str,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<TaskId, TaskError> {
        let today = self.clock.now().date();
        let task = self.factory.create(name, color, start, end, today)?;
        let id = task.id();
        info!(%id, "task added");
        self.store.add(task);
        Ok(id)
    }

    pub fn toggle_task(&mut self, id: TaskId) -> Result<(), TaskError> {
        match self.store.toggle_completed(id) {
            Ok(()) => {
                debug!(%id, "toggled task");
                Ok(())
            }
            Err(err) => {
                debug!(%id, "toggle ignored: {}", err);
                Err(err)
            }
        }
    }

    /// Classifies the store at an explicit instant.
    pub fn timeline_at(&self, now: NaiveDateTime) -> Timeline<'_> {
        classify(self.store.all(), now)
    }

    /// Reads the clock once and classifies at that instant.
    pub fn timeline(&self) -> Timeline<'_> {
        self.timeline_at(self.clock.now())
    }

    /// Start and end values for a fresh add-task form: now and an hour later.
    pub fn form_prefill(&self, now: NaiveDateTime) -> (String, String) {
        let next_hour = now + Duration::hours(1);
        (
            format_input_field(now.time()),
            format_input_field(next_hour.time()),
        )
    }

    /// Seeds the two sample tasks shown on first launch.
    pub fn seed_demo_tasks(&mut self) -> Result<(), TaskError> {
        let breakfast = self.add_task(
            "Breakfast",
            TaskColor::Red.tag(),
            parse_time_of_day("08:00")?,
            parse_time_of_day("09:00")?,
        )?;
        self.toggle_task(breakfast)?;
        self.add_task(
            "Frontend Work",
            TaskColor::Green.tag(),
            parse_time_of_day("10:00")?,
            parse_time_of_day("13:00")?,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn demo_tasks_match_first_launch() {
        let mut planner = Planner::new(FixedClock::new(at(8, 30)));
        planner.seed_demo_tasks().unwrap();

        let timeline = planner.timeline();
        assert_eq!(timeline.now, at(8, 30));
        let current = timeline.current.unwrap();
        assert_eq!(current.name(), "Breakfast");
        assert!(current.completed());
        assert_eq!(timeline.current_progress, Some(0.5));
        assert_eq!(timeline.upcoming[0].name(), "Frontend Work");
        assert!(!timeline.upcoming[0].completed());
    }

    #[test]
    fn tick_rereads_the_clock() {
        let mut planner = Planner::new(FixedClock::new(at(8, 30)));
        planner.seed_demo_tasks().unwrap();

        planner.clock().set(at(14, 0));
        let timeline = planner.timeline();
        assert!(timeline.current.is_none());
        assert_eq!(timeline.previous.len(), 2);
    }

    #[test]
    fn add_uses_today_from_the_clock() {
        let mut planner = Planner::new(FixedClock::new(at(21, 0)));
        let id = planner
            .add_task("Reading", "color-orange", hm(22, 0), hm(2, 0))
            .unwrap();
        let task = planner.store().get(id).unwrap();
        assert_eq!(task.start(), at(22, 0));
        assert_eq!(task.end(), at(2, 0) + Duration::days(1));
    }

    #[test]
    fn invalid_add_leaves_store_untouched() {
        let mut planner = Planner::new(FixedClock::new(at(9, 0)));
        assert!(planner.add_task("   ", "blue", hm(9, 0), hm(10, 0)).is_err());
        assert!(planner.add_task("Gym", "teal", hm(9, 0), hm(10, 0)).is_err());
        assert!(planner.store().is_empty());
    }

    #[test]
    fn toggle_of_unknown_id_is_recoverable() {
        let mut planner = Planner::new(FixedClock::new(at(9, 0)));
        planner.seed_demo_tasks().unwrap();
        let before = planner.store().all().to_vec();
        assert!(matches!(
            planner.toggle_task(TaskId(42)),
            Err(TaskError::NotFound(_))
        ));
        assert_eq!(planner.store().all(), before.as_slice());
    }

    #[test]
    fn toggle_is_visible_in_next_classification() {
        let mut planner = Planner::new(FixedClock::new(at(10, 30)));
        let id = planner.add_task("Work", "green", hm(10, 0), hm(11, 0)).unwrap();
        assert!(!planner.timeline().current.unwrap().completed());
        planner.toggle_task(id).unwrap();
        assert!(planner.timeline().current.unwrap().completed());
    }

    #[test]
    fn prefill_is_now_and_an_hour_later() {
        let planner = Planner::new(FixedClock::new(at(23, 15)));
        let (start, end) = planner.form_prefill(planner.now());
        assert_eq!(start, "23:15");
        assert_eq!(end, "00:15");
    }
}
