use crate::clock::{FixedClock, SystemClock, TimeSource};
use crate::config::Config;
use crate::factory::parse_time_of_day;
use crate::format::{date_strip, format_display, format_range};
use crate::model::Task;
use crate::planner::Planner;
use crate::timeline::Timeline;
use crate::ui;
use anyhow::{anyhow, Context, Result};
use chrono::Local;
use std::fmt::Write as _;

pub fn show(config: &Config, at: Option<String>, tasks: Vec<String>) -> Result<()> {
    let clock: Box<dyn TimeSource> = match at.as_deref() {
        Some(raw) => {
            let time = parse_time_of_day(raw)?;
            Box::new(FixedClock::new(Local::now().date_naive().and_time(time)))
        }
        None => Box::new(SystemClock),
    };
    let mut planner = Planner::new(clock);
    if config.demo_tasks {
        planner.seed_demo_tasks()?;
    }
    for entry in &tasks {
        add_task_entry(&mut planner, entry).with_context(|| format!("adding task {:?}", entry))?;
    }

    let timeline = planner.timeline();
    print!("{}", render_snapshot(config, &timeline));
    Ok(())
}

pub fn tui(config: &Config) -> Result<()> {
    let mut planner = Planner::new(SystemClock);
    if config.demo_tasks {
        planner.seed_demo_tasks()?;
    }
    ui::run(planner, config)
}

fn add_task_entry<C: TimeSource>(planner: &mut Planner<C>, entry: &str) -> Result<()> {
    let parts: Vec<&str> = entry.split(',').map(str::trim).collect();
    let [name, color, start, end] = parts.as_slice() else {
        return Err(anyhow!("expected NAME,COLOR,START,END"));
    };
    let start = parse_time_of_day(start)?;
    let end = parse_time_of_day(end)?;
    planner.add_task(name, color, start, end)?;
    Ok(())
}

fn render_snapshot(config: &Config, timeline: &Timeline<'_>) -> String {
    let mut out = String::new();
    let strip: Vec<String> = date_strip(
        timeline.now.date(),
        config.strip_days_before,
        config.strip_days_after,
    )
    .into_iter()
    .map(|d| {
        if d.active {
            format!("[{} {}]", d.day, d.weekday)
        } else {
            format!(" {} {} ", d.day, d.weekday)
        }
    })
    .collect();
    let _ = writeln!(out, "{}", strip.join(" "));
    let _ = writeln!(out, "Now: {}", format_display(timeline.now.time()));
    let _ = writeln!(out);

    let _ = writeln!(out, "current");
    match (timeline.current, timeline.current_progress) {
        (Some(task), Some(progress)) => {
            let _ = writeln!(out, "{}", task_line(task));
            let _ = writeln!(out, "    {:.0}% elapsed", progress * 100.0);
        }
        _ => {
            let _ = writeln!(out, "  No active task right now");
        }
    }
    for (title, tasks) in [("upcoming", &timeline.upcoming), ("previous", &timeline.previous)] {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", title);
        if tasks.is_empty() {
            let _ = writeln!(out, "  (empty)");
        }
        for task in tasks {
            let _ = writeln!(out, "{}", task_line(task));
        }
    }
    out
}

fn task_line(task: &Task) -> String {
    format!(
        "  [{}] {}  {}  ({})",
        if task.completed() { "x" } else { " " },
        task.name(),
        format_range(task.start(), task.end()),
        task.color().label().to_lowercase()
    )
}
