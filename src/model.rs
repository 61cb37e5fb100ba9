use chrono::NaiveDateTime;
use std::fmt;
use std::str::FromStr;

/// Identifier handed out by the task factory. Later tasks get larger ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(pub(crate) u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskColor {
    Red,
    Green,
    Blue,
    Orange,
}

impl TaskColor {
    pub const ALL: [TaskColor; 4] = [
        TaskColor::Green,
        TaskColor::Blue,
        TaskColor::Orange,
        TaskColor::Red,
    ];

    /// Category tag as it appears in color pickers, e.g. `color-blue`.
    pub fn tag(&self) -> &'static str {
        match self {
            TaskColor::Red => "color-red",
            TaskColor::Green => "color-green",
            TaskColor::Blue => "color-blue",
            TaskColor::Orange => "color-orange",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskColor::Red => "Red",
            TaskColor::Green => "Green",
            TaskColor::Blue => "Blue",
            TaskColor::Orange => "Orange",
        }
    }

    pub fn next(&self) -> TaskColor {
        let idx = Self::ALL.iter().position(|c| c == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> TaskColor {
        let idx = Self::ALL.iter().position(|c| c == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl FromStr for TaskColor {
    type Err = TaskError;

    /// Accepts both `color-blue` and `blue`, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        let bare = lowered.strip_prefix("color-").unwrap_or(&lowered);
        match bare {
            "red" => Ok(TaskColor::Red),
            "green" => Ok(TaskColor::Green),
            "blue" => Ok(TaskColor::Blue),
            "orange" => Ok(TaskColor::Orange),
            _ => Err(TaskError::InvalidInput(format!("unknown color: {}", s))),
        }
    }
}

impl fmt::Display for TaskColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A named, colored, time-boxed piece of the day.
///
/// Only the factory builds tasks and only the store flips `completed`;
/// everything else is fixed once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    id: TaskId,
    name: String,
    color: TaskColor,
    start: NaiveDateTime,
    end: NaiveDateTime,
    completed: bool,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TaskError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("task not found: {0}")]
    NotFound(TaskId),
}

impl Task {
    pub(crate) fn new(
        id: TaskId,
        name: String,
        color: TaskColor,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Self {
        Task {
            id,
            name,
            color,
            start,
            end,
            completed: false,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> TaskColor {
        self.color
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub(crate) fn toggle(&mut self) {
        self.completed = !self.completed;
    }
}
