use crate::model::{Task, TaskError, TaskId};

/// Owns every task for the lifetime of the process, in insertion order.
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        TaskStore { tasks: Vec::new() }
    }

    pub fn add(&mut self, task: Task) {
        self.tasks.push(task);
    }

    pub fn toggle_completed(&mut self, id: TaskId) -> Result<(), TaskError> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id() == id)
            .ok_or(TaskError::NotFound(id))?;
        task.toggle();
        Ok(())
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id() == id)
    }

    pub fn all(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
