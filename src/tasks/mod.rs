//! Session task list.
//!
//! Tasks live only as long as the daemon process.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub text: String,
    pub completed: bool,
}

/// Task list errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskError {
    /// Text was empty after trimming
    #[error("task text must not be empty")]
    EmptyText,

    /// No task has the given id
    #[error("task not found: {0}")]
    NotFound(Uuid),
}

/// Ordered list of tasks, oldest first.
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a task with trimmed `text`.
    pub fn add(&mut self, text: &str) -> Result<Task, TaskError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TaskError::EmptyText);
        }
        let task = Task {
            id: Uuid::new_v4(),
            text: text.to_string(),
            completed: false,
        };
        self.tasks.push(task.clone());
        Ok(task)
    }

    /// Flips a task's completion flag and returns the updated task.
    pub fn toggle(&mut self, id: Uuid) -> Result<Task, TaskError> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(TaskError::NotFound(id))?;
        task.completed = !task.completed;
        Ok(task.clone())
    }

    /// Removes a task and returns it.
    pub fn delete(&mut self, id: Uuid) -> Result<Task, TaskError> {
        let index = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(TaskError::NotFound(id))?;
        Ok(self.tasks.remove(index))
    }

    pub fn list(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_trims_text() {
        let mut store = TaskStore::new();
        let task = store.add("  write report \n").unwrap();

        assert_eq!(task.text, "write report");
        assert!(!task.completed);
        assert_eq!(store.list(), &[task]);
    }

    #[test]
    fn test_add_rejects_blank_text() {
        let mut store = TaskStore::new();
        assert_eq!(store.add("   "), Err(TaskError::EmptyText));
        assert!(store.is_empty());
    }

    #[test]
    fn test_ids_are_unique() {
        let mut store = TaskStore::new();
        let a = store.add("a").unwrap();
        let b = store.add("b").unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_toggle() {
        let mut store = TaskStore::new();
        let task = store.add("read").unwrap();

        assert!(store.toggle(task.id).unwrap().completed);
        assert!(!store.toggle(task.id).unwrap().completed);
    }

    #[test]
    fn test_delete_keeps_order() {
        let mut store = TaskStore::new();
        let a = store.add("a").unwrap();
        let b = store.add("b").unwrap();
        let c = store.add("c").unwrap();

        store.delete(b.id).unwrap();
        let ids: Vec<_> = store.list().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![a.id, c.id]);
    }

    #[test]
    fn test_unknown_id() {
        let mut store = TaskStore::new();
        let id = Uuid::new_v4();
        assert_eq!(store.toggle(id), Err(TaskError::NotFound(id)));
        assert_eq!(store.delete(id), Err(TaskError::NotFound(id)));
    }
}
