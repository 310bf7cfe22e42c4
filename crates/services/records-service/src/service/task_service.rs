//! Per-user task lists.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use common::{AppError, AppResult, OptionExt};
use domain::task::sort_for_display;
use domain::{Document, Task};

use crate::infra::DocumentStore;

#[async_trait]
pub trait TaskService: Send + Sync {
    /// Tasks of one user: incomplete first, newest first.
    async fn list_tasks(&self, user_id: u64) -> AppResult<Vec<Task>>;

    async fn add_task(&self, user_id: u64, text: &str) -> AppResult<Task>;

    async fn edit_task(&self, user_id: u64, task_id: u64, text: &str) -> AppResult<Task>;

    async fn toggle_task(&self, user_id: u64, task_id: u64) -> AppResult<Task>;

    async fn delete_task(&self, user_id: u64, task_id: u64) -> AppResult<()>;
}

pub struct TaskManager {
    store: Arc<DocumentStore>,
}

impl TaskManager {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }
}

/// The task, if it exists and belongs to `user_id`.
fn owned_task(doc: &mut Document, user_id: u64, task_id: u64) -> AppResult<&mut Task> {
    let task = doc
        .tasks
        .iter_mut()
        .find(|t| t.id == task_id)
        .ok_or_not_found(format!("Task {}", task_id))?;
    if !task.is_owned_by(user_id) {
        return Err(AppError::forbidden("task belongs to another user"));
    }
    Ok(task)
}

pub(crate) fn tasks_of(doc: &Document, user_id: u64) -> Vec<Task> {
    let mut tasks: Vec<Task> = doc
        .tasks
        .iter()
        .filter(|t| t.is_owned_by(user_id))
        .cloned()
        .collect();
    sort_for_display(&mut tasks);
    tasks
}

#[async_trait]
impl TaskService for TaskManager {
    async fn list_tasks(&self, user_id: u64) -> AppResult<Vec<Task>> {
        let doc = self.store.snapshot().await;
        Ok(tasks_of(&doc, user_id))
    }

    async fn add_task(&self, user_id: u64, text: &str) -> AppResult<Task> {
        let text = text.to_string();
        self.store
            .apply(move |doc| {
                let task = Task::new(doc.next_task_id(), user_id, &text, Utc::now())?;
                doc.tasks.push(task.clone());
                Ok(task)
            })
            .await
    }

    async fn edit_task(&self, user_id: u64, task_id: u64, text: &str) -> AppResult<Task> {
        let text = text.to_string();
        self.store
            .apply(move |doc| {
                let task = owned_task(doc, user_id, task_id)?;
                task.set_text(&text, Utc::now())?;
                Ok(task.clone())
            })
            .await
    }

    async fn toggle_task(&self, user_id: u64, task_id: u64) -> AppResult<Task> {
        self.store
            .apply(move |doc| {
                let task = owned_task(doc, user_id, task_id)?;
                task.toggle(Utc::now());
                Ok(task.clone())
            })
            .await
    }

    async fn delete_task(&self, user_id: u64, task_id: u64) -> AppResult<()> {
        self.store
            .apply(move |doc| {
                owned_task(doc, user_id, task_id)?;
                doc.tasks.retain(|t| t.id != task_id);
                Ok(())
            })
            .await
    }
}
