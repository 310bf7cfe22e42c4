//! Per-user to-do items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{DomainError, DomainResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u64,
    pub user_id: u64,
    pub text: String,
    #[serde(default)]
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(id: u64, user_id: u64, text: &str, now: DateTime<Utc>) -> DomainResult<Self> {
        Ok(Self {
            id,
            user_id,
            text: task_text(text)?,
            is_completed: false,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_owned_by(&self, user_id: u64) -> bool {
        self.user_id == user_id
    }

    pub fn set_text(&mut self, text: &str, now: DateTime<Utc>) -> DomainResult<()> {
        self.text = task_text(text)?;
        self.updated_at = now;
        Ok(())
    }

    pub fn toggle(&mut self, now: DateTime<Utc>) {
        self.is_completed = !self.is_completed;
        self.updated_at = now;
    }
}

fn task_text(raw: &str) -> DomainResult<String> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(DomainError::field("text", "Task text is required"));
    }
    Ok(text.to_string())
}

/// Incomplete tasks first, newest first within each group.
pub fn sort_for_display(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| {
        a.is_completed
            .cmp(&b.is_completed)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 11, day, 10, 0, 0).unwrap()
    }

    #[test]
    fn blank_text_is_rejected() {
        assert!(Task::new(1, 1, "   ", at(1)).is_err());
    }

    #[test]
    fn wire_names_are_camel_case() {
        let task = Task::new(1, 2, " call ", at(1)).unwrap();
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["userId"], 2);
        assert_eq!(json["isCompleted"], false);
        assert_eq!(json["text"], "call");
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn display_order_puts_open_tasks_first() {
        let mut done = Task::new(1, 1, "done", at(5)).unwrap();
        done.toggle(at(6));
        let old = Task::new(2, 1, "old", at(1)).unwrap();
        let new = Task::new(3, 1, "new", at(3)).unwrap();

        let mut tasks = vec![done, old, new];
        sort_for_display(&mut tasks);

        let ids: Vec<u64> = tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }
}
