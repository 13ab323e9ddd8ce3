//! Queued focus sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Minutes, TaskId};

/// A focus session waiting in the queue.
///
/// Queue order is execution order; the head of the queue is the active task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier.
    pub id: TaskId,

    /// Display name, also the charting category.
    pub name: String,

    /// Planned length of the session.
    pub duration: Minutes,

    /// Text color class carried over from the preset.
    pub color: String,

    /// Accent color (e.g. `#2563eb`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,

    /// Icon key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    /// Anchor of the whole timeline when this task is at the head of the queue.
    ///
    /// Ignored for every other position.
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Creates a task with a fresh ID and no category styling.
    pub fn new(name: impl Into<String>, duration: Minutes, created_at: DateTime<Utc>) -> Self {
        Self {
            id: TaskId::generate(),
            name: name.into(),
            duration,
            color: String::new(),
            accent: None,
            icon: None,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn task_serializes_camel_case() {
        let task = Task {
            id: TaskId::new("t1").unwrap(),
            name: "Deep Work".to_string(),
            duration: Minutes::new(60).unwrap(),
            color: "text-zinc-600".to_string(),
            accent: Some("#2563eb".to_string()),
            icon: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
        };

        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["createdAt"], "2024-01-01T09:00:00Z");
        assert_eq!(json["duration"], 60);
        assert!(json.get("icon").is_none());

        let parsed: Task = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, task);
    }

    #[test]
    fn task_rejects_zero_duration() {
        let json = r#"{
            "id": "t1",
            "name": "x",
            "duration": 0,
            "color": "",
            "createdAt": "2024-01-01T00:00:00Z"
        }"#;
        assert!(serde_json::from_str::<Task>(json).is_err());
    }
}
