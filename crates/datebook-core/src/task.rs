use std::fmt;

use datebook_shared::TaskDto;
use serde::{Deserialize, Serialize};

use crate::date::CalendarDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub date: CalendarDate,
    #[serde(default)]
    pub is_completed: bool,
}

/// String-dated form of [`Task`] used at the import/export boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeTask {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// `YYYY-MM-DD`; a missing date reads as empty and fails on import.
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub is_completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub date: Option<CalendarDate>,
}

impl NewTask {
    pub fn new(title: impl Into<String>, description: impl Into<String>, date: CalendarDate) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            date: Some(date),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskUpdate {
    pub id: TaskId,
    pub title: String,
    pub description: String,
}

impl Task {
    pub fn to_exchange(&self) -> ExchangeTask {
        ExchangeTask {
            id: Some(self.id.0),
            title: self.title.clone(),
            description: self.description.clone(),
            date: self.date.to_string(),
            is_completed: self.is_completed,
        }
    }

    pub fn to_dto(&self) -> TaskDto {
        TaskDto {
            id: self.id.0,
            title: self.title.clone(),
            description: self.description.clone(),
            date: self.date.to_string(),
            is_completed: self.is_completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exchange_record_tolerates_missing_fields() {
        let raw = r#"{"title":"Pay bills","date":"2025-01-01"}"#;
        let record: ExchangeTask = serde_json::from_str(raw).expect("parse record");
        assert_eq!(record.id, None);
        assert!(record.description.is_empty());
        assert!(!record.is_completed);
    }

    #[test]
    fn exchange_form_keeps_every_field() {
        let task = Task {
            id: TaskId(4),
            title: "Dentist".to_string(),
            description: "bring forms".to_string(),
            date: CalendarDate::from_ymd(2025, 3, 9).expect("valid date"),
            is_completed: true,
        };
        let record = task.to_exchange();
        assert_eq!(record.id, Some(4));
        assert_eq!(record.date, "2025-03-09");
        assert!(record.is_completed);

        let value = serde_json::to_value(&record).expect("serialize");
        assert_eq!(value["isCompleted"], true);
        assert_eq!(value["description"], "bring forms");
    }
}
