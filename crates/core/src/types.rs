use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::validation::ValidationError;

/// Todo as exposed over the HTTP API.
///
/// Values are kept as stored so rows written before validation existed still
/// render; typed enums are only enforced on the way in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub todo: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub due_date: Option<String>,
}

/// Progress state of a todo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TodoStatus {
    #[serde(rename = "TO DO", alias = "TO_DO")]
    ToDo,
    #[serde(rename = "IN PROGRESS", alias = "IN_PROGRESS")]
    InProgress,
    #[serde(rename = "DONE")]
    Done,
}

impl TodoStatus {
    /// Returns the canonical database representation for the status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ToDo => "TO DO",
            Self::InProgress => "IN PROGRESS",
            Self::Done => "DONE",
        }
    }
}

impl FromStr for TodoStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "TO DO" | "TO_DO" => Ok(Self::ToDo),
            "IN PROGRESS" | "IN_PROGRESS" => Ok(Self::InProgress),
            "DONE" => Ok(Self::Done),
            _ => Err(ValidationError::InvalidStatus),
        }
    }
}

/// Urgency of a todo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TodoPriority {
    High,
    Medium,
    Low,
}

impl TodoPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

impl FromStr for TodoPriority {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "HIGH" => Ok(Self::High),
            "MEDIUM" => Ok(Self::Medium),
            "LOW" => Ok(Self::Low),
            _ => Err(ValidationError::InvalidPriority),
        }
    }
}

/// Area of life a todo belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TodoCategory {
    Work,
    Home,
    Learning,
}

impl TodoCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Work => "WORK",
            Self::Home => "HOME",
            Self::Learning => "LEARNING",
        }
    }
}

impl FromStr for TodoCategory {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "WORK" => Ok(Self::Work),
            "HOME" => Ok(Self::Home),
            "LEARNING" => Ok(Self::Learning),
            _ => Err(ValidationError::InvalidCategory),
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(TodoStatus, TodoPriority, TodoCategory);

/// Validated payload for inserting a todo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub id: i64,
    pub todo: String,
    pub category: Option<TodoCategory>,
    pub priority: Option<TodoPriority>,
    pub status: Option<TodoStatus>,
    pub due_date: Option<NaiveDate>,
}

/// Validated criteria for listing todos.
///
/// `search` is a case-sensitive substring of the description; the empty
/// string matches every row that has a description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoFilter {
    pub status: Option<TodoStatus>,
    pub priority: Option<TodoPriority>,
    pub category: Option<TodoCategory>,
    pub search: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn todo_serializes_with_camel_case_due_date() {
        let todo = Todo {
            id: 1,
            todo: Some("Learn Rust".to_string()),
            priority: Some("HIGH".to_string()),
            status: Some("TO DO".to_string()),
            category: Some("LEARNING".to_string()),
            due_date: Some("2023-01-05".to_string()),
        };

        let value = serde_json::to_value(&todo).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 1,
                "todo": "Learn Rust",
                "priority": "HIGH",
                "status": "TO DO",
                "category": "LEARNING",
                "dueDate": "2023-01-05",
            })
        );
    }

    #[test]
    fn status_accepts_underscore_aliases() {
        assert_eq!("TO_DO".parse::<TodoStatus>(), Ok(TodoStatus::ToDo));
        assert_eq!("IN PROGRESS".parse::<TodoStatus>(), Ok(TodoStatus::InProgress));
        assert_eq!(TodoStatus::InProgress.as_str(), "IN PROGRESS");
        let parsed: TodoStatus = serde_json::from_value(json!("IN_PROGRESS")).unwrap();
        assert_eq!(parsed, TodoStatus::InProgress);
    }

    #[test]
    fn enum_parsing_is_exact() {
        assert_eq!("done".parse::<TodoStatus>(), Err(ValidationError::InvalidStatus));
        assert_eq!("URGENT".parse::<TodoPriority>(), Err(ValidationError::InvalidPriority));
        assert_eq!("Work".parse::<TodoCategory>(), Err(ValidationError::InvalidCategory));
        assert_eq!("LEARNING".parse::<TodoCategory>(), Ok(TodoCategory::Learning));
        assert_eq!(TodoPriority::Medium.to_string(), "MEDIUM");
    }
}
