use std::str::FromStr;

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use crate::date::{format_due_date, normalize_due_date, parse_due_date};
use crate::types::{NewTodo, Todo, TodoCategory, TodoFilter, TodoPriority, TodoStatus};

/// Rejections raised while validating client input.
///
/// The display strings are returned verbatim to API clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid Todo Status")]
    InvalidStatus,
    #[error("Invalid Todo Priority")]
    InvalidPriority,
    #[error("Invalid Todo Category")]
    InvalidCategory,
    #[error("Invalid Due Date")]
    InvalidDueDate,
    #[error("No Todo Fields Supplied")]
    EmptyUpdate,
}

fn present(raw: Option<&str>) -> Option<&str> {
    raw.filter(|value| !value.is_empty())
}

fn parse_optional<T>(raw: Option<&str>) -> Result<Option<T>, ValidationError>
where
    T: FromStr<Err = ValidationError>,
{
    present(raw).map(|value| value.parse::<T>()).transpose()
}

fn parse_optional_date(raw: Option<&str>) -> Result<Option<NaiveDate>, ValidationError> {
    present(raw).map(parse_due_date).transpose()
}

impl TodoFilter {
    /// Builds a filter from raw query values. Empty values count as absent.
    pub fn from_params(
        status: Option<&str>,
        priority: Option<&str>,
        category: Option<&str>,
        search: Option<&str>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            status: parse_optional(status)?,
            priority: parse_optional(priority)?,
            category: parse_optional(category)?,
            search: search.unwrap_or_default().to_string(),
        })
    }
}

/// Body of a create request, before validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoDraft {
    pub id: i64,
    pub todo: String,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub due_date: Option<String>,
}

impl TodoDraft {
    /// Checks enum membership and normalizes the due date.
    pub fn validate(self) -> Result<NewTodo, ValidationError> {
        let status = parse_optional(self.status.as_deref())?;
        let priority = parse_optional(self.priority.as_deref())?;
        let category = parse_optional(self.category.as_deref())?;
        let due_date = parse_optional_date(self.due_date.as_deref())?;

        Ok(NewTodo {
            id: self.id,
            todo: self.todo,
            category,
            priority,
            status,
            due_date,
        })
    }
}

/// Body of an update request: any subset of the mutable fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoPatch {
    pub todo: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub due_date: Option<String>,
}

impl TodoPatch {
    /// Validates only the supplied fields. A patch with nothing left to
    /// apply is rejected.
    pub fn validate(self) -> Result<ValidatedPatch, ValidationError> {
        let status = parse_optional(self.status.as_deref())?;
        let priority = parse_optional(self.priority.as_deref())?;
        let category = parse_optional(self.category.as_deref())?;
        let due_date = parse_optional_date(self.due_date.as_deref())?;

        let patch = ValidatedPatch {
            todo: self.todo,
            status,
            priority,
            category,
            due_date,
        };
        if patch.updated_fields().is_empty() {
            return Err(ValidationError::EmptyUpdate);
        }
        Ok(patch)
    }
}

/// Update whose supplied fields have all passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPatch {
    todo: Option<String>,
    status: Option<TodoStatus>,
    priority: Option<TodoPriority>,
    category: Option<TodoCategory>,
    due_date: Option<NaiveDate>,
}

impl ValidatedPatch {
    /// Names of the supplied fields, in fixed field order.
    pub fn updated_fields(&self) -> Vec<&'static str> {
        [
            (self.todo.is_some(), "Todo"),
            (self.status.is_some(), "Status"),
            (self.priority.is_some(), "Priority"),
            (self.category.is_some(), "Category"),
            (self.due_date.is_some(), "DueDate"),
        ]
        .into_iter()
        .filter_map(|(supplied, name)| supplied.then_some(name))
        .collect()
    }

    /// Confirmation text returned to the client, e.g. `Status Updated`.
    pub fn confirmation(&self) -> String {
        format!("{} Updated", self.updated_fields().join(", "))
    }

    /// Applies the supplied fields over `previous`; absent fields keep their
    /// prior value. A previous due date is re-normalized when it parses and
    /// kept verbatim otherwise.
    pub fn merge_over(&self, previous: Todo) -> Todo {
        let due_date = match self.due_date {
            Some(date) => Some(format_due_date(date)),
            None => previous
                .due_date
                .map(|raw| normalize_due_date(&raw).unwrap_or(raw)),
        };

        Todo {
            id: previous.id,
            todo: self.todo.clone().or(previous.todo),
            status: self
                .status
                .map(|value| value.as_str().to_string())
                .or(previous.status),
            priority: self
                .priority
                .map(|value| value.as_str().to_string())
                .or(previous.priority),
            category: self
                .category
                .map(|value| value.as_str().to_string())
                .or(previous.category),
            due_date,
        }
    }
}
