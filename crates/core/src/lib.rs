//! Domain layer for the todo API.
//!
//! Holds the todo record shape exposed over HTTP, the enum fields and their
//! permitted values, due-date normalization, and the validation and merge
//! rules applied to create/update payloads. Nothing in here touches I/O.
pub mod date;
pub mod types;
pub mod validation;

pub use types::{NewTodo, Todo, TodoCategory, TodoFilter, TodoPriority, TodoStatus};
pub use validation::{TodoDraft, TodoPatch, ValidatedPatch, ValidationError};
