use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use todo_api_core::date::parse_due_date;
use todo_api_core::{Todo, TodoDraft, TodoFilter, TodoPatch, ValidationError};
use todo_api_storage::{Database, TodoRow, TodoStoreError};

/// Query string accepted by the list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub search_q: Option<String>,
}

/// Query string accepted by the agenda endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct AgendaQuery {
    #[serde(default)]
    pub date: Option<String>,
}

/// Todo operations over a single injected [`Database`].
#[derive(Clone)]
pub struct TodoService {
    database: Database,
}

impl TodoService {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Vec<Todo>, ServiceError> {
        let filter = TodoFilter::from_params(
            query.status.as_deref(),
            query.priority.as_deref(),
            query.category.as_deref(),
            query.search_q.as_deref(),
        )?;

        let rows = self.database.todos().list(&filter).await?;
        Ok(rows.into_iter().map(TodoRow::into_domain).collect())
    }

    /// `None` when no row has this id.
    pub async fn get(&self, id: i64) -> Result<Option<Todo>, ServiceError> {
        let row = self.database.todos().fetch(id).await?;
        Ok(row.map(TodoRow::into_domain))
    }

    /// Rows due on the given day, in storage naming. A missing date is
    /// treated like an unparseable one.
    pub async fn agenda(&self, query: &AgendaQuery) -> Result<Vec<TodoRow>, ServiceError> {
        let day = parse_due_date(query.date.as_deref().unwrap_or_default())?;
        Ok(self.database.todos().list_due_on(day).await?)
    }

    pub async fn create(&self, draft: TodoDraft) -> Result<&'static str, ServiceError> {
        let todo = draft.validate()?;
        self.database.todos().insert(&todo).await?;
        info!(stage = "todo", id = todo.id, "todo created");
        Ok("Todo Successfully Added")
    }

    /// Merges the supplied fields over the stored row and writes it back.
    pub async fn update(&self, id: i64, patch: TodoPatch) -> Result<String, ServiceError> {
        let patch = patch.validate()?;

        let repo = self.database.todos();
        let previous = repo
            .fetch(id)
            .await?
            .ok_or(ServiceError::NotFound(id))?
            .into_domain();

        let merged = patch.merge_over(previous);
        repo.update(&merged).await?;

        let message = patch.confirmation();
        info!(stage = "todo", id, fields = ?patch.updated_fields(), "todo updated");
        Ok(message)
    }

    /// Succeeds whether or not the row existed.
    pub async fn delete(&self, id: i64) -> Result<&'static str, ServiceError> {
        let removed = self.database.todos().delete(id).await?;
        info!(stage = "todo", id, removed, "todo deleted");
        Ok("Todo Deleted")
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("todo {0} not found")]
    NotFound(i64),
    #[error("storage failure: {0}")]
    Storage(#[from] TodoStoreError),
}

impl ServiceError {
    /// Label used for the `result` dimension of request metrics.
    pub fn metric_label(&self) -> &'static str {
        match self {
            Self::Validation(_) => "invalid",
            Self::NotFound(_) => "not_found",
            Self::Storage(_) => "error",
        }
    }
}
