use chrono::NaiveDate;
use serde::Serialize;
use sqlx::{migrate::MigrateError, sqlite::SqlitePoolOptions, SqlitePool};
use thiserror::Error;

use todo_api_core::date::format_due_date;
use todo_api_core::types::{NewTodo, Todo, TodoFilter};

/// Top-level database handle that owns the SQLite connection pool.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Establishes a new SQLite connection pool for the provided connection string.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(StorageError::Connect)?;

        apply_pragmas(&pool).await?;

        Ok(Self { pool })
    }

    /// Creates the `todo` table when it does not exist yet.
    pub async fn run_migrations(&self) -> Result<(), StorageError> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(StorageError::Migration)?;
        Ok(())
    }

    /// Returns a handle to interact with the `todo` table.
    pub fn todos(&self) -> TodoRepository {
        TodoRepository {
            pool: self.pool.clone(),
        }
    }

    /// Exposes the inner pool when lower level access is required.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

async fn apply_pragmas(pool: &SqlitePool) -> Result<(), StorageError> {
    sqlx::query("PRAGMA foreign_keys = ON;")
        .execute(pool)
        .await
        .map_err(StorageError::Pragma)?;

    sqlx::query("PRAGMA journal_mode = WAL;")
        .fetch_one(pool)
        .await
        .map_err(StorageError::Pragma)?;

    sqlx::query("PRAGMA synchronous = NORMAL;")
        .execute(pool)
        .await
        .map_err(StorageError::Pragma)?;

    sqlx::query("PRAGMA busy_timeout = 5000;")
        .execute(pool)
        .await
        .map_err(StorageError::Pragma)?;

    Ok(())
}

/// General storage level errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to connect to sqlite: {0}")]
    Connect(sqlx::Error),
    #[error("failed to apply pragma: {0}")]
    Pragma(sqlx::Error),
    #[error("failed to run database migrations: {0}")]
    Migration(MigrateError),
}

/// Row of the `todo` table, with storage column names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct TodoRow {
    pub id: i64,
    pub todo: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub due_date: Option<String>,
}

impl TodoRow {
    /// Converts the database row into the API representation.
    pub fn into_domain(self) -> Todo {
        Todo {
            id: self.id,
            todo: self.todo,
            priority: self.priority,
            status: self.status,
            category: self.category,
            due_date: self.due_date,
        }
    }
}

/// Repository for todo rows. Every statement is parameterized.
#[derive(Clone)]
pub struct TodoRepository {
    pool: SqlitePool,
}

impl TodoRepository {
    /// Lists rows matching every supplied filter whose description contains
    /// `filter.search` (case-sensitive), ordered by id.
    pub async fn list(&self, filter: &TodoFilter) -> Result<Vec<TodoRow>, TodoStoreError> {
        let status = filter.status.map(|value| value.as_str());
        let priority = filter.priority.map(|value| value.as_str());
        let category = filter.category.map(|value| value.as_str());

        let rows = sqlx::query_as::<_, TodoRow>(
            r#"
SELECT id, todo, category, priority, status, due_date
  FROM todo
 WHERE instr(todo, ?) > 0
   AND (? IS NULL OR status = ?)
   AND (? IS NULL OR priority = ?)
   AND (? IS NULL OR category = ?)
 ORDER BY id ASC
            "#,
        )
        .bind(&filter.search)
        .bind(status)
        .bind(status)
        .bind(priority)
        .bind(priority)
        .bind(category)
        .bind(category)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Loads a single row by id.
    pub async fn fetch(&self, id: i64) -> Result<Option<TodoRow>, TodoStoreError> {
        let row = sqlx::query_as::<_, TodoRow>(
            "SELECT id, todo, category, priority, status, due_date FROM todo WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Lists rows whose stored due date equals `day`.
    pub async fn list_due_on(&self, day: NaiveDate) -> Result<Vec<TodoRow>, TodoStoreError> {
        let rows = sqlx::query_as::<_, TodoRow>(
            "SELECT id, todo, category, priority, status, due_date FROM todo \
             WHERE due_date = ? ORDER BY id ASC",
        )
        .bind(format_due_date(day))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Inserts a new row. Duplicate ids surface as a database error.
    pub async fn insert(&self, todo: &NewTodo) -> Result<(), TodoStoreError> {
        sqlx::query(
            "INSERT INTO todo (id, todo, category, priority, status, due_date) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(todo.id)
        .bind(&todo.todo)
        .bind(todo.category.map(|value| value.as_str()))
        .bind(todo.priority.map(|value| value.as_str()))
        .bind(todo.status.map(|value| value.as_str()))
        .bind(todo.due_date.map(format_due_date))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Overwrites every mutable column of the row identified by `todo.id`.
    pub async fn update(&self, todo: &Todo) -> Result<u64, TodoStoreError> {
        let result = sqlx::query(
            "UPDATE todo \
             SET todo = ?, status = ?, priority = ?, category = ?, due_date = ? \
             WHERE id = ?",
        )
        .bind(&todo.todo)
        .bind(&todo.status)
        .bind(&todo.priority)
        .bind(&todo.category)
        .bind(&todo.due_date)
        .bind(todo.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Deletes the row if present, returning the number of rows removed.
    pub async fn delete(&self, id: i64) -> Result<u64, TodoStoreError> {
        let result = sqlx::query("DELETE FROM todo WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

/// Errors that can occur while reading or writing todos.
#[derive(Debug, Error)]
pub enum TodoStoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
