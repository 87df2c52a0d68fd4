use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;

use todo_api_core::{Todo, TodoDraft, TodoPatch};
use todo_api_storage::TodoRow;

use crate::service::{AgendaQuery, ListQuery, ServiceError, TodoService};
use crate::telemetry::{self, observe};

#[derive(Clone)]
pub struct AppState {
    metrics: PrometheusHandle,
    todos: TodoService,
}

impl AppState {
    pub fn new(metrics: PrometheusHandle, todos: TodoService) -> Self {
        Self { metrics, todos }
    }

    pub fn metrics(&self) -> &PrometheusHandle {
        &self.metrics
    }

    pub fn todos(&self) -> &TodoService {
        &self.todos
    }
}

/// Every resource path is served with and without its trailing slash.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/", get(list_todos).post(create_todo))
        .route(
            "/todos/:id",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .route(
            "/todos/:id/",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .route("/agenda", get(agenda))
        .route("/agenda/", get(agenda))
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn metrics(State(state): State<AppState>) -> Response {
    let body = telemetry::render_metrics(state.metrics());
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        Body::from(body),
    )
        .into_response()
}

async fn list_todos(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Todo>>, ServiceError> {
    observe("list", state.todos().list(&query).await).map(Json)
}

/// An unknown id answers 200 with an empty body.
async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, ServiceError> {
    let todo = observe("get", state.todos().get(id).await)?;
    Ok(match todo {
        Some(todo) => Json(todo).into_response(),
        None => StatusCode::OK.into_response(),
    })
}

async fn agenda(
    State(state): State<AppState>,
    Query(query): Query<AgendaQuery>,
) -> Result<Json<Vec<TodoRow>>, ServiceError> {
    observe("agenda", state.todos().agenda(&query).await).map(Json)
}

async fn create_todo(
    State(state): State<AppState>,
    Json(draft): Json<TodoDraft>,
) -> Result<&'static str, ServiceError> {
    observe("create", state.todos().create(draft).await)
}

async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<TodoPatch>,
) -> Result<String, ServiceError> {
    observe("update", state.todos().update(id, patch).await)
}

async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<&'static str, ServiceError> {
    observe("delete", state.todos().delete(id).await)
}
