//! Route handlers for the three task actions.

use super::error::ApiError;
use crate::task::{
    domain::{AUDIT_DATE_FORMAT, Task},
    ports::TaskStore,
    services::{
        CreateTaskRequest, ListTasksRequest, PromoteTaskRequest, TaskLifecycleError,
        TaskLifecycleService,
    },
};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{patch, post};
use axum::{Json, Router};
use mockable::Clock;
use serde::Serialize;
use serde_json::{Map, Value};

const SUCCESS_CODE: &str = "S000";

/// Shared handler state.
pub struct AppState<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    service: TaskLifecycleService<S, C>,
}

impl<S, C> Clone for AppState<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
        }
    }
}

/// Builds the router serving the task actions.
///
/// Any path other than the three action routes answers `404` with
/// [`super::UNKNOWN_ROUTE_CODE`].
pub fn router<S, C>(service: TaskLifecycleService<S, C>) -> Router
where
    S: TaskStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    Router::new()
        .route("/CreateTask", post(create_task::<S, C>))
        .route("/GetTaskbyState", post(list_tasks_by_state::<S, C>))
        .route("/PromoteTask2Done", patch(promote_task_to_done::<S, C>))
        .fallback(|| async { ApiError::unknown_route() })
        .with_state(AppState { service })
}

#[derive(Debug, Serialize)]
struct CreatedBody {
    code: &'static str,
    task_id: String,
}

#[derive(Debug, Serialize)]
struct TasksBody {
    code: &'static str,
    tasks: Vec<TaskView>,
}

#[derive(Debug, Serialize)]
struct AckBody {
    code: &'static str,
}

#[derive(Debug, Serialize)]
struct TaskView {
    task_id: String,
    task_name: String,
    task_description: Option<String>,
    task_state: &'static str,
    task_app_acronym: String,
    task_creator: String,
    task_owner: String,
    task_createdate: String,
}

impl From<&Task> for TaskView {
    fn from(task: &Task) -> Self {
        Self {
            task_id: task.id().to_string(),
            task_name: task.name().to_string(),
            task_description: task.description().map(ToOwned::to_owned),
            task_state: task.state().as_str(),
            task_app_acronym: task.application().to_string(),
            task_creator: task.creator().to_string(),
            task_owner: task.owner().to_string(),
            task_createdate: task.created_at().format(AUDIT_DATE_FORMAT).to_string(),
        }
    }
}

/// Decodes a request body; an empty body counts as an empty object.
fn parse_body(body: &Bytes) -> Result<Value, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(body).map_err(|err| {
        ApiError::from(TaskLifecycleError::InvalidInput(format!(
            "malformed JSON body: {err}"
        )))
    })
}

async fn create_task<S, C>(
    State(state): State<AppState<S, C>>,
    body: Bytes,
) -> Result<(StatusCode, Json<CreatedBody>), ApiError>
where
    S: TaskStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    let request = CreateTaskRequest::from_payload(&parse_body(&body)?)?;
    let task = state.service.create_task(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedBody {
            code: SUCCESS_CODE,
            task_id: task.id().to_string(),
        }),
    ))
}

async fn list_tasks_by_state<S, C>(
    State(state): State<AppState<S, C>>,
    body: Bytes,
) -> Result<Json<TasksBody>, ApiError>
where
    S: TaskStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    let request = ListTasksRequest::from_payload(&parse_body(&body)?)?;
    let tasks = state.service.list_by_state(request).await?;
    Ok(Json(TasksBody {
        code: SUCCESS_CODE,
        tasks: tasks.iter().map(TaskView::from).collect(),
    }))
}

async fn promote_task_to_done<S, C>(
    State(state): State<AppState<S, C>>,
    body: Bytes,
) -> Result<Json<AckBody>, ApiError>
where
    S: TaskStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    let request = PromoteTaskRequest::from_payload(&parse_body(&body)?)?;
    // The notification batch runs detached.
    state.service.promote_to_done(request).await?;
    Ok(Json(AckBody { code: SUCCESS_CODE }))
}
