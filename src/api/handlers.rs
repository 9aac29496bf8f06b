use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::monitor::notify_changed;
use crate::task::{Task, TaskStatus};

use super::AppState;
use super::models::{
    CreateTaskRequest, ErrorResponse, ListQuery, TaskListResponse, TaskResponse, UpdateTaskRequest,
};

pub async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    // Default mirrors the external read surface contract: recorded tasks only.
    let result = if query.all.unwrap_or(false) {
        state.db.list_all_tasks()
    } else {
        state.db.list_recorded_tasks()
    };

    match result {
        Ok(tasks) => {
            let response = TaskListResponse {
                tasks: tasks.iter().map(TaskResponse::from).collect(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => ErrorResponse::internal(e),
    }
}

pub async fn get_task(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    match state.db.get_task_by_id(id) {
        Ok(Some(task)) => (StatusCode::OK, Json(TaskResponse::from(&task))).into_response(),
        Ok(None) => ErrorResponse::not_found("Task not found"),
        Err(e) => ErrorResponse::internal(e),
    }
}

pub async fn create_task(
    State(state): State<AppState>,
    Json(req): Json<CreateTaskRequest>,
) -> impl IntoResponse {
    if let Err(message) = req.validate() {
        return ErrorResponse::bad_request(message);
    }

    let mut task = Task::new(req.short_name, req.date, req.start_time, req.duration_hours);
    task.description = req.description;
    task.location = req.location;

    match state.db.insert_task(&task) {
        Ok(id) => {
            task.id = id;
            notify_changed(&state.notifier);
            (StatusCode::CREATED, Json(TaskResponse::from(&task))).into_response()
        }
        Err(e) => ErrorResponse::internal(e),
    }
}

pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateTaskRequest>,
) -> impl IntoResponse {
    let mut task = match state.db.get_task_by_id(id) {
        Ok(Some(task)) => task,
        Ok(None) => return ErrorResponse::not_found("Task not found"),
        Err(e) => return ErrorResponse::internal(e),
    };

    if let Some(short_name) = req.short_name {
        if short_name.trim().is_empty() {
            return ErrorResponse::bad_request("short_name must not be empty");
        }
        task.short_name = short_name;
    }

    if let Some(description) = req.description {
        task.description = if description.is_empty() {
            None
        } else {
            Some(description)
        };
    }

    if let Some(date) = req.date {
        task.date = date;
    }

    if let Some(start_time) = req.start_time {
        task.start_time = start_time;
    }

    if let Some(duration_hours) = req.duration_hours {
        // Boundary validation applies here too; external writes must not be
        // able to smuggle in a non-positive duration.
        if duration_hours < 1 {
            return ErrorResponse::bad_request("duration_hours must be at least 1");
        }
        task.duration_hours = duration_hours;
    }

    if let Some(location) = req.location {
        task.location = if location.is_empty() {
            None
        } else {
            Some(location)
        };
    }

    if let Some(status_str) = req.status {
        match status_str.parse::<TaskStatus>() {
            Ok(status) => task.status = status,
            Err(_) => {
                return ErrorResponse::bad_request(format!(
                    "Invalid status: {status_str}. Use recorded, in_progress, expired or completed"
                ));
            }
        }
    }

    if let Err(e) = state.db.update_task(&task) {
        return ErrorResponse::internal(e);
    }

    notify_changed(&state.notifier);
    (StatusCode::OK, Json(TaskResponse::from(&task))).into_response()
}

pub async fn delete_task(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    match state.db.delete_task_by_id(id) {
        Ok(0) => ErrorResponse::not_found("Task not found"),
        Ok(_) => {
            notify_changed(&state.notifier);
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => ErrorResponse::internal(e),
    }
}
