use axum::{
    Json,
    body::Body,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::task::Task;

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: i64,
    pub short_name: String,
    pub description: Option<String>,
    pub date: String,
    pub start_time: String,
    pub duration_hours: i64,
    pub location: Option<String>,
    pub status: String,
}

impl From<&Task> for TaskResponse {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            short_name: task.short_name.clone(),
            description: task.description.clone(),
            date: task.date.clone(),
            start_time: task.start_time.clone(),
            duration_hours: task.duration_hours,
            location: task.location.clone(),
            status: task.status.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub tasks: Vec<TaskResponse>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub short_name: String,
    pub description: Option<String>,
    pub date: String,
    pub start_time: String,
    pub duration_hours: i64,
    pub location: Option<String>,
}

impl CreateTaskRequest {
    /// Boundary validation: the core assumes every task it sees already
    /// satisfies these invariants.
    pub fn validate(&self) -> Result<(), String> {
        if self.short_name.trim().is_empty() {
            return Err("short_name must not be empty".to_string());
        }
        if self.date.trim().is_empty() || self.start_time.trim().is_empty() {
            return Err("date and start_time are required".to_string());
        }
        if self.duration_hours < 1 {
            return Err("duration_hours must be at least 1".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    pub short_name: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub duration_hours: Option<i64>,
    pub location: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// When true, return every task instead of only recorded ones.
    pub all: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }

    pub fn internal(e: impl std::fmt::Display) -> Response<Body> {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(Self::new(e.to_string())),
        )
            .into_response()
    }

    pub fn not_found(message: impl Into<String>) -> Response<Body> {
        (StatusCode::NOT_FOUND, Json(Self::new(message))).into_response()
    }

    pub fn bad_request(message: impl Into<String>) -> Response<Body> {
        (StatusCode::BAD_REQUEST, Json(Self::new(message))).into_response()
    }
}
