//! HTTP surface.
//!
//! `POST /ask` and `POST /chat` take `{message, memory?, session_id?}` and answer
//! `{reply, session_id}`. Errors always carry a user-safe `reply`.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};
use validator::{Validate, ValidationError};

use crate::actors::messages::ChatReply;
use crate::actors::supervisor::SupervisorHandle;
use crate::brain::memory::Turn;
use crate::error::AppError;

const RETRY_PROMPT: &str = "Please enter a valid message.";
const APOLOGY: &str = "Internal error. Please try again.";
const BANNER: &str = "NeuroGen backend running.";

const MAX_MESSAGE_CHARS: u64 = 4000;

pub struct AppState {
    pub supervisor: SupervisorHandle,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(supervisor: SupervisorHandle) -> Self {
        Self {
            supervisor,
            started_at: Instant::now(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AskRequest {
    #[validate(length(min = 1, max = MAX_MESSAGE_CHARS), custom(function = "not_blank"))]
    pub message: String,
    #[serde(default)]
    pub memory: Option<Vec<Turn>>,
    #[serde(default)]
    pub session_id: Option<String>,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    reply: &'static str,
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    /// Seconds since startup
    uptime: f64,
    timestamp: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(reason) => {
                warn!("Rejected request: {}", reason);
                (StatusCode::BAD_REQUEST, Json(ErrorBody { reply: RETRY_PROMPT })).into_response()
            }
            other => {
                error!("Request failed: {}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody { reply: APOLOGY }),
                )
                    .into_response()
            }
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(banner))
        .route("/health", get(health))
        .route("/ask", post(ask))
        .route("/chat", post(ask))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

async fn banner() -> &'static str {
    BANNER
}

async fn health(State(state): State<Arc<AppState>>) -> Json<Health> {
    Json(Health {
        status: "ok",
        uptime: state.started_at.elapsed().as_secs_f64(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

async fn ask(
    State(state): State<Arc<AppState>>,
    body: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, AppError> {
    let Json(request) = body.map_err(|e| AppError::Validation(e.body_text()))?;
    request.validate()?;

    let reply = state
        .supervisor
        .process_message(request.session_id, request.message, request.memory)
        .await?;
    Ok(Json(reply))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(message: &str) -> AskRequest {
        AskRequest {
            message: message.to_string(),
            memory: None,
            session_id: None,
        }
    }

    #[test]
    fn test_validation() {
        assert!(request("hi").validate().is_ok());
        assert!(request("").validate().is_err());
        assert!(request(" \n\t ").validate().is_err());
        assert!(request(&"a".repeat(MAX_MESSAGE_CHARS as usize + 1)).validate().is_err());
    }

    #[test]
    fn test_deserialize_with_memory() {
        let parsed: AskRequest = serde_json::from_str(
            r#"{"message":"and tomorrow?","memory":[{"role":"user","content":"fixtures?"}],"session_id":"s1"}"#,
        )
        .unwrap();
        assert_eq!(parsed.memory.unwrap().len(), 1);
        assert_eq!(parsed.session_id.as_deref(), Some("s1"));
    }

    #[test]
    fn test_error_status_codes() {
        let bad = AppError::Validation("empty".to_string()).into_response();
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

        let internal = AppError::Actor("closed".to_string()).into_response();
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
