mod curriculum;
mod dashboard;
mod health;
mod practice;
mod reveal;

use axum::extract::rejection::QueryRejection;
use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;

use crate::response::{json_error, AppError};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/app/curriculum",
            get(curriculum::curriculum_tree).fallback(fallback_handler),
        )
        .route(
            "/api/app/practice/next",
            get(practice::next_question).fallback(fallback_handler),
        )
        .route(
            "/api/adaptive",
            post(practice::submit_attempt).fallback(fallback_handler),
        )
        .route(
            "/api/app/reveal",
            post(reveal::reveal).fallback(fallback_handler),
        )
        .route(
            "/api/app/assessment/start",
            get(curriculum::start_assessment).fallback(fallback_handler),
        )
        .route(
            "/api/dashboard",
            get(dashboard::dashboard).fallback(fallback_handler),
        )
        .nest("/health", health::router())
        .fallback(fallback_handler)
        .with_state(state)
}

/// `?userId=` shared by the learner-scoped GET routes
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserQuery {
    user_id: String,
}

impl UserQuery {
    pub(crate) fn validated(query: Result<Query<Self>, QueryRejection>) -> Result<String, AppError> {
        let Query(query) = query?;
        let user_id = query.user_id.trim();
        if user_id.is_empty() {
            return Err(AppError::validation("userId is required"));
        }
        Ok(user_id.to_string())
    }
}

async fn fallback_handler() -> Response {
    json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "Route not found").into_response()
}
