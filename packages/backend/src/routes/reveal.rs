use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;

use crate::response::{json_error, ok, AppError};
use crate::services::reveal::{self, RevealError, RevealRequest};
use crate::state::AppState;

impl From<RevealError> for AppError {
    fn from(err: RevealError) -> Self {
        match err {
            RevealError::UserNotFound => AppError::not_found(err.to_string()),
            RevealError::QuestionNotFound => AppError::not_found(err.to_string()),
            RevealError::InsufficientXp { .. } => {
                json_error(StatusCode::BAD_REQUEST, "INSUFFICIENT_XP", err.to_string())
            }
            RevealError::Sql(sql_err) => AppError::database(&sql_err),
        }
    }
}

pub async fn reveal(
    State(state): State<AppState>,
    payload: Result<Json<RevealRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload?;
    if request.user_id.trim().is_empty() || request.question_id.trim().is_empty() {
        return Err(AppError::validation("userId, questionId, and type required"));
    }

    let proxy = state.db_proxy();
    let evaluator = state.evaluator();
    let result = reveal::reveal(
        &proxy,
        evaluator.as_ref(),
        state.hint_cache(),
        state.practice(),
        &request,
    )
    .await?;
    Ok(ok(result))
}
