use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;

use crate::response::{json_error, ok, AppError};
use crate::services::practice::{self, PracticeError, PracticeMode, SubmitAttemptRequest};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextQuestionQuery {
    user_id: String,
    concept_id: String,
    #[serde(default)]
    mode: PracticeMode,
}

impl From<PracticeError> for AppError {
    fn from(err: PracticeError) -> Self {
        match err {
            PracticeError::UserNotFound => {
                json_error(StatusCode::NOT_FOUND, "USER_NOT_FOUND", err.to_string())
            }
            PracticeError::ConceptNotFound => {
                json_error(StatusCode::NOT_FOUND, "CONCEPT_NOT_FOUND", err.to_string())
            }
            PracticeError::NoQuestions => {
                json_error(StatusCode::BAD_REQUEST, "NO_QUESTIONS", err.to_string())
            }
            PracticeError::Sql(sql_err) => AppError::database(&sql_err),
        }
    }
}

pub async fn next_question(
    State(state): State<AppState>,
    query: Result<Query<NextQuestionQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query?;
    if query.user_id.trim().is_empty() || query.concept_id.trim().is_empty() {
        return Err(AppError::validation("userId and conceptId required"));
    }

    let proxy = state.db_proxy();
    let next = practice::next_question(&proxy, &query.user_id, &query.concept_id, query.mode).await?;
    Ok(ok(next))
}

pub async fn submit_attempt(
    State(state): State<AppState>,
    payload: Result<Json<SubmitAttemptRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload?;
    if request.user_id.trim().is_empty() || request.concept_id.trim().is_empty() {
        return Err(AppError::validation("userId and conceptId required"));
    }

    let proxy = state.db_proxy();
    let evaluator = state.evaluator();
    let result =
        practice::submit_attempt(&proxy, evaluator.as_ref(), state.practice(), &request).await?;
    Ok(ok(result))
}
