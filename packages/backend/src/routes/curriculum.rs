use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Response;

use crate::response::{json_error, ok, AppError};
use crate::routes::UserQuery;
use crate::services::curriculum::{self, AssessmentError};
use crate::state::AppState;

impl From<AssessmentError> for AppError {
    fn from(err: AssessmentError) -> Self {
        match err {
            AssessmentError::UserNotFound => {
                json_error(StatusCode::NOT_FOUND, "USER_NOT_FOUND", err.to_string())
            }
            AssessmentError::NoQuestions => {
                json_error(StatusCode::BAD_REQUEST, "NO_QUESTIONS", err.to_string())
            }
            AssessmentError::Sql(sql_err) => AppError::database(&sql_err),
        }
    }
}

pub async fn curriculum_tree(State(state): State<AppState>) -> Result<Response, AppError> {
    let proxy = state.db_proxy();
    let tree = curriculum::curriculum_tree(&proxy).await?;
    Ok(ok(tree))
}

pub async fn start_assessment(
    State(state): State<AppState>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let user_id = UserQuery::validated(query)?;
    let proxy = state.db_proxy();
    let assessment =
        curriculum::start_assessment(&proxy, &user_id, state.practice().assessment_size).await?;
    Ok(ok(assessment))
}
