use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Response;

use crate::response::{json_error, ok, AppError};
use crate::routes::UserQuery;
use crate::services::dashboard::{self, DashboardError};
use crate::state::AppState;

impl From<DashboardError> for AppError {
    fn from(err: DashboardError) -> Self {
        match err {
            DashboardError::UserNotFound => {
                json_error(StatusCode::NOT_FOUND, "USER_NOT_FOUND", err.to_string())
            }
            DashboardError::Sql(sql_err) => AppError::database(&sql_err),
        }
    }
}

pub async fn dashboard(
    State(state): State<AppState>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let user_id = UserQuery::validated(query)?;
    let proxy = state.db_proxy();
    let dashboard = dashboard::dashboard(&proxy, &user_id).await?;
    Ok(ok(dashboard))
}
