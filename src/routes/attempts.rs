use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json},
    Extension,
};

use crate::{error::Result, middleware::auth::Session, AppState};

#[axum::debug_handler]
pub async fn my_attempts(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse> {
    let student_id = session.require_user()?;
    let attempts = state.attempt_service.student_attempts(student_id).await?;
    Ok(Json(attempts))
}

#[axum::debug_handler]
pub async fn student_attempts(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<impl IntoResponse> {
    let attempts = state.attempt_service.student_attempts(&student_id).await?;
    Ok(Json(attempts))
}
