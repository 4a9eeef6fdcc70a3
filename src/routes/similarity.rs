use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    database::reports::ReportFilter,
    dto::similarity_dto::{CheckSimilarityRequest, ReportQuery},
    error::Result,
    middleware::auth::Session,
    services::similarity_service::SimilarityCheck,
    AppState,
};

/// Students check their own work; instructors may check on a student's behalf.
#[axum::debug_handler]
pub async fn check_similarity(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(payload): Json<CheckSimilarityRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user_id = session.require_user()?;
    let owner_id = match payload.owner_id {
        Some(owner) if session.is_instructor() => owner,
        _ => user_id.to_string(),
    };

    let report = state
        .similarity_service
        .check(SimilarityCheck {
            text: payload.text,
            owner_id,
            context_id: payload.context_id,
            check_external: payload.check_external,
            threshold: payload
                .threshold
                .unwrap_or(crate::config::get_config().similarity_threshold),
        })
        .await?;
    Ok(Json(report))
}

#[axum::debug_handler]
pub async fn list_reports(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse> {
    let reports = state
        .similarity_service
        .list_reports(ReportFilter {
            owner_id: query.owner_id,
            context_id: query.context_id,
        })
        .await?;
    Ok(Json(reports))
}

#[axum::debug_handler]
pub async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let report = state.similarity_service.get_report(id).await?;
    Ok(Json(report))
}
