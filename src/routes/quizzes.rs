use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use serde_json::json;
use validator::Validate;

use crate::{
    database::quizzes::QuizFilter,
    dto::quiz_dto::{GenerateQuizPayload, QuizListQuery, QuizPayload},
    error::Result,
    middleware::auth::Session,
    models::grading::QuizSubmission,
    services::ai_service::QuizGenerationRequest,
    AppState,
};

#[axum::debug_handler]
pub async fn list_course_quizzes(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
    Query(query): Query<QuizListQuery>,
) -> Result<impl IntoResponse> {
    let quizzes: Vec<_> = state
        .quiz_service
        .list_quizzes(QuizFilter {
            course_id: Some(course_id),
            subject: query.subject,
        })
        .await?
        .iter()
        .map(|q| q.student_view())
        .collect();
    Ok(Json(quizzes))
}

/// Quiz as shown to an examinee: no answer key, no explanations.
#[axum::debug_handler]
pub async fn get_quiz_for_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let quiz = state.quiz_service.get_quiz(&id).await?;
    Ok(Json(quiz.student_view()))
}

/// Anonymous submissions are graded but leave no attempt behind.
#[axum::debug_handler]
pub async fn submit_quiz(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    Json(submission): Json<QuizSubmission>,
) -> Result<impl IntoResponse> {
    let response = state
        .quiz_service
        .submit(&id, &submission, session.user_id())
        .await?;
    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn create_quiz(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(course_id): Path<String>,
    Json(payload): Json<QuizPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let quiz = state
        .quiz_service
        .create_quiz(
            Some(course_id),
            payload,
            session.user_id().map(str::to_string),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(quiz)))
}

/// Full quizzes across courses, optionally narrowed by course and subject.
#[axum::debug_handler]
pub async fn list_quizzes(
    State(state): State<AppState>,
    Query(query): Query<QuizListQuery>,
) -> Result<impl IntoResponse> {
    let quizzes = state
        .quiz_service
        .list_quizzes(QuizFilter {
            course_id: query.course_id,
            subject: query.subject,
        })
        .await?;
    Ok(Json(quizzes))
}

#[axum::debug_handler]
pub async fn get_quiz(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let quiz = state.quiz_service.get_quiz(&id).await?;
    Ok(Json(quiz))
}

#[axum::debug_handler]
pub async fn update_quiz(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<QuizPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let quiz = state.quiz_service.update_quiz(&id, payload).await?;
    Ok(Json(quiz))
}

#[axum::debug_handler]
pub async fn delete_quiz(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    state.quiz_service.delete_quiz(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn generate_quiz(
    State(state): State<AppState>,
    Json(payload): Json<GenerateQuizPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let output = state
        .ai_service
        .generate_quiz(&QuizGenerationRequest {
            subject: payload.subject,
            topic: payload.topic,
            difficulty: payload.difficulty,
            num_questions: payload.num_questions,
            course_id: payload.course_id,
        })
        .await;

    if payload.save {
        let stored = state.quiz_service.store_quiz(output.quiz).await?;
        return Ok((
            StatusCode::CREATED,
            Json(json!({
                "quiz": stored,
                "ai_generated": output.ai_generated,
                "logs": output.logs,
            })),
        ));
    }

    Ok((
        StatusCode::OK,
        Json(json!({
            "quiz": output.quiz,
            "ai_generated": output.ai_generated,
            "logs": output.logs,
        })),
    ))
}

#[axum::debug_handler]
pub async fn quiz_statistics(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let stats = state.attempt_service.quiz_statistics(&id).await?;
    Ok(Json(stats))
}
