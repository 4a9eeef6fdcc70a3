pub mod attempts;
pub mod health;
pub mod quizzes;
pub mod similarity;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{
    auth::{require_instructor, resolve_session},
    rate_limit::{throttle, RateLimiter},
};
use crate::AppState;

const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

pub fn build_router(state: AppState, similarity_rps: u32) -> Router {
    let similarity_api = Router::new()
        .route("/api/similarity/check", post(similarity::check_similarity))
        .layer(axum::middleware::from_fn_with_state(
            RateLimiter::new(similarity_rps),
            throttle,
        ));

    let student_api = Router::new()
        .route(
            "/api/courses/:course_id/quizzes",
            get(quizzes::list_course_quizzes),
        )
        .route("/api/quizzes/:id", get(quizzes::get_quiz_for_student))
        .route("/api/quizzes/:id/submit", post(quizzes::submit_quiz))
        .route("/api/me/attempts", get(attempts::my_attempts));

    let instructor_api = Router::new()
        .route(
            "/api/instructor/courses/:course_id/quizzes",
            post(quizzes::create_quiz),
        )
        .route("/api/instructor/quizzes", get(quizzes::list_quizzes))
        .route(
            "/api/instructor/quizzes/generate",
            post(quizzes::generate_quiz),
        )
        .route(
            "/api/instructor/quizzes/:id",
            get(quizzes::get_quiz)
                .put(quizzes::update_quiz)
                .delete(quizzes::delete_quiz),
        )
        .route(
            "/api/instructor/quizzes/:id/statistics",
            get(quizzes::quiz_statistics),
        )
        .route(
            "/api/instructor/students/:student_id/attempts",
            get(attempts::student_attempts),
        )
        .route(
            "/api/instructor/similarity/reports",
            get(similarity::list_reports),
        )
        .route(
            "/api/instructor/similarity/reports/:id",
            get(similarity::get_report),
        )
        .route_layer(axum::middleware::from_fn(require_instructor));

    Router::new()
        .route("/health", get(health::health))
        .merge(similarity_api)
        .merge(student_api)
        .merge(instructor_api)
        .layer(axum::middleware::from_fn(resolve_session))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}
