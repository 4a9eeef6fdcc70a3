mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;

use common::{send, test_app, token, EchoSearch};

#[tokio::test]
async fn similarity_check_flow() {
    let app = test_app(None);
    let alice = token("alice", "student");
    let bob = token("bob", "student");
    let teacher = token("t-1", "teacher");

    // first submission meets an empty corpus
    let (status, body) = send(
        &app.router,
        "POST",
        "/api/similarity/check",
        Some(&alice),
        Some(json!({ "text": "The sky is blue.", "context_id": "essay-1", "check_external": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["plagiarism_detected"], false);
    assert_eq!(body["similarity_score"], 0.0);
    assert_eq!(body["owner_id"], "alice");
    assert_eq!(app.corpus.0.lock().unwrap().len(), 1);

    // an identical text is caught
    let (status, body) = send(
        &app.router,
        "POST",
        "/api/similarity/check",
        Some(&bob),
        Some(json!({ "text": "The sky is blue.", "context_id": "essay-1", "check_external": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["plagiarism_detected"], true);
    let matches = body["matched_sources"].as_array().unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["owner_id"], "alice");
    assert!((matches[0]["similarity_score"].as_f64().unwrap() - 1.0).abs() < 1e-9);
    assert_eq!(matches[0]["matching_sentences"].as_array().unwrap().len(), 1);
    assert_eq!(app.corpus.0.lock().unwrap().len(), 2);

    // instructors see the stored reports
    let (status, body) = send(
        &app.router,
        "GET",
        "/api/instructor/similarity/reports?owner_id=bob",
        Some(&teacher),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let reports = body.as_array().unwrap();
    assert_eq!(reports.len(), 1);
    let id = reports[0]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app.router,
        "GET",
        &format!("/api/instructor/similarity/reports/{}", id),
        Some(&teacher),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["owner_id"], "bob");

    // students cannot
    let (status, _) = send(
        &app.router,
        "GET",
        "/api/instructor/similarity/reports",
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn similarity_check_requires_a_session_and_valid_input() {
    let app = test_app(None);

    let (status, _) = send(
        &app.router,
        "POST",
        "/api/similarity/check",
        None,
        Some(json!({ "text": "Anything at all.", "context_id": "essay-1" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/similarity/check",
        Some("not-a-jwt"),
        Some(json!({ "text": "Anything at all.", "context_id": "essay-1" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_token");

    let student = token("carol", "student");
    let (status, _) = send(
        &app.router,
        "POST",
        "/api/similarity/check",
        Some(&student),
        Some(json!({ "text": "", "context_id": "essay-1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.corpus.0.lock().unwrap().is_empty());
}

#[tokio::test]
async fn external_matches_and_instructor_on_behalf_checks() {
    let app = test_app(Some(Arc::new(EchoSearch { score: 0.95 })));
    let teacher = token("t-1", "admin");
    let text = "Plants convert sunlight into chemical energy through photosynthesis every day. \
                The process happens inside chloroplasts found in the leaf cells of plants. \
                Oxygen is released into the air as a by-product of that reaction.";

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/similarity/check",
        Some(&teacher),
        Some(json!({ "text": text, "context_id": "essay-2", "owner_id": "dave" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["owner_id"], "dave");
    assert_eq!(body["plagiarism_detected"], true);
    assert_eq!(body["external_matches"].as_array().unwrap().len(), 1);
    assert!(body["summary"]
        .as_str()
        .unwrap()
        .contains("URL: https://example.org/source"));
}

#[tokio::test]
async fn reports_list_newest_first_and_filter_by_context() {
    let app = test_app(None);
    let erin = token("erin", "student");
    let teacher = token("t-1", "teacher");

    for (text, context) in [
        ("Rivers carve valleys over long periods.", "essay-1"),
        ("Volcanoes build islands from cooled lava.", "essay-2"),
    ] {
        let (status, _) = send(
            &app.router,
            "POST",
            "/api/similarity/check",
            Some(&erin),
            Some(json!({ "text": text, "context_id": context, "check_external": false })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(
        &app.router,
        "GET",
        "/api/instructor/similarity/reports?owner_id=erin",
        Some(&teacher),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let reports = body.as_array().unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0]["context_id"], "essay-2");
    assert_eq!(reports[1]["context_id"], "essay-1");

    let (status, body) = send(
        &app.router,
        "GET",
        "/api/instructor/similarity/reports?owner_id=erin&context_id=essay-1",
        Some(&teacher),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let reports = body.as_array().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["submission_text"], "Rivers carve valleys over long periods.");

    let (_, body) = send(
        &app.router,
        "GET",
        "/api/instructor/similarity/reports?context_id=essay-3",
        Some(&teacher),
        None,
    )
    .await;
    assert!(body.as_array().unwrap().is_empty());
}
