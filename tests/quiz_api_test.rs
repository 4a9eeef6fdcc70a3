mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{send, test_app, token};

fn scenario_quiz() -> serde_json::Value {
    json!({
        "title": "Basics",
        "topic": "General knowledge",
        "questions": [
            { "type": "true_false", "question": "The earth orbits the sun.", "correct_answer": "True" },
            { "type": "multiple_choice", "question": "Pick A.", "options": ["A", "B"], "correct_answer": "A",
              "explanation": "A is the first letter." }
        ]
    })
}

#[tokio::test]
async fn quiz_lifecycle_and_grading() {
    let app = test_app(None);
    let teacher = token("t-1", "teacher");
    let student = token("s-1", "student");

    let (status, quiz) = send(
        &app.router,
        "POST",
        "/api/instructor/courses/c-1/quizzes",
        Some(&teacher),
        Some(scenario_quiz()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = quiz["id"].as_str().unwrap().to_string();
    assert_eq!(quiz["passing_score"], 60.0);
    assert_eq!(quiz["created_by"], "t-1");
    assert_eq!(quiz["questions"][0]["options"], json!(["True", "False"]));

    // the student view hides the key
    let (status, view) = send(&app.router, "GET", &format!("/api/quizzes/{}", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["questions"][1]["correct_answer"], "");
    assert!(view["questions"][1]["explanation"].is_null());

    let (status, listed) = send(&app.router, "GET", "/api/courses/c-1/quizzes", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    // half right
    let (status, result) = send(
        &app.router,
        "POST",
        &format!("/api/quizzes/{}/submit", id),
        Some(&student),
        Some(json!({ "answers": { "0": "true", "1": "B" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["score"], 1);
    assert_eq!(result["total"], 2);
    assert_eq!(result["percentage"], 50.0);
    assert_eq!(result["passed"], false);
    assert_eq!(result["question_results"][0]["is_correct"], true);
    assert_eq!(result["question_results"][1]["is_correct"], false);
    assert_eq!(
        result["feedback"],
        "You scored 50.0% on the quiz. Consider revisiting the material and trying again."
    );
    assert_eq!(result["attempt"]["student_id"], "s-1");

    // all right, case-insensitively
    let (_, result) = send(
        &app.router,
        "POST",
        &format!("/api/quizzes/{}/submit", id),
        Some(&student),
        Some(json!({ "answers": { "0": "TRUE", "1": " a " } })),
    )
    .await;
    assert_eq!(result["percentage"], 100.0);
    assert_eq!(result["passed"], true);

    // anonymous attempts are graded but not kept
    let (_, result) = send(
        &app.router,
        "POST",
        &format!("/api/quizzes/{}/submit", id),
        None,
        Some(json!({})),
    )
    .await;
    assert_eq!(result["score"], 0);
    assert!(result.get("attempt").is_none());

    let (status, attempts) = send(&app.router, "GET", "/api/me/attempts", Some(&student), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(attempts.as_array().unwrap().len(), 2);

    let (status, stats) = send(
        &app.router,
        "GET",
        &format!("/api/instructor/quizzes/{}/statistics", id),
        Some(&teacher),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["attempts"], 2);
    assert_eq!(stats["average_score"], 75.0);
    assert_eq!(stats["highest_score"], 100.0);
    assert_eq!(stats["lowest_score"], 50.0);
    assert_eq!(stats["passing_rate"], 50.0);

    let (status, by_student) = send(
        &app.router,
        "GET",
        "/api/instructor/students/s-1/attempts",
        Some(&teacher),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_student.as_array().unwrap().len(), 2);

    // update keeps identity
    let mut changed = scenario_quiz();
    changed["title"] = json!("Basics v2");
    let (status, updated) = send(
        &app.router,
        "PUT",
        &format!("/api/instructor/quizzes/{}", id),
        Some(&teacher),
        Some(changed),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], id.as_str());
    assert_eq!(updated["title"], "Basics v2");
    assert_eq!(updated["course_id"], "c-1");

    let (status, _) = send(
        &app.router,
        "DELETE",
        &format!("/api/instructor/quizzes/{}", id),
        Some(&teacher),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app.router,
        "GET",
        &format!("/api/instructor/quizzes/{}", id),
        Some(&teacher),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn grading_unknown_quiz_returns_indicator() {
    let app = test_app(None);
    let (status, result) = send(
        &app.router,
        "POST",
        "/api/quizzes/does-not-exist/submit",
        Some(&token("s-1", "student")),
        Some(json!({ "answers": { "0": "A" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["error"], "Quiz not found");
    assert_eq!(result["feedback"], "Error: Quiz not found");
    assert_eq!(result["total"], 0);
    assert!(result.get("attempt").is_none());
}

#[tokio::test]
async fn instructor_routes_are_gated() {
    let app = test_app(None);

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/instructor/courses/c-1/quizzes",
        None,
        Some(scenario_quiz()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "missing_authorization");

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/instructor/courses/c-1/quizzes",
        Some(&token("s-1", "student")),
        Some(scenario_quiz()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");
}

#[tokio::test]
async fn invalid_answer_key_is_rejected() {
    let app = test_app(None);
    let mut quiz = scenario_quiz();
    quiz["questions"][1]["correct_answer"] = json!("C");

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/instructor/courses/c-1/quizzes",
        Some(&token("t-1", "teacher")),
        Some(quiz),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("question 2:"));
}

#[tokio::test]
async fn generation_falls_back_to_template_when_generator_is_down() {
    let app = test_app(None);
    let teacher = token("t-1", "teacher");

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/instructor/quizzes/generate",
        Some(&teacher),
        Some(json!({ "subject": "Biology", "topic": "Cells", "num_questions": 4, "course_id": "bio", "save": true })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["ai_generated"], false);
    let questions = body["quiz"]["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 4);
    let kinds: Vec<&str> = questions.iter().map(|q| q["type"].as_str().unwrap()).collect();
    assert_eq!(kinds, ["multiple_choice", "true_false", "short_answer", "fill_blank"]);

    let (_, listed) = send(&app.router, "GET", "/api/courses/bio/quizzes", None, None).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn quiz_listings_filter_by_subject() {
    let app = test_app(None);
    let teacher = token("t-1", "teacher");

    for (course, subject) in [("c-1", "Biology"), ("c-1", "History"), ("c-2", "biology")] {
        let mut quiz = scenario_quiz();
        quiz["subject"] = json!(subject);
        let (status, _) = send(
            &app.router,
            "POST",
            &format!("/api/instructor/courses/{}/quizzes", course),
            Some(&teacher),
            Some(quiz),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, listed) = send(
        &app.router,
        "GET",
        "/api/courses/c-1/quizzes?subject=BIOLOGY",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["subject"], "Biology");
    assert_eq!(listed[0]["questions"][0]["correct_answer"], "");

    let (_, listed) = send(&app.router, "GET", "/api/courses/c-1/quizzes", None, None).await;
    assert_eq!(listed.as_array().unwrap().len(), 2);

    // instructors list across courses with the full answer key
    let (status, listed) = send(
        &app.router,
        "GET",
        "/api/instructor/quizzes?subject=biology",
        Some(&teacher),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|q| q["questions"][0]["correct_answer"] == "True"));

    let (_, listed) = send(&app.router, "GET", "/api/instructor/quizzes", Some(&teacher), None).await;
    assert_eq!(listed.as_array().unwrap().len(), 3);

    let (status, _) = send(
        &app.router,
        "GET",
        "/api/instructor/quizzes",
        Some(&token("s-1", "student")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
