use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;

use studemy_backend::db::operations::users;
use studemy_backend::services::evaluation::ErrorType;

mod common;

use common::{FixedEvaluator, DEMO_USER};

async fn app_grading(correct: bool, error_type: Option<ErrorType>) -> common::TestApp {
    common::create_test_app_with(Some(Arc::new(FixedEvaluator {
        correct,
        error_type,
    })))
    .await
}

#[tokio::test]
async fn test_adaptive_correct_attempt_updates_everything() {
    let app = app_grading(true, None).await;
    let (status, body) = app
        .post_json(
            "/api/adaptive",
            json!({
                "userId": DEMO_USER,
                "conceptId": "concept-linear-equations",
                "studentSteps": "x + 3 = 7\nx = 7 - 3\nx = 4",
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let result = &body["data"];
    assert_eq!(result["isCorrect"], true);
    assert_eq!(result["banditEnabled"], true);
    assert_eq!(result["difficulty"], "EASY");
    assert_eq!(result["masteryBefore"].as_f64().unwrap(), 0.0);
    assert!((result["masteryAfter"].as_f64().unwrap() - 0.08).abs() < 1e-9);
    assert!(result["reward"].as_f64().unwrap() > 0.0);
    assert_eq!(result["xpEarned"], 10);
    assert_eq!(result["xpTotal"], 10);
    assert_eq!(result["completeSolution"], "x = 4");
    assert_eq!(result["skillTreeDecision"]["type"], "STAY");
    assert_eq!(
        result["skillTreeDecision"]["conceptId"],
        "concept-linear-equations"
    );

    assert_eq!(app.count(r#"SELECT COUNT(*) FROM "attempts""#).await, 1);
    assert_eq!(app.count(r#"SELECT COUNT(*) FROM "bandit_stats""#).await, 4);
    assert_eq!(
        app.count(r#"SELECT COUNT(*) FROM "bandit_stats" WHERE "timesSelected" = 1 AND "difficulty" = 'EASY'"#)
            .await,
        1
    );
    assert_eq!(
        app.count(r#"SELECT "questionsAnswered" + "correctAnswers" FROM "student_concept_stats""#)
            .await,
        2
    );

    let user = users::find_user(&app.proxy, DEMO_USER).await.unwrap().unwrap();
    assert_eq!(user.xp, 10);
}

#[tokio::test]
async fn test_adaptive_walks_every_arm_once() {
    let app = app_grading(true, None).await;
    let mut served = Vec::new();
    for _ in 0..4 {
        let (status, body) = app
            .post_json(
                "/api/adaptive",
                json!({"userId": DEMO_USER, "conceptId": "concept-matrices"}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        served.push(body["data"]["difficulty"].as_str().unwrap().to_string());
    }

    assert_eq!(served, vec!["EASY", "MEDIUM", "HARD", "CHALLENGE"]);
    assert_eq!(
        app.count(r#"SELECT COUNT(*) FROM "bandit_stats" WHERE "timesSelected" = 1"#)
            .await,
        4
    );
}

#[tokio::test]
async fn test_static_attempt_leaves_bandit_alone() {
    let app = app_grading(false, None).await;
    let (status, body) = app
        .post_json(
            "/api/adaptive",
            json!({
                "userId": DEMO_USER,
                "conceptId": "concept-matrices",
                "mode": "STATIC",
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["banditEnabled"], false);
    assert_eq!(body["data"]["difficulty"], "MEDIUM");
    assert_eq!(body["data"]["xpEarned"], 0);
    assert_eq!(app.count(r#"SELECT COUNT(*) FROM "bandit_stats""#).await, 0);
    assert_eq!(
        app.count(r#"SELECT COUNT(*) FROM "attempts" WHERE "mode" = 'STATIC'"#)
            .await,
        1
    );
}

#[tokio::test]
async fn test_requested_question_is_graded() {
    let app = app_grading(true, None).await;
    let (status, body) = app
        .post_json(
            "/api/adaptive",
            json!({
                "userId": DEMO_USER,
                "conceptId": "concept-linear-equations",
                "questionId": "question-linear-equations-5",
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["difficulty"], "HARD");
    assert_eq!(
        app.count(r#"SELECT COUNT(*) FROM "attempts" WHERE "questionId" = 'question-linear-equations-5'"#)
            .await,
        1
    );
    assert_eq!(
        app.count(r#"SELECT COUNT(*) FROM "bandit_stats" WHERE "timesSelected" = 1 AND "difficulty" = 'HARD'"#)
            .await,
        1
    );
}

#[tokio::test]
async fn test_wrong_answer_redirects_to_prerequisite() {
    let app = app_grading(false, Some(ErrorType::SignError)).await;
    let (status, body) = app
        .post_json(
            "/api/adaptive",
            json!({"userId": DEMO_USER, "conceptId": "concept-systems-of-equations"}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let decision = &body["data"]["skillTreeDecision"];
    assert_eq!(decision["type"], "REDIRECT_PREREQUISITE");
    assert_eq!(decision["conceptId"], "concept-linear-equations");
    assert_eq!(
        app.count(r#"SELECT "redirectedCount" FROM "student_concept_stats""#)
            .await,
        1
    );
    assert_eq!(
        app.count(r#"SELECT COUNT(*) FROM "error_logs" WHERE "errorType" = 'SIGN_ERROR'"#)
            .await,
        1
    );
}

#[tokio::test]
async fn test_submit_validation_and_unknown_user() {
    let app = app_grading(true, None).await;

    let (status, body) = app
        .post_json("/api/adaptive", json!({"userId": DEMO_USER}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = app
        .post_json(
            "/api/adaptive",
            json!({"userId": "ghost", "conceptId": "concept-matrices"}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "USER_NOT_FOUND");
    assert_eq!(app.count(r#"SELECT COUNT(*) FROM "attempts""#).await, 0);
}

#[tokio::test]
async fn test_reveal_requires_enough_xp() {
    let app = app_grading(true, None).await;
    let (status, body) = app
        .post_json(
            "/api/app/reveal",
            json!({
                "userId": DEMO_USER,
                "questionId": "question-matrices-1",
                "type": "hint1",
            }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INSUFFICIENT_XP");
    assert_eq!(
        body["error"],
        "Not enough XP. Need 5 XP. You have 0 XP."
    );
}

#[tokio::test]
async fn test_reveal_deducts_xp() {
    let app = app_grading(true, None).await;
    app.execute(r#"UPDATE "users" SET "xp" = 12 WHERE "id" = 'demo-student'"#)
        .await;

    let (status, body) = app
        .post_json(
            "/api/app/reveal",
            json!({
                "userId": DEMO_USER,
                "questionId": "question-matrices-1",
                "type": "solution",
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["content"], "x = 4");
    assert_eq!(body["data"]["xpDeducted"], 10);
    assert_eq!(body["data"]["xpTotal"], 2);

    let (status, body) = app
        .post_json(
            "/api/app/reveal",
            json!({
                "userId": DEMO_USER,
                "questionId": "question-matrices-1",
                "type": "hint2",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INSUFFICIENT_XP");

    let user = users::find_user(&app.proxy, DEMO_USER).await.unwrap().unwrap();
    assert_eq!(user.xp, 2);
}

#[tokio::test]
async fn test_reveal_unknown_type_is_rejected() {
    let app = app_grading(true, None).await;
    let (status, body) = app
        .post_json(
            "/api/app/reveal",
            json!({
                "userId": DEMO_USER,
                "questionId": "question-matrices-1",
                "type": "hint9",
            }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_dashboard_reflects_attempts() {
    let app = app_grading(false, Some(ErrorType::ExpansionError)).await;
    for mode in ["ADAPTIVE", "STATIC"] {
        let (status, _) = app
            .post_json(
                "/api/adaptive",
                json!({
                    "userId": DEMO_USER,
                    "conceptId": "concept-systems-of-equations",
                    "mode": mode,
                    "usedHint": true,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = app.get("/api/dashboard?userId=demo-student").await;
    assert_eq!(status, StatusCode::OK);
    let dashboard = &body["data"];

    assert_eq!(dashboard["user"]["email"], "demo@student.com");
    let concepts = dashboard["concepts"].as_array().unwrap();
    assert_eq!(concepts.len(), 1);
    assert_eq!(concepts[0]["id"], "concept-systems-of-equations");
    assert_eq!(concepts[0]["questionsAnswered"], 2);
    assert_eq!(concepts[0]["redirectedCount"], 2);
    assert_eq!(concepts[0]["prerequisites"], json!(["concept-linear-equations"]));
    assert_eq!(concepts[0]["reinforcementNodes"], json!(["concept-matrices"]));
    assert_eq!(concepts[0]["unlocked"], false);

    assert_eq!(dashboard["conceptRedirectHistory"].as_array().unwrap().len(), 2);
    assert_eq!(dashboard["errorSummary"][0]["errorType"], "EXPANSION_ERROR");
    assert_eq!(dashboard["errorSummary"][0]["count"], 2);
    assert_eq!(dashboard["hintUsageRatio"].as_f64().unwrap(), 1.0);
}

#[tokio::test]
async fn test_dashboard_unknown_user() {
    let app = common::create_test_app().await;
    let (status, body) = app.get("/api/dashboard?userId=ghost").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "USER_NOT_FOUND");
}

/// Creates the learner's stats row for `concept_id` and overwrites its state.
async fn prime_stats(app: &common::TestApp, concept_id: &str, mastery: f64, velocity: f64) {
    let (status, _) = app
        .get(&format!(
            "/api/app/practice/next?userId={DEMO_USER}&conceptId={concept_id}&mode=STATIC"
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    app.execute(&format!(
        r#"UPDATE "student_concept_stats" SET "masteryProbability" = {mastery}, "learningVelocity" = {velocity} WHERE "conceptId" = '{concept_id}'"#
    ))
    .await;
}

#[tokio::test]
async fn test_plateau_injects_reinforcement() {
    let app = app_grading(true, None).await;
    prime_stats(&app, "concept-systems-of-equations", 0.75, 0.0).await;

    let (status, body) = app
        .post_json(
            "/api/adaptive",
            json!({"userId": DEMO_USER, "conceptId": "concept-systems-of-equations"}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let decision = &body["data"]["skillTreeDecision"];
    assert_eq!(decision["type"], "INJECT_REINFORCEMENT");
    assert_eq!(decision["conceptId"], "concept-matrices");
    assert_eq!(
        app.count(r#"SELECT "redirectedCount" FROM "student_concept_stats" WHERE "conceptId" = 'concept-systems-of-equations'"#)
            .await,
        1
    );
}

#[tokio::test]
async fn test_high_mastery_unlocks_next_concept() {
    let app = app_grading(true, None).await;
    prime_stats(&app, "concept-linear-equations", 0.95, 0.05).await;

    let (status, body) = app
        .post_json(
            "/api/adaptive",
            json!({"userId": DEMO_USER, "conceptId": "concept-linear-equations"}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let decision = &body["data"]["skillTreeDecision"];
    assert_eq!(decision["type"], "UNLOCK_NEXT");
    assert_eq!(decision["conceptId"], "concept-systems-of-equations");
    assert!((body["data"]["masteryBefore"].as_f64().unwrap() - 0.95).abs() < 1e-9);
    assert_eq!(
        app.count(r#"SELECT "redirectedCount" FROM "student_concept_stats" WHERE "conceptId" = 'concept-linear-equations'"#)
            .await,
        0
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_attempts_are_all_counted() {
    let app = Arc::new(app_grading(true, None).await);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let app = Arc::clone(&app);
        handles.push(tokio::spawn(async move {
            app.post_json(
                "/api/adaptive",
                json!({
                    "userId": DEMO_USER,
                    "conceptId": "concept-matrices",
                    "mode": "STATIC",
                }),
            )
            .await
            .0
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::OK);
    }

    let attempts = app.count(r#"SELECT COUNT(*) FROM "attempts""#).await;
    assert_eq!(attempts, 8);
    assert_eq!(
        app.count(r#"SELECT "questionsAnswered" FROM "student_concept_stats""#)
            .await,
        attempts
    );
    assert_eq!(
        app.count(r#"SELECT "correctAnswers" FROM "student_concept_stats""#)
            .await,
        attempts
    );
    assert_eq!(app.count(r#"SELECT "xp" FROM "users""#).await, 80);
}

#[tokio::test]
async fn test_out_of_range_counters_are_repaired_on_load() {
    let app = app_grading(true, None).await;
    prime_stats(&app, "concept-matrices", 0.0, 0.0).await;
    app.execute(
        r#"UPDATE "student_concept_stats" SET "questionsAnswered" = -5, "correctAnswers" = -1, "hintsUsed" = 9999999999"#,
    )
    .await;

    let (status, body) = app.get("/api/dashboard?userId=demo-student").await;
    assert_eq!(status, StatusCode::OK);
    let node = &body["data"]["concepts"][0];
    assert_eq!(node["questionsAnswered"], 0);
    assert_eq!(node["correctAnswers"], 0);
    assert_eq!(node["incorrectAnswers"], 0);

    let (status, body) = app
        .post_json(
            "/api/adaptive",
            json!({"userId": DEMO_USER, "conceptId": "concept-matrices", "mode": "STATIC"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isCorrect"], true);
    assert_eq!(
        app.count(r#"SELECT "questionsAnswered" FROM "student_concept_stats""#)
            .await,
        1
    );
}
