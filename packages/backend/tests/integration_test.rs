use axum::http::StatusCode;

mod common;

#[tokio::test]
async fn test_health_root() {
    let app = common::create_test_app().await;
    let (status, body) = app.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_health_live_and_info() {
    let app = common::create_test_app().await;

    let (status, body) = app.get("/health/live").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = app.get("/health/info").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "studemy-backend");
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = common::create_test_app().await;
    let (status, body) = app.get("/api/unknown").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_wrong_method_falls_back_to_404() {
    let app = common::create_test_app().await;
    let (status, body) = app.get("/api/adaptive").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_curriculum_tree_lists_seeded_chapters() {
    let app = common::create_test_app().await;
    let (status, body) = app.get("/api/app/curriculum").await;

    assert_eq!(status, StatusCode::OK);
    let tree = &body["data"];
    assert_eq!(tree["subject"]["slug"], "mathematics");
    assert_eq!(tree["class"]["name"], "12");

    let chapters = tree["chapters"].as_array().unwrap();
    assert_eq!(chapters.len(), 5);
    let orders: Vec<i64> = chapters.iter().map(|c| c["order"].as_i64().unwrap()).collect();
    assert_eq!(orders, vec![1, 2, 3, 4, 5]);

    let sections = chapters[1]["sections"].as_array().unwrap();
    let slugs: Vec<&str> = sections.iter().map(|s| s["slug"].as_str().unwrap()).collect();
    assert!(slugs.contains(&"linear-equations"));
    assert!(slugs.contains(&"systems-of-equations"));
    assert!(sections.iter().all(|s| s["questionCount"].as_i64().unwrap() > 0));
}

#[tokio::test]
async fn test_seed_is_idempotent() {
    let app = common::create_test_app().await;
    let questions = app.count(r#"SELECT COUNT(*) FROM "questions""#).await;

    let summary = studemy_backend::seed::seed_demo_data(&app.proxy).await.unwrap();
    assert_eq!(summary.new_rows, 0);
    assert_eq!(app.count(r#"SELECT COUNT(*) FROM "questions""#).await, questions);
    assert_eq!(app.count(r#"SELECT COUNT(*) FROM "users""#).await, 1);
}

#[tokio::test]
async fn test_next_question_requires_ids() {
    let app = common::create_test_app().await;

    let (status, body) = app.get("/api/app/practice/next?userId=demo-student").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = app
        .get("/api/app/practice/next?userId=%20&conceptId=concept-matrices")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_next_question_static_serves_medium() {
    let app = common::create_test_app().await;
    let (status, body) = app
        .get("/api/app/practice/next?userId=demo-student&conceptId=concept-linear-equations&mode=STATIC")
        .await;

    assert_eq!(status, StatusCode::OK);
    let next = &body["data"];
    assert_eq!(next["difficulty"], "MEDIUM");
    assert_eq!(next["conceptTitle"], "Linear Equations");
    assert_eq!(next["displayElo"].as_f64().unwrap(), 1200.0);
    assert_eq!(app.count(r#"SELECT COUNT(*) FROM "bandit_stats""#).await, 0);
}

#[tokio::test]
async fn test_next_question_adaptive_tries_easy_first() {
    let app = common::create_test_app().await;
    let (status, body) = app
        .get("/api/app/practice/next?userId=demo-student&conceptId=concept-matrices")
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["difficulty"], "EASY");
    assert_eq!(app.count(r#"SELECT COUNT(*) FROM "bandit_stats""#).await, 4);
}

#[tokio::test]
async fn test_next_question_unknown_concept() {
    let app = common::create_test_app().await;
    let (status, body) = app
        .get("/api/app/practice/next?userId=demo-student&conceptId=missing")
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "CONCEPT_NOT_FOUND");
}

#[tokio::test]
async fn test_assessment_samples_questions() {
    let app = common::create_test_app().await;
    let (status, body) = app.get("/api/app/assessment/start?userId=demo-student").await;

    assert_eq!(status, StatusCode::OK);
    let questions = body["data"]["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 10);
    assert_eq!(body["data"]["total"], 10);
    assert!(questions.iter().all(|q| q["chapterTitle"].is_string()));

    let (status, body) = app.get("/api/app/assessment/start?userId=nobody").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "USER_NOT_FOUND");
}
