#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use studemy_backend::config::PracticeConfig;
use studemy_backend::db::config::DbConfig;
use studemy_backend::db::DatabaseProxy;
use studemy_backend::seed;
use studemy_backend::services::evaluation::{
    ErrorType, HintSet, QuestionHints, StepEvaluation, StepEvaluator,
};
use studemy_backend::state::AppState;

pub const DEMO_USER: &str = seed::DEMO_USER_ID;

pub struct TestApp {
    pub router: Router,
    pub proxy: Arc<DatabaseProxy>,
    _dir: TempDir,
}

/// Grades every submission the same way.
pub struct FixedEvaluator {
    pub correct: bool,
    pub error_type: Option<ErrorType>,
}

impl StepEvaluator for FixedEvaluator {
    fn evaluate(&self, _question_prompt: &str, _student_steps: &str) -> StepEvaluation {
        StepEvaluation {
            is_correct: self.correct,
            error_type: self.error_type,
            hints: HintSet {
                conceptual_nudge: "nudge".to_string(),
                strategy_hint: "strategy".to_string(),
                step_correction: if self.correct {
                    String::new()
                } else {
                    "check the sign when moving terms".to_string()
                },
            },
            complete_solution: "x = 4".to_string(),
        }
    }

    fn question_hints(&self, _question_prompt: &str) -> QuestionHints {
        QuestionHints {
            conceptual_nudge: "nudge".to_string(),
            strategy_hint: "strategy".to_string(),
            step_correction: "correction".to_string(),
            complete_solution: "x = 4".to_string(),
        }
    }
}

pub async fn create_test_app() -> TestApp {
    create_test_app_with(None).await
}

pub async fn create_test_app_with(evaluator: Option<Arc<dyn StepEvaluator>>) -> TestApp {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let config = DbConfig::at_path(temp_dir.path().join("studemy.db"));
    let proxy = DatabaseProxy::connect(config)
        .await
        .expect("failed to open database");
    seed::seed_demo_data(&proxy)
        .await
        .expect("failed to seed demo data");

    let state = match evaluator {
        Some(evaluator) => {
            AppState::with_evaluator(Arc::clone(&proxy), PracticeConfig::default(), evaluator)
        }
        None => AppState::new(Arc::clone(&proxy), PracticeConfig::default()),
    };

    TestApp {
        router: studemy_backend::create_app(state),
        proxy,
        _dir: temp_dir,
    }
}

impl TestApp {
    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    pub async fn execute(&self, sql: &str) {
        sqlx::query(sql).execute(self.proxy.pool()).await.unwrap();
    }

    pub async fn count(&self, sql: &str) -> i64 {
        sqlx::query_scalar(sql)
            .fetch_one(self.proxy.pool())
            .await
            .unwrap()
    }
}
