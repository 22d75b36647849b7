use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Instant, SystemTime};

use parking_lot::RwLock;

use crate::config::PracticeConfig;
use crate::db::DatabaseProxy;
use crate::services::evaluation::{KeywordEvaluator, QuestionHints, StepEvaluator};

/// Hints generated per question id, kept for the life of the process
pub type HintCache = RwLock<HashMap<String, QuestionHints>>;

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    started_at_system: SystemTime,
    db_proxy: Arc<DatabaseProxy>,
    evaluator: Arc<dyn StepEvaluator>,
    hint_cache: Arc<HintCache>,
    practice: Arc<PracticeConfig>,
}

impl AppState {
    pub fn new(db_proxy: Arc<DatabaseProxy>, practice: PracticeConfig) -> Self {
        Self::with_evaluator(db_proxy, practice, Arc::new(KeywordEvaluator::new()))
    }

    pub fn with_evaluator(
        db_proxy: Arc<DatabaseProxy>,
        practice: PracticeConfig,
        evaluator: Arc<dyn StepEvaluator>,
    ) -> Self {
        Self {
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
            db_proxy,
            evaluator,
            hint_cache: Arc::new(RwLock::new(HashMap::new())),
            practice: Arc::new(practice),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }

    pub fn db_proxy(&self) -> Arc<DatabaseProxy> {
        Arc::clone(&self.db_proxy)
    }

    pub fn evaluator(&self) -> Arc<dyn StepEvaluator> {
        Arc::clone(&self.evaluator)
    }

    pub fn hint_cache(&self) -> &HintCache {
        &self.hint_cache
    }

    pub fn practice(&self) -> &PracticeConfig {
        &self.practice
    }
}
