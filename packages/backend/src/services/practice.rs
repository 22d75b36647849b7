//! Attempt orchestration
//!
//! Glues the pure adaptive core to storage: picks the next question's
//! difficulty (fixed MEDIUM or UCB1 over the learner's arms), grades a
//! submission, folds it into mastery and the bandit, and decides where the
//! learner goes next. Every write of one attempt lands in one transaction.

use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use studemy_algo::{
    attempt_reward, decide_next_step, hint_reward_multiplier, select_arm, total_selections,
    AttemptOutcome, Difficulty, HintLevel, SkillTreeDecision,
};

use crate::config::PracticeConfig;
use crate::db::operations::attempts::{self, Attempt, ErrorLog};
use crate::db::operations::curriculum::{self, Concept};
use crate::db::operations::questions::{self, Question};
use crate::db::operations::stats::{self, StudentConceptStats};
use crate::db::operations::users;
use crate::db::DatabaseProxy;
use crate::services::evaluation::{HintSet, StepEvaluator};

/// Hint level assumed for the reward discount when a hint was used
pub const ASSUMED_HINT_LEVEL: HintLevel = HintLevel::StrategyHint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PracticeMode {
    /// Always MEDIUM; the bandit is neither consulted nor updated
    Static,
    #[default]
    Adaptive,
}

impl PracticeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PracticeMode::Static => "STATIC",
            PracticeMode::Adaptive => "ADAPTIVE",
        }
    }

    pub fn bandit_enabled(&self) -> bool {
        matches!(self, PracticeMode::Adaptive)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAttemptRequest {
    pub user_id: String,
    pub concept_id: String,
    #[serde(default)]
    pub question_id: Option<String>,
    #[serde(default)]
    pub student_steps: String,
    #[serde(default)]
    pub used_hint: bool,
    #[serde(default)]
    pub mode: PracticeMode,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptResult {
    pub attempt_id: String,
    pub is_correct: bool,
    pub mastery_before: f64,
    pub mastery_after: f64,
    pub reward: f64,
    pub difficulty: Difficulty,
    pub bandit_enabled: bool,
    pub hints: HintSet,
    pub complete_solution: String,
    pub skill_tree_decision: SkillTreeDecision,
    pub xp_earned: i64,
    pub xp_total: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextQuestion {
    pub question_id: String,
    pub prompt: String,
    pub difficulty: Difficulty,
    pub display_elo: f64,
    pub concept_title: String,
}

#[derive(Debug, Error)]
pub enum PracticeError {
    #[error("User not found")]
    UserNotFound,
    #[error("Concept not found")]
    ConceptNotFound,
    #[error("No questions for concept")]
    NoQuestions,
    #[error("sql error: {0}")]
    Sql(#[from] sqlx::Error),
}

struct PracticeContext {
    concept: Concept,
    stats: StudentConceptStats,
    questions: Vec<Question>,
}

async fn load_context(
    proxy: &DatabaseProxy,
    user_id: &str,
    concept_id: &str,
) -> Result<PracticeContext, PracticeError> {
    if !users::user_exists(proxy, user_id).await? {
        return Err(PracticeError::UserNotFound);
    }
    let concept = curriculum::find_concept(proxy, concept_id)
        .await?
        .ok_or(PracticeError::ConceptNotFound)?;
    let stats = stats::load_or_create_stats(proxy, user_id, &concept.id).await?;
    let questions = questions::list_for_concept(proxy, &concept.id).await?;
    if questions.is_empty() {
        return Err(PracticeError::NoQuestions);
    }

    Ok(PracticeContext {
        concept,
        stats,
        questions,
    })
}

/// Difficulty to serve next. ADAPTIVE creates the arm rows on first use.
async fn choose_difficulty(
    proxy: &DatabaseProxy,
    stats_id: &str,
    mode: PracticeMode,
) -> Result<Difficulty, sqlx::Error> {
    if !mode.bandit_enabled() {
        return Ok(Difficulty::Medium);
    }

    let mut conn = proxy.pool().acquire().await?;
    stats::ensure_arms(&mut conn, stats_id).await?;
    let arms = stats::load_arms(&mut conn, stats_id).await?;
    let total = total_selections(&arms).max(1);

    Ok(select_arm(total, &arms).unwrap_or(Difficulty::Medium))
}

/// Random question of `difficulty`, or the concept's first question when none matches.
fn pick_question(questions: &[Question], difficulty: Difficulty) -> Option<&Question> {
    let candidates: Vec<&Question> = questions
        .iter()
        .filter(|q| q.difficulty == difficulty)
        .collect();
    let mut rng = rand::rng();
    candidates
        .choose(&mut rng)
        .copied()
        .or_else(|| questions.first())
}

pub async fn next_question(
    proxy: &DatabaseProxy,
    user_id: &str,
    concept_id: &str,
    mode: PracticeMode,
) -> Result<NextQuestion, PracticeError> {
    let ctx = load_context(proxy, user_id, concept_id).await?;
    let difficulty = choose_difficulty(proxy, &ctx.stats.id, mode).await?;
    let question = pick_question(&ctx.questions, difficulty).ok_or(PracticeError::NoQuestions)?;

    Ok(NextQuestion {
        question_id: question.id.clone(),
        prompt: question.prompt.clone(),
        difficulty: question.difficulty,
        display_elo: question.difficulty.elo_for(ctx.stats.elo_rating),
        concept_title: ctx.concept.title,
    })
}

pub async fn submit_attempt(
    proxy: &DatabaseProxy,
    evaluator: &dyn StepEvaluator,
    practice: &PracticeConfig,
    request: &SubmitAttemptRequest,
) -> Result<AttemptResult, PracticeError> {
    let ctx = load_context(proxy, &request.user_id, &request.concept_id).await?;
    let stats_id = ctx.stats.id.clone();

    // A question the client already showed wins over a fresh draw.
    let requested = request
        .question_id
        .as_deref()
        .and_then(|id| ctx.questions.iter().find(|q| q.id == id));
    let (question, difficulty) = match requested {
        Some(question) => (question.clone(), question.difficulty),
        None => {
            let difficulty = choose_difficulty(proxy, &stats_id, request.mode).await?;
            let question = pick_question(&ctx.questions, difficulty)
                .cloned()
                .ok_or(PracticeError::NoQuestions)?;
            (question, difficulty)
        }
    };

    let evaluation = evaluator.evaluate(&question.prompt, &request.student_steps);
    let is_correct = evaluation.is_correct;
    let used_hint = request.used_hint;

    let mut tx = proxy.pool().begin().await?;

    // Re-read under the writer lock; the snapshot from `load_context` may be stale.
    stats::claim_for_update(&mut tx, &stats_id).await?;
    let before = stats::load_stats(&mut tx, &stats_id).await?.state;
    let after = before.apply_attempt(is_correct, used_hint);
    let multiplier = hint_reward_multiplier(used_hint, used_hint.then_some(ASSUMED_HINT_LEVEL));
    let outcome = AttemptOutcome {
        is_correct,
        used_hint,
        chosen_difficulty: difficulty,
        mastery_before: before.mastery_probability,
        mastery_after: after.mastery_probability,
        reward: attempt_reward(before.mastery_probability, after.mastery_probability, multiplier),
    };

    let attempt = Attempt::from_outcome(
        uuid::Uuid::new_v4().to_string(),
        &request.user_id,
        &question.id,
        &ctx.concept.id,
        &stats_id,
        request.mode.as_str(),
        &outcome,
    );

    attempts::insert_attempt(&mut tx, &attempt).await?;

    if let Some(error_type) = evaluation.error_type {
        let message = if evaluation.hints.step_correction.trim().is_empty() {
            error_type.describe().to_string()
        } else {
            evaluation.hints.step_correction.clone()
        };
        attempts::insert_error_log(
            &mut tx,
            &ErrorLog {
                id: uuid::Uuid::new_v4().to_string(),
                user_id: request.user_id.clone(),
                attempt_id: attempt.id.clone(),
                concept_id: ctx.concept.id.clone(),
                error_type: error_type.as_str().to_string(),
                message,
                created_at: attempt.created_at.clone(),
            },
        )
        .await?;
    }

    stats::save_state(&mut tx, &stats_id, &after).await?;

    if request.mode.bandit_enabled() {
        stats::ensure_arms(&mut tx, &stats_id).await?;
        let arms = stats::load_arms(&mut tx, &stats_id).await?;
        if let Some(arm) = arms.iter().find(|arm| arm.arm_id == outcome.chosen_difficulty) {
            stats::save_arm(&mut tx, &stats_id, &arm.record_reward(outcome.reward)).await?;
        }
    }

    let xp_earned = if is_correct {
        practice.xp_correct_reward
    } else {
        0
    };
    let xp_total = users::award_xp(&mut tx, &request.user_id, xp_earned).await?;

    let neighbors = curriculum::concept_neighbors(&mut tx, &ctx.concept.id).await?;
    let decision = decide_next_step(&after, &neighbors, &ctx.concept.id);
    if decision.counts_as_redirect() {
        stats::increment_redirects(&mut tx, &stats_id).await?;
    }

    tx.commit().await?;

    tracing::info!(
        user_id = %request.user_id,
        concept_id = %ctx.concept.id,
        attempt_id = %attempt.id,
        mode = request.mode.as_str(),
        %difficulty,
        is_correct,
        mastery_after = after.mastery_probability,
        decision = ?decision.kind,
        "attempt recorded"
    );

    let complete_solution = if evaluation.complete_solution.trim().is_empty() {
        evaluation.hints.step_correction.clone()
    } else {
        evaluation.complete_solution
    };

    Ok(AttemptResult {
        attempt_id: attempt.id,
        is_correct,
        mastery_before: outcome.mastery_before,
        mastery_after: outcome.mastery_after,
        reward: outcome.reward,
        difficulty: outcome.chosen_difficulty,
        bandit_enabled: request.mode.bandit_enabled(),
        hints: evaluation.hints,
        complete_solution,
        skill_tree_decision: decision,
        xp_earned,
        xp_total,
    })
}
