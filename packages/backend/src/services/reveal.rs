use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::PracticeConfig;
use crate::db::operations::{questions, users};
use crate::db::DatabaseProxy;
use crate::services::evaluation::{QuestionHints, StepEvaluator};
use crate::state::HintCache;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevealType {
    Hint1,
    Hint2,
    Hint3,
    Solution,
}

impl RevealType {
    pub fn cost(&self, config: &PracticeConfig) -> i64 {
        match self {
            RevealType::Solution => config.xp_solution_cost,
            _ => config.xp_hint_cost,
        }
    }

    /// Picks this reveal's text, falling back to a fixed sentence when blank
    pub fn content(&self, hints: &QuestionHints) -> String {
        let (text, fallback) = match self {
            RevealType::Hint1 => (
                &hints.conceptual_nudge,
                "Consider the main idea behind the question.",
            ),
            RevealType::Hint2 => (
                &hints.strategy_hint,
                "Plan the steps from given information to the answer.",
            ),
            RevealType::Hint3 => (
                &hints.step_correction,
                "Recheck your last step and the required formula.",
            ),
            RevealType::Solution => (
                &hints.complete_solution,
                "Use your textbook or notes for the full solution.",
            ),
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            fallback.to_string()
        } else {
            trimmed.to_string()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealRequest {
    pub user_id: String,
    pub question_id: String,
    #[serde(rename = "type")]
    pub reveal_type: RevealType,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealResult {
    pub content: String,
    pub xp_deducted: i64,
    pub xp_total: i64,
}

#[derive(Debug, Error)]
pub enum RevealError {
    #[error("User not found")]
    UserNotFound,
    #[error("Question not found")]
    QuestionNotFound,
    #[error("Not enough XP. Need {needed} XP. You have {available} XP.")]
    InsufficientXp { needed: i64, available: i64 },
    #[error("sql error: {0}")]
    Sql(#[from] sqlx::Error),
}

fn cached_hints(
    cache: &HintCache,
    evaluator: &dyn StepEvaluator,
    question_id: &str,
    prompt: &str,
) -> QuestionHints {
    if let Some(hints) = cache.read().get(question_id) {
        return hints.clone();
    }
    let mut guard = cache.write();
    guard
        .entry(question_id.to_string())
        .or_insert_with(|| evaluator.question_hints(prompt))
        .clone()
}

pub async fn reveal(
    proxy: &DatabaseProxy,
    evaluator: &dyn StepEvaluator,
    cache: &HintCache,
    config: &PracticeConfig,
    request: &RevealRequest,
) -> Result<RevealResult, RevealError> {
    let user = users::find_user(proxy, &request.user_id)
        .await?
        .ok_or(RevealError::UserNotFound)?;
    let question = questions::find_question(proxy, &request.question_id)
        .await?
        .ok_or(RevealError::QuestionNotFound)?;

    let cost = request.reveal_type.cost(config);
    if user.xp < cost {
        return Err(RevealError::InsufficientXp {
            needed: cost,
            available: user.xp,
        });
    }

    let hints = cached_hints(cache, evaluator, &question.id, &question.prompt);

    // The balance may have moved since it was read; the guarded update decides.
    let xp_total = match users::try_spend_xp(proxy, &user.id, cost).await? {
        Some(xp) => xp,
        None => {
            let available = users::find_user(proxy, &user.id)
                .await?
                .map(|u| u.xp)
                .unwrap_or(0);
            return Err(RevealError::InsufficientXp {
                needed: cost,
                available,
            });
        }
    };

    tracing::info!(
        user_id = %user.id,
        question_id = %question.id,
        reveal = ?request.reveal_type,
        cost,
        xp_total,
        "reveal purchased"
    );

    Ok(RevealResult {
        content: request.reveal_type.content(&hints),
        xp_deducted: cost,
        xp_total,
    })
}
