//! Bandit reward of an attempt: the mastery gain, discounted by how much
//! help the learner took.

use crate::types::HintLevel;

/// Multiplier applied to the mastery delta before it reaches the bandit
pub fn hint_reward_multiplier(used_hint: bool, level: Option<HintLevel>) -> f64 {
    if !used_hint {
        return 1.0;
    }

    match level {
        Some(HintLevel::ConceptualNudge) => 0.75,
        Some(HintLevel::StrategyHint) => 0.5,
        Some(HintLevel::StepCorrection) => 0.25,
        None => 0.5,
    }
}

pub fn attempt_reward(mastery_before: f64, mastery_after: f64, multiplier: f64) -> f64 {
    (mastery_after - mastery_before) * multiplier
}
