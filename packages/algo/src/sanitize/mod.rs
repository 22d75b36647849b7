//! Data Sanitization
//!
//! Numerical guards for values that come back from storage.
//!
//! Functions:
//! - Unit interval clamping
//! - Counter clamping
//! - Learner state repair
//! - Bandit arm repair

use crate::types::{BanditArmStats, LearnerConceptState};

/// Clamp a stored counter into `u32`; negatives map to 0
pub fn clamp_count(raw: i64) -> u32 {
    u32::try_from(raw.max(0)).unwrap_or(u32::MAX)
}

/// Clamp to [0, 1]; NaN maps to 0
pub fn clamp_unit(x: f64) -> f64 {
    if x.is_nan() {
        return 0.0;
    }
    x.clamp(0.0, 1.0)
}

fn finite_or_zero(x: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}

/// Repair a learner state loaded from storage.
///
/// Non-finite values become 0, ratio fields are clamped to [0, 1], and the
/// correct/incorrect split is capped at `questions_answered`.
/// Returns true if anything was changed.
pub fn sanitize_learner_state(state: &mut LearnerConceptState) -> bool {
    let before = state.clone();

    state.mastery_probability = clamp_unit(state.mastery_probability);
    state.learning_velocity = finite_or_zero(state.learning_velocity);
    state.frustration_index = clamp_unit(state.frustration_index);
    state.hint_dependency_ratio = clamp_unit(state.hint_dependency_ratio);

    if state.correct_answers > state.questions_answered {
        state.correct_answers = state.questions_answered;
    }
    let remaining = state.questions_answered - state.correct_answers;
    if state.incorrect_answers > remaining {
        state.incorrect_answers = remaining;
    }

    *state != before
}

/// Repair a bandit arm loaded from storage. Returns true if changed.
pub fn sanitize_arm(arm: &mut BanditArmStats) -> bool {
    if arm.average_reward.is_finite() {
        return false;
    }
    arm.average_reward = 0.0;
    true
}
