//! Mastery Update
//!
//! One attempt moves four per-concept signals:
//! - mastery: gain toward 1 on a correct answer (halved with a hint),
//!   proportional loss on an incorrect one
//! - learning velocity: exponential smoothing of the mastery delta
//! - frustration: 0.7 x incorrect rate + 0.3 x hint rate over the whole history
//! - hint dependency: history-weighted share of hinted answers
//!
//! The hint contribution of an attempt is its own 0/1 flag, not the running
//! `hints_used` total.

use crate::sanitize::clamp_unit;
use crate::types::{LearnerConceptState, MasteryUpdate, MasteryUpdateInput};

const CORRECT_GAIN: f64 = 0.08;
const HINTED_CORRECT_GAIN: f64 = 0.04;
const INCORRECT_LOSS: f64 = 0.10;
const VELOCITY_ALPHA: f64 = 0.3;
const FRUSTRATION_INCORRECT_WEIGHT: f64 = 0.7;
const FRUSTRATION_HINT_WEIGHT: f64 = 0.3;

pub fn update_mastery(input: &MasteryUpdateInput) -> MasteryUpdate {
    let mastery = input.mastery;

    let mut new_mastery = if input.is_correct && !input.used_hint {
        mastery + CORRECT_GAIN * (1.0 - mastery)
    } else if input.is_correct {
        mastery + HINTED_CORRECT_GAIN * (1.0 - mastery)
    } else {
        mastery - INCORRECT_LOSS * mastery
    };
    new_mastery = clamp_unit(new_mastery);

    let total_questions = f64::from(input.questions_answered) + 1.0;
    let new_incorrect = f64::from(input.incorrect_answers) + if input.is_correct { 0.0 } else { 1.0 };
    let new_hints_used = if input.used_hint { 1.0 } else { 0.0 };

    let delta = new_mastery - mastery;
    let learning_velocity = VELOCITY_ALPHA * delta + (1.0 - VELOCITY_ALPHA) * input.learning_velocity;

    let hinted_answers = input.hint_dependency_ratio * f64::from(input.questions_answered) + new_hints_used;
    let incorrect_rate = new_incorrect / total_questions;
    let hint_rate = hinted_answers / total_questions;
    let frustration_index = clamp_unit(
        FRUSTRATION_INCORRECT_WEIGHT * incorrect_rate + FRUSTRATION_HINT_WEIGHT * hint_rate,
    );

    let hint_dependency_ratio = hinted_answers / total_questions;

    MasteryUpdate {
        mastery: new_mastery,
        learning_velocity,
        frustration_index,
        hint_dependency_ratio,
    }
}

impl LearnerConceptState {
    pub fn update_input(&self, is_correct: bool, used_hint: bool) -> MasteryUpdateInput {
        MasteryUpdateInput {
            mastery: self.mastery_probability,
            learning_velocity: self.learning_velocity,
            frustration_index: self.frustration_index,
            hint_dependency_ratio: self.hint_dependency_ratio,
            questions_answered: self.questions_answered,
            correct_answers: self.correct_answers,
            incorrect_answers: self.incorrect_answers,
            used_hint,
            is_correct,
        }
    }

    /// Next state after one attempt: the mastery update plus the counter
    /// bookkeeping that [`update_mastery`] leaves to its caller.
    pub fn apply_attempt(&self, is_correct: bool, used_hint: bool) -> LearnerConceptState {
        let update = update_mastery(&self.update_input(is_correct, used_hint));

        LearnerConceptState {
            mastery_probability: update.mastery,
            learning_velocity: update.learning_velocity,
            frustration_index: update.frustration_index,
            hint_dependency_ratio: update.hint_dependency_ratio,
            questions_answered: self.questions_answered + 1,
            correct_answers: self.correct_answers + u32::from(is_correct),
            incorrect_answers: self.incorrect_answers + u32::from(!is_correct),
            hints_used: self.hints_used + u32::from(used_hint),
        }
    }
}
