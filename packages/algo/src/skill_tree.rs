//! Skill-Tree Decision
//!
//! A static threshold table, evaluated top to bottom:
//!
//! | condition                                   | decision              |
//! |---------------------------------------------|-----------------------|
//! | mastery > 0.9 and velocity > 0.02           | UNLOCK_NEXT           |
//! | mastery < 0.6 and frustration > 0.5         | REDIRECT_PREREQUISITE |
//! | 0.6 <= mastery <= 0.9, 0 <= velocity < 0.02 | INJECT_REINFORCEMENT  |
//! | otherwise                                   | STAY                  |
//!
//! A row whose target concept is missing falls through to the next row.

use crate::types::{ConceptNeighbors, DecisionKind, LearnerConceptState, SkillTreeDecision};

const UNLOCK_MASTERY: f64 = 0.9;
const UNLOCK_VELOCITY: f64 = 0.02;
const REDIRECT_MASTERY: f64 = 0.6;
const REDIRECT_FRUSTRATION: f64 = 0.5;
const REINFORCE_MASTERY_MIN: f64 = 0.6;
const REINFORCE_MASTERY_MAX: f64 = 0.9;
const REINFORCE_VELOCITY_MAX: f64 = 0.02;

/// Mastery at which a concept shows as unlocked on the learner's map
pub const UNLOCK_DISPLAY_MASTERY: f64 = 0.2;

/// Decide the learner's next step from the post-update state
pub fn decide_next_step(
    state: &LearnerConceptState,
    neighbors: &ConceptNeighbors,
    current_concept_id: &str,
) -> SkillTreeDecision {
    let mastery = state.mastery_probability;
    let velocity = state.learning_velocity;
    let frustration = state.frustration_index;

    if mastery > UNLOCK_MASTERY && velocity > UNLOCK_VELOCITY {
        if let Some(next) = &neighbors.next_concept_id {
            return SkillTreeDecision::new(DecisionKind::UnlockNext, next.as_str());
        }
    }

    if mastery < REDIRECT_MASTERY && frustration > REDIRECT_FRUSTRATION {
        if let Some(prerequisite) = &neighbors.prerequisite_concept_id {
            return SkillTreeDecision::new(DecisionKind::RedirectPrerequisite, prerequisite.as_str());
        }
    }

    if (REINFORCE_MASTERY_MIN..=REINFORCE_MASTERY_MAX).contains(&mastery)
        && (0.0..REINFORCE_VELOCITY_MAX).contains(&velocity)
    {
        if let Some(reinforcement) = &neighbors.reinforcement_concept_id {
            return SkillTreeDecision::new(DecisionKind::InjectReinforcement, reinforcement.as_str());
        }
    }

    SkillTreeDecision::new(DecisionKind::Stay, current_concept_id)
}

pub fn is_unlocked_for_display(mastery: f64) -> bool {
    mastery >= UNLOCK_DISPLAY_MASTERY
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(mastery: f64, velocity: f64, frustration: f64) -> LearnerConceptState {
        LearnerConceptState {
            mastery_probability: mastery,
            learning_velocity: velocity,
            frustration_index: frustration,
            ..Default::default()
        }
    }

    fn all_neighbors() -> ConceptNeighbors {
        ConceptNeighbors {
            next_concept_id: Some("C2".to_string()),
            prerequisite_concept_id: Some("C0".to_string()),
            reinforcement_concept_id: Some("C1b".to_string()),
        }
    }

    #[test]
    fn test_unlock_next() {
        let neighbors = ConceptNeighbors {
            next_concept_id: Some("C2".to_string()),
            ..Default::default()
        };
        let decision = decide_next_step(&state(0.95, 0.05, 0.0), &neighbors, "C1");
        assert_eq!(decision, SkillTreeDecision::new(DecisionKind::UnlockNext, "C2"));
    }

    #[test]
    fn test_redirect_prerequisite() {
        let neighbors = ConceptNeighbors {
            prerequisite_concept_id: Some("C0".to_string()),
            ..Default::default()
        };
        let decision = decide_next_step(&state(0.3, 0.0, 0.8), &neighbors, "C1");
        assert_eq!(
            decision,
            SkillTreeDecision::new(DecisionKind::RedirectPrerequisite, "C0")
        );
    }

    #[test]
    fn test_inject_reinforcement() {
        let neighbors = ConceptNeighbors {
            reinforcement_concept_id: Some("C1b".to_string()),
            ..Default::default()
        };
        let decision = decide_next_step(&state(0.75, 0.01, 0.0), &neighbors, "C1");
        assert_eq!(
            decision,
            SkillTreeDecision::new(DecisionKind::InjectReinforcement, "C1b")
        );
    }

    #[test]
    fn test_stay_without_neighbors() {
        let empty = ConceptNeighbors::default();
        for s in [
            state(0.95, 0.05, 0.0),
            state(0.3, 0.0, 0.8),
            state(0.75, 0.01, 0.0),
            state(0.0, -0.3, 1.0),
        ] {
            let decision = decide_next_step(&s, &empty, "C1");
            assert_eq!(decision, SkillTreeDecision::new(DecisionKind::Stay, "C1"));
        }
    }

    #[test]
    fn test_missing_next_falls_through_to_stay() {
        let neighbors = ConceptNeighbors {
            next_concept_id: None,
            ..all_neighbors()
        };
        // mastery 0.95 is outside the reinforcement band
        let decision = decide_next_step(&state(0.95, 0.05, 0.0), &neighbors, "C1");
        assert_eq!(decision.kind, DecisionKind::Stay);
    }

    #[test]
    fn test_boundaries_are_inclusive_for_reinforcement() {
        let neighbors = all_neighbors();
        let low = decide_next_step(&state(0.6, 0.0, 0.0), &neighbors, "C1");
        assert_eq!(low.kind, DecisionKind::InjectReinforcement);
        let high = decide_next_step(&state(0.9, 0.0199, 0.0), &neighbors, "C1");
        assert_eq!(high.kind, DecisionKind::InjectReinforcement);
    }

    #[test]
    fn test_velocity_at_threshold_does_not_reinforce() {
        let decision = decide_next_step(&state(0.75, 0.02, 0.0), &all_neighbors(), "C1");
        assert_eq!(decision.kind, DecisionKind::Stay);
    }

    #[test]
    fn test_negative_velocity_stays() {
        let decision = decide_next_step(&state(0.75, -0.01, 0.0), &all_neighbors(), "C1");
        assert_eq!(decision.kind, DecisionKind::Stay);
    }

    #[test]
    fn test_unlock_requires_strict_thresholds() {
        let neighbors = all_neighbors();
        assert_eq!(
            decide_next_step(&state(0.9, 0.05, 0.0), &neighbors, "C1").kind,
            DecisionKind::Stay
        );
        assert_eq!(
            decide_next_step(&state(0.95, 0.02, 0.0), &neighbors, "C1").kind,
            DecisionKind::Stay
        );
    }

    #[test]
    fn test_frustration_at_threshold_does_not_redirect() {
        let decision = decide_next_step(&state(0.3, 0.0, 0.5), &all_neighbors(), "C1");
        assert_eq!(decision.kind, DecisionKind::Stay);
    }

    #[test]
    fn test_is_unlocked_for_display() {
        assert!(!is_unlocked_for_display(0.19));
        assert!(is_unlocked_for_display(0.2));
    }
}
