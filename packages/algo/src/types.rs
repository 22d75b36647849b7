//! Common Types and Constants
//!
//! Value snapshots shared by the selector, the mastery updater and the
//! skill-tree decision. Every type here is plain data; persistence belongs
//! to the caller.

use serde::{Deserialize, Serialize};

// ==================== Constants ====================

/// Number of difficulty arms the bandit chooses between
pub const ARM_COUNT: usize = 4;

/// Starting ELO rating of a learner on a concept
pub const DEFAULT_ELO: f64 = 1200.0;

// ==================== Difficulty Arms ====================

/// Difficulty level of a question, and the arm the bandit pulls to pick it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Challenge,
}

impl Difficulty {
    /// Canonical arm order; bandit rows are created and scanned in this order
    pub const ALL: [Difficulty; ARM_COUNT] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Challenge,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EASY" => Some(Difficulty::Easy),
            "MEDIUM" => Some(Difficulty::Medium),
            "HARD" => Some(Difficulty::Hard),
            "CHALLENGE" => Some(Difficulty::Challenge),
            _ => None,
        }
    }

    /// Storage and wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Medium => "MEDIUM",
            Difficulty::Hard => "HARD",
            Difficulty::Challenge => "CHALLENGE",
        }
    }

    pub fn to_index(&self) -> usize {
        match self {
            Difficulty::Easy => 0,
            Difficulty::Medium => 1,
            Difficulty::Hard => 2,
            Difficulty::Challenge => 3,
        }
    }

    /// Offset added to the learner's rating when a question of this
    /// difficulty is displayed
    pub fn elo_offset(&self) -> f64 {
        match self {
            Difficulty::Easy => -100.0,
            Difficulty::Medium => 0.0,
            Difficulty::Hard => 100.0,
            Difficulty::Challenge => 200.0,
        }
    }

    pub fn elo_for(&self, base_elo: f64) -> f64 {
        base_elo + self.elo_offset()
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==================== Bandit Types ====================

/// Statistics of one difficulty arm for one learner/concept pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BanditArmStats {
    pub arm_id: Difficulty,
    /// How many attempts were served from this arm
    pub times_selected: u32,
    /// Running mean of every reward assigned to this arm
    pub average_reward: f64,
}

impl BanditArmStats {
    /// Fresh arm that has never been pulled
    pub fn untried(arm_id: Difficulty) -> Self {
        Self {
            arm_id,
            times_selected: 0,
            average_reward: 0.0,
        }
    }
}

// ==================== Learner State ====================

/// Per-(learner, concept) adaptive state
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerConceptState {
    /// Estimated command of the concept [0, 1]
    pub mastery_probability: f64,
    /// Exponentially smoothed mastery delta (signed)
    pub learning_velocity: f64,
    /// Blend of incorrect-answer rate and hint rate [0, 1]
    pub frustration_index: f64,
    /// Share of answers given with a hint [0, 1]
    pub hint_dependency_ratio: f64,
    pub questions_answered: u32,
    pub correct_answers: u32,
    pub incorrect_answers: u32,
    pub hints_used: u32,
}

/// Inputs of one mastery update
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryUpdateInput {
    pub mastery: f64,
    pub learning_velocity: f64,
    pub frustration_index: f64,
    pub hint_dependency_ratio: f64,
    pub questions_answered: u32,
    pub correct_answers: u32,
    pub incorrect_answers: u32,
    pub used_hint: bool,
    pub is_correct: bool,
}

/// Result of one mastery update; counters are the caller's business
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryUpdate {
    pub mastery: f64,
    pub learning_velocity: f64,
    pub frustration_index: f64,
    pub hint_dependency_ratio: f64,
}

/// Outcome of one submitted attempt, as fed back to the bandit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptOutcome {
    pub is_correct: bool,
    pub used_hint: bool,
    pub chosen_difficulty: Difficulty,
    pub mastery_before: f64,
    pub mastery_after: f64,
    pub reward: f64,
}

// ==================== Hints ====================

/// How much help the learner received before answering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HintLevel {
    ConceptualNudge,
    StrategyHint,
    StepCorrection,
}

// ==================== Skill Tree Types ====================

/// Neighbouring concepts consulted by the skill-tree decision.
/// Each slot holds the first stored relation of its kind.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptNeighbors {
    /// A concept that lists the current one as a prerequisite
    pub next_concept_id: Option<String>,
    /// A concept the current one depends on
    pub prerequisite_concept_id: Option<String>,
    /// A remedial or parallel concept
    pub reinforcement_concept_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionKind {
    UnlockNext,
    RedirectPrerequisite,
    InjectReinforcement,
    Stay,
}

/// Where the learner should go after an attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillTreeDecision {
    #[serde(rename = "type")]
    pub kind: DecisionKind,
    pub concept_id: String,
}

impl SkillTreeDecision {
    pub fn new(kind: DecisionKind, concept_id: impl Into<String>) -> Self {
        Self {
            kind,
            concept_id: concept_id.into(),
        }
    }

    /// Decisions that move the learner away from the current concept
    /// without progressing; the caller counts these as redirects.
    pub fn counts_as_redirect(&self) -> bool {
        matches!(
            self.kind,
            DecisionKind::RedirectPrerequisite | DecisionKind::InjectReinforcement
        )
    }
}
