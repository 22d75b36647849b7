//! # studemy-algo - adaptive practice core
//!
//! Pure Rust implementations of the three decisions behind an adaptive
//! practice session:
//!
//! - **UCB1 Bandit** - which difficulty to serve next
//! - **Mastery Update** - how one attempt moves mastery, velocity,
//!   frustration and hint dependency
//! - **Skill Tree** - whether to unlock, redirect, reinforce or stay
//!
//! ## Design
//!
//! - **State in, state out** - no globals, no I/O; the caller owns persistence
//! - **Deterministic** - same snapshot, same answer
//! - **Plain data** - every type is `serde`-serialisable with camelCase fields
//!
//! ## Modules
//!
//! - [`bandit`] - UCB1 arm selection and running-mean reward update
//! - [`mastery`] - mastery/velocity/frustration/hint-dependency update
//! - [`reward`] - hint-discounted bandit reward
//! - [`skill_tree`] - next-step decision table
//! - [`sanitize`] - numerical guards for stored values
//! - [`types`] - shared types and constants
//!
//! ## Example
//!
//! ```rust
//! use studemy_algo::{
//!     attempt_reward, decide_next_step, hint_reward_multiplier, select_arm, BanditArmStats,
//!     ConceptNeighbors, Difficulty, LearnerConceptState,
//! };
//!
//! let arms: Vec<BanditArmStats> = Difficulty::ALL.iter().map(|d| BanditArmStats::untried(*d)).collect();
//! let arm = select_arm(1, &arms).unwrap();
//! assert_eq!(arm, Difficulty::Easy);
//!
//! let before = LearnerConceptState::default();
//! let after = before.apply_attempt(true, false);
//! let reward = attempt_reward(
//!     before.mastery_probability,
//!     after.mastery_probability,
//!     hint_reward_multiplier(false, None),
//! );
//! let arms_after = arms[arm.to_index()].record_reward(reward);
//! assert_eq!(arms_after.times_selected, 1);
//!
//! let decision = decide_next_step(&after, &ConceptNeighbors::default(), "concept-1");
//! assert_eq!(decision.concept_id, "concept-1");
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod bandit;
pub mod mastery;
pub mod reward;
pub mod sanitize;
pub mod skill_tree;
pub mod types;

// ============================================================================
// Re-exports
// ============================================================================

pub use types::*;

pub use bandit::{select_arm, total_selections};

pub use mastery::update_mastery;

pub use reward::{attempt_reward, hint_reward_multiplier};

pub use skill_tree::{decide_next_step, is_unlocked_for_display};
