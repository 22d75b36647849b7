//! UCB1 Difficulty Bandit
//!
//! Chooses which difficulty arm to serve next for a learner/concept pair.
//!
//! Core principles:
//! - Every arm is pulled once before any statistics are trusted
//! - After that, score = mean reward + sqrt(2 ln N / n_arm)
//! - The strictly greatest score wins; ties go to the earlier arm
//!
//! The selector is a pure function over a snapshot of arm statistics. The
//! caller persists the arms and feeds the observed reward back through
//! [`BanditArmStats::record_reward`].

use crate::types::{BanditArmStats, Difficulty};

/// Pick the arm to serve next.
///
/// `total_selections` is floored to 1 before the logarithm. Returns `None`
/// only for an empty arm list.
pub fn select_arm(total_selections: u64, arms: &[BanditArmStats]) -> Option<Difficulty> {
    // Force exploration: any untried arm goes first, in list order.
    if let Some(untried) = arms.iter().find(|a| a.times_selected == 0) {
        return Some(untried.arm_id);
    }

    let log_n = (total_selections.max(1) as f64).ln();

    let mut best_arm = arms.first()?.arm_id;
    let mut best_score = f64::NEG_INFINITY;

    for arm in arms {
        let score = ucb_score(arm, log_n);
        if score > best_score {
            best_score = score;
            best_arm = arm.arm_id;
        }
    }

    Some(best_arm)
}

/// Upper confidence bound of a pulled arm
pub fn ucb_score(arm: &BanditArmStats, log_n: f64) -> f64 {
    let exploration = (2.0 * log_n / f64::from(arm.times_selected)).sqrt();
    arm.average_reward + exploration
}

/// Sum of pulls over all arms
pub fn total_selections(arms: &[BanditArmStats]) -> u64 {
    arms.iter().map(|a| u64::from(a.times_selected)).sum()
}

impl BanditArmStats {
    /// Fold one more reward into the running mean
    pub fn record_reward(&self, reward: f64) -> Self {
        let n = f64::from(self.times_selected);
        Self {
            arm_id: self.arm_id,
            times_selected: self.times_selected + 1,
            average_reward: (self.average_reward * n + reward) / (n + 1.0),
        }
    }
}
