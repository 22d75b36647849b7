//! Benchmark suite for studemy-algo
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use studemy_algo::{
    decide_next_step, select_arm, update_mastery, BanditArmStats, ConceptNeighbors, Difficulty,
    LearnerConceptState, MasteryUpdateInput,
};

fn bench_select_arm(c: &mut Criterion) {
    let arms = [
        BanditArmStats { arm_id: Difficulty::Easy, times_selected: 12, average_reward: 0.02 },
        BanditArmStats { arm_id: Difficulty::Medium, times_selected: 30, average_reward: 0.04 },
        BanditArmStats { arm_id: Difficulty::Hard, times_selected: 9, average_reward: 0.01 },
        BanditArmStats { arm_id: Difficulty::Challenge, times_selected: 3, average_reward: -0.02 },
    ];
    c.bench_function("select_arm", |b| {
        b.iter(|| select_arm(black_box(54), black_box(&arms)))
    });
}

fn bench_update_mastery(c: &mut Criterion) {
    let input = MasteryUpdateInput {
        mastery: 0.62,
        learning_velocity: 0.01,
        frustration_index: 0.3,
        hint_dependency_ratio: 0.2,
        questions_answered: 40,
        correct_answers: 28,
        incorrect_answers: 12,
        used_hint: true,
        is_correct: true,
    };
    c.bench_function("update_mastery", |b| {
        b.iter(|| update_mastery(black_box(&input)))
    });
}

fn bench_decide_next_step(c: &mut Criterion) {
    let state = LearnerConceptState {
        mastery_probability: 0.75,
        learning_velocity: 0.01,
        ..Default::default()
    };
    let neighbors = ConceptNeighbors {
        next_concept_id: Some("next".to_string()),
        prerequisite_concept_id: Some("prev".to_string()),
        reinforcement_concept_id: Some("side".to_string()),
    };
    c.bench_function("decide_next_step", |b| {
        b.iter(|| decide_next_step(black_box(&state), black_box(&neighbors), "current"))
    });
}

criterion_group!(benches, bench_select_arm, bench_update_mastery, bench_decide_next_step);
criterion_main!(benches);
