use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use studemy_algo::{is_unlocked_for_display, Difficulty};

use crate::db::operations::attempts::{self, Attempt, ErrorSummary};
use crate::db::operations::curriculum;
use crate::db::operations::stats::{self, StudentConceptStats};
use crate::db::operations::users::{self, User};
use crate::db::DatabaseProxy;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptNode {
    pub id: String,
    pub title: String,
    pub chapter_title: Option<String>,
    pub chapter_order: Option<i64>,
    pub mastery: f64,
    pub learning_velocity: f64,
    pub frustration_index: f64,
    pub hint_dependency_ratio: f64,
    pub elo_rating: f64,
    pub questions_answered: u32,
    pub correct_answers: u32,
    pub incorrect_answers: u32,
    pub redirected_count: i64,
    pub prerequisites: Vec<String>,
    pub reinforcement_nodes: Vec<String>,
    pub unlocked: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub attempt_id: String,
    pub concept_id: String,
    pub difficulty: Difficulty,
    pub mode: String,
    pub mastery_after: f64,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryByMode {
    pub adaptive: f64,
    #[serde(rename = "static")]
    pub static_mode: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub user: User,
    pub concepts: Vec<ConceptNode>,
    pub error_summary: Vec<ErrorSummary>,
    pub concept_redirect_history: Vec<HistoryEntry>,
    pub learning_velocity: f64,
    pub hint_usage_ratio: f64,
    pub mastery_by_mode: MasteryByMode,
}

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("User not found")]
    UserNotFound,
    #[error("sql error: {0}")]
    Sql(#[from] sqlx::Error),
}

/// Mean learning velocity over the learner's concepts
pub fn mean_velocity(stats: &[StudentConceptStats]) -> f64 {
    if stats.is_empty() {
        return 0.0;
    }
    stats.iter().map(|s| s.state.learning_velocity).sum::<f64>() / stats.len() as f64
}

/// Hints used per question answered, across all concepts
pub fn hint_usage_ratio(stats: &[StudentConceptStats]) -> f64 {
    let hints: u64 = stats.iter().map(|s| u64::from(s.state.hints_used)).sum();
    let answered: u64 = stats.iter().map(|s| u64::from(s.state.questions_answered)).sum();
    if answered == 0 {
        0.0
    } else {
        hints as f64 / answered as f64
    }
}

/// Mastery after the latest attempt of each mode; `attempts` must be chronological
pub fn mastery_by_mode(attempts: &[Attempt]) -> MasteryByMode {
    let latest = |mode: &str| {
        attempts
            .iter()
            .rev()
            .find(|a| a.mode == mode)
            .map(|a| a.mastery_after)
            .unwrap_or(0.0)
    };
    MasteryByMode {
        adaptive: latest("ADAPTIVE"),
        static_mode: latest("STATIC"),
    }
}

pub async fn dashboard(proxy: &DatabaseProxy, user_id: &str) -> Result<Dashboard, DashboardError> {
    let user = users::find_user(proxy, user_id)
        .await?
        .ok_or(DashboardError::UserNotFound)?;

    let stats = stats::list_stats_for_user(proxy, user_id).await?;
    let attempts = attempts::list_attempts_for_user(proxy, user_id).await?;
    let error_summary = attempts::error_summary_for_user(proxy, user_id).await?;

    let concepts: HashMap<String, curriculum::Concept> = curriculum::list_concepts(proxy)
        .await?
        .into_iter()
        .map(|c| (c.id.clone(), c))
        .collect();
    let chapters: HashMap<String, curriculum::Chapter> = curriculum::list_all_chapters(proxy)
        .await?
        .into_iter()
        .map(|c| (c.id.clone(), c))
        .collect();

    let mut prerequisites: HashMap<String, Vec<String>> = HashMap::new();
    for (from, to) in curriculum::list_relations(proxy).await? {
        prerequisites.entry(to).or_default().push(from);
    }
    let mut reinforcements: HashMap<String, Vec<String>> = HashMap::new();
    for (concept_id, reinforcement_id) in curriculum::list_reinforcements(proxy).await? {
        reinforcements.entry(concept_id).or_default().push(reinforcement_id);
    }

    let nodes = stats
        .iter()
        .map(|s| {
            let concept = concepts.get(&s.concept_id);
            let chapter = concept.and_then(|c| chapters.get(&c.chapter_id));
            ConceptNode {
                id: s.concept_id.clone(),
                title: concept.map(|c| c.title.clone()).unwrap_or_default(),
                chapter_title: chapter.map(|ch| ch.title.clone()),
                chapter_order: chapter.map(|ch| ch.order),
                mastery: s.state.mastery_probability,
                learning_velocity: s.state.learning_velocity,
                frustration_index: s.state.frustration_index,
                hint_dependency_ratio: s.state.hint_dependency_ratio,
                elo_rating: s.elo_rating,
                questions_answered: s.state.questions_answered,
                correct_answers: s.state.correct_answers,
                incorrect_answers: s.state.incorrect_answers,
                redirected_count: s.redirected_count,
                prerequisites: prerequisites.get(&s.concept_id).cloned().unwrap_or_default(),
                reinforcement_nodes: reinforcements.get(&s.concept_id).cloned().unwrap_or_default(),
                unlocked: is_unlocked_for_display(s.state.mastery_probability),
            }
        })
        .collect();

    let history = attempts
        .iter()
        .map(|a| HistoryEntry {
            attempt_id: a.id.clone(),
            concept_id: a.concept_id.clone(),
            difficulty: a.selected_difficulty,
            mode: a.mode.clone(),
            mastery_after: a.mastery_after,
            created_at: a.created_at.clone(),
        })
        .collect();

    Ok(Dashboard {
        user,
        concepts: nodes,
        error_summary,
        concept_redirect_history: history,
        learning_velocity: mean_velocity(&stats),
        hint_usage_ratio: hint_usage_ratio(&stats),
        mastery_by_mode: mastery_by_mode(&attempts),
    })
}
