use rand::seq::SliceRandom;
use serde::Serialize;
use thiserror::Error;

use studemy_algo::Difficulty;

use crate::db::operations::curriculum;
use crate::db::operations::questions::{self, QuestionWithContext};
use crate::db::operations::users;
use crate::db::DatabaseProxy;

pub const SUBJECT_SLUG: &str = "mathematics";
pub const SUBJECT_NAME: &str = "Mathematics";
pub const CLASS_NAME: &str = "12";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectInfo {
    pub id: Option<String>,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassInfo {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub question_count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterNode {
    pub id: String,
    pub title: String,
    pub order: i64,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurriculumTree {
    pub subject: SubjectInfo,
    pub class: Option<ClassInfo>,
    pub chapters: Vec<ChapterNode>,
}

impl CurriculumTree {
    fn empty() -> Self {
        Self {
            subject: SubjectInfo {
                id: None,
                name: SUBJECT_NAME.to_string(),
                slug: SUBJECT_SLUG.to_string(),
            },
            class: None,
            chapters: Vec::new(),
        }
    }
}

pub async fn curriculum_tree(proxy: &DatabaseProxy) -> Result<CurriculumTree, sqlx::Error> {
    let Some(subject) = curriculum::find_subject(proxy, SUBJECT_SLUG).await? else {
        return Ok(CurriculumTree::empty());
    };
    let Some(class) = curriculum::find_class(proxy, &subject.id, CLASS_NAME).await? else {
        return Ok(CurriculumTree {
            subject: SubjectInfo {
                id: Some(subject.id),
                name: subject.name,
                slug: subject.slug,
            },
            ..CurriculumTree::empty()
        });
    };

    let mut chapters = Vec::new();
    for chapter in curriculum::list_chapters(proxy, &class.id).await? {
        let sections = curriculum::list_concept_summaries(proxy, &chapter.id)
            .await?
            .into_iter()
            .map(|summary| Section {
                id: summary.concept.id,
                slug: summary.concept.slug,
                title: summary.concept.title,
                description: summary.concept.description,
                question_count: summary.question_count,
            })
            .collect();
        chapters.push(ChapterNode {
            id: chapter.id,
            title: chapter.title,
            order: chapter.order,
            sections,
        });
    }

    Ok(CurriculumTree {
        subject: SubjectInfo {
            id: Some(subject.id),
            name: subject.name,
            slug: subject.slug,
        },
        class: Some(ClassInfo {
            id: class.id,
            name: class.name,
        }),
        chapters,
    })
}

// ==================== Assessment ====================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentQuestion {
    pub question_id: String,
    pub concept_id: String,
    pub prompt: String,
    pub difficulty: Difficulty,
    pub concept_title: String,
    pub chapter_title: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub questions: Vec<AssessmentQuestion>,
    pub total: usize,
}

#[derive(Debug, Error)]
pub enum AssessmentError {
    #[error("User not found")]
    UserNotFound,
    #[error("No questions available for assessment")]
    NoQuestions,
    #[error("sql error: {0}")]
    Sql(#[from] sqlx::Error),
}

fn sample_questions(mut pool: Vec<QuestionWithContext>, size: usize) -> Vec<QuestionWithContext> {
    let mut rng = rand::rng();
    pool.shuffle(&mut rng);
    pool.truncate(size);
    pool
}

pub async fn start_assessment(
    proxy: &DatabaseProxy,
    user_id: &str,
    size: usize,
) -> Result<Assessment, AssessmentError> {
    if !users::user_exists(proxy, user_id).await? {
        return Err(AssessmentError::UserNotFound);
    }

    let all = questions::list_with_context(proxy).await?;
    if all.is_empty() {
        return Err(AssessmentError::NoQuestions);
    }

    let questions: Vec<AssessmentQuestion> = sample_questions(all, size)
        .into_iter()
        .map(|q| AssessmentQuestion {
            question_id: q.id,
            concept_id: q.concept_id,
            prompt: q.prompt,
            difficulty: q.difficulty,
            concept_title: q.concept_title,
            chapter_title: q.chapter_title,
        })
        .collect();

    Ok(Assessment {
        total: questions.len(),
        questions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn question(id: usize) -> QuestionWithContext {
        QuestionWithContext {
            id: format!("q{id}"),
            prompt: String::new(),
            difficulty: Difficulty::Easy,
            concept_id: "c".to_string(),
            concept_title: "C".to_string(),
            chapter_title: "Ch".to_string(),
        }
    }

    #[test]
    fn test_sample_caps_and_keeps_distinct() {
        let sampled = sample_questions((0..25).map(question).collect(), 10);
        assert_eq!(sampled.len(), 10);
        let ids: HashSet<_> = sampled.iter().map(|q| q.id.clone()).collect();
        assert_eq!(ids.len(), 10);
    }

    #[test]
    fn test_sample_smaller_pool() {
        let sampled = sample_questions((0..3).map(question).collect(), 10);
        assert_eq!(sampled.len(), 3);
    }
}
