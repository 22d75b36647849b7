use serde::{Deserialize, Serialize};
use sqlx::{Row, SqliteConnection};

use studemy_algo::{AttemptOutcome, Difficulty};

use crate::db::operations::questions::decode_difficulty;
use crate::db::operations::stats::now_iso;
use crate::db::DatabaseProxy;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    pub id: String,
    pub user_id: String,
    pub question_id: String,
    pub concept_id: String,
    pub stats_id: String,
    pub is_correct: bool,
    pub used_hint: bool,
    pub mode: String,
    pub mastery_before: f64,
    pub mastery_after: f64,
    pub reward: f64,
    pub selected_difficulty: Difficulty,
    pub created_at: String,
}

impl Attempt {
    /// Row for a graded attempt, stamped now
    pub fn from_outcome(
        id: String,
        user_id: &str,
        question_id: &str,
        concept_id: &str,
        stats_id: &str,
        mode: &str,
        outcome: &AttemptOutcome,
    ) -> Self {
        Self {
            id,
            user_id: user_id.to_string(),
            question_id: question_id.to_string(),
            concept_id: concept_id.to_string(),
            stats_id: stats_id.to_string(),
            is_correct: outcome.is_correct,
            used_hint: outcome.used_hint,
            mode: mode.to_string(),
            mastery_before: outcome.mastery_before,
            mastery_after: outcome.mastery_after,
            reward: outcome.reward,
            selected_difficulty: outcome.chosen_difficulty,
            created_at: now_iso(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorLog {
    pub id: String,
    pub user_id: String,
    pub attempt_id: String,
    pub concept_id: String,
    pub error_type: String,
    pub message: String,
    pub created_at: String,
}

/// Error count per (concept, error type)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorSummary {
    pub concept_id: String,
    pub error_type: String,
    pub count: i64,
}

pub async fn insert_attempt(conn: &mut SqliteConnection, attempt: &Attempt) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO "attempts" (
            "id", "userId", "questionId", "conceptId", "statsId", "isCorrect", "usedHint", "mode",
            "masteryBefore", "masteryAfter", "reward", "selectedDifficulty", "createdAt"
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&attempt.id)
    .bind(&attempt.user_id)
    .bind(&attempt.question_id)
    .bind(&attempt.concept_id)
    .bind(&attempt.stats_id)
    .bind(attempt.is_correct)
    .bind(attempt.used_hint)
    .bind(&attempt.mode)
    .bind(attempt.mastery_before)
    .bind(attempt.mastery_after)
    .bind(attempt.reward)
    .bind(attempt.selected_difficulty.as_str())
    .bind(&attempt.created_at)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn insert_error_log(conn: &mut SqliteConnection, log: &ErrorLog) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO "error_logs" ("id", "userId", "attemptId", "conceptId", "errorType", "message", "createdAt")
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&log.id)
    .bind(&log.user_id)
    .bind(&log.attempt_id)
    .bind(&log.concept_id)
    .bind(&log.error_type)
    .bind(&log.message)
    .bind(&log.created_at)
    .execute(conn)
    .await?;
    Ok(())
}

/// Every attempt of a learner, oldest first
pub async fn list_attempts_for_user(
    proxy: &DatabaseProxy,
    user_id: &str,
) -> Result<Vec<Attempt>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT "id", "userId", "questionId", "conceptId", "statsId", "isCorrect", "usedHint", "mode",
               "masteryBefore", "masteryAfter", "reward", "selectedDifficulty", "createdAt"
        FROM "attempts" WHERE "userId" = ?
        ORDER BY "createdAt" ASC, rowid ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(proxy.pool())
    .await?;

    rows.iter()
        .map(|row| -> Result<Attempt, sqlx::Error> {
            let difficulty: String = row.try_get("selectedDifficulty")?;
            Ok(Attempt {
                id: row.try_get("id")?,
                user_id: row.try_get("userId")?,
                question_id: row.try_get("questionId")?,
                concept_id: row.try_get("conceptId")?,
                stats_id: row.try_get("statsId")?,
                is_correct: row.try_get("isCorrect")?,
                used_hint: row.try_get("usedHint")?,
                mode: row.try_get("mode")?,
                mastery_before: row.try_get("masteryBefore")?,
                mastery_after: row.try_get("masteryAfter")?,
                reward: row.try_get("reward")?,
                selected_difficulty: decode_difficulty(&difficulty)?,
                created_at: row.try_get("createdAt")?,
            })
        })
        .collect()
}

pub async fn error_summary_for_user(
    proxy: &DatabaseProxy,
    user_id: &str,
) -> Result<Vec<ErrorSummary>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT "conceptId", "errorType", COUNT(*) AS "count"
        FROM "error_logs" WHERE "userId" = ?
        GROUP BY "conceptId", "errorType"
        ORDER BY "conceptId", "errorType"
        "#,
    )
    .bind(user_id)
    .fetch_all(proxy.pool())
    .await?;

    rows.iter()
        .map(|row| -> Result<ErrorSummary, sqlx::Error> {
            Ok(ErrorSummary {
                concept_id: row.try_get("conceptId")?,
                error_type: row.try_get("errorType")?,
                count: row.try_get("count")?,
            })
        })
        .collect()
}
