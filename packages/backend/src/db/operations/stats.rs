use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use studemy_algo::sanitize::{clamp_count, sanitize_arm, sanitize_learner_state};
use studemy_algo::{BanditArmStats, Difficulty, LearnerConceptState, DEFAULT_ELO};

use crate::db::operations::questions::decode_difficulty;
use crate::db::DatabaseProxy;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentConceptStats {
    pub id: String,
    pub user_id: String,
    pub concept_id: String,
    #[serde(flatten)]
    pub state: LearnerConceptState,
    pub elo_rating: f64,
    pub redirected_count: i64,
    pub last_updated_at: String,
}

pub(crate) fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Reads a counter column; out-of-range values are clamped and logged.
fn count(row: &SqliteRow, column: &str, stats_id: &str) -> Result<u32, sqlx::Error> {
    let raw: i64 = row.try_get(column)?;
    let value = clamp_count(raw);
    if i64::from(value) != raw {
        tracing::warn!(stats_id, column, raw, value, "repaired out-of-range counter on load");
    }
    Ok(value)
}

fn map_stats(row: &SqliteRow) -> Result<StudentConceptStats, sqlx::Error> {
    let id: String = row.try_get("id")?;
    let mut state = LearnerConceptState {
        mastery_probability: row.try_get("masteryProbability")?,
        learning_velocity: row.try_get("learningVelocity")?,
        frustration_index: row.try_get("frustrationIndex")?,
        hint_dependency_ratio: row.try_get("hintDependencyRatio")?,
        questions_answered: count(row, "questionsAnswered", &id)?,
        correct_answers: count(row, "correctAnswers", &id)?,
        incorrect_answers: count(row, "incorrectAnswers", &id)?,
        hints_used: count(row, "hintsUsed", &id)?,
    };
    if sanitize_learner_state(&mut state) {
        tracing::warn!(stats_id = %id, "repaired out-of-range learner state on load");
    }

    let elo_rating: f64 = row.try_get("eloRating")?;
    Ok(StudentConceptStats {
        id,
        user_id: row.try_get("userId")?,
        concept_id: row.try_get("conceptId")?,
        state,
        elo_rating: if elo_rating.is_finite() { elo_rating } else { DEFAULT_ELO },
        redirected_count: row.try_get("redirectedCount")?,
        last_updated_at: row.try_get("lastUpdatedAt")?,
    })
}

const STATS_COLUMNS: &str = r#""id", "userId", "conceptId", "masteryProbability", "learningVelocity",
    "frustrationIndex", "hintDependencyRatio", "questionsAnswered", "correctAnswers",
    "incorrectAnswers", "hintsUsed", "eloRating", "redirectedCount", "lastUpdatedAt""#;

/// Returns the learner's row for the concept, creating a default one first if needed.
pub async fn load_or_create_stats(
    proxy: &DatabaseProxy,
    user_id: &str,
    concept_id: &str,
) -> Result<StudentConceptStats, sqlx::Error> {
    let inserted = sqlx::query(
        r#"
        INSERT OR IGNORE INTO "student_concept_stats" ("id", "userId", "conceptId", "eloRating", "lastUpdatedAt")
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(user_id)
    .bind(concept_id)
    .bind(DEFAULT_ELO)
    .bind(now_iso())
    .execute(proxy.pool())
    .await?;

    if inserted.rows_affected() > 0 {
        tracing::debug!(user_id, concept_id, "created learner concept stats");
    }

    let sql = format!(
        r#"SELECT {STATS_COLUMNS} FROM "student_concept_stats" WHERE "userId" = ? AND "conceptId" = ? LIMIT 1"#
    );
    let row = sqlx::query(&sql)
        .bind(user_id)
        .bind(concept_id)
        .fetch_one(proxy.pool())
        .await?;
    map_stats(&row)
}

/// Takes SQLite's writer lock for the row's transaction so the following
/// read cannot be overtaken by a concurrent attempt.
pub async fn claim_for_update(
    conn: &mut SqliteConnection,
    stats_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(r#"UPDATE "student_concept_stats" SET "lastUpdatedAt" = ? WHERE "id" = ?"#)
        .bind(now_iso())
        .bind(stats_id)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn load_stats(
    conn: &mut SqliteConnection,
    stats_id: &str,
) -> Result<StudentConceptStats, sqlx::Error> {
    let sql = format!(r#"SELECT {STATS_COLUMNS} FROM "student_concept_stats" WHERE "id" = ?"#);
    let row = sqlx::query(&sql).bind(stats_id).fetch_one(conn).await?;
    map_stats(&row)
}

pub async fn list_stats_for_user(
    proxy: &DatabaseProxy,
    user_id: &str,
) -> Result<Vec<StudentConceptStats>, sqlx::Error> {
    let sql = format!(
        r#"SELECT {STATS_COLUMNS} FROM "student_concept_stats" WHERE "userId" = ? ORDER BY rowid ASC"#
    );
    let rows = sqlx::query(&sql)
        .bind(user_id)
        .fetch_all(proxy.pool())
        .await?;
    rows.iter().map(map_stats).collect()
}

/// Writes the post-attempt state and stamps `lastUpdatedAt`.
pub async fn save_state(
    conn: &mut SqliteConnection,
    stats_id: &str,
    state: &LearnerConceptState,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE "student_concept_stats" SET
            "masteryProbability" = ?,
            "learningVelocity" = ?,
            "frustrationIndex" = ?,
            "hintDependencyRatio" = ?,
            "questionsAnswered" = ?,
            "correctAnswers" = ?,
            "incorrectAnswers" = ?,
            "hintsUsed" = ?,
            "lastUpdatedAt" = ?
        WHERE "id" = ?
        "#,
    )
    .bind(state.mastery_probability)
    .bind(state.learning_velocity)
    .bind(state.frustration_index)
    .bind(state.hint_dependency_ratio)
    .bind(i64::from(state.questions_answered))
    .bind(i64::from(state.correct_answers))
    .bind(i64::from(state.incorrect_answers))
    .bind(i64::from(state.hints_used))
    .bind(now_iso())
    .bind(stats_id)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn increment_redirects(
    conn: &mut SqliteConnection,
    stats_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"UPDATE "student_concept_stats" SET "redirectedCount" = "redirectedCount" + 1 WHERE "id" = ?"#,
    )
    .bind(stats_id)
    .execute(conn)
    .await?;
    Ok(())
}

// ==================== Bandit arms ====================

/// Creates the four arm rows for a stats row; existing rows are left alone.
pub async fn ensure_arms(conn: &mut SqliteConnection, stats_id: &str) -> Result<(), sqlx::Error> {
    let now = now_iso();
    for arm in Difficulty::ALL {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO "bandit_stats" ("id", "statsId", "difficulty", "timesSelected", "averageReward", "updatedAt")
            VALUES (?, ?, ?, 0, 0, ?)
            "#,
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(stats_id)
        .bind(arm.as_str())
        .bind(&now)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// Arm rows of a stats row in canonical arm order
pub async fn load_arms(
    conn: &mut SqliteConnection,
    stats_id: &str,
) -> Result<Vec<BanditArmStats>, sqlx::Error> {
    let rows = sqlx::query(
        r#"SELECT "difficulty", "timesSelected", "averageReward" FROM "bandit_stats" WHERE "statsId" = ?"#,
    )
    .bind(stats_id)
    .fetch_all(conn)
    .await?;

    let mut arms = Vec::with_capacity(rows.len());
    for row in &rows {
        let difficulty: String = row.try_get("difficulty")?;
        let mut arm = BanditArmStats {
            arm_id: decode_difficulty(&difficulty)?,
            times_selected: count(row, "timesSelected", stats_id)?,
            average_reward: row.try_get("averageReward")?,
        };
        if sanitize_arm(&mut arm) {
            tracing::warn!(stats_id, arm = %arm.arm_id, "repaired non-finite arm reward on load");
        }
        arms.push(arm);
    }
    arms.sort_by_key(|arm| arm.arm_id.to_index());
    Ok(arms)
}

pub async fn save_arm(
    conn: &mut SqliteConnection,
    stats_id: &str,
    arm: &BanditArmStats,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE "bandit_stats" SET "timesSelected" = ?, "averageReward" = ?, "updatedAt" = ?
        WHERE "statsId" = ? AND "difficulty" = ?
        "#,
    )
    .bind(i64::from(arm.times_selected))
    .bind(arm.average_reward)
    .bind(now_iso())
    .bind(stats_id)
    .bind(arm.arm_id.as_str())
    .execute(conn)
    .await?;
    Ok(())
}
