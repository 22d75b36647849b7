use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use studemy_algo::Difficulty;

use crate::db::DatabaseProxy;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub concept_id: String,
    pub prompt: String,
    pub difficulty: Difficulty,
}

/// A question with the titles needed to show it outside its concept page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionWithContext {
    pub id: String,
    pub prompt: String,
    pub difficulty: Difficulty,
    pub concept_id: String,
    pub concept_title: String,
    pub chapter_title: String,
}

pub(crate) fn decode_difficulty(raw: &str) -> Result<Difficulty, sqlx::Error> {
    Difficulty::parse(raw)
        .ok_or_else(|| sqlx::Error::Decode(format!("unknown difficulty {raw:?}").into()))
}

fn map_question(row: &SqliteRow) -> Result<Question, sqlx::Error> {
    let difficulty: String = row.try_get("difficulty")?;
    Ok(Question {
        id: row.try_get("id")?,
        concept_id: row.try_get("conceptId")?,
        prompt: row.try_get("prompt")?,
        difficulty: decode_difficulty(&difficulty)?,
    })
}

/// Questions of a concept in insertion order
pub async fn list_for_concept(
    proxy: &DatabaseProxy,
    concept_id: &str,
) -> Result<Vec<Question>, sqlx::Error> {
    let rows = sqlx::query(
        r#"SELECT "id", "conceptId", "prompt", "difficulty" FROM "questions" WHERE "conceptId" = ? ORDER BY rowid ASC"#,
    )
    .bind(concept_id)
    .fetch_all(proxy.pool())
    .await?;
    rows.iter().map(map_question).collect()
}

pub async fn find_question(
    proxy: &DatabaseProxy,
    question_id: &str,
) -> Result<Option<Question>, sqlx::Error> {
    let row = sqlx::query(
        r#"SELECT "id", "conceptId", "prompt", "difficulty" FROM "questions" WHERE "id" = ? LIMIT 1"#,
    )
    .bind(question_id)
    .fetch_optional(proxy.pool())
    .await?;
    row.as_ref().map(map_question).transpose()
}

pub async fn list_with_context(
    proxy: &DatabaseProxy,
) -> Result<Vec<QuestionWithContext>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT q."id", q."prompt", q."difficulty", q."conceptId",
               c."title" AS "conceptTitle", ch."title" AS "chapterTitle"
        FROM "questions" q
        JOIN "concepts" c ON c."id" = q."conceptId"
        JOIN "chapters" ch ON ch."id" = c."chapterId"
        ORDER BY q.rowid ASC
        "#,
    )
    .fetch_all(proxy.pool())
    .await?;

    rows.iter()
        .map(|row| -> Result<QuestionWithContext, sqlx::Error> {
            let difficulty: String = row.try_get("difficulty")?;
            Ok(QuestionWithContext {
                id: row.try_get("id")?,
                prompt: row.try_get("prompt")?,
                difficulty: decode_difficulty(&difficulty)?,
                concept_id: row.try_get("conceptId")?,
                concept_title: row.try_get("conceptTitle")?,
                chapter_title: row.try_get("chapterTitle")?,
            })
        })
        .collect()
}
