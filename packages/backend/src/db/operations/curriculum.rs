use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use studemy_algo::ConceptNeighbors;

use crate::db::DatabaseProxy;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: String,
    pub class_id: String,
    pub title: String,
    pub order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Concept {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub chapter_id: String,
}

/// A concept with the number of questions attached to it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptSummary {
    #[serde(flatten)]
    pub concept: Concept,
    pub question_count: i64,
}

fn map_concept(row: &SqliteRow) -> Result<Concept, sqlx::Error> {
    Ok(Concept {
        id: row.try_get("id")?,
        slug: row.try_get("slug")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        chapter_id: row.try_get("chapterId")?,
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: String,
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolClass {
    pub id: String,
    pub subject_id: String,
    pub name: String,
}

pub async fn find_subject(proxy: &DatabaseProxy, slug: &str) -> Result<Option<Subject>, sqlx::Error> {
    let row = sqlx::query(r#"SELECT "id", "slug", "name" FROM "subjects" WHERE "slug" = ? LIMIT 1"#)
        .bind(slug)
        .fetch_optional(proxy.pool())
        .await?;
    row.map(|row| -> Result<Subject, sqlx::Error> {
        Ok(Subject {
            id: row.try_get("id")?,
            slug: row.try_get("slug")?,
            name: row.try_get("name")?,
        })
    })
    .transpose()
}

pub async fn find_class(
    proxy: &DatabaseProxy,
    subject_id: &str,
    class_name: &str,
) -> Result<Option<SchoolClass>, sqlx::Error> {
    let row = sqlx::query(
        r#"SELECT "id", "subjectId", "name" FROM "classes" WHERE "subjectId" = ? AND "name" = ? LIMIT 1"#,
    )
    .bind(subject_id)
    .bind(class_name)
    .fetch_optional(proxy.pool())
    .await?;
    row.map(|row| -> Result<SchoolClass, sqlx::Error> {
        Ok(SchoolClass {
            id: row.try_get("id")?,
            subject_id: row.try_get("subjectId")?,
            name: row.try_get("name")?,
        })
    })
    .transpose()
}

fn map_chapter(row: &SqliteRow) -> Result<Chapter, sqlx::Error> {
    Ok(Chapter {
        id: row.try_get("id")?,
        class_id: row.try_get("classId")?,
        title: row.try_get("title")?,
        order: row.try_get("order")?,
    })
}

pub async fn list_chapters(
    proxy: &DatabaseProxy,
    class_id: &str,
) -> Result<Vec<Chapter>, sqlx::Error> {
    let rows = sqlx::query(
        r#"SELECT "id", "classId", "title", "order" FROM "chapters" WHERE "classId" = ? ORDER BY "order" ASC, rowid ASC"#,
    )
    .bind(class_id)
    .fetch_all(proxy.pool())
    .await?;
    rows.iter().map(map_chapter).collect()
}

pub async fn list_all_chapters(proxy: &DatabaseProxy) -> Result<Vec<Chapter>, sqlx::Error> {
    let rows = sqlx::query(
        r#"SELECT "id", "classId", "title", "order" FROM "chapters" ORDER BY "order" ASC, rowid ASC"#,
    )
    .fetch_all(proxy.pool())
    .await?;
    rows.iter().map(map_chapter).collect()
}

pub async fn list_concept_summaries(
    proxy: &DatabaseProxy,
    chapter_id: &str,
) -> Result<Vec<ConceptSummary>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT c."id", c."slug", c."title", c."description", c."chapterId",
               (SELECT COUNT(*) FROM "questions" q WHERE q."conceptId" = c."id") AS "questionCount"
        FROM "concepts" c
        WHERE c."chapterId" = ?
        ORDER BY c.rowid ASC
        "#,
    )
    .bind(chapter_id)
    .fetch_all(proxy.pool())
    .await?;

    rows.iter()
        .map(|row| -> Result<ConceptSummary, sqlx::Error> {
            Ok(ConceptSummary {
                concept: map_concept(row)?,
                question_count: row.try_get("questionCount")?,
            })
        })
        .collect()
}

pub async fn find_concept(
    proxy: &DatabaseProxy,
    concept_id: &str,
) -> Result<Option<Concept>, sqlx::Error> {
    let row = sqlx::query(
        r#"SELECT "id", "slug", "title", "description", "chapterId" FROM "concepts" WHERE "id" = ? LIMIT 1"#,
    )
    .bind(concept_id)
    .fetch_optional(proxy.pool())
    .await?;
    row.as_ref().map(map_concept).transpose()
}

pub async fn list_concepts(proxy: &DatabaseProxy) -> Result<Vec<Concept>, sqlx::Error> {
    let rows = sqlx::query(
        r#"SELECT "id", "slug", "title", "description", "chapterId" FROM "concepts" ORDER BY rowid ASC"#,
    )
    .fetch_all(proxy.pool())
    .await?;
    rows.iter().map(map_concept).collect()
}

// ==================== Concept graph ====================

/// First stored relation of each kind around `concept_id`, in insertion order.
pub async fn concept_neighbors(
    conn: &mut SqliteConnection,
    concept_id: &str,
) -> Result<ConceptNeighbors, sqlx::Error> {
    let next_concept_id: Option<String> = sqlx::query_scalar(
        r#"SELECT "toConceptId" FROM "concept_relations" WHERE "fromConceptId" = ? ORDER BY "createdAt" ASC, rowid ASC LIMIT 1"#,
    )
    .bind(concept_id)
    .fetch_optional(&mut *conn)
    .await?;

    let prerequisite_concept_id: Option<String> = sqlx::query_scalar(
        r#"SELECT "fromConceptId" FROM "concept_relations" WHERE "toConceptId" = ? ORDER BY "createdAt" ASC, rowid ASC LIMIT 1"#,
    )
    .bind(concept_id)
    .fetch_optional(&mut *conn)
    .await?;

    let reinforcement_concept_id: Option<String> = sqlx::query_scalar(
        r#"SELECT "reinforcementConceptId" FROM "reinforcement_nodes" WHERE "conceptId" = ? ORDER BY "createdAt" ASC, rowid ASC LIMIT 1"#,
    )
    .bind(concept_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(ConceptNeighbors {
        next_concept_id,
        prerequisite_concept_id,
        reinforcement_concept_id,
    })
}

/// `(fromConceptId, toConceptId)` pairs in insertion order
pub async fn list_relations(proxy: &DatabaseProxy) -> Result<Vec<(String, String)>, sqlx::Error> {
    sqlx::query_as(
        r#"SELECT "fromConceptId", "toConceptId" FROM "concept_relations" ORDER BY "createdAt" ASC, rowid ASC"#,
    )
    .fetch_all(proxy.pool())
    .await
}

/// `(conceptId, reinforcementConceptId)` pairs in insertion order
pub async fn list_reinforcements(
    proxy: &DatabaseProxy,
) -> Result<Vec<(String, String)>, sqlx::Error> {
    sqlx::query_as(
        r#"SELECT "conceptId", "reinforcementConceptId" FROM "reinforcement_nodes" ORDER BY "createdAt" ASC, rowid ASC"#,
    )
    .fetch_all(proxy.pool())
    .await
}
