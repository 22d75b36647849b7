use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use crate::db::DatabaseProxy;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub school: Option<String>,
    pub xp: i64,
    pub created_at: String,
}

fn map_user(row: &SqliteRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        phone: row.try_get("phone")?,
        school: row.try_get("school")?,
        xp: row.try_get("xp")?,
        created_at: row.try_get("createdAt")?,
    })
}

pub async fn find_user(proxy: &DatabaseProxy, user_id: &str) -> Result<Option<User>, sqlx::Error> {
    let row = sqlx::query(
        r#"SELECT "id", "email", "name", "phone", "school", "xp", "createdAt" FROM "users" WHERE "id" = ? LIMIT 1"#,
    )
    .bind(user_id)
    .fetch_optional(proxy.pool())
    .await?;
    row.as_ref().map(map_user).transpose()
}

pub async fn user_exists(proxy: &DatabaseProxy, user_id: &str) -> Result<bool, sqlx::Error> {
    let found: Option<String> = sqlx::query_scalar(r#"SELECT "id" FROM "users" WHERE "id" = ?"#)
        .bind(user_id)
        .fetch_optional(proxy.pool())
        .await?;
    Ok(found.is_some())
}

/// Deducts `cost` only when the balance covers it. Returns the new balance,
/// or `None` when the user cannot afford it (or does not exist).
pub async fn try_spend_xp(
    proxy: &DatabaseProxy,
    user_id: &str,
    cost: i64,
) -> Result<Option<i64>, sqlx::Error> {
    let new_xp: Option<i64> = sqlx::query_scalar(
        r#"UPDATE "users" SET "xp" = "xp" - ? WHERE "id" = ? AND "xp" >= ? RETURNING "xp""#,
    )
    .bind(cost)
    .bind(user_id)
    .bind(cost)
    .fetch_optional(proxy.pool())
    .await?;
    Ok(new_xp)
}

/// Adds `amount` XP inside the caller's transaction and returns the new total.
pub async fn award_xp(
    conn: &mut SqliteConnection,
    user_id: &str,
    amount: i64,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(r#"UPDATE "users" SET "xp" = "xp" + ? WHERE "id" = ? RETURNING "xp""#)
        .bind(amount)
        .bind(user_id)
        .fetch_one(conn)
        .await
}
