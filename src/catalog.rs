use serde_json::Value;
use sqlx::SqlitePool;

use crate::db::rows::{bind_value, row_to_value};
use crate::AppResult;

/// Upper bound on rows returned by a single book search.
pub const SEARCH_LIMIT: i64 = 200;

const COUNT_BOOKS_SQL: &str = "SELECT COUNT(*) AS n FROM Books";

const SEARCH_BOOKS_SQL: &str = "SELECT ID AS id, Title AS title, Author AS author, \
     Category_ID AS categoryId, Filename AS filename, Thumbnail AS thumbnail \
     FROM Books \
     WHERE Title LIKE ?1 ESCAPE '\\' OR Author LIKE ?1 ESCAPE '\\' \
     ORDER BY Title \
     LIMIT ?2";

pub async fn count_books(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    let (n,): (i64,) = sqlx::query_as(COUNT_BOOKS_SQL).fetch_one(pool).await?;
    Ok(n)
}

/// Runs caller-supplied SQL with positional parameters and returns every row.
pub async fn run_query(pool: &SqlitePool, sql: &str, params: &[Value]) -> AppResult<Vec<Value>> {
    let mut query = sqlx::query(sql);
    for param in params {
        query = bind_value(query, param);
    }
    let rows = query.fetch_all(pool).await?;
    Ok(rows.iter().map(row_to_value).collect())
}

/// Case-insensitive substring match on title or author, ordered by title.
pub async fn search_books(pool: &SqlitePool, needle: &str) -> AppResult<Vec<Value>> {
    let rows = sqlx::query(SEARCH_BOOKS_SQL)
        .bind(like_pattern(needle))
        .bind(SEARCH_LIMIT)
        .fetch_all(pool)
        .await?;
    Ok(rows.iter().map(row_to_value).collect())
}

/// Wraps `needle` in `%` wildcards, escaping LIKE metacharacters so they match literally.
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
