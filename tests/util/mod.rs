#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ourlibrary_lib::config::AppPaths;
use ourlibrary_lib::db::CatalogDb;
use ourlibrary_lib::host::BackendHost;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

pub const BOOKS_SCHEMA: &str = "CREATE TABLE Books (\
     ID INTEGER PRIMARY KEY, \
     Title TEXT NOT NULL, \
     Author TEXT, \
     Category_ID INTEGER, \
     Filename TEXT, \
     Thumbnail BLOB)";

/// Creates `path` with an empty `Books` table.
pub async fn create_catalog(path: &Path) -> SqlitePool {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("create catalog pool");
    sqlx::query(BOOKS_SCHEMA).execute(&pool).await.unwrap();
    pool
}

pub async fn insert_book(pool: &SqlitePool, title: &str, author: &str, thumbnail: Option<&[u8]>) {
    sqlx::query(
        "INSERT INTO Books (Title, Author, Category_ID, Filename, Thumbnail) \
         VALUES (?1, ?2, 1, ?3, ?4)",
    )
    .bind(title)
    .bind(author)
    .bind(format!("{title}.pdf"))
    .bind(thumbnail.map(|t| t.to_vec()))
    .execute(pool)
    .await
    .unwrap();
}

/// Lays out `<root>/Config/*.json` the way an installation does.
pub fn write_install(root: &Path, database: &str, allow_raw_query: bool, external: &str) {
    let config_dir = root.join("Config");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("ourlibrary_config.json"),
        serde_json::json!({
            "local_database_path": database,
            "allow_raw_query": allow_raw_query,
        })
        .to_string(),
    )
    .unwrap();
    std::fs::write(config_dir.join("ourlibrary_google_config.json"), external).unwrap();
}

pub fn catalog_path(root: &Path) -> PathBuf {
    root.join("Data").join("OurLibrary.db")
}

/// Host over an already-populated pool.
pub fn host_for(pool: SqlitePool, root: &Path) -> BackendHost {
    BackendHost::new(Arc::new(CatalogDb::from_pool(pool)), AppPaths::new(root))
}
