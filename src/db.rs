use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::Duration;

use anyhow::{Context, Result as AnyResult};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::{AppError, AppResult};

pub mod rows;

/// The one handle every catalog read goes through.
///
/// The pool is capped at a single connection that never idles out, so the
/// database file is opened once at startup and closed once by [`CatalogDb::close`].
pub struct CatalogDb {
    pool: RwLock<Option<SqlitePool>>,
    path: Option<PathBuf>,
}

impl CatalogDb {
    pub async fn open(path: &Path) -> AnyResult<Self> {
        let pool = open_catalog_pool(path).await?;
        Ok(Self {
            pool: RwLock::new(Some(pool)),
            path: Some(path.to_path_buf()),
        })
    }

    /// Opens the catalog, degrading to a disconnected handle when the file cannot be opened.
    pub async fn open_or_disconnected(path: &Path) -> Self {
        match Self::open(path).await {
            Ok(db) => db,
            Err(err) => {
                tracing::error!(
                    target: "ourlibrary",
                    event = "catalog_open_failed",
                    path = %path.display(),
                    error = %format!("{err:#}")
                );
                Self {
                    pool: RwLock::new(None),
                    path: Some(path.to_path_buf()),
                }
            }
        }
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self {
            pool: RwLock::new(Some(pool)),
            path: None,
        }
    }

    pub fn disconnected() -> Self {
        Self {
            pool: RwLock::new(None),
            path: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.pool
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|pool| !pool.is_closed())
    }

    #[allow(clippy::result_large_err)]
    pub fn pool(&self) -> AppResult<SqlitePool> {
        self.pool
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .filter(|pool| !pool.is_closed())
            .cloned()
            .ok_or_else(AppError::not_connected)
    }

    /// Closes the handle. Later calls see a disconnected catalog.
    pub async fn close(&self) {
        let pool = self.pool.write().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(pool) = pool {
            pool.close().await;
            match &self.path {
                Some(path) => tracing::info!(
                    target: "ourlibrary",
                    event = "catalog_closed",
                    path = %path.display()
                ),
                None => tracing::info!(target: "ourlibrary", event = "catalog_closed"),
            }
        }
    }
}

pub async fn open_catalog_pool(path: &Path) -> AnyResult<SqlitePool> {
    let opts = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(Option::<Duration>::None)
        .max_lifetime(Option::<Duration>::None)
        .connect_with(opts)
        .await
        .with_context(|| format!("open catalog database {}", path.display()))?;

    log_sqlite_version(&pool, path).await;
    Ok(pool)
}

async fn log_sqlite_version(pool: &SqlitePool, path: &Path) {
    let (sqlite_ver,): (String,) = sqlx::query_as("select sqlite_version()")
        .fetch_one(pool)
        .await
        .unwrap_or((String::from("unknown"),));

    tracing::info!(
        target: "ourlibrary",
        event = "catalog_open",
        sqlite_version = %sqlite_ver,
        path = %path.display()
    );
}
