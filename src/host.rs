//! The privileged side of the bridge: owns the catalog handle and the config files.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use ts_rs::TS;

use crate::config::{load_external_config, AppPaths};
use crate::db::CatalogDb;
use crate::{catalog, AppError, AppResult};

/// Mode tag reported by every status call.
pub const MODE: &str = "desktop";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../ui/bindings/")]
pub struct ConnectionStatus {
    pub ok: bool,
    pub mode: String,
}

impl ConnectionStatus {
    pub fn disconnected() -> Self {
        Self {
            ok: false,
            mode: MODE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../ui/bindings/")]
pub struct CatalogStatus {
    pub ok: bool,
    pub mode: String,
    #[ts(type = "number")]
    pub books: i64,
}

impl CatalogStatus {
    pub fn disconnected() -> Self {
        Self {
            ok: false,
            mode: MODE.to_string(),
            books: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../ui/bindings/")]
pub struct UpdateOutcome {
    pub ok: bool,
    pub mode: String,
    pub updated: bool,
}

pub struct BackendHost {
    catalog: Arc<CatalogDb>,
    paths: AppPaths,
}

impl BackendHost {
    pub fn new(catalog: Arc<CatalogDb>, paths: AppPaths) -> Self {
        Self { catalog, paths }
    }

    pub fn initialize(&self) -> ConnectionStatus {
        self.connection_status()
    }

    pub fn connect(&self) -> ConnectionStatus {
        self.connection_status()
    }

    fn connection_status(&self) -> ConnectionStatus {
        ConnectionStatus {
            ok: self.catalog.is_connected(),
            mode: MODE.to_string(),
        }
    }

    /// Best-effort health check: a failing count reads as an empty catalog.
    pub async fn get_status(&self) -> CatalogStatus {
        let Ok(pool) = self.catalog.pool() else {
            return CatalogStatus::disconnected();
        };
        let books = match catalog::count_books(&pool).await {
            Ok(n) => n,
            Err(err) => {
                warn!(
                    target: "ourlibrary",
                    event = "catalog_count_failed",
                    error = %AppError::from(err)
                );
                0
            }
        };
        CatalogStatus {
            ok: true,
            mode: MODE.to_string(),
            books,
        }
    }

    pub async fn query(&self, sql: &str, params: &[Value]) -> AppResult<Vec<Value>> {
        let pool = self
            .catalog
            .pool()
            .map_err(|err| err.with_context("operation", "query"))?;
        catalog::run_query(&pool, sql, params)
            .await
            .map_err(|err| err.with_context("operation", "query"))
    }

    pub async fn search_books(&self, query: &str) -> AppResult<Vec<Value>> {
        let pool = self
            .catalog
            .pool()
            .map_err(|err| err.with_context("operation", "search_books"))?;
        catalog::search_books(&pool, query)
            .await
            .map_err(|err| err.with_context("operation", "search_books"))
    }

    pub fn get_google_config(&self) -> AppResult<Value> {
        load_external_config(&self.paths)
            .map_err(|err| AppError::from(err).with_context("operation", "get_google_config"))
    }

    /// Accepts a replacement catalog payload. Ingestion is not supported yet, so
    /// nothing is written and `updated` is always false.
    pub fn update_database(&self, buffer: &[u8]) -> UpdateOutcome {
        info!(
            target: "ourlibrary",
            event = "update_database_ignored",
            bytes = buffer.len()
        );
        UpdateOutcome {
            ok: true,
            mode: MODE.to_string(),
            updated: false,
        }
    }

    pub async fn shutdown(&self) {
        self.catalog.close().await;
    }
}
