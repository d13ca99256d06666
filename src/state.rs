use std::sync::Arc;

use anyhow::{Context, Result};

use crate::bridge::{self, Bridge, Capabilities};
use crate::config::{load_library_config, AppPaths};
use crate::db::CatalogDb;
use crate::host::BackendHost;

/// State managed by Tauri. Commands only ever touch `bridge`.
#[derive(Clone)]
pub struct AppState {
    pub bridge: Bridge,
    pub host: Arc<BackendHost>,
}

impl AppState {
    pub fn new(host: Arc<BackendHost>, capabilities: Capabilities) -> Self {
        let bridge = bridge::spawn(host.clone(), capabilities);
        Self { bridge, host }
    }

    /// Closes the catalog handle. Safe to call more than once.
    pub async fn shutdown(&self) {
        self.host.shutdown().await;
    }
}

/// Loads the main config, opens the catalog and starts the bridge.
///
/// A malformed config is fatal; a catalog that cannot be opened is not, the host
/// then answers status calls with `ok = false` and rejects reads.
pub async fn start_backend(paths: AppPaths) -> Result<AppState> {
    let config = load_library_config(&paths).context("load library configuration")?;
    let db_path = paths.database_path(&config);
    if let Err(err) = paths.prepare_database_dir(&config) {
        tracing::warn!(
            target: "ourlibrary",
            event = "catalog_dir_create_failed",
            path = %db_path.display(),
            error = %err
        );
    }
    let catalog = Arc::new(CatalogDb::open_or_disconnected(&db_path).await);
    let host = Arc::new(BackendHost::new(catalog, paths));
    Ok(AppState::new(
        host,
        Capabilities {
            raw_query: config.allow_raw_query,
        },
    ))
}
