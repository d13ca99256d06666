//! Named-call channel between the UI context and the [`BackendHost`].
//!
//! Every call travels as one [`Request`] carrying its own reply channel. The host
//! loop runs each request as an independent task, so concurrent calls interleave
//! and complete in whatever order the catalog answers them.
//!
//! The bridge forwards arguments and results untouched. Its only policy is the
//! [`Capabilities`] check, which withholds the raw `query` operation from
//! windows that have not been granted it.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::host::{BackendHost, CatalogStatus, ConnectionStatus, UpdateOutcome};
use crate::{AppError, AppResult};

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Arbitrary SQL from the UI. Only safe when the UI is trusted bundled code.
    pub raw_query: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self { raw_query: true }
    }
}

enum Request {
    Initialize {
        reply: oneshot::Sender<ConnectionStatus>,
    },
    Connect {
        reply: oneshot::Sender<ConnectionStatus>,
    },
    GetStatus {
        reply: oneshot::Sender<CatalogStatus>,
    },
    Query {
        sql: String,
        params: Vec<Value>,
        reply: oneshot::Sender<AppResult<Vec<Value>>>,
    },
    SearchBooks {
        query: String,
        reply: oneshot::Sender<AppResult<Vec<Value>>>,
    },
    GetGoogleConfig {
        reply: oneshot::Sender<AppResult<Value>>,
    },
    UpdateDatabase {
        buffer: Vec<u8>,
        reply: oneshot::Sender<UpdateOutcome>,
    },
}

impl Request {
    fn name(&self) -> &'static str {
        match self {
            Request::Initialize { .. } => "db:initialize",
            Request::Connect { .. } => "db:connect",
            Request::GetStatus { .. } => "db:getStatus",
            Request::Query { .. } => "db:query",
            Request::SearchBooks { .. } => "db:searchBooks",
            Request::GetGoogleConfig { .. } => "getGoogleConfig",
            Request::UpdateDatabase { .. } => "updateDatabase",
        }
    }
}

/// Client half of the bridge. Cheap to clone; all clones feed the same host loop.
#[derive(Clone)]
pub struct Bridge {
    tx: mpsc::Sender<Request>,
    capabilities: Capabilities,
}

/// Starts the host loop on the current Tokio runtime and returns its client.
///
/// The loop ends once every [`Bridge`] clone has been dropped.
pub fn spawn(host: Arc<BackendHost>, capabilities: Capabilities) -> Bridge {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    tokio::spawn(serve(host, rx));
    info!(
        target: "ourlibrary",
        event = "bridge_started",
        raw_query = capabilities.raw_query
    );
    Bridge { tx, capabilities }
}

async fn serve(host: Arc<BackendHost>, mut rx: mpsc::Receiver<Request>) {
    while let Some(request) = rx.recv().await {
        let host = host.clone();
        tokio::spawn(async move {
            let name = request.name();
            debug!(target: "ourlibrary", event = "bridge_call", op = name);
            if !dispatch(&host, request).await {
                debug!(target: "ourlibrary", event = "bridge_reply_dropped", op = name);
            }
        });
    }
    info!(target: "ourlibrary", event = "bridge_stopped");
}

/// Runs one request against the host. Returns false when the caller stopped waiting.
async fn dispatch(host: &BackendHost, request: Request) -> bool {
    match request {
        Request::Initialize { reply } => reply.send(host.initialize()).is_ok(),
        Request::Connect { reply } => reply.send(host.connect()).is_ok(),
        Request::GetStatus { reply } => reply.send(host.get_status().await).is_ok(),
        Request::Query { sql, params, reply } => {
            reply.send(host.query(&sql, &params).await).is_ok()
        }
        Request::SearchBooks { query, reply } => {
            reply.send(host.search_books(&query).await).is_ok()
        }
        Request::GetGoogleConfig { reply } => reply.send(host.get_google_config()).is_ok(),
        Request::UpdateDatabase { buffer, reply } => {
            reply.send(host.update_database(&buffer)).is_ok()
        }
    }
}

impl Bridge {
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Request,
    ) -> AppResult<T> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(build(reply))
            .await
            .map_err(|_| AppError::bridge_closed())?;
        rx.await.map_err(|_| AppError::bridge_closed())
    }

    /// Never fails; a stopped host reads as no connection.
    pub async fn initialize(&self) -> ConnectionStatus {
        self.request(|reply| Request::Initialize { reply })
            .await
            .unwrap_or_else(|_| ConnectionStatus::disconnected())
    }

    pub async fn connect(&self) -> ConnectionStatus {
        self.request(|reply| Request::Connect { reply })
            .await
            .unwrap_or_else(|_| ConnectionStatus::disconnected())
    }

    pub async fn get_status(&self) -> CatalogStatus {
        self.request(|reply| Request::GetStatus { reply })
            .await
            .unwrap_or_else(|_| CatalogStatus::disconnected())
    }

    pub async fn query(&self, sql: String, params: Vec<Value>) -> AppResult<Vec<Value>> {
        if !self.capabilities.raw_query {
            return Err(AppError::capability_denied("query"));
        }
        self.request(|reply| Request::Query { sql, params, reply })
            .await?
    }

    pub async fn search_books(&self, query: String) -> AppResult<Vec<Value>> {
        self.request(|reply| Request::SearchBooks { query, reply })
            .await?
    }

    pub async fn get_google_config(&self) -> AppResult<Value> {
        self.request(|reply| Request::GetGoogleConfig { reply })
            .await?
    }

    pub async fn update_database(&self, buffer: Vec<u8>) -> AppResult<UpdateOutcome> {
        self.request(|reply| Request::UpdateDatabase { buffer, reply })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppPaths;
    use crate::db::CatalogDb;

    fn disconnected_host() -> Arc<BackendHost> {
        Arc::new(BackendHost::new(
            Arc::new(CatalogDb::disconnected()),
            AppPaths::new("."),
        ))
    }

    #[tokio::test]
    async fn status_calls_degrade_once_host_loop_is_gone() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let bridge = Bridge {
            tx,
            capabilities: Capabilities::default(),
        };

        assert_eq!(bridge.initialize().await, ConnectionStatus::disconnected());
        assert_eq!(bridge.get_status().await, CatalogStatus::disconnected());
        let err = bridge.search_books("moby".into()).await.unwrap_err();
        assert_eq!(err.code(), AppError::BRIDGE_CLOSED_CODE);
    }

    #[tokio::test]
    async fn raw_query_without_capability_is_denied() {
        let bridge = spawn(disconnected_host(), Capabilities { raw_query: false });

        let err = bridge
            .query("SELECT 1".into(), Vec::new())
            .await
            .unwrap_err();
        assert_eq!(err.code(), AppError::CAPABILITY_DENIED_CODE);
        assert_eq!(err.context().get("operation"), Some(&"query".to_string()));

        // Other calls still reach the host.
        assert!(!bridge.connect().await.ok);
    }

    #[tokio::test]
    async fn query_before_connection_is_not_connected() {
        let bridge = spawn(disconnected_host(), Capabilities::default());

        let err = bridge
            .query("SELECT 1".into(), Vec::new())
            .await
            .unwrap_err();
        assert!(err.is_not_connected());
    }
}
