//! Tauri commands exposed to the webview. Each one forwards to the bridge.

use serde_json::Value;
use tauri::State;

use crate::host::{CatalogStatus, ConnectionStatus, UpdateOutcome};
use crate::{AppResult, AppState};

#[tauri::command]
pub async fn db_initialize(state: State<'_, AppState>) -> AppResult<ConnectionStatus> {
    Ok(state.bridge.initialize().await)
}

#[tauri::command]
pub async fn db_connect(state: State<'_, AppState>) -> AppResult<ConnectionStatus> {
    Ok(state.bridge.connect().await)
}

#[tauri::command]
pub async fn db_get_status(state: State<'_, AppState>) -> AppResult<CatalogStatus> {
    Ok(state.bridge.get_status().await)
}

#[tauri::command]
pub async fn db_query(
    state: State<'_, AppState>,
    sql: String,
    params: Option<Vec<Value>>,
) -> AppResult<Vec<Value>> {
    state.bridge.query(sql, params.unwrap_or_default()).await
}

#[tauri::command]
pub async fn db_search_books(state: State<'_, AppState>, query: String) -> AppResult<Vec<Value>> {
    state.bridge.search_books(query).await
}

#[tauri::command]
pub async fn get_google_config(state: State<'_, AppState>) -> AppResult<Value> {
    state.bridge.get_google_config().await
}

#[tauri::command]
pub async fn update_database(
    state: State<'_, AppState>,
    buffer: Vec<u8>,
) -> AppResult<UpdateOutcome> {
    state.bridge.update_database(buffer).await
}
