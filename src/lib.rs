// Learn more about Tauri commands at https://tauri.app/develop/calling-rust/
use tauri::{Manager, RunEvent};

pub mod bridge;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod db;
mod error;
pub mod host;
pub mod logging;
mod state;

pub use error::{AppError, AppResult};
pub use state::{start_backend, AppState};

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    let app = tauri::Builder::default()
        .setup(|app| {
            let resolver = app.path();
            let paths = config::AppPaths::for_bundle(
                resolver.resource_dir()?,
                resolver.app_data_dir().ok(),
            );
            tracing::info!(
                target: "ourlibrary",
                event = "install_dir",
                path = %paths.install_dir().display(),
                data_dir = ?paths.data_dir()
            );
            let state = tauri::async_runtime::block_on(start_backend(paths))?;
            app.manage(state);
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::db_initialize,
            commands::db_connect,
            commands::db_get_status,
            commands::db_query,
            commands::db_search_books,
            commands::get_google_config,
            commands::update_database,
        ])
        .build(tauri::generate_context!())
        .expect("error while building tauri application");

    app.run(|handle, event| {
        if let RunEvent::Exit = event {
            if let Some(state) = handle.try_state::<AppState>() {
                tauri::async_runtime::block_on(state.shutdown());
            }
        }
    });
}
