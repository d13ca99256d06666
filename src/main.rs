// Prevents additional console window on Windows in release, DO NOT REMOVE!!
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;

use ourlibrary_lib::config::AppPaths;
use ourlibrary_lib::host::CatalogStatus;
use ourlibrary_lib::AppState;

#[derive(Debug, Parser)]
#[command(name = "ourlibrary", about = "OurLibrary desktop catalog", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Catalog inspection commands that run without opening a window.
    #[command(subcommand)]
    Db(DbCommand),
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    /// Report whether the catalog opens and how many books it holds.
    Status {
        /// Emit the raw JSON status instead of the text view.
        #[arg(long)]
        json: bool,
    },
    /// Search titles and authors the same way the library window does.
    Search {
        /// Case-insensitive text to look for; empty matches every book.
        query: String,
        /// Emit the matching rows as a JSON array.
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Some(command) = cli.command {
        let _ = ourlibrary_lib::logging::init_logging(None);
        match handle_cli(command) {
            Ok(code) => process::exit(code),
            Err(err) => {
                eprintln!("Error: {err:#}");
                process::exit(1);
            }
        }
    }

    let log_dir = ourlibrary_lib::logging::default_log_dir();
    let _log_guard = ourlibrary_lib::logging::init_logging(log_dir.as_deref());
    tracing::debug!(target: "ourlibrary", "app booted");
    ourlibrary_lib::run()
}

fn handle_cli(command: Commands) -> Result<i32> {
    match command {
        Commands::Db(db) => handle_db_command(db),
    }
}

fn handle_db_command(command: DbCommand) -> Result<i32> {
    let paths = AppPaths::resolve().context("determine installation directory")?;

    tauri::async_runtime::block_on(async move {
        let state = ourlibrary_lib::start_backend(paths).await?;
        let result = run_db_command(&state, command).await;
        state.shutdown().await;
        result
    })
}

async fn run_db_command(state: &AppState, command: DbCommand) -> Result<i32> {
    match command {
        DbCommand::Status { json } => {
            let status = state.bridge.get_status().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                print_status(&status);
            }
            Ok(if status.ok { 0 } else { 1 })
        }
        DbCommand::Search { query, json } => {
            let rows = state
                .bridge
                .search_books(query)
                .await
                .context("search books")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                print_books(&rows);
            }
            Ok(0)
        }
    }
}

fn print_status(status: &CatalogStatus) {
    println!(
        "status: {}",
        if status.ok { "connected" } else { "disconnected" }
    );
    println!("mode: {}", status.mode);
    println!("books: {}", status.books);
}

fn print_books(rows: &[Value]) {
    for row in rows {
        let title = row.get("title").and_then(Value::as_str).unwrap_or("");
        let author = row.get("author").and_then(Value::as_str).unwrap_or("");
        println!("{title}\t{author}");
    }
    println!("{} book(s)", rows.len());
}
