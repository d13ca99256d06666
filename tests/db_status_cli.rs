mod util;

use anyhow::Result;
use assert_cmd::Command;
use serde_json::Value;
use tempfile::tempdir;

use util::{catalog_path, create_catalog, insert_book, write_install};

#[tokio::test]
async fn db_status_cli_reports_book_count() -> Result<()> {
    let tmp = tempdir()?;
    write_install(tmp.path(), "Data/OurLibrary.db", true, "{}");
    let pool = create_catalog(&catalog_path(tmp.path())).await;
    insert_book(&pool, "Emma", "Jane Austen", None).await;
    insert_book(&pool, "Walden", "Henry David Thoreau", None).await;
    pool.close().await;

    let output = Command::cargo_bin("ourlibrary")?
        .env("OURLIBRARY_HOME", tmp.path())
        .args(["db", "status", "--json"])
        .output()?;
    assert!(
        output.status.success(),
        "stdout: {}\nstderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );

    let status: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(status["ok"], Value::Bool(true));
    assert_eq!(status["mode"], Value::from("desktop"));
    assert_eq!(status["books"], Value::from(2));
    Ok(())
}

#[tokio::test]
async fn db_status_cli_fails_when_catalog_cannot_open() -> Result<()> {
    let tmp = tempdir()?;
    write_install(tmp.path(), "Missing/Dir/OurLibrary.db", true, "{}");

    let output = Command::cargo_bin("ourlibrary")?
        .env("OURLIBRARY_HOME", tmp.path())
        .args(["db", "status"])
        .output()?;
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("status: disconnected"), "stdout: {stdout}");
    assert!(stdout.contains("books: 0"), "stdout: {stdout}");
    Ok(())
}

#[tokio::test]
async fn db_search_cli_lists_matches() -> Result<()> {
    let tmp = tempdir()?;
    write_install(tmp.path(), "Data/OurLibrary.db", true, "{}");
    let pool = create_catalog(&catalog_path(tmp.path())).await;
    insert_book(&pool, "Moby Dick", "Herman Melville", None).await;
    insert_book(&pool, "Emma", "Jane Austen", None).await;
    pool.close().await;

    let output = Command::cargo_bin("ourlibrary")?
        .env("OURLIBRARY_HOME", tmp.path())
        .args(["db", "search", "MOBY"])
        .output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Moby Dick\tHerman Melville"), "stdout: {stdout}");
    assert!(!stdout.contains("Emma"), "stdout: {stdout}");
    assert!(stdout.contains("1 book(s)"), "stdout: {stdout}");
    Ok(())
}

#[test]
fn missing_config_is_fatal() -> Result<()> {
    let tmp = tempdir()?;

    let output = Command::cargo_bin("ourlibrary")?
        .env("OURLIBRARY_HOME", tmp.path())
        .args(["db", "status"])
        .output()?;
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("load library configuration"), "stderr: {stderr}");
    Ok(())
}
