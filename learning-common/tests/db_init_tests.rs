//! Database initialization tests
//!
//! Covers first-run creation, idempotent reopen and the constraints the
//! service relies on (unique video IDs, foreign keys, problem positions).

use learning_common::db::init::{init_database, SCHEMA_VERSION};
use tempfile::TempDir;

async fn insert_source(pool: &sqlx::SqlitePool, id: &str, video_id: &str) -> sqlx::Result<()> {
    sqlx::query(
        "INSERT INTO sources (id, title, url, video_id, transcript, duration, created_at, updated_at)
         VALUES (?, 'Title', 'https://www.youtube.com/watch?v=x', ?, '[0:00] hi', 60, 't', 't')",
    )
    .bind(id)
    .bind(video_id)
    .execute(pool)
    .await
    .map(|_| ())
}

async fn insert_problem(pool: &sqlx::SqlitePool, id: &str, position: i64) -> sqlx::Result<()> {
    sqlx::query(
        "INSERT INTO problems (id, session_id, position, kind, text, created_at)
         VALUES (?, 'sess-1', ?, 'construction', 'Explain it', 't')",
    )
    .bind(id)
    .bind(position)
    .execute(pool)
    .await
    .map(|_| ())
}

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("nested").join("learning.db");

    let result = init_database(&db_path).await;

    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("learning.db");

    let pool1 = init_database(&db_path).await.unwrap();
    insert_source(&pool1, "src-1", "dQw4w9WgXcQ").await.unwrap();
    pool1.close().await;

    let pool2 = init_database(&db_path).await;
    assert!(pool2.is_ok(), "Failed to open existing database: {:?}", pool2.err());
    let pool2 = pool2.unwrap();

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sources")
        .fetch_one(&pool2)
        .await
        .unwrap();
    assert_eq!(count, 1, "Reopen must keep existing rows");
}

#[tokio::test]
async fn test_all_tables_created() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("learning.db")).await.unwrap();

    for table in ["schema_version", "sources", "sessions", "problems"] {
        let exists: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
        )
        .bind(table)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(exists, 1, "Table {} missing", table);
    }

    let version: i64 = sqlx::query_scalar("SELECT MAX(version) FROM schema_version")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(version, SCHEMA_VERSION);
}

#[tokio::test]
async fn test_video_id_is_unique() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("learning.db")).await.unwrap();

    insert_source(&pool, "src-1", "dQw4w9WgXcQ").await.unwrap();
    let duplicate = insert_source(&pool, "src-2", "dQw4w9WgXcQ").await;

    assert!(duplicate.is_err(), "Second source with same video_id must be rejected");
}

#[tokio::test]
async fn test_session_requires_existing_source() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("learning.db")).await.unwrap();

    let orphan = sqlx::query(
        "INSERT INTO sessions (id, viewer_id, source_id, start_time, end_time, status, created_at, updated_at)
         VALUES ('sess-1', 'viewer', 'missing', 0, 60, 'challenging', 't', 't')",
    )
    .execute(&pool)
    .await;

    assert!(orphan.is_err(), "Foreign key on sessions.source_id not enforced");
}

#[tokio::test]
async fn test_session_status_checked() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("learning.db")).await.unwrap();
    insert_source(&pool, "src-1", "dQw4w9WgXcQ").await.unwrap();

    let bad = sqlx::query(
        "INSERT INTO sessions (id, viewer_id, source_id, start_time, end_time, status, created_at, updated_at)
         VALUES ('sess-1', 'viewer', 'src-1', 0, 60, 'paused', 't', 't')",
    )
    .execute(&pool)
    .await;

    assert!(bad.is_err(), "Unknown session status accepted");
}

#[tokio::test]
async fn test_problem_position_unique_per_session() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("learning.db")).await.unwrap();
    insert_source(&pool, "src-1", "dQw4w9WgXcQ").await.unwrap();
    sqlx::query(
        "INSERT INTO sessions (id, viewer_id, source_id, start_time, end_time, status, created_at, updated_at)
         VALUES ('sess-1', 'viewer', 'src-1', 0, 60, 'challenging', 't', 't')",
    )
    .execute(&pool)
    .await
    .unwrap();

    insert_problem(&pool, "p-1", 0).await.unwrap();
    insert_problem(&pool, "p-2", 1).await.unwrap();
    assert!(insert_problem(&pool, "p-3", 0).await.is_err(), "Duplicate position accepted");
}

#[tokio::test]
async fn test_deleting_source_cascades() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("learning.db")).await.unwrap();
    insert_source(&pool, "src-1", "dQw4w9WgXcQ").await.unwrap();
    sqlx::query(
        "INSERT INTO sessions (id, viewer_id, source_id, start_time, end_time, status, created_at, updated_at)
         VALUES ('sess-1', 'viewer', 'src-1', 0, 60, 'challenging', 't', 't')",
    )
    .execute(&pool)
    .await
    .unwrap();

    sqlx::query("DELETE FROM sources WHERE id = 'src-1'")
        .execute(&pool)
        .await
        .unwrap();

    let sessions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(sessions, 0);
}
