//! Session database operations

use learning_common::db::{Session, SessionStatus};
use learning_common::time::db_now;
use learning_common::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

const SESSION_COLUMNS: &str =
    "id, viewer_id, source_id, start_time, end_time, status, created_at, updated_at";

fn row_to_session(row: &SqliteRow) -> Result<Session> {
    let status: String = row.get("status");
    Ok(Session {
        id: row.get("id"),
        viewer_id: row.get("viewer_id"),
        source_id: row.get("source_id"),
        start_time: row.get("start_time"),
        end_time: row.get("end_time"),
        status: status.parse()?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// Start a new `challenging` session
pub async fn create_session(
    pool: &SqlitePool,
    viewer_id: &str,
    source_id: &str,
    start_time: f64,
    end_time: f64,
) -> Result<Session> {
    let id = Uuid::new_v4().to_string();
    let now = db_now();

    sqlx::query(
        r#"
        INSERT INTO sessions (
            id, viewer_id, source_id, start_time, end_time, status, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(viewer_id)
    .bind(source_id)
    .bind(start_time)
    .bind(end_time)
    .bind(SessionStatus::Challenging.as_str())
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await
    .map_err(Error::Database)?;

    get_session(pool, &id)
        .await?
        .ok_or_else(|| Error::Internal(format!("Session {} vanished after insert", id)))
}

/// Load a session by ID
pub async fn get_session(pool: &SqlitePool, id: &str) -> Result<Option<Session>> {
    let row = sqlx::query(&format!("SELECT {} FROM sessions WHERE id = ?", SESSION_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(Error::Database)?;

    row.as_ref().map(row_to_session).transpose()
}

/// Set a session's status; `None` when the session does not exist
pub async fn update_status(
    pool: &SqlitePool,
    id: &str,
    status: SessionStatus,
) -> Result<Option<Session>> {
    let result = sqlx::query("UPDATE sessions SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(db_now())
        .bind(id)
        .execute(pool)
        .await
        .map_err(Error::Database)?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_session(pool, id).await
}

/// Newest completed session of a viewer on a source
pub async fn latest_completed(
    pool: &SqlitePool,
    viewer_id: &str,
    source_id: &str,
) -> Result<Option<Session>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM sessions
         WHERE viewer_id = ? AND source_id = ? AND status = ?
         ORDER BY created_at DESC, rowid DESC
         LIMIT 1",
        SESSION_COLUMNS
    ))
    .bind(viewer_id)
    .bind(source_id)
    .bind(SessionStatus::Completed.as_str())
    .fetch_optional(pool)
    .await
    .map_err(Error::Database)?;

    row.as_ref().map(row_to_session).transpose()
}

/// Sessions of a source, newest first, optionally capped
pub async fn list_for_source(
    pool: &SqlitePool,
    source_id: &str,
    limit: Option<i64>,
) -> Result<Vec<Session>> {
    // SQLite treats a negative LIMIT as unbounded
    let rows = sqlx::query(&format!(
        "SELECT {} FROM sessions WHERE source_id = ?
         ORDER BY created_at DESC, rowid DESC
         LIMIT ?",
        SESSION_COLUMNS
    ))
    .bind(source_id)
    .bind(limit.unwrap_or(-1))
    .fetch_all(pool)
    .await
    .map_err(Error::Database)?;

    rows.iter().map(row_to_session).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sources::{insert_source, NewSource};
    use learning_common::db::init_schema;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn pool_with_source() -> (SqlitePool, String) {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        init_schema(&pool).await.unwrap();
        let source = insert_source(
            &pool,
            NewSource {
                title: "Video".into(),
                url: "https://www.youtube.com/watch?v=aaaaaaaaaaa".into(),
                video_id: "aaaaaaaaaaa".into(),
                transcript: "[0:00] hi".into(),
                duration: 900,
                thumbnail: None,
                breakpoints: None,
            },
        )
        .await
        .unwrap();
        (pool, source.id)
    }

    #[tokio::test]
    async fn test_create_and_complete() {
        let (pool, source_id) = pool_with_source().await;
        let session = create_session(&pool, "viewer", &source_id, 0.0, 300.0).await.unwrap();
        assert_eq!(session.status, SessionStatus::Challenging);
        assert!(latest_completed(&pool, "viewer", &source_id).await.unwrap().is_none());

        let updated = update_status(&pool, &session.id, SessionStatus::Completed)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, SessionStatus::Completed);

        let latest = latest_completed(&pool, "viewer", &source_id).await.unwrap().unwrap();
        assert_eq!(latest.id, session.id);
        assert!(latest_completed(&pool, "other", &source_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_session() {
        let (pool, _) = pool_with_source().await;
        let result = update_status(&pool, "missing", SessionStatus::Completed).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_list_for_source_limit() {
        let (pool, source_id) = pool_with_source().await;
        let first = create_session(&pool, "v", &source_id, 0.0, 300.0).await.unwrap();
        let second = create_session(&pool, "v", &source_id, 300.0, 600.0).await.unwrap();

        let all = list_for_source(&pool, &source_id, None).await.unwrap();
        assert_eq!(
            all.iter().map(|s| s.id.clone()).collect::<Vec<_>>(),
            vec![second.id.clone(), first.id]
        );

        let latest = list_for_source(&pool, &source_id, Some(1)).await.unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].id, second.id);
    }

    #[tokio::test]
    async fn test_unknown_source_rejected() {
        let (pool, _) = pool_with_source().await;
        assert!(create_session(&pool, "v", "missing", 0.0, 1.0).await.is_err());
    }
}
