//! Source database operations

use learning_common::db::Source;
use learning_common::time::db_now;
use learning_common::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Fields of a source about to be stored
#[derive(Debug, Clone)]
pub struct NewSource {
    pub title: String,
    pub url: String,
    pub video_id: String,
    pub transcript: String,
    pub duration: i64,
    pub thumbnail: Option<String>,
    pub breakpoints: Option<String>,
}

const SOURCE_COLUMNS: &str = "id, title, url, video_id, transcript, duration, thumbnail, \
                              breakpoints, created_at, updated_at";

fn row_to_source(row: &SqliteRow) -> Source {
    Source {
        id: row.get("id"),
        title: row.get("title"),
        url: row.get("url"),
        video_id: row.get("video_id"),
        transcript: row.get("transcript"),
        duration: row.get("duration"),
        thumbnail: row.get("thumbnail"),
        breakpoints: row.get("breakpoints"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Load a source by ID
pub async fn get_source(pool: &SqlitePool, id: &str) -> Result<Option<Source>> {
    let row = sqlx::query(&format!("SELECT {} FROM sources WHERE id = ?", SOURCE_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(Error::Database)?;

    Ok(row.as_ref().map(row_to_source))
}

/// Load a source by YouTube video ID
pub async fn find_by_video_id(pool: &SqlitePool, video_id: &str) -> Result<Option<Source>> {
    let row = sqlx::query(&format!("SELECT {} FROM sources WHERE video_id = ?", SOURCE_COLUMNS))
        .bind(video_id)
        .fetch_optional(pool)
        .await
        .map_err(Error::Database)?;

    Ok(row.as_ref().map(row_to_source))
}

/// Most recently created sources
pub async fn list_recent(pool: &SqlitePool, limit: i64) -> Result<Vec<Source>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM sources ORDER BY created_at DESC, rowid DESC LIMIT ?",
        SOURCE_COLUMNS
    ))
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(Error::Database)?;

    Ok(rows.iter().map(row_to_source).collect())
}

/// Store a new source
///
/// If another request stored the same video first, that row is returned.
pub async fn insert_source(pool: &SqlitePool, new: NewSource) -> Result<Source> {
    let id = Uuid::new_v4().to_string();
    let now = db_now();

    let inserted = sqlx::query(
        r#"
        INSERT INTO sources (
            id, title, url, video_id, transcript, duration, thumbnail,
            breakpoints, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&new.title)
    .bind(&new.url)
    .bind(&new.video_id)
    .bind(&new.transcript)
    .bind(new.duration.max(0))
    .bind(&new.thumbnail)
    .bind(&new.breakpoints)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await
    .map_err(Error::Database);

    match inserted {
        Ok(_) => get_source(pool, &id)
            .await?
            .ok_or_else(|| Error::Internal(format!("Source {} vanished after insert", id))),
        Err(e) if super::is_unique_violation(&e) => find_by_video_id(pool, &new.video_id)
            .await?
            .ok_or(e),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use learning_common::db::init_schema;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        init_schema(&pool).await.unwrap();
        pool
    }

    fn new_source(video_id: &str) -> NewSource {
        NewSource {
            title: format!("Video {}", video_id),
            url: format!("https://www.youtube.com/watch?v={}", video_id),
            video_id: video_id.to_string(),
            transcript: "[0:00] hello".to_string(),
            duration: 120,
            thumbnail: None,
            breakpoints: Some("[]".to_string()),
        }
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let pool = test_pool().await;
        let source = insert_source(&pool, new_source("aaaaaaaaaaa")).await.unwrap();

        assert_eq!(get_source(&pool, &source.id).await.unwrap(), Some(source.clone()));
        assert_eq!(
            find_by_video_id(&pool, "aaaaaaaaaaa").await.unwrap().map(|s| s.id),
            Some(source.id)
        );
        assert!(get_source(&pool, "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_video_returns_existing() {
        let pool = test_pool().await;
        let first = insert_source(&pool, new_source("aaaaaaaaaaa")).await.unwrap();
        let second = insert_source(&pool, new_source("aaaaaaaaaaa")).await.unwrap();

        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_list_recent_newest_first() {
        let pool = test_pool().await;
        for id in ["aaaaaaaaaaa", "bbbbbbbbbbb", "ccccccccccc"] {
            insert_source(&pool, new_source(id)).await.unwrap();
        }

        let recent = list_recent(&pool, 2).await.unwrap();
        let ids: Vec<_> = recent.iter().map(|s| s.video_id.as_str()).collect();
        assert_eq!(ids, vec!["ccccccccccc", "bbbbbbbbbbb"]);
    }
}
