//! Problem database operations

use learning_common::db::{Problem, ProblemSolution};
use learning_common::questions::ProblemSpec;
use learning_common::time::db_now;
use learning_common::{Error, QuestionKind, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::services::challenge::Evaluation;

const PROBLEM_COLUMNS: &str = "id, session_id, position, kind, text, difficulty, options, solution, \
                               user_answer, is_correct, feedback, next_step, evaluated_at, created_at";

fn row_to_problem(row: &SqliteRow) -> Result<Problem> {
    let kind: String = row.get("kind");
    let options: Option<String> = row.get("options");
    let options: Option<Vec<String>> = options
        .as_deref()
        .map(serde_json::from_str::<Vec<String>>)
        .transpose()?;
    let solution: Option<String> = row.get("solution");
    let solution: ProblemSolution = solution
        .as_deref()
        .map(serde_json::from_str::<ProblemSolution>)
        .transpose()?
        .unwrap_or_default();

    Ok(Problem {
        id: row.get("id"),
        session_id: row.get("session_id"),
        position: row.get("position"),
        kind: QuestionKind::from(kind),
        text: row.get("text"),
        difficulty: row.get("difficulty"),
        options,
        column_a: solution.column_a,
        column_b: solution.column_b,
        correct_answer: solution.correct_answer,
        user_answer: row.get("user_answer"),
        is_correct: row.get("is_correct"),
        feedback: row.get("feedback"),
        next_step: row.get("next_step"),
        evaluated_at: row.get("evaluated_at"),
        created_at: row.get("created_at"),
    })
}

/// Store generated problems for a session in one transaction
///
/// Positions follow the order of `specs`.
pub async fn insert_problems(
    pool: &SqlitePool,
    session_id: &str,
    specs: &[ProblemSpec],
) -> Result<Vec<Problem>> {
    let now = db_now();
    let mut tx = pool.begin().await.map_err(Error::Database)?;

    for (position, spec) in specs.iter().enumerate() {
        let options = spec.options.as_ref().map(serde_json::to_string).transpose()?;
        let solution = ProblemSolution {
            column_a: spec.column_a.clone(),
            column_b: spec.column_b.clone(),
            correct_answer: spec.correct_answer.clone(),
        };
        let solution = if solution == ProblemSolution::default() {
            None
        } else {
            Some(serde_json::to_string(&solution)?)
        };

        sqlx::query(
            r#"
            INSERT INTO problems (
                id, session_id, position, kind, text, difficulty, options, solution, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(session_id)
        .bind(position as i64)
        .bind(spec.kind.as_str())
        .bind(spec.text.trim())
        .bind(&spec.difficulty)
        .bind(&options)
        .bind(&solution)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;
    }

    tx.commit().await.map_err(Error::Database)?;

    list_for_session(pool, session_id).await
}

/// Problems of a session in position order
pub async fn list_for_session(pool: &SqlitePool, session_id: &str) -> Result<Vec<Problem>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM problems WHERE session_id = ? ORDER BY position",
        PROBLEM_COLUMNS
    ))
    .bind(session_id)
    .fetch_all(pool)
    .await
    .map_err(Error::Database)?;

    rows.iter().map(row_to_problem).collect()
}

/// Load a problem by ID
pub async fn get_problem(pool: &SqlitePool, id: &str) -> Result<Option<Problem>> {
    let row = sqlx::query(&format!("SELECT {} FROM problems WHERE id = ?", PROBLEM_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(Error::Database)?;

    row.as_ref().map(row_to_problem).transpose()
}

/// Store the submitted answer and its evaluation
///
/// Only an unevaluated problem is written. Returns `None` when no such row
/// matched, either because the ID is unknown or the problem was already graded.
pub async fn record_evaluation(
    pool: &SqlitePool,
    id: &str,
    user_answer: &str,
    evaluation: &Evaluation,
) -> Result<Option<Problem>> {
    let result = sqlx::query(
        r#"
        UPDATE problems
        SET user_answer = ?, is_correct = ?, feedback = ?, next_step = ?, evaluated_at = ?
        WHERE id = ? AND evaluated_at IS NULL
        "#,
    )
    .bind(user_answer)
    .bind(evaluation.is_correct)
    .bind(&evaluation.feedback)
    .bind(&evaluation.next_step)
    .bind(db_now())
    .bind(id)
    .execute(pool)
    .await
    .map_err(Error::Database)?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    get_problem(pool, id).await
}

/// Problems of a session not yet evaluated
pub async fn count_unevaluated(pool: &SqlitePool, session_id: &str) -> Result<i64> {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM problems WHERE session_id = ? AND evaluated_at IS NULL",
    )
    .bind(session_id)
    .fetch_one(pool)
    .await
    .map_err(Error::Database)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sessions::create_session;
    use crate::db::sources::{insert_source, NewSource};
    use learning_common::db::init_schema;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn pool_with_session() -> (SqlitePool, String) {
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
        let session = create_session(&pool, "viewer", &source.id, 0.0, 300.0).await.unwrap();
        (pool, session.id)
    }

    fn specs() -> Vec<ProblemSpec> {
        serde_json::from_value(serde_json::json!([
            {"id": "p1", "type": "construction", "text": "Design a thing", "difficulty": "Medium"},
            {"id": "p2", "type": "matching", "text": "Match",
             "columnA": ["x", "y"], "columnB": ["1", "2"], "correctAnswer": {"0": 1, "1": 0}},
            {"id": "p3", "type": "multiple_choice", "text": "Pick", "options": ["a", "b"]}
        ]))
        .unwrap()
    }

    #[tokio::test]
    async fn test_insert_preserves_order_and_shape() {
        let (pool, session_id) = pool_with_session().await;
        let problems = insert_problems(&pool, &session_id, &specs()).await.unwrap();

        assert_eq!(problems.len(), 3);
        assert_eq!(problems.iter().map(|p| p.position).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(problems[1].kind, QuestionKind::Matching);
        assert_eq!(problems[1].column_b.as_deref(), Some(&["1".to_string(), "2".to_string()][..]));
        assert_eq!(problems[1].correct_answer, Some(serde_json::json!({"0": 1, "1": 0})));
        assert_eq!(problems[2].options.as_ref().map(Vec::len), Some(2));
        assert!(problems[0].options.is_none());
        assert_eq!(count_unevaluated(&pool, &session_id).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_second_insert_rolls_back() {
        let (pool, session_id) = pool_with_session().await;
        insert_problems(&pool, &session_id, &specs()[..1]).await.unwrap();

        // Position 0 already taken: nothing from this batch may land
        let err = insert_problems(&pool, &session_id, &specs()).await;
        assert!(err.is_err());
        assert_eq!(list_for_session(&pool, &session_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_record_evaluation() {
        let (pool, session_id) = pool_with_session().await;
        let problems = insert_problems(&pool, &session_id, &specs()).await.unwrap();

        let evaluation = Evaluation {
            is_correct: true,
            feedback: "Nice".into(),
            next_step: "Go on".into(),
        };
        let updated = record_evaluation(&pool, &problems[0].id, "My design", &evaluation)
            .await
            .unwrap()
            .unwrap();

        assert!(updated.is_evaluated());
        assert_eq!(updated.is_correct, Some(true));
        assert_eq!(updated.user_answer.as_deref(), Some("My design"));
        assert_eq!(count_unevaluated(&pool, &session_id).await.unwrap(), 2);

        let missing = record_evaluation(&pool, "missing", "x", &evaluation).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_record_evaluation_only_once() {
        let (pool, session_id) = pool_with_session().await;
        let problems = insert_problems(&pool, &session_id, &specs()).await.unwrap();

        let first = Evaluation {
            is_correct: true,
            feedback: "Nice".into(),
            next_step: "Go on".into(),
        };
        let second = Evaluation {
            is_correct: false,
            feedback: "Nope".into(),
            next_step: "Retry".into(),
        };
        record_evaluation(&pool, &problems[0].id, "first", &first)
            .await
            .unwrap()
            .unwrap();
        let again = record_evaluation(&pool, &problems[0].id, "second", &second)
            .await
            .unwrap();
        assert!(again.is_none());

        let stored = get_problem(&pool, &problems[0].id).await.unwrap().unwrap();
        assert_eq!(stored.user_answer.as_deref(), Some("first"));
        assert_eq!(stored.is_correct, Some(true));
        assert_eq!(stored.feedback.as_deref(), Some("Nice"));
    }
}
