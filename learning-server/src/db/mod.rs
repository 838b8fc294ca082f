//! Database operations per entity

pub mod problems;
pub mod sessions;
pub mod sources;

/// Whether an insert lost a race against a UNIQUE constraint
pub(crate) fn is_unique_violation(err: &learning_common::Error) -> bool {
    match err {
        learning_common::Error::Database(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
        _ => false,
    }
}
