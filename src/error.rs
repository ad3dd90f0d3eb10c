/// Domain errors surfaced by the issue model and the database layer.
use thiserror::Error;

use crate::types::IssueId;

#[derive(Debug, Error)]
pub enum Error {
    #[error("'{0}' is not a valid state (expected TO_DO, IN_PROGRESS, DONE or CANCELED)")]
    InvalidState(String),

    #[error(
        "{} has no recorded state change",
        .0.map_or_else(|| "unsaved issue".to_string(), |id| format!("issue {id}"))
    )]
    MissingHistory(Option<IssueId>),

    #[error("integrity violation: {0}")]
    IntegrityViolation(String),

    #[error("issue '{0}' not found")]
    IssueNotFound(String),
}

/// Maps rusqlite constraint failures (unique title/name/username, RESTRICT
/// references) to `IntegrityViolation`; everything else passes through as-is.
pub fn from_sqlite(err: rusqlite::Error) -> anyhow::Error {
    match &err {
        rusqlite::Error::SqliteFailure(code, message)
            if code.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Error::IntegrityViolation(
                message
                    .clone()
                    .unwrap_or_else(|| "constraint violation".to_string()),
            )
            .into()
        }
        _ => err.into(),
    }
}
