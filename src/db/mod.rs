/// Database module with issue, category, user and history queries plus
/// migrations.
mod category;
mod history;
mod issue;
mod migrations;
mod user;

use anyhow::Result;
use chrono::{DateTime, Local};
use rusqlite::Connection;

// Re-export all public functions
pub use category::{
    create_category, delete_category, query_categories, query_category_by_id,
    query_category_by_name,
};
pub use history::{query_history_by_issue_id, query_state_counts, query_state_records};
pub use issue::{
    create_issue, delete_issue, query_issue_by_id, query_issue_by_title, query_issues,
    update_issue_state,
};
pub use user::{create_user, delete_user, query_user_by_id, query_user_by_name, query_users};

/// Opens (or creates) the SQLite database and runs migrations.
pub fn init(db_path: &str) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    // RESTRICT/CASCADE semantics depend on this pragma; it is off by default.
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    migrations::run_migrations(&conn)?;
    Ok(conn)
}

/// Returns the default database path inside the user's data directory.
/// Falls back to `./trackr.db` when no data dir is found.
pub fn default_db_path() -> String {
    if let Some(data_dir) = dirs::data_local_dir() {
        let trackr_dir = data_dir.join("trackr");
        std::fs::create_dir_all(&trackr_dir).ok();
        trackr_dir.join("trackr.db").to_string_lossy().into_owned()
    } else {
        "trackr.db".to_string()
    }
}

/// Parses an RFC 3339 timestamp read from a row, reporting a conversion
/// failure on the given column index if the stored value is malformed.
pub(crate) fn parse_datetime(raw: &str, column: usize) -> rusqlite::Result<DateTime<Local>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Local))
        .map_err(|err| {
            rusqlite::Error::FromSqlConversionFailure(
                column,
                rusqlite::types::Type::Text,
                Box::new(err),
            )
        })
}

/// Parses a stored state value, reporting a conversion failure on the given
/// column index if the value is outside the enumeration.
pub(crate) fn parse_state(raw: &str, column: usize) -> rusqlite::Result<crate::types::State> {
    raw.parse().map_err(|err: crate::error::Error| {
        rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(err))
    })
}

#[cfg(test)]
pub(crate) fn open_in_memory() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
    migrations::run_migrations(&conn).unwrap();
    conn
}
