/// Database migrations and schema management.
use anyhow::Result;
use rusqlite::Connection;

/// Creates the initial schema if it doesn't exist yet.
///
/// `state_changes` is append-only: nothing in the crate updates or deletes a
/// row there, except the cascade when its issue is deleted. The
/// `last_state_change_id` pointer on `issues` is only ever written in the same
/// transaction that inserts the state change it points to.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            username    TEXT    NOT NULL UNIQUE,
            created_at  TEXT    NOT NULL
        );

        CREATE TABLE IF NOT EXISTS categories (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT    NOT NULL UNIQUE CHECK (length(name) <= 50),
            created_at  TEXT    NOT NULL
        );

        CREATE TABLE IF NOT EXISTS issues (
            id                   INTEGER PRIMARY KEY AUTOINCREMENT,
            title                TEXT    NOT NULL UNIQUE CHECK (length(title) <= 80),
            description          TEXT,
            category_id          INTEGER NOT NULL,
            reporter_id          INTEGER NOT NULL,
            assignee_id          INTEGER NOT NULL,
            last_state_change_id INTEGER,
            FOREIGN KEY (category_id) REFERENCES categories(id) ON DELETE RESTRICT,
            FOREIGN KEY (reporter_id) REFERENCES users(id) ON DELETE RESTRICT,
            FOREIGN KEY (assignee_id) REFERENCES users(id) ON DELETE RESTRICT,
            FOREIGN KEY (last_state_change_id) REFERENCES state_changes(id)
        );

        CREATE TABLE IF NOT EXISTS state_changes (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            issue_id    INTEGER NOT NULL,
            new_state   TEXT    NOT NULL,
            occurred_at TEXT    NOT NULL,
            FOREIGN KEY (issue_id) REFERENCES issues(id) ON DELETE CASCADE
        );
        ",
    )?;
    Ok(())
}
