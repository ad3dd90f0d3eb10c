/// User (reporter/assignee) database queries.
use anyhow::Result;
use rusqlite::Connection;

use crate::error;
use crate::types::{User, UserId};

pub fn create_user(arg: User, conn: &Connection) -> Result<UserId> {
    conn.execute(
        "INSERT INTO users (username, created_at) VALUES (?1, ?2)",
        (&arg.username, arg.created_at.to_rfc3339()),
    )
    .map_err(error::from_sqlite)?;
    Ok(conn.last_insert_rowid() as UserId)
}

pub fn query_users(conn: &Connection) -> Result<Vec<User>> {
    let mut stmt = conn.prepare("SELECT id, username, created_at FROM users ORDER BY username")?;
    let rows = stmt.query_map([], |row| {
        Ok(User {
            id: Some(row.get(0)?),
            username: row.get(1)?,
            created_at: super::parse_datetime(&row.get::<_, String>(2)?, 2)?,
        })
    })?;
    let mut users = Vec::new();
    for row in rows {
        users.push(row?);
    }
    Ok(users)
}

pub fn query_user_by_name(username: &str, conn: &Connection) -> Result<Option<User>> {
    let mut stmt = conn.prepare("SELECT id, username, created_at FROM users WHERE username = ?1")?;
    let mut rows = stmt.query([username])?;
    if let Some(row) = rows.next()? {
        Ok(Some(User {
            id: Some(row.get(0)?),
            username: row.get(1)?,
            created_at: super::parse_datetime(&row.get::<_, String>(2)?, 2)?,
        }))
    } else {
        Ok(None)
    }
}

pub fn query_user_by_id(id: UserId, conn: &Connection) -> Result<Option<User>> {
    let mut stmt = conn.prepare("SELECT id, username, created_at FROM users WHERE id = ?1")?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        Ok(Some(User {
            id: Some(row.get(0)?),
            username: row.get(1)?,
            created_at: super::parse_datetime(&row.get::<_, String>(2)?, 2)?,
        }))
    } else {
        Ok(None)
    }
}

/// Fails with `IntegrityViolation` while any issue still references the user
/// as reporter or assignee.
pub fn delete_user(id: UserId, conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM users WHERE id = ?1", [id])
        .map_err(error::from_sqlite)?;
    Ok(())
}
