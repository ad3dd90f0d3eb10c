/// State-history database queries.
///
/// Ordering is always `(occurred_at, id)`: the autoincrement id breaks ties
/// between changes sharing a timestamp, so the history order is the insertion
/// order.
use anyhow::Result;
use rusqlite::Connection;

use crate::resolving::StateRecord;
use crate::types::{IssueId, State, StateChange};

pub fn query_history_by_issue_id(issue_id: IssueId, conn: &Connection) -> Result<Vec<StateChange>> {
    let mut stmt = conn.prepare(
        "SELECT id, issue_id, new_state, occurred_at FROM state_changes
         WHERE issue_id = ?1 ORDER BY occurred_at, id",
    )?;
    let rows = stmt.query_map([issue_id], |row| {
        Ok(StateChange {
            id: Some(row.get(0)?),
            issue_id: row.get(1)?,
            new_state: super::parse_state(&row.get::<_, String>(2)?, 2)?,
            occurred_at: super::parse_datetime(&row.get::<_, String>(3)?, 3)?,
        })
    })?;
    let mut history = Vec::new();
    for row in rows {
        history.push(row?);
    }
    Ok(history)
}

/// All state changes of all issues as plain records, in `(occurred_at, id)`
/// order — the input shape `resolving::compute` works on.
pub fn query_state_records(conn: &Connection) -> Result<Vec<StateRecord>> {
    let mut stmt = conn.prepare(
        "SELECT issue_id, new_state, occurred_at FROM state_changes ORDER BY occurred_at, id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(StateRecord {
            issue_id: row.get(0)?,
            state: super::parse_state(&row.get::<_, String>(1)?, 1)?,
            occurred_at: super::parse_datetime(&row.get::<_, String>(2)?, 2)?,
        })
    })?;
    let mut records = Vec::new();
    for row in rows {
        records.push(row?);
    }
    Ok(records)
}

/// Number of issues currently in each state, via the current-state pointer.
pub fn query_state_counts(conn: &Connection) -> Result<Vec<(State, usize)>> {
    let mut stmt = conn.prepare(
        "SELECT sc.new_state, COUNT(*)
         FROM issues i
         JOIN state_changes sc ON sc.id = i.last_state_change_id
         GROUP BY sc.new_state",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            super::parse_state(&row.get::<_, String>(0)?, 0)?,
            row.get::<_, i64>(1)? as usize,
        ))
    })?;
    let mut counts = Vec::new();
    for row in rows {
        counts.push(row?);
    }
    Ok(counts)
}
