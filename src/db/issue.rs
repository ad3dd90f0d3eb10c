/// Issue database queries and the state-history operations.
///
/// The state history is the source of truth for an issue's current state; the
/// `last_state_change_id` pointer is a cache of `last(history)` and is only
/// written inside the transaction that inserts the change it points to, so
/// the two can never be observed out of step.
use anyhow::Result;
use chrono::{DateTime, Local};
use rusqlite::Connection;

use crate::db::history::query_history_by_issue_id;
use crate::error::{self, Error};
use crate::types::{Issue, IssueId, IssueQuery, NewIssue, State, StateChangeId};

/// Creates the issue together with its first state change and points the
/// issue at it, all in one transaction. An issue is never observable without
/// a current state, and a failed creation leaves no orphan change behind.
pub fn create_issue(
    arg: NewIssue,
    occurred_at: DateTime<Local>,
    conn: &Connection,
) -> Result<IssueId> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO issues (title, description, category_id, reporter_id, assignee_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            &arg.title,
            &arg.description,
            arg.category_id,
            arg.reporter_id,
            arg.assignee_id,
        ),
    )
    .map_err(error::from_sqlite)?;
    let issue_id = tx.last_insert_rowid() as IssueId;
    let change_id = insert_state_change(issue_id, arg.initial_state, occurred_at, &tx)?;
    tx.execute(
        "UPDATE issues SET last_state_change_id = ?1 WHERE id = ?2",
        (change_id, issue_id),
    )?;
    tx.commit()?;
    Ok(issue_id)
}

/// Appends a state change and repoints the issue at it, in one transaction.
/// Returns the new current state. Any enumerated state is accepted from any
/// prior state.
pub fn update_issue_state(
    issue_id: IssueId,
    new_state: State,
    occurred_at: DateTime<Local>,
    conn: &Connection,
) -> Result<State> {
    let exists: bool = conn
        .prepare("SELECT 1 FROM issues WHERE id = ?1")?
        .exists([issue_id])?;
    if !exists {
        return Err(Error::IssueNotFound(issue_id.to_string()).into());
    }
    let tx = conn.unchecked_transaction()?;
    let change_id = insert_state_change(issue_id, new_state, occurred_at, &tx)?;
    tx.execute(
        "UPDATE issues SET last_state_change_id = ?1 WHERE id = ?2",
        (change_id, issue_id),
    )?;
    tx.commit()?;
    Ok(new_state)
}

fn insert_state_change(
    issue_id: IssueId,
    new_state: State,
    occurred_at: DateTime<Local>,
    conn: &Connection,
) -> Result<StateChangeId> {
    conn.execute(
        "INSERT INTO state_changes (issue_id, new_state, occurred_at) VALUES (?1, ?2, ?3)",
        (issue_id, new_state.as_str(), occurred_at.to_rfc3339()),
    )
    .map_err(error::from_sqlite)?;
    Ok(conn.last_insert_rowid() as StateChangeId)
}

pub fn query_issues(query: IssueQuery, conn: &Connection) -> Result<Vec<Issue>> {
    // Ordered by (current state, occurred-at) like the issues list screen
    // displays them.
    const BASE: &str = "SELECT i.id, i.title, i.description, i.category_id, i.reporter_id,
                        i.assignee_id
                        FROM issues i
                        LEFT JOIN state_changes sc ON sc.id = i.last_state_change_id";
    const ORDER: &str = " ORDER BY sc.new_state, sc.occurred_at";

    let mut issues = match query {
        IssueQuery::All => {
            let mut stmt = conn.prepare(&format!("{BASE}{ORDER}"))?;
            let rows = stmt.query_map([], issue_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        }
        IssueQuery::ByCategoryId(category_id) => {
            let mut stmt = conn.prepare(&format!("{BASE} WHERE i.category_id = ?1{ORDER}"))?;
            let rows = stmt.query_map([category_id], issue_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        }
        IssueQuery::ByDescriptionPrefix(prefix) => {
            let mut stmt =
                conn.prepare(&format!("{BASE} WHERE i.description LIKE ?1 || '%'{ORDER}"))?;
            let rows = stmt.query_map([prefix], issue_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        }
    };
    for issue in &mut issues {
        if let Some(id) = issue.id {
            issue.history = query_history_by_issue_id(id, conn)?;
        }
    }
    Ok(issues)
}

pub fn query_issue_by_id(id: IssueId, conn: &Connection) -> Result<Option<Issue>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, description, category_id, reporter_id, assignee_id
         FROM issues WHERE id = ?1",
    )?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        let mut issue = issue_from_row(row)?;
        issue.history = query_history_by_issue_id(id, conn)?;
        Ok(Some(issue))
    } else {
        Ok(None)
    }
}

pub fn query_issue_by_title(title: &str, conn: &Connection) -> Result<Option<Issue>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, description, category_id, reporter_id, assignee_id
         FROM issues WHERE title = ?1",
    )?;
    let mut rows = stmt.query([title])?;
    if let Some(row) = rows.next()? {
        let mut issue = issue_from_row(row)?;
        if let Some(id) = issue.id {
            issue.history = query_history_by_issue_id(id, conn)?;
        }
        Ok(Some(issue))
    } else {
        Ok(None)
    }
}

/// Deletes the issue and, via the cascade, its whole history. The pointer is
/// cleared first so the issue row no longer references the history being
/// cascaded away.
pub fn delete_issue(id: IssueId, conn: &Connection) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "UPDATE issues SET last_state_change_id = NULL WHERE id = ?1",
        [id],
    )?;
    tx.execute("DELETE FROM issues WHERE id = ?1", [id])
        .map_err(error::from_sqlite)?;
    tx.commit()?;
    Ok(())
}

fn issue_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Issue> {
    Ok(Issue {
        id: Some(row.get(0)?),
        title: row.get(1)?,
        description: row.get(2)?,
        category_id: row.get(3)?,
        reporter_id: row.get(4)?,
        assignee_id: row.get(5)?,
        history: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::db;
    use crate::resolving;
    use crate::types::{Category, CategoryId, User, UserId};

    fn setup() -> (Connection, CategoryId, UserId) {
        let conn = db::open_in_memory();
        let category_id = db::create_category(
            Category {
                id: None,
                name: "Backend".to_string(),
                created_at: Local::now(),
            },
            &conn,
        )
        .unwrap();
        let user_id = db::create_user(
            User {
                id: None,
                username: "userA".to_string(),
                created_at: Local::now(),
            },
            &conn,
        )
        .unwrap();
        (conn, category_id, user_id)
    }

    fn new_issue(title: &str, state: State, category_id: CategoryId, user_id: UserId) -> NewIssue {
        NewIssue {
            title: title.to_string(),
            description: None,
            category_id,
            reporter_id: user_id,
            assignee_id: user_id,
            initial_state: state,
        }
    }

    fn at(seconds_offset: i64) -> DateTime<Local> {
        Local.with_ymd_and_hms(2023, 1, 26, 12, 0, 0).unwrap() + Duration::seconds(seconds_offset)
    }

    fn pointer_of(issue_id: IssueId, conn: &Connection) -> Option<StateChangeId> {
        conn.query_row(
            "SELECT last_state_change_id FROM issues WHERE id = ?1",
            [issue_id],
            |row| row.get(0),
        )
        .unwrap()
    }

    #[test]
    fn create_records_default_state() {
        let (conn, category_id, user_id) = setup();
        let issue_id = create_issue(
            new_issue("Issue A", State::DEFAULT, category_id, user_id),
            at(0),
            &conn,
        )
        .unwrap();

        let issue = query_issue_by_id(issue_id, &conn).unwrap().unwrap();
        assert_eq!(issue.history.len(), 1);
        assert_eq!(issue.current_state().unwrap(), State::ToDo);
        assert_eq!(pointer_of(issue_id, &conn), issue.history[0].id);
    }

    #[test]
    fn create_records_explicit_initial_state() {
        let (conn, category_id, user_id) = setup();
        let issue_id = create_issue(
            new_issue("Issue A", State::Done, category_id, user_id),
            at(0),
            &conn,
        )
        .unwrap();

        let issue = query_issue_by_id(issue_id, &conn).unwrap().unwrap();
        assert_eq!(issue.history.len(), 1);
        assert_eq!(issue.current_state().unwrap(), State::Done);
    }

    #[test]
    fn transitions_append_and_track_current_state() {
        let (conn, category_id, user_id) = setup();
        let issue_id = create_issue(
            new_issue("Issue A", State::DEFAULT, category_id, user_id),
            at(0),
            &conn,
        )
        .unwrap();

        let returned = update_issue_state(issue_id, State::InProgress, at(60), &conn).unwrap();
        assert_eq!(returned, State::InProgress);
        update_issue_state(issue_id, State::Canceled, at(120), &conn).unwrap();
        // Re-entering an earlier state is allowed.
        update_issue_state(issue_id, State::InProgress, at(180), &conn).unwrap();

        let issue = query_issue_by_id(issue_id, &conn).unwrap().unwrap();
        assert_eq!(issue.history.len(), 4);
        assert_eq!(issue.current_state().unwrap(), State::InProgress);
        assert_eq!(pointer_of(issue_id, &conn), issue.history.last().unwrap().id);
    }

    #[test]
    fn update_state_on_unknown_issue_is_not_found() {
        let (conn, _, _) = setup();
        let err = update_issue_state(99, State::Done, at(0), &conn).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::IssueNotFound(_))
        ));
    }

    #[test]
    fn reload_round_trips_history_order() {
        let (conn, category_id, user_id) = setup();
        let issue_id = create_issue(
            new_issue("Issue A", State::DEFAULT, category_id, user_id),
            at(0),
            &conn,
        )
        .unwrap();
        update_issue_state(issue_id, State::InProgress, at(600), &conn).unwrap();
        update_issue_state(issue_id, State::Done, at(2400), &conn).unwrap();

        let first = query_issue_by_id(issue_id, &conn).unwrap().unwrap();
        let second = query_issue_by_id(issue_id, &conn).unwrap().unwrap();
        assert_eq!(first.history, second.history);
        let pairs: Vec<_> = first
            .history
            .iter()
            .map(|c| (c.new_state, c.occurred_at))
            .collect();
        assert_eq!(
            pairs,
            vec![
                (State::ToDo, at(0)),
                (State::InProgress, at(600)),
                (State::Done, at(2400)),
            ]
        );
    }

    #[test]
    fn identical_timestamps_order_by_insertion() {
        let (conn, category_id, user_id) = setup();
        let issue_id = create_issue(
            new_issue("Issue A", State::DEFAULT, category_id, user_id),
            at(0),
            &conn,
        )
        .unwrap();
        update_issue_state(issue_id, State::InProgress, at(0), &conn).unwrap();
        update_issue_state(issue_id, State::Done, at(0), &conn).unwrap();

        let issue = query_issue_by_id(issue_id, &conn).unwrap().unwrap();
        let states: Vec<_> = issue.history.iter().map(|c| c.new_state).collect();
        assert_eq!(states, vec![State::ToDo, State::InProgress, State::Done]);
        assert_eq!(issue.current_state().unwrap(), State::Done);
    }

    #[test]
    fn duplicate_title_is_an_integrity_violation() {
        let (conn, category_id, user_id) = setup();
        create_issue(
            new_issue("Issue A", State::DEFAULT, category_id, user_id),
            at(0),
            &conn,
        )
        .unwrap();
        let err = create_issue(
            new_issue("Issue A", State::DEFAULT, category_id, user_id),
            at(0),
            &conn,
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::IntegrityViolation(_))
        ));
        // The failed creation must not leave an orphan state change around.
        let changes: i64 = conn
            .query_row("SELECT COUNT(*) FROM state_changes", [], |row| row.get(0))
            .unwrap();
        assert_eq!(changes, 1);
    }

    #[test]
    fn title_longer_than_eighty_chars_is_an_integrity_violation() {
        let (conn, category_id, user_id) = setup();
        let err = create_issue(
            new_issue(&"x".repeat(81), State::DEFAULT, category_id, user_id),
            at(0),
            &conn,
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::IntegrityViolation(_))
        ));
        // The rejected issue must not leave an orphan state change around.
        let changes: i64 = conn
            .query_row("SELECT COUNT(*) FROM state_changes", [], |row| row.get(0))
            .unwrap();
        assert_eq!(changes, 0);

        create_issue(
            new_issue(&"x".repeat(80), State::DEFAULT, category_id, user_id),
            at(0),
            &conn,
        )
        .unwrap();
    }

    #[test]
    fn referenced_category_and_user_cannot_be_deleted() {
        let (conn, category_id, user_id) = setup();
        create_issue(
            new_issue("Issue A", State::DEFAULT, category_id, user_id),
            at(0),
            &conn,
        )
        .unwrap();

        let err = db::delete_category(category_id, &conn).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::IntegrityViolation(_))
        ));
        let err = db::delete_user(user_id, &conn).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::IntegrityViolation(_))
        ));
    }

    #[test]
    fn deleting_an_issue_cascades_its_history() {
        let (conn, category_id, user_id) = setup();
        let issue_id = create_issue(
            new_issue("Issue A", State::DEFAULT, category_id, user_id),
            at(0),
            &conn,
        )
        .unwrap();
        update_issue_state(issue_id, State::Done, at(60), &conn).unwrap();

        delete_issue(issue_id, &conn).unwrap();
        let changes: i64 = conn
            .query_row("SELECT COUNT(*) FROM state_changes", [], |row| row.get(0))
            .unwrap();
        assert_eq!(changes, 0);
        // With the issue gone, its category and users are deletable again.
        db::delete_category(category_id, &conn).unwrap();
        db::delete_user(user_id, &conn).unwrap();
    }

    #[test]
    fn issues_list_orders_by_state_then_occurred_at() {
        let (conn, category_id, user_id) = setup();
        let done = create_issue(
            new_issue("Done issue", State::Done, category_id, user_id),
            at(0),
            &conn,
        )
        .unwrap();
        let todo = create_issue(
            new_issue("Open issue", State::DEFAULT, category_id, user_id),
            at(60),
            &conn,
        )
        .unwrap();

        let issues = query_issues(IssueQuery::All, &conn).unwrap();
        let ids: Vec<_> = issues.iter().filter_map(|i| i.id).collect();
        // "DONE" sorts before "TO_DO" in the stored representation.
        assert_eq!(ids, vec![done, todo]);
    }

    #[test]
    fn resolving_times_from_persisted_histories() {
        let (conn, category_id, user_id) = setup();

        // Cycles through DONE before settling there: counts from first DONE.
        let cycled = create_issue(
            new_issue("Cycled", State::DEFAULT, category_id, user_id),
            at(0),
            &conn,
        )
        .unwrap();
        update_issue_state(cycled, State::InProgress, at(600), &conn).unwrap();
        update_issue_state(cycled, State::Done, at(2400), &conn).unwrap();
        update_issue_state(cycled, State::InProgress, at(3000), &conn).unwrap();
        update_issue_state(cycled, State::Done, at(21600), &conn).unwrap();

        // Reached DONE once but moved away: excluded.
        let reopened = create_issue(
            new_issue("Reopened", State::Done, category_id, user_id),
            at(0),
            &conn,
        )
        .unwrap();
        update_issue_state(reopened, State::InProgress, at(60), &conn).unwrap();

        // Never DONE: excluded.
        create_issue(
            new_issue("Open", State::DEFAULT, category_id, user_id),
            at(0),
            &conn,
        )
        .unwrap();

        let records = db::query_state_records(&conn).unwrap();
        let times = resolving::compute(&records);
        assert_eq!(times.times, vec![Duration::seconds(2400)]);
    }
}
