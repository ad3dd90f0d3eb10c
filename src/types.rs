use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local};

use crate::error::Error;

pub type IssueId = u32;
pub type CategoryId = u32;
pub type UserId = u32;
pub type StateChangeId = u32;

/// The closed set of states an issue can be in. Any state may follow any
/// other; the model records that a change happened, not whether it was a
/// sensible workflow move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    ToDo,
    InProgress,
    Done,
    Canceled,
}

pub const ALL_STATES: [State; 4] = [State::ToDo, State::InProgress, State::Done, State::Canceled];

impl State {
    pub const DEFAULT: State = State::ToDo;

    /// Stable value stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            State::ToDo => "TO_DO",
            State::InProgress => "IN_PROGRESS",
            State::Done => "DONE",
            State::Canceled => "CANCELED",
        }
    }

    /// Human-readable label shown in listings and forms.
    pub fn label(&self) -> &'static str {
        match self {
            State::ToDo => "TO DO",
            State::InProgress => "IN PROGRESS",
            State::Done => "DONE",
            State::Canceled => "CANCELED",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for State {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TO_DO" => Ok(State::ToDo),
            "IN_PROGRESS" => Ok(State::InProgress),
            "DONE" => Ok(State::Done),
            "CANCELED" => Ok(State::Canceled),
            _ => Err(Error::InvalidState(s.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Category {
    pub id: Option<CategoryId>,
    pub name: String,
    pub created_at: DateTime<Local>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct User {
    pub id: Option<UserId>,
    pub username: String,
    pub created_at: DateTime<Local>,
}

/// One immutable entry in an issue's state history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct StateChange {
    pub id: Option<StateChangeId>,
    pub issue_id: IssueId,
    pub new_state: State,
    pub occurred_at: DateTime<Local>,
}

/// An issue together with its full ordered state history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Issue {
    pub id: Option<IssueId>,
    pub title: String,
    pub description: Option<String>,
    pub category_id: CategoryId,
    pub reporter_id: UserId,
    pub assignee_id: UserId,
    pub history: Vec<StateChange>,
}

impl Issue {
    /// State of the most recent history entry. An issue persisted through
    /// `db::create_issue` always has one; a bare instance does not.
    pub fn current_state(&self) -> Result<State, Error> {
        self.history
            .last()
            .map(|change| change.new_state)
            .ok_or(Error::MissingHistory(self.id))
    }
}

/// Fields needed to create a new issue; the first state change is written
/// alongside it.
#[derive(Clone, Debug)]
pub(crate) struct NewIssue {
    pub title: String,
    pub description: Option<String>,
    pub category_id: CategoryId,
    pub reporter_id: UserId,
    pub assignee_id: UserId,
    pub initial_state: State,
}

pub(crate) enum IssueQuery {
    All,
    ByCategoryId(CategoryId),
    ByDescriptionPrefix(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_round_trips_through_stored_value() {
        for state in ALL_STATES {
            assert_eq!(state.as_str().parse::<State>().unwrap(), state);
        }
    }

    #[test]
    fn unknown_state_value_is_invalid() {
        let err = "REOPENED".parse::<State>().unwrap_err();
        assert!(matches!(err, Error::InvalidState(value) if value == "REOPENED"));
    }

    #[test]
    fn state_labels_are_human_readable() {
        assert_eq!(State::ToDo.label(), "TO DO");
        assert_eq!(State::InProgress.label(), "IN PROGRESS");
        assert_eq!(State::Done.label(), "DONE");
        assert_eq!(State::Canceled.label(), "CANCELED");
    }

    #[test]
    fn current_state_without_history_is_missing_history() {
        let issue = Issue {
            id: Some(7),
            title: "Bare issue".to_string(),
            description: None,
            category_id: 1,
            reporter_id: 1,
            assignee_id: 1,
            history: Vec::new(),
        };
        assert!(matches!(
            issue.current_state(),
            Err(Error::MissingHistory(Some(7)))
        ));
    }

    #[test]
    fn missing_history_on_unsaved_issue_carries_no_id() {
        let issue = Issue {
            id: None,
            title: "Bare issue".to_string(),
            description: None,
            category_id: 1,
            reporter_id: 1,
            assignee_id: 1,
            history: Vec::new(),
        };
        let err = issue.current_state().unwrap_err();
        assert!(matches!(err, Error::MissingHistory(None)));
        assert_eq!(err.to_string(), "unsaved issue has no recorded state change");
    }
}
