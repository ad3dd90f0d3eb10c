/// Resolving-time aggregation over issue state histories.
///
/// Works on plain (issue id, state, timestamp) records so it can be exercised
/// without a database; `db::history::query_state_records` produces the input
/// in `(occurred_at, id)` order.
use chrono::{DateTime, Duration, Local};

use crate::types::{IssueId, State};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct StateRecord {
    pub issue_id: IssueId,
    pub state: State,
    pub occurred_at: DateTime<Local>,
}

/// Per-issue resolving times and summaries over them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ResolvingTimes {
    pub times: Vec<Duration>,
}

impl ResolvingTimes {
    pub fn shortest(&self) -> Option<Duration> {
        self.times.iter().min().copied()
    }

    pub fn longest(&self) -> Option<Duration> {
        self.times.iter().max().copied()
    }

    /// Arithmetic mean, rounded to the nearest whole second. Half-second
    /// ties round away from zero, so an average of 2.5 s reports as 3 s.
    pub fn average(&self) -> Option<Duration> {
        if self.times.is_empty() {
            return None;
        }
        let total_ms: i64 = self.times.iter().map(|t| t.num_milliseconds()).sum();
        let avg_ms = total_ms as f64 / self.times.len() as f64;
        Some(Duration::seconds((avg_ms / 1000.0).round() as i64))
    }
}

/// For every issue whose current (latest) state is DONE, compute the time
/// from its earliest recorded state change to the earliest one with state
/// DONE. Issues that passed through DONE but currently sit elsewhere are
/// excluded; issues that cycled through DONE and came back count from their
/// first DONE, not the current one.
///
/// `records` must be ordered by `(occurred_at, id)`; records of different
/// issues may interleave.
pub(crate) fn compute(records: &[StateRecord]) -> ResolvingTimes {
    let mut times = Vec::new();
    let mut issue_ids: Vec<IssueId> = records.iter().map(|r| r.issue_id).collect();
    issue_ids.sort_unstable();
    issue_ids.dedup();

    for issue_id in issue_ids {
        let history: Vec<&StateRecord> =
            records.iter().filter(|r| r.issue_id == issue_id).collect();
        let Some(current) = history.last() else {
            continue;
        };
        if current.state != State::Done {
            continue;
        }
        // Non-empty by construction, so these always exist.
        let created = history.first().map(|r| r.occurred_at);
        let first_done = history
            .iter()
            .find(|r| r.state == State::Done)
            .map(|r| r.occurred_at);
        if let (Some(created), Some(first_done)) = (created, first_done) {
            times.push(round_to_seconds(first_done.signed_duration_since(created)));
        }
    }
    ResolvingTimes { times }
}

fn round_to_seconds(duration: Duration) -> Duration {
    Duration::seconds((duration.num_milliseconds() as f64 / 1000.0).round() as i64)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(seconds_offset: i64) -> DateTime<Local> {
        Local.with_ymd_and_hms(2023, 1, 26, 12, 0, 0).unwrap() + Duration::seconds(seconds_offset)
    }

    fn record(issue_id: IssueId, state: State, seconds_offset: i64) -> StateRecord {
        StateRecord {
            issue_id,
            state,
            occurred_at: at(seconds_offset),
        }
    }

    #[test]
    fn shortest_of_empty_is_none() {
        assert_eq!(ResolvingTimes::default().shortest(), None);
    }

    #[test]
    fn shortest_picks_minimum() {
        let times = ResolvingTimes {
            times: vec![
                Duration::seconds(10),
                Duration::seconds(20),
                Duration::hours(15),
            ],
        };
        assert_eq!(times.shortest(), Some(Duration::seconds(10)));
    }

    #[test]
    fn longest_of_empty_is_none() {
        assert_eq!(ResolvingTimes::default().longest(), None);
    }

    #[test]
    fn longest_picks_maximum() {
        let times = ResolvingTimes {
            times: vec![
                Duration::hours(5),
                Duration::seconds(60),
                Duration::seconds(15),
            ],
        };
        assert_eq!(times.longest(), Some(Duration::hours(5)));
    }

    #[test]
    fn average_of_empty_is_none() {
        assert_eq!(ResolvingTimes::default().average(), None);
    }

    #[test]
    fn average_rounds_to_whole_seconds() {
        let times = ResolvingTimes {
            times: vec![Duration::seconds(10), Duration::seconds(20)],
        };
        assert_eq!(times.average(), Some(Duration::seconds(15)));

        let times = ResolvingTimes {
            times: vec![Duration::hours(1), Duration::hours(2), Duration::hours(3)],
        };
        assert_eq!(times.average(), Some(Duration::hours(2)));
    }

    #[test]
    fn average_rounds_half_seconds_away_from_zero() {
        let times = ResolvingTimes {
            times: vec![Duration::seconds(2), Duration::seconds(3)],
        };
        assert_eq!(times.average(), Some(Duration::seconds(3)));
    }

    #[test]
    fn compute_on_empty_input_is_empty() {
        let times = compute(&[]);
        assert!(times.times.is_empty());
        assert_eq!(times.shortest(), None);
        assert_eq!(times.longest(), None);
        assert_eq!(times.average(), None);
    }

    #[test]
    fn compute_skips_issues_not_currently_done() {
        let records = vec![
            record(1, State::ToDo, 0),
            record(2, State::ToDo, 0),
            record(2, State::InProgress, 60),
            // Reached DONE but moved away again.
            record(3, State::ToDo, 0),
            record(3, State::Done, 120),
            record(3, State::InProgress, 180),
        ];
        assert!(compute(&records).times.is_empty());
    }

    #[test]
    fn compute_counts_issue_created_directly_done_as_zero() {
        let records = vec![record(1, State::Done, 0)];
        let times = compute(&records);
        assert_eq!(times.times, vec![Duration::zero()]);
        assert_eq!(times.shortest(), Some(Duration::zero()));
        assert_eq!(times.longest(), Some(Duration::zero()));
        assert_eq!(times.average(), Some(Duration::zero()));
    }

    #[test]
    fn compute_uses_first_done_when_issue_cycled_through_done() {
        // TO_DO at T0, IN_PROGRESS at +10min, DONE at +40min, back to
        // IN_PROGRESS at +50min, DONE again at +6h. Currently DONE, so it
        // qualifies, and the duration is measured to the first DONE.
        let records = vec![
            record(1, State::ToDo, 0),
            record(1, State::InProgress, 600),
            record(1, State::Done, 2400),
            record(1, State::InProgress, 3000),
            record(1, State::Done, 21600),
        ];
        let times = compute(&records);
        assert_eq!(times.times, vec![Duration::seconds(2400)]);
    }

    #[test]
    fn compute_summarizes_multiple_issues() {
        // Issue 1 resolves in 30 minutes, issue 2 in 6 hours; their records
        // interleave in time order.
        let records = vec![
            record(1, State::ToDo, 0),
            record(2, State::ToDo, 30),
            record(1, State::InProgress, 900),
            record(1, State::Done, 1800),
            record(2, State::Done, 30 + 21600),
        ];
        let times = compute(&records);
        assert_eq!(times.times.len(), 2);
        assert_eq!(times.shortest(), Some(Duration::seconds(1800)));
        assert_eq!(times.longest(), Some(Duration::seconds(21600)));
        assert_eq!(times.average(), Some(Duration::seconds(11700)));
    }
}
