use chrono::Local;
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span, Text},
};

use super::helpers::format_duration;
use super::theme::Theme;
use crate::app::App;
use crate::types::ALL_STATES;

pub fn build_dashboard_text(app: &App) -> Text<'_> {
    let mut lines = Vec::new();

    let now = Local::now();
    lines.push(Line::from(Span::styled(
        format!("  Welcome to Trackr - {}", now.format("%A, %B %e, %Y")),
        Style::default()
            .fg(Theme::accent())
            .add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled(
        "  Issues by State",
        Style::default()
            .fg(Theme::secondary())
            .add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(Span::styled(
        "  ────────────────",
        Style::default().fg(Theme::dim()),
    )));
    for state in ALL_STATES {
        let count = app
            .state_counts
            .iter()
            .find(|(s, _)| *s == state)
            .map(|(_, count)| *count)
            .unwrap_or(0);
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(
                format!("{:<12}", state.label()),
                Style::default()
                    .fg(Theme::state(state))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("{count}"),
                Style::default().fg(Theme::accent()),
            ),
        ]));
    }
    lines.push(Line::from(""));

    // Resolving times: creation to first DONE, for currently DONE issues.
    lines.push(Line::from(Span::styled(
        "  Resolving Times",
        Style::default()
            .fg(Theme::secondary())
            .add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(Span::styled(
        "  ────────────────",
        Style::default().fg(Theme::dim()),
    )));
    let times = &app.resolving_times;
    match (times.shortest(), times.longest(), times.average()) {
        (Some(shortest), Some(longest), Some(average)) => {
            lines.push(Line::from(vec![
                Span::styled("  Resolved:  ", Style::default().fg(Theme::dim())),
                Span::styled(
                    format!("{}", times.times.len()),
                    Style::default().fg(Theme::accent()),
                ),
            ]));
            lines.push(Line::from(vec![
                Span::styled("  Shortest:  ", Style::default().fg(Theme::dim())),
                Span::styled(format_duration(shortest), Style::default().fg(Theme::text())),
            ]));
            lines.push(Line::from(vec![
                Span::styled("  Longest:   ", Style::default().fg(Theme::dim())),
                Span::styled(format_duration(longest), Style::default().fg(Theme::text())),
            ]));
            lines.push(Line::from(vec![
                Span::styled("  Average:   ", Style::default().fg(Theme::dim())),
                Span::styled(format_duration(average), Style::default().fg(Theme::text())),
            ]));
        }
        _ => {
            lines.push(Line::from(Span::styled(
                "  No resolved issues yet",
                Style::default().fg(Theme::dim()),
            )));
        }
    }

    Text::from(lines)
}
