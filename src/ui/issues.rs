use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span, Text},
};

use super::helpers::clamp_name;
use super::theme::Theme;
use crate::app::App;

pub fn build_issues_text(app: &App) -> Text<'_> {
    if let Some(status) = &app.status {
        return Text::from(status.as_str());
    }
    if app.issues.is_empty() {
        return Text::from("No issues found. Press 'n' to create one.");
    }

    let mut lines = Vec::new();
    if let Some(category_id) = app.category_filter {
        lines.push(Line::from(vec![
            Span::styled("  Filter: ", Style::default().fg(Theme::dim())),
            Span::styled(
                app.category_name(category_id).to_string(),
                Style::default()
                    .fg(Theme::highlight())
                    .add_modifier(Modifier::BOLD),
            ),
        ]));
        lines.push(Line::from(""));
    }

    for (index, issue) in app.issues.iter().enumerate() {
        let selected = index == app.selected_issue_index;
        let marker_style = if selected {
            Style::default()
                .fg(Theme::highlight())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Theme::dim())
        };
        let state_span = match issue.current_state() {
            Ok(state) => Span::styled(
                format!("{:<12}", state.label()),
                Style::default()
                    .fg(Theme::state(state))
                    .add_modifier(Modifier::BOLD),
            ),
            Err(_) => Span::styled(
                format!("{:<12}", "?"),
                Style::default().fg(Theme::dim()),
            ),
        };
        let title_style = if selected {
            Style::default()
                .fg(Theme::text())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Theme::text())
        };
        lines.push(Line::from(vec![
            Span::styled(if selected { "> " } else { "  " }, marker_style),
            state_span,
            Span::styled(clamp_name(&issue.title, 32), title_style),
            Span::raw("  "),
            Span::styled(
                clamp_name(app.category_name(issue.category_id), 16),
                Style::default().fg(Theme::dim()),
            ),
            Span::styled(
                app.username(issue.assignee_id).to_string(),
                Style::default().fg(Theme::dim()),
            ),
        ]));
    }

    Text::from(lines)
}
