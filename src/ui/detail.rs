use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span, Text},
};

use super::theme::Theme;
use crate::app::App;

pub fn build_issue_detail_text(app: &App) -> Text<'_> {
    if let Some(status) = &app.status {
        return Text::from(status.as_str());
    }
    let Some(issue) = &app.selected_issue else {
        return Text::from("No issue selected.");
    };

    const LABEL_WIDTH: usize = 13;
    let label_style = Style::default().fg(Theme::dim());
    let label = |name: &str| {
        let label_text = format!("{name}:");
        Span::styled(
            format!("{label_text:width$}", width = LABEL_WIDTH),
            label_style,
        )
    };
    let value = |text: &str| Span::raw(text.to_string());

    let state_line = match issue.current_state() {
        Ok(state) => Line::from(vec![
            label("State"),
            Span::styled(
                state.label(),
                Style::default()
                    .fg(Theme::state(state))
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Err(err) => Line::from(vec![label("State"), value(&err.to_string())]),
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                "Issue",
                Style::default()
                    .fg(Theme::primary())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                issue.title.as_str(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from("----------------------------------------"),
        state_line,
        Line::from(vec![
            label("Category"),
            value(app.category_name(issue.category_id)),
        ]),
        Line::from(vec![
            label("Reporter"),
            value(app.username(issue.reporter_id)),
        ]),
        Line::from(vec![
            label("Assignee"),
            value(app.username(issue.assignee_id)),
        ]),
        Line::from(vec![
            label("Description"),
            value(issue.description.as_deref().unwrap_or("-")),
        ]),
        Line::from(""),
        Line::from(vec![Span::styled(
            format!("History ({})", issue.history.len()),
            Style::default()
                .fg(Theme::accent())
                .add_modifier(Modifier::BOLD),
        )]),
    ];

    if issue.history.is_empty() {
        lines.push(Line::from(vec![Span::styled("  none", label_style)]));
    } else {
        for (index, change) in issue.history.iter().enumerate() {
            let entry = Line::from(vec![
                Span::raw(format!(
                    "  {:>2}) {} -> ",
                    index + 1,
                    change.occurred_at.format("%Y-%m-%d %H:%M")
                )),
                Span::styled(
                    change.new_state.label(),
                    Style::default().fg(Theme::state(change.new_state)),
                ),
            ]);
            if issue.history.len() > 8 {
                if index < 3 || index >= issue.history.len() - 3 {
                    lines.push(entry);
                } else if index == 3 {
                    lines.push(Line::from(vec![Span::raw("     ...")]));
                }
            } else {
                lines.push(entry);
            }
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from("s: Set state   d: Delete   esc: Back"));
    Text::from(lines)
}
