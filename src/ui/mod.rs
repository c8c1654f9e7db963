mod alert;
mod detail;
mod form;
mod grid;
mod help;

use crate::app::{App, Modal, View};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Span,
};

/// Top-level render dispatch.
pub fn render(app: &App, frame: &mut Frame) {
    match app.view {
        View::Explore | View::MyRecipes => grid::render(app, frame),
        View::AddRecipe => form::render_page(app, frame),
    }

    match &app.modal {
        Some(Modal::Detail(detail)) => detail::render(detail, frame),
        Some(Modal::Edit(edit)) => form::render_modal(edit, frame),
        None => {}
    }

    if app.pending_delete.is_some() {
        alert::render_confirm(frame);
    }
    if let Some(message) = &app.alert {
        alert::render_alert(message, frame);
    }

    // Render help overlay on top if active
    if app.show_help {
        help::render(frame);
    }
}

/// Cyan bold key hint used in status bars.
fn key_span(key: &str) -> Span<'_> {
    Span::styled(
        key,
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
}

/// Create a centered rectangle using percentage of parent area.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}

/// Truncate a string to `max_width` characters, adding "…" if truncated.
pub fn truncate_str(s: &str, max_width: usize) -> String {
    if s.chars().count() <= max_width {
        s.to_string()
    } else {
        let mut result: String = s.chars().take(max_width.saturating_sub(1)).collect();
        result.push('…');
        result
    }
}
