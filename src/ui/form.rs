use super::grid::render_header;
use super::{centered_rect, key_span};
use crate::app::{App, EditModal, InputMode};
use crate::form::{FormField, RecipeForm};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

/// The "add recipe" section.
pub fn render_page(app: &App, frame: &mut Frame) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(app, frame, chunks[0]);

    // The page form is live unless the edit modal owns the keyboard
    let active = app.input_mode == InputMode::Form && !app.editing();
    render_fields(&app.add_form, active, " New recipe ", frame, chunks[1]);

    let status = if active {
        Line::from(vec![
            key_span(" Tab"),
            Span::raw(" Next field  "),
            key_span("Ctrl+S"),
            Span::raw(" Save  "),
            key_span("Esc"),
            Span::raw(" Stop editing  "),
            Span::styled(&app.status_msg, Style::default().fg(Color::DarkGray)),
        ])
    } else {
        Line::from(vec![
            key_span(" Enter"),
            Span::raw(" Start editing  "),
            key_span("1/2/3"),
            Span::raw(" Switch view  "),
            key_span("?"),
            Span::raw(" Help  "),
            key_span("q"),
            Span::raw(" Quit  "),
            Span::styled(&app.status_msg, Style::default().fg(Color::DarkGray)),
        ])
    };
    frame.render_widget(Paragraph::new(status), chunks[2]);
}

/// Edit popup for a recipe the user created.
pub fn render_modal(edit: &EditModal, frame: &mut Frame) {
    let area = centered_rect(80, 85, frame.area());
    frame.render_widget(Clear, area);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(10), Constraint::Length(1)])
        .split(area);

    render_fields(&edit.form, true, " Edit recipe ", frame, chunks[0]);
    let status = Line::from(vec![
        key_span(" Tab"),
        Span::raw(" Next field  "),
        key_span("Ctrl+S"),
        Span::raw(" Save changes  "),
        key_span("Esc"),
        Span::raw(" Cancel"),
    ]);
    frame.render_widget(Paragraph::new(status), chunks[1]);
}

fn render_fields(form: &RecipeForm, active: bool, title: &str, frame: &mut Frame, area: Rect) {
    let outer = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(title);
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(4),
            Constraint::Min(4),
        ])
        .split(inner);

    for (field, row) in FormField::ALL.iter().zip(rows.iter()) {
        let focused = active && form.focus == *field;
        let style = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let value = form.value(*field);
        let widget = Paragraph::new(value)
            .style(Style::default().fg(Color::White))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(style)
                    .title(Span::styled(format!(" {} ", field.label()), style)),
            );
        frame.render_widget(widget, *row);

        if focused {
            let last = value.rsplit('\n').next().unwrap_or("");
            let line = value.matches('\n').count() as u16;
            let x = row.x + 1 + unicode_width::UnicodeWidthStr::width(last) as u16;
            let y = row.y + 1 + line;
            if x < row.right() && y < row.bottom() {
                frame.set_cursor_position((x, y));
            }
        }
    }
}
