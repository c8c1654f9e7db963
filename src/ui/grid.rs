use super::{key_span, truncate_str};
use crate::app::{App, Grid, InputMode, View};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs},
};

pub fn render(app: &App, frame: &mut Frame) {
    let area = frame.area();
    let bar_height = if app.show_category_bar() { 3 } else { 0 };

    // Layout: header(3) + categories(3, explore only) + search(3) + cards(min) + status(1)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(bar_height),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(app, frame, chunks[0]);
    if app.show_category_bar() {
        render_categories(app, frame, chunks[1]);
    }
    render_search(app, frame, chunks[2]);
    render_cards(app, frame, chunks[3]);

    // ── Status bar ──
    let mut spans = vec![
        key_span(" ↑↓"),
        Span::raw(" Navigate  "),
        key_span("/"),
        Span::raw(" Search  "),
        key_span("Enter"),
        Span::raw(" Open  "),
    ];
    if app.show_category_bar() {
        spans.push(key_span("←→"));
        spans.push(Span::raw(" Category  "));
    }
    spans.extend([
        key_span("r"),
        Span::raw(" Refresh  "),
        key_span("?"),
        Span::raw(" Help  "),
        key_span("q"),
        Span::raw(" Quit  "),
        Span::styled(&app.status_msg, Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(Line::from(spans)), chunks[4]);
}

/// Title plus the three section tabs.
pub fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let titles: Vec<Line> = View::ALL
        .iter()
        .enumerate()
        .map(|(i, v)| Line::from(format!("{} {}", i + 1, v.label())))
        .collect();
    let selected = View::ALL.iter().position(|v| *v == app.view).unwrap_or(0);
    let title = if app.in_flight() > 0 {
        " Click&Cook ⟳ "
    } else {
        " Click&Cook "
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(Span::styled(
                    title,
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )),
        );
    frame.render_widget(tabs, area);
}

fn render_categories(app: &App, frame: &mut Frame, area: Rect) {
    let buttons = app.category_buttons();
    let titles: Vec<Line> = buttons.iter().map(|b| Line::from(b.label)).collect();
    let selected = buttons.iter().position(|b| b.active).unwrap_or(0);
    let blurb = app
        .categories
        .iter()
        .find(|c| c.name == app.active_category)
        .and_then(|c| c.description.as_deref())
        .and_then(|d| d.lines().next())
        .map(|d| format!(" {} ", truncate_str(d, (area.width as usize).saturating_sub(4))))
        .unwrap_or_default();

    let bar = Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Categories ")
                .title_bottom(Line::from(blurb).style(Style::default().fg(Color::DarkGray))),
        );
    frame.render_widget(bar, area);
}

fn render_search(app: &App, frame: &mut Frame, area: Rect) {
    let searching = app.input_mode == InputMode::Search;
    let style = if searching {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let label = if searching {
        " 🔍 Search (Enter to keep, Esc to clear): "
    } else {
        " 🔍 Search (/): "
    };
    let bar = Paragraph::new(format!("{}{}", label, app.query))
        .style(style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(style)
                .title(" Search "),
        );
    frame.render_widget(bar, area);

    // Set cursor position when editing
    if searching {
        let cursor_x = area.x
            + unicode_width::UnicodeWidthStr::width(label) as u16
            + unicode_width::UnicodeWidthStr::width(app.query.as_str()) as u16;
        frame.set_cursor_position((cursor_x, area.y + 1));
    }
}

fn render_cards(app: &App, frame: &mut Frame, area: Rect) {
    let title = format!(" {} ", app.view.label());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(title);

    let cards = match app.grid() {
        Grid::Placeholder(message) => {
            let placeholder = Paragraph::new(message)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(placeholder, area);
            return;
        }
        Grid::Cards(cards) => cards,
    };

    let name_width = (area.width as usize).saturating_sub(30);
    let count = cards.len();
    let items: Vec<ListItem> = cards
        .into_iter()
        .map(|card| {
            let marker = if card.id.is_local() { "★" } else { "•" };
            let line = Line::from(vec![
                Span::styled(
                    format!("{} ", marker),
                    Style::default().fg(if card.id.is_local() {
                        Color::Green
                    } else {
                        Color::DarkGray
                    }),
                ),
                Span::raw(format!(
                    "{:<width$}",
                    truncate_str(card.title, name_width),
                    width = name_width
                )),
                Span::styled(
                    format!("  {}", truncate_str(card.category, 20)),
                    Style::default().fg(Color::Yellow),
                ),
            ]);
            ListItem::new(line)
        })
        .collect();

    let list = List::new(items)
        .block(block.title_bottom(
            Line::from(format!(" {} recipes ", count)).alignment(Alignment::Right),
        ))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▸ ");

    let mut state = ListState::default();
    state.select(Some(app.selected));
    frame.render_stateful_widget(list, area, &mut state);
}
