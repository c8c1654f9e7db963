use super::{centered_rect, key_span};
use crate::app::DetailModal;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

pub fn render(detail: &DetailModal, frame: &mut Frame) {
    let area = centered_rect(80, 80, frame.area());
    frame.render_widget(Clear, area);

    let recipe = &detail.recipe;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} ", recipe.name));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Layout: metadata(3) + body(min) + actions(1)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(inner);

    // ── Metadata ──
    let mut meta = vec![Span::styled(" Category: ", Style::default().fg(Color::DarkGray))];
    meta.push(Span::styled(&recipe.category, Style::default().fg(Color::Yellow)));
    if let Some(area_name) = &recipe.area {
        meta.push(Span::raw("   "));
        meta.push(Span::styled("Area: ", Style::default().fg(Color::DarkGray)));
        meta.push(Span::styled(area_name, Style::default().fg(Color::White)));
    }
    let meta_lines = vec![
        Line::from(meta),
        Line::from(vec![
            Span::styled(" Image: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                &recipe.image_url,
                Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
            ),
        ]),
    ];
    frame.render_widget(Paragraph::new(meta_lines), chunks[0]);

    // ── Ingredients and instructions ──
    let heading = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let mut body = vec![Line::from(Span::styled("Ingredients", heading))];
    if recipe.ingredients.is_empty() {
        body.push(Line::from(Span::styled(
            "  (none listed)",
            Style::default().fg(Color::DarkGray),
        )));
    }
    body.extend(
        recipe
            .ingredients
            .iter()
            .map(|ingredient| Line::from(format!("  • {}", ingredient))),
    );
    body.push(Line::from(""));
    body.push(Line::from(Span::styled("Instructions", heading)));
    body.extend(recipe.instructions.lines().map(|l| Line::from(l.to_string())));

    let content = Paragraph::new(body)
        .wrap(Wrap { trim: false })
        .scroll((detail.scroll, 0))
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(Color::DarkGray))
                .title_bottom(
                    Line::from(format!(" scroll: {} ", detail.scroll)).alignment(Alignment::Right),
                ),
        );
    frame.render_widget(content, chunks[1]);

    // ── Actions ──
    let mut actions = vec![key_span(" ↑↓"), Span::raw(" Scroll  ")];
    if detail.actions.favorite {
        actions.push(key_span("f"));
        actions.push(Span::raw(" Save to my recipes  "));
    }
    if detail.actions.edit {
        actions.push(key_span("e"));
        actions.push(Span::raw(" Edit  "));
    }
    if detail.actions.delete {
        actions.push(key_span("d"));
        actions.push(Span::raw(" Delete  "));
    }
    actions.push(key_span("Esc"));
    actions.push(Span::raw(" Close"));
    frame.render_widget(Paragraph::new(Line::from(actions)), chunks[2]);
}
