use super::centered_rect;
use ratatui::{
    Frame,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Global",
        &[
            ("?", "Toggle this help"),
            ("q", "Quit application"),
            ("1/2/3", "Explore / My Recipes / Add Recipe"),
            ("Tab", "Next section"),
        ],
    ),
    (
        "Recipe Grid",
        &[
            ("↑/k ↓/j", "Navigate up/down"),
            ("Enter", "Open recipe detail"),
            ("/", "Search by name (type to filter)"),
            ("←/→", "Previous/next category (Explore)"),
            ("r", "Reload the current section"),
            ("Esc", "Clear search"),
        ],
    ),
    (
        "Recipe Detail",
        &[
            ("↑/↓", "Scroll content"),
            ("f", "Save to my recipes"),
            ("e", "Edit a recipe you created"),
            ("d", "Delete from my recipes"),
            ("Esc", "Close"),
        ],
    ),
    (
        "Forms",
        &[
            ("Tab", "Next field"),
            ("Enter", "New line in ingredients/instructions"),
            ("Ctrl+S", "Submit"),
            ("Esc", "Leave the form"),
        ],
    ),
];

pub fn render(frame: &mut Frame) {
    let area = centered_rect(70, 80, frame.area());

    // Clear the area behind the popup
    frame.render_widget(Clear, area);

    let mut help_text = vec![Line::from("")];
    for (title, keys) in SECTIONS {
        help_text.push(Line::from(Span::styled(
            format!("  {}", title),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )));
        for (key, what) in keys.iter() {
            help_text.push(Line::from(vec![
                Span::styled(format!("    {:<10}", key), Style::default().fg(Color::Yellow)),
                Span::raw(*what),
            ]));
        }
        help_text.push(Line::from(""));
    }

    let help = Paragraph::new(help_text)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Help: Keybindings ")
                .title_bottom(Line::from(" Press any key to close ").style(Style::default().fg(Color::DarkGray))),
        )
        .style(Style::default().fg(Color::White));

    frame.render_widget(help, area);
}
