//! Stateless rendering of the puzzle screen.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
};
use word_trinity::{BoardView, CellView, Statistics, StatsSubject};

/// What the screen shows besides the board.
#[derive(Debug, Default)]
pub struct Overlay {
    /// A guess is being verified.
    pub submitting: bool,
    /// Last message for the player.
    pub notice: Option<String>,
    /// Statistics fetched after the game ended.
    pub stats: Vec<(StatsSubject, Statistics)>,
}

/// Draws the whole screen.
pub fn draw(frame: &mut Frame, board: Option<&BoardView>, overlay: &Overlay) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Length(7), // Words
            Constraint::Length(3), // Letter pool
            Constraint::Min(3),    // Messages and statistics
            Constraint::Length(1), // Help
        ])
        .split(frame.area());

    let title = board.map_or_else(|| "Loading...".to_string(), BoardView::status_line);
    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .title(" Word Trinity ")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        );
    frame.render_widget(header, chunks[0]);

    if let Some(board) = board {
        draw_words(frame, chunks[1], board);
        draw_pool(frame, chunks[2], board);
    }
    draw_messages(frame, chunks[3], overlay);

    let help = Paragraph::new(
        "letters: place | Backspace: clear | Space: next word | Enter: submit word | Tab: submit all | F5: reload | Esc: quit",
    )
    .alignment(Alignment::Center)
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[4]);
}

fn tier_style(cell: &CellView) -> Style {
    let base = match (cell.letter, cell.tier.value()) {
        (None, _) | (_, 0) => Style::default(),
        (_, 1) => Style::default().fg(Color::DarkGray),
        (_, 2) => Style::default().fg(Color::Blue),
        (_, 3) => Style::default().fg(Color::Yellow),
        _ => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    };
    if cell.focused {
        base.add_modifier(Modifier::REVERSED)
    } else {
        base
    }
}

fn draw_words(frame: &mut Frame, area: Rect, board: &BoardView) {
    let lines: Vec<Line> = board
        .words
        .iter()
        .map(|word| {
            let marker = if word.active { "> " } else { "  " };
            let mut spans = vec![Span::raw(format!("{}{} ", marker, word.index + 1))];
            spans.extend(word.cells.iter().map(|cell| {
                let text = format!(" {} ", cell.letter.unwrap_or('_'));
                Span::styled(text, tier_style(cell))
            }));
            Line::from(spans)
        })
        .collect();

    let words = Paragraph::new(lines).block(
        Block::default()
            .title(" Words ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded),
    );
    frame.render_widget(words, area);
}

fn draw_pool(frame: &mut Frame, area: Rect, board: &BoardView) {
    let spans: Vec<Span> = board
        .pool
        .iter()
        .map(|tile| {
            let style = match (tile.usable, tile.placed) {
                (false, _) => Style::default().fg(Color::Green),
                (true, true) => Style::default().fg(Color::DarkGray),
                (true, false) => Style::default().add_modifier(Modifier::BOLD),
            };
            Span::styled(format!(" {} ", tile.letter), style)
        })
        .collect();

    let pool = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(Block::default().title(" Letters ").borders(Borders::ALL));
    frame.render_widget(pool, area);
}

fn draw_messages(frame: &mut Frame, area: Rect, overlay: &Overlay) {
    let mut lines = Vec::new();
    if overlay.submitting {
        lines.push(Line::styled("Checking guess...", Style::default().fg(Color::Yellow)));
    }
    if let Some(notice) = &overlay.notice {
        lines.push(Line::from(notice.as_str()));
    }
    for (subject, stats) in &overlay.stats {
        lines.push(Line::styled(
            format!(
                "{}: win rate {}% | average guesses {}",
                subject,
                stats.win_rate(),
                stats.average_guesses()
            ),
            Style::default().fg(Color::Cyan),
        ));
        if *subject == StatsSubject::User {
            for (turn, percent) in stats.percentages().iter().enumerate() {
                let width = (percent / 5.0).round() as usize;
                lines.push(Line::from(format!("{:>2} {}", turn + 1, "█".repeat(width))));
            }
        }
    }

    let messages = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().title(" Messages ").borders(Borders::ALL));
    frame.render_widget(messages, area);
}

