pub mod history;
pub mod screen;

use std::collections::HashMap;
use std::time::Instant;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};

use motle::{
    celebration::Celebration,
    evaluate::LetterStatus,
    grid::{Cell, CellStatus},
    history::points_for,
    session::GameResult,
    util::format_hms,
};

use crate::{App, AppState};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;

const KEYBOARD_ROWS: [&str; 3] = ["QWERTYUIOP", "ASDFGHJKL", "ZXCVBNM"];

fn status_style(status: CellStatus) -> Style {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    match status {
        CellStatus::Correct => bold.fg(Color::Black).bg(Color::Green),
        CellStatus::Present => bold.fg(Color::Black).bg(Color::Yellow),
        CellStatus::Absent => bold.fg(Color::White).bg(Color::DarkGray),
        CellStatus::Pending => bold,
        CellStatus::Empty => Style::default().add_modifier(Modifier::DIM),
    }
}

fn board_height(rows: usize) -> u16 {
    u16::try_from(rows).unwrap_or(u16::MAX)
}

fn key_style(hint: Option<&LetterStatus>) -> Style {
    match hint {
        Some(status) => status_style(CellStatus::from(*status)),
        None => Style::default(),
    }
}

fn cell_span(cell: &Cell, under_cursor: bool) -> Span<'static> {
    let text = match cell.letter {
        Some(c) => format!(" {c} "),
        None => " · ".to_string(),
    };
    let mut style = status_style(cell.status);
    if under_cursor {
        style = style.add_modifier(Modifier::UNDERLINED);
    }
    Span::styled(text, style)
}

fn keyboard_lines(hints: &HashMap<char, LetterStatus>) -> Vec<Line<'static>> {
    KEYBOARD_ROWS
        .iter()
        .map(|row| {
            let spans: Vec<Span> = row
                .chars()
                .flat_map(|c| {
                    [
                        Span::styled(format!(" {c} "), key_style(hints.get(&c))),
                        Span::raw(" "),
                    ]
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

fn outcome_line(app: &App) -> Line<'static> {
    let session = app.game.session();
    let word = session.target_word().to_string();
    let used = session.attempts().len();
    let bold = Style::default().add_modifier(Modifier::BOLD);

    match app.game.result() {
        GameResult::Win => {
            let points = points_for(GameResult::Win, used, session.max_attempts());
            Line::from(vec![
                Span::styled(word, bold.fg(Color::Green)),
                Span::raw(format!(
                    " in {used}/{}   {points} pts   {}",
                    session.max_attempts(),
                    format_hms(session.elapsed_time().as_secs())
                )),
            ])
        }
        GameResult::LossAttempts => Line::from(vec![
            Span::raw("Out of guesses. The word was "),
            Span::styled(word, bold.fg(Color::Red)),
        ]),
        GameResult::LossTimeout => Line::from(vec![
            Span::raw("Out of time. The word was "),
            Span::styled(word, bold.fg(Color::Red)),
        ]),
        GameResult::Unresolved => Line::raw(""),
    }
}

fn status_line(app: &App) -> Line<'static> {
    if let Some(err) = &app.error {
        return Line::styled(err.clone(), Style::default().fg(Color::Red));
    }
    if app.game.is_validating() {
        return Line::styled(
            "checking...",
            Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
        );
    }
    match app.game.info_message(Instant::now()) {
        Some(notice) => Line::styled(
            notice.to_string(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        None => Line::raw(""),
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let game = &self.game;
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);
        let dim_bold_style = Style::default()
            .add_modifier(Modifier::BOLD)
            .add_modifier(Modifier::DIM);

        if game.is_paused() {
            let paused = Paragraph::new(Span::styled(
                "PAUSED - ctrl-p to resume",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD | Modifier::ITALIC),
            ))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
            let middle = Rect {
                y: area.y + area.height / 2,
                height: 1.min(area.height),
                ..area
            };
            paused.render(middle, buf);
            return;
        }

        let grid = game.grid();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1),                 // header
                Constraint::Length(1),                 // padding
                Constraint::Length(board_height(grid.rows())), // board
                Constraint::Length(1),                 // padding
                Constraint::Length(1),                 // message / outcome
                Constraint::Length(1),                 // padding
                Constraint::Length(3),                 // keyboard
                Constraint::Min(0),
                Constraint::Length(1), // legend
            ])
            .split(area);

        let header = Paragraph::new(Line::from(vec![
            Span::styled(self.username.clone(), italic_style),
            Span::raw("   "),
            Span::styled(game.remaining_display(), dim_bold_style),
        ]))
        .alignment(Alignment::Center);
        header.render(chunks[0], buf);

        let cursor = game.cursor();
        let playing = self.state == AppState::Playing && !game.is_game_over();
        let rows: Vec<Line> = grid
            .iter_rows()
            .enumerate()
            .map(|(r, cells)| {
                let spans: Vec<Span> = cells
                    .iter()
                    .enumerate()
                    .flat_map(|(c, cell)| {
                        let here = playing && cursor.row == r + 1 && cursor.column == c + 1;
                        [cell_span(cell, here), Span::raw(" ")]
                    })
                    .collect();
                Line::from(spans)
            })
            .collect();
        Paragraph::new(rows)
            .alignment(Alignment::Center)
            .render(chunks[2], buf);

        let message = if game.is_game_over() && self.error.is_none() {
            outcome_line(self)
        } else {
            status_line(self)
        };
        Paragraph::new(message)
            .alignment(Alignment::Center)
            .render(chunks[4], buf);

        Paragraph::new(keyboard_lines(&game.keyboard_hints()))
            .alignment(Alignment::Center)
            .render(chunks[6], buf);

        let legend = if game.is_game_over() {
            "(n)ew / (h)istory / (esc)ape"
        } else {
            "(enter) guess / (ctrl-p) pause / (ctrl-a) give up / (tab) history / (esc)ape"
        };
        Paragraph::new(Span::styled(legend, italic_style)).render(chunks[8], buf);

        if self.celebration.is_active() {
            render_celebration_particles(&self.celebration, area, buf);
        }
    }
}

/// Render celebration particles on top of the board
fn render_celebration_particles(celebration: &Celebration, area: Rect, buf: &mut Buffer) {
    let colors = [Color::Green, Color::Yellow, Color::LightGreen];

    for particle in &celebration.particles {
        if particle.x < 0.0 || particle.y < 0.0 {
            continue;
        }
        let x = particle.x as u16;
        let y = particle.y as u16;
        if x >= area.width || y >= area.height {
            continue;
        }

        let color = colors[particle.color_index % colors.len()];
        let fade = 1.0 - (particle.age / particle.max_age);
        let style = if particle.is_letter() || fade > 0.6 {
            Style::default().fg(color).add_modifier(Modifier::BOLD)
        } else if fade > 0.3 {
            Style::default().fg(color)
        } else {
            Style::default().fg(color).add_modifier(Modifier::DIM)
        };

        if let Some(cell) = buf.cell_mut((area.x + x, area.y + y)) {
            cell.set_symbol(&particle.symbol.to_string());
            cell.set_style(style);
        }
    }
}
