use itertools::Itertools;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use motle::{
    history::{GameRecord, HistorySummary},
    session::GameResult,
    util::{format_date_time, format_hms, format_title},
};

use crate::App;

/// One row of the history table.
pub fn present_row(record: &GameRecord) -> Row<'static> {
    let (label, color) = match record.result {
        GameResult::Win => ("won", Color::Green),
        GameResult::LossAttempts => ("out of guesses", Color::Red),
        GameResult::LossTimeout => ("out of time", Color::Red),
        GameResult::Unresolved => ("unfinished", Color::Gray),
    };

    let guesses = record.attempts.iter().map(|a| &a.guess).join(" ");

    Row::new(vec![
        Cell::from(format_date_time(record.date.as_ref())),
        Cell::from(record.word.clone()).style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from(label).style(Style::default().fg(color)),
        Cell::from(record.points.to_string()),
        Cell::from(format_hms(record.time)),
        Cell::from(guesses),
    ])
}

pub fn summary_text(summary: &HistorySummary) -> String {
    if summary.played == 0 {
        return "No games played yet".to_string();
    }
    format!(
        "Played {}   Won {}   Win rate {}%   Avg points {:.1}",
        summary.played,
        summary.won,
        summary.win_rate,
        summary.mean_points.unwrap_or_default()
    )
}

/// Render the game history screen
pub fn render_history(app: &mut App, f: &mut Frame) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // summary
            Constraint::Min(0),    // table
            Constraint::Length(2), // instructions
        ])
        .split(area);

    let title = format!(
        "{}  last game: {}",
        app.username,
        format_title(app.history.records.first().and_then(|r| r.date.as_ref()))
    );
    let summary = Paragraph::new(summary_text(&app.history.summary))
        .block(Block::default().borders(Borders::ALL).title(title))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    f.render_widget(summary, chunks[0]);

    if app.history.records.is_empty() {
        let empty = Paragraph::new("Finished games show up here.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray));
        f.render_widget(empty, chunks[1]);
    } else {
        let table_height = chunks[1].height.saturating_sub(3) as usize; // borders + header
        let max_scroll = app.history.records.len().saturating_sub(table_height);
        if app.history.scroll_offset > max_scroll {
            app.history.scroll_offset = max_scroll;
        }

        let header = Row::new(vec!["Date", "Word", "Result", "Points", "Time", "Guesses"]).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

        let rows: Vec<Row> = app
            .history
            .records
            .iter()
            .skip(app.history.scroll_offset)
            .take(table_height)
            .map(present_row)
            .collect();

        let widths = [
            Constraint::Length(16),
            Constraint::Length(8),
            Constraint::Length(14),
            Constraint::Length(6),
            Constraint::Length(8),
            Constraint::Min(10),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title("History"))
            .column_spacing(2);
        f.render_widget(table, chunks[1]);
    }

    let instructions = Paragraph::new("(↑/↓) scroll  (PgUp/PgDn) page  (Home) top  (esc/b) back  (q) quit")
        .alignment(Alignment::Center)
        .wrap(ratatui::widgets::Wrap { trim: true });
    f.render_widget(instructions, chunks[2]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use motle::history::{AttemptOutcome, AttemptRecord};

    fn record(result: GameResult, points: u32) -> GameRecord {
        GameRecord {
            id: Some(1),
            username: "User_test".into(),
            word: "MANGO".into(),
            attempts: vec![AttemptRecord {
                guess: "MANGO".into(),
                result: AttemptOutcome::Correct,
            }],
            points,
            result,
            time: 75,
            date: None,
        }
    }

    #[test]
    fn test_summary_text() {
        assert_eq!(summary_text(&HistorySummary::default()), "No games played yet");
        let summary = HistorySummary::from_records(&[
            record(GameResult::Win, 60),
            record(GameResult::LossTimeout, 0),
        ]);
        assert_eq!(
            summary_text(&summary),
            "Played 2   Won 1   Win rate 50%   Avg points 30.0"
        );
    }

    #[test]
    fn test_present_row_builds() {
        for result in [
            GameResult::Win,
            GameResult::LossAttempts,
            GameResult::LossTimeout,
            GameResult::Unresolved,
        ] {
            let _ = present_row(&record(result, 0));
        }
    }
}
