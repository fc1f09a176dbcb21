use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Row, Table, Wrap},
    Frame,
};
use todays_core::{Status, MAX_NOTE_CHARS};
use unicode_width::UnicodeWidthStr;

use crate::tui::app::{App, InputMode};

pub fn status_color(status: Status) -> Color {
    match status {
        Status::Completed => Color::Green,
        Status::Underway => Color::Yellow,
        Status::Aborted => Color::Red,
    }
}

pub fn draw(f: &mut Frame, app: &mut App) {
    let size = f.area();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header clock
            Constraint::Length(1), // Title
            Constraint::Length(3), // Overview bar
            Constraint::Length(1), // Count / clear all
            Constraint::Min(1),    // Task list
            Constraint::Length(1), // Footer/Help
        ])
        .split(size);

    draw_header(f, app, main_chunks[0]);

    let title = Paragraph::new("TODAY'S TASKS")
        .style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    f.render_widget(title, main_chunks[1]);

    draw_overview(f, app, main_chunks[2]);
    draw_count_row(f, app, main_chunks[3]);
    draw_task_list(f, app, main_chunks[4]);

    let footer = match &app.notice {
        Some(notice) => Paragraph::new(notice.text.as_str())
            .style(Style::default().fg(Color::Black).bg(Color::Yellow)),
        None => Paragraph::new("a: Add | Enter: Edit | c: Clear all | j/k: Navigate | q: Quit")
            .style(Style::default().fg(Color::DarkGray)),
    };
    f.render_widget(footer.alignment(Alignment::Center), main_chunks[5]);

    match app.input_mode {
        InputMode::Adding => draw_add_dialog(f, app, size),
        InputMode::Editing => draw_edit_dialog(f, app, size),
        InputMode::Normal => {}
    }
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(
            app.clock.date.as_str(),
            Style::default().fg(Color::White),
        )),
        Line::from(Span::styled(
            app.clock.time.as_str(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
    ];
    let header = Paragraph::new(lines)
        .alignment(Alignment::Right)
        .block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(header, area);
}

fn draw_overview(f: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3); 3])
        .split(area);

    for (status, column) in Status::ALL.iter().zip(columns.iter()) {
        let color = status_color(*status);
        let bucket = Paragraph::new(vec![
            Line::from(Span::styled(
                " ".repeat(column.width as usize),
                Style::default().bg(color),
            )),
            Line::from(format!("{} {}", status.label(), app.overview.count(*status))),
        ])
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::White));
        f.render_widget(bucket, *column);
    }
}

fn draw_count_row(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(13)])
        .split(area);

    let total = Paragraph::new(format!(" {} Total task(s)", app.overview.total()))
        .style(Style::default().fg(Color::White));
    f.render_widget(total, chunks[0]);

    let clear = Paragraph::new("Clear all (c)")
        .style(Style::default().fg(Color::White).bg(Color::Red));
    f.render_widget(clear, chunks[1]);
}

fn draw_task_list(f: &mut Frame, app: &mut App, area: Rect) {
    let rows: Vec<Row> = app
        .tasks
        .iter()
        .map(|task| {
            let badge = Span::styled(
                format!("{:^4}", task.sequence_number),
                Style::default()
                    .fg(Color::Black)
                    .bg(status_color(task.status))
                    .add_modifier(Modifier::BOLD),
            );
            Row::new(vec![badge, Span::raw(task.note.clone())])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(4), // Sequence badge
            Constraint::Min(10),   // Note
        ],
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded),
    )
    .row_highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("> ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn draw_add_dialog(f: &mut Frame, app: &App, area: Rect) {
    let popup = centered_rect(60, 7, area);
    f.render_widget(Clear, popup);

    let block = dialog_block(" NEW TASK ");
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(inner);

    draw_input(f, app, chunks[0], "Enter task");
    let help = Paragraph::new("Enter: Add | Esc: Cancel").style(Style::default().fg(Color::White));
    f.render_widget(help, chunks[1]);
}

fn draw_edit_dialog(f: &mut Frame, app: &App, area: Rect) {
    let Some(task) = &app.editing else {
        return;
    };
    let popup = centered_rect(60, 12, area);
    f.render_widget(Clear, popup);

    let block = dialog_block(" TASK DETAILS ");
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Current note
            Constraint::Length(3), // New note
            Constraint::Length(1), // Status selector
            Constraint::Min(1),    // Help
        ])
        .split(inner);

    let note = Paragraph::new(format!("Note: {}", task.note))
        .style(Style::default().fg(Color::White))
        .wrap(Wrap { trim: true });
    f.render_widget(note, chunks[0]);

    draw_input(f, app, chunks[1], "New note (blank keeps current)");

    let mut choices = Vec::new();
    for status in Status::CHOICES {
        let marker = if status == app.selected_status { "(•) " } else { "( ) " };
        let style = if status == app.selected_status {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        choices.push(Span::styled(format!("{marker}{}  ", status.label()), style));
    }
    f.render_widget(Paragraph::new(Line::from(choices)), chunks[2]);

    let help = Paragraph::new("Enter: Update | Tab: Status | Ctrl-D: Delete | Esc: Cancel")
        .style(Style::default().fg(Color::White))
        .wrap(Wrap { trim: true });
    f.render_widget(help, chunks[3]);
}

fn draw_input(f: &mut Frame, app: &App, area: Rect, label: &str) {
    let counter = format!(" {}/{} ", app.input.chars().count(), MAX_NOTE_CHARS);
    let input = Paragraph::new(app.input.as_str())
        .style(Style::default().fg(Color::White).bg(Color::Black))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(label, Style::default().fg(Color::Yellow)))
                .title_bottom(Line::from(counter).alignment(Alignment::Right)),
        );
    f.render_widget(input, area);

    // Place the terminal cursor after the typed prefix, in display columns.
    let prefix: String = app.input.chars().take(app.cursor_position).collect();
    let max_x = area.x + area.width.saturating_sub(2);
    let x = (area.x + 1 + prefix.width() as u16).min(max_x);
    f.set_cursor_position(Position::new(x, area.y + 1));
}

fn dialog_block(title: &str) -> Block<'_> {
    Block::default()
        .title(Span::styled(
            title,
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .style(Style::default().bg(Color::Blue))
}

/// A rect `percent_x` wide and `height` rows tall, centered in `area`.
fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height),
            Constraint::Fill(1),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_colors_match_overview_buckets() {
        assert_eq!(status_color(Status::Aborted), Color::Red);
        assert_eq!(status_color(Status::Underway), Color::Yellow);
        assert_eq!(status_color(Status::Completed), Color::Green);
    }

    #[test]
    fn centered_rect_stays_inside_area() {
        let area = Rect::new(0, 0, 100, 40);
        let popup = centered_rect(60, 7, area);
        assert_eq!(popup.height, 7);
        assert_eq!(popup.width, 60);
        assert!(popup.x >= 20 && popup.y >= 16);
    }
}
