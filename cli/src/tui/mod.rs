pub mod app;
pub mod ui;

use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::info;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use todays_core::TaskService;

use crate::sound::SoundPlayer;
use crate::tui::app::{App, InputMode};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

pub fn run(service: TaskService, sound: SoundPlayer) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    info!("event=tui_start module=tui status=ok");
    let mut app = App::new(service, sound);
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    info!("event=tui_stop module=tui status=ok");

    res
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        app.sync_tasks();
        app.tick(Instant::now());

        terminal
            .draw(|f| ui::draw(f, app))
            .map_err(|e| io::Error::other(e.to_string()))?;

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind == KeyEventKind::Press && handle_key(app, key) {
            return Ok(());
        }
    }
}

/// Applies one key press to `app`. Returns true when the user asked to quit.
fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    match app.input_mode {
        InputMode::Normal => match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Down | KeyCode::Char('j') => app.next(),
            KeyCode::Up | KeyCode::Char('k') => app.previous(),
            KeyCode::Enter | KeyCode::Char('e') => app.open_editor(),
            KeyCode::Char('a') => app.enter_add_mode(),
            KeyCode::Char('c') => app.clear_all(),
            _ => {}
        },
        InputMode::Adding | InputMode::Editing => match key.code {
            KeyCode::Char('d')
                if key.modifiers.contains(KeyModifiers::CONTROL)
                    && app.input_mode == InputMode::Editing =>
            {
                app.delete_editing()
            }
            KeyCode::Enter => app.submit(),
            KeyCode::Esc => app.cancel(),
            KeyCode::Tab if app.input_mode == InputMode::Editing => app.next_status(),
            KeyCode::BackTab if app.input_mode == InputMode::Editing => {
                app.previous_status()
            }
            KeyCode::Left
                if key.modifiers.contains(KeyModifiers::ALT)
                    && app.input_mode == InputMode::Editing =>
            {
                app.previous_status()
            }
            KeyCode::Right
                if key.modifiers.contains(KeyModifiers::ALT)
                    && app.input_mode == InputMode::Editing =>
            {
                app.next_status()
            }
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                app.input_char(c)
            }
            KeyCode::Backspace => app.delete_char(),
            KeyCode::Left => app.move_cursor_left(),
            KeyCode::Right => app.move_cursor_right(),
            _ => {}
        },
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use todays_core::TaskStore;

    fn app() -> App {
        let service = TaskService::new(Arc::new(TaskStore::in_memory()));
        App::new(service, SoundPlayer::new(false))
    }

    fn press(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> bool {
        handle_key(app, KeyEvent::new(code, modifiers))
    }

    #[test]
    fn modified_chars_are_not_typed_into_the_note() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'), KeyModifiers::NONE);
        assert_eq!(app.input_mode, InputMode::Adding);

        press(&mut app, KeyCode::Char('c'), KeyModifiers::CONTROL);
        press(&mut app, KeyCode::Char('x'), KeyModifiers::ALT);
        assert!(app.input.is_empty());

        press(&mut app, KeyCode::Char('H'), KeyModifiers::SHIFT);
        press(&mut app, KeyCode::Char('i'), KeyModifiers::NONE);
        assert_eq!(app.input, "Hi");
    }

    #[test]
    fn ctrl_d_deletes_only_inside_the_editor() {
        let mut app = app();
        app.service.add("Walk dog").unwrap();
        app.sync_tasks();

        press(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(app.input_mode, InputMode::Editing);
        press(&mut app, KeyCode::Char('d'), KeyModifiers::CONTROL);

        assert!(app.tasks.is_empty());
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn q_quits_from_the_list_only() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'), KeyModifiers::NONE);
        assert!(!press(&mut app, KeyCode::Char('q'), KeyModifiers::NONE));
        assert_eq!(app.input, "q");

        press(&mut app, KeyCode::Esc, KeyModifiers::NONE);
        assert!(press(&mut app, KeyCode::Char('q'), KeyModifiers::NONE));
    }
}
