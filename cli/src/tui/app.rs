use std::time::{Duration, Instant};

use log::error;
use ratatui::widgets::TableState;
use todays_core::{
    is_blank, Clock, Snapshot, Status, StatusOverview, StoreResult, Task, TaskFeed, TaskService,
    MAX_NOTE_CHARS,
};

use crate::sound::{Cue, SoundPlayer};

const CLOCK_PERIOD: Duration = Duration::from_secs(1);
const NOTICE_TTL: Duration = Duration::from_secs(2);
pub const BLANK_NOTE_NOTICE: &str = "Please enter task text";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Adding,
    Editing,
}

pub struct Notice {
    pub text: String,
    expires_at: Instant,
}

pub struct App {
    pub service: TaskService,
    feed: TaskFeed,
    pub tasks: Snapshot,
    pub overview: StatusOverview,
    pub state: TableState,
    pub input: String,
    pub input_mode: InputMode,
    pub cursor_position: usize,
    /// Record open in the edit dialog, as it looked when opened.
    pub editing: Option<Task>,
    pub selected_status: Status,
    pub clock: Clock,
    last_clock_tick: Instant,
    pub notice: Option<Notice>,
    pub sound: SoundPlayer,
}

impl App {
    pub fn new(service: TaskService, sound: SoundPlayer) -> App {
        let feed = service.observe_all();
        let tasks = feed.latest();
        let overview = StatusOverview::from_tasks(&tasks);
        let mut state = TableState::default();
        if !tasks.is_empty() {
            state.select(Some(0));
        }
        App {
            service,
            feed,
            tasks,
            overview,
            state,
            input: String::new(),
            input_mode: InputMode::Normal,
            cursor_position: 0,
            editing: None,
            selected_status: Status::default(),
            clock: Clock::now(),
            last_clock_tick: Instant::now(),
            notice: None,
            sound,
        }
    }

    /// Advances time-driven state: the header clock and the transient notice.
    pub fn tick(&mut self, now: Instant) {
        if now.duration_since(self.last_clock_tick) >= CLOCK_PERIOD {
            self.clock = Clock::now();
            self.last_clock_tick = now;
        }
        if self.notice.as_ref().is_some_and(|n| now >= n.expires_at) {
            self.notice = None;
        }
    }

    /// Pulls the latest committed snapshot, if any, and keeps the selection in range.
    pub fn sync_tasks(&mut self) {
        let Some(tasks) = self.feed.refresh() else {
            return;
        };
        self.overview = StatusOverview::from_tasks(&tasks);
        self.tasks = tasks;

        match self.state.selected() {
            _ if self.tasks.is_empty() => self.state.select(None),
            Some(i) if i >= self.tasks.len() => self.state.select(Some(self.tasks.len() - 1)),
            None => self.state.select(Some(0)),
            Some(_) => {}
        }
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.state.selected().and_then(|i| self.tasks.get(i))
    }

    pub fn next(&mut self) {
        if self.tasks.is_empty() {
            return;
        }

        let i = match self.state.selected() {
            Some(i) if i + 1 < self.tasks.len() => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.tasks.is_empty() {
            return;
        }

        let i = match self.state.selected() {
            Some(0) | None => self.tasks.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn enter_add_mode(&mut self) {
        self.sound.play(Cue::Click);
        self.input_mode = InputMode::Adding;
        self.clear_input();
    }

    pub fn open_editor(&mut self) {
        let Some(task) = self.selected_task().cloned() else {
            return;
        };
        self.sound.play(Cue::Click);
        self.selected_status = task.status;
        self.editing = Some(task);
        self.input_mode = InputMode::Editing;
        self.clear_input();
    }

    /// Dismisses any open dialog without writing.
    pub fn cancel(&mut self) {
        self.sound.play(Cue::Back);
        self.close_dialog();
    }

    fn close_dialog(&mut self) {
        self.input_mode = InputMode::Normal;
        self.editing = None;
        self.clear_input();
    }

    fn clear_input(&mut self) {
        self.input.clear();
        self.cursor_position = 0;
    }

    pub fn input_char(&mut self, c: char) {
        if self.input.chars().count() >= MAX_NOTE_CHARS {
            return;
        }
        let byte_index = self.byte_index(self.cursor_position);
        self.input.insert(byte_index, c);
        self.cursor_position += 1;
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position > 0 {
            let byte_index = self.byte_index(self.cursor_position - 1);
            self.input.remove(byte_index);
            self.cursor_position -= 1;
        }
    }

    fn byte_index(&self, char_position: usize) -> usize {
        self.input
            .chars()
            .take(char_position)
            .map(|c| c.len_utf8())
            .sum()
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.input.chars().count() {
            self.cursor_position += 1;
        }
    }

    pub fn next_status(&mut self) {
        self.step_status(1);
    }

    pub fn previous_status(&mut self) {
        self.step_status(Status::CHOICES.len() - 1);
    }

    fn step_status(&mut self, offset: usize) {
        let current = Status::CHOICES
            .iter()
            .position(|s| *s == self.selected_status)
            .unwrap_or(0);
        self.selected_status = Status::CHOICES[(current + offset) % Status::CHOICES.len()];
        self.sound.play(Cue::Click);
    }

    pub fn submit(&mut self) {
        match self.input_mode {
            InputMode::Adding => self.submit_add(),
            InputMode::Editing => self.submit_edit(),
            InputMode::Normal => {}
        }
    }

    fn submit_add(&mut self) {
        if is_blank(&self.input) {
            self.show_notice(BLANK_NOTE_NOTICE);
            return;
        }

        let result = self.service.add(&self.input);
        if self.report(result).is_some() {
            self.sound.play(Cue::Other);
            self.close_dialog();
            self.sync_tasks();
            if !self.tasks.is_empty() {
                self.state.select(Some(self.tasks.len() - 1));
            }
        }
    }

    fn submit_edit(&mut self) {
        let Some(task) = self.editing.clone() else {
            return;
        };
        let result = self.service.update(&task, &self.input, self.selected_status);
        if self.report(result).is_some() {
            self.sound.play(Cue::Other);
            self.close_dialog();
            self.sync_tasks();
        }
    }

    /// Deletes the record open in the edit dialog.
    pub fn delete_editing(&mut self) {
        let Some(task) = self.editing.clone() else {
            return;
        };
        let result = self.service.delete_one(&task);
        if self.report(result).is_some() {
            self.sound.play(Cue::Clear);
            self.close_dialog();
            self.sync_tasks();
        }
    }

    pub fn clear_all(&mut self) {
        let result = self.service.delete_all();
        if self.report(result).is_some() {
            self.sound.play(Cue::Clear);
            self.sync_tasks();
        }
    }

    pub fn show_notice(&mut self, text: &str) {
        self.notice = Some(Notice {
            text: text.to_string(),
            expires_at: Instant::now() + NOTICE_TTL,
        });
    }

    fn report<T>(&mut self, result: StoreResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                error!("event=tui_action module=tui status=error error={}", err);
                self.show_notice(&format!("Save failed: {err}"));
                None
            }
        }
    }
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

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.input_char(c);
        }
    }

    #[test]
    fn add_flow_appends_and_selects_new_task() {
        let mut app = app();
        app.enter_add_mode();
        type_text(&mut app, "Buy milk");
        app.submit();

        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.tasks.len(), 1);
        assert_eq!(app.tasks[0].note, "Buy milk");
        assert_eq!(app.state.selected(), Some(0));
        assert_eq!(app.overview.underway, 1);
        assert_eq!(app.sound.last(), Some(Cue::Other));
    }

    #[test]
    fn blank_add_keeps_dialog_open_with_notice() {
        let mut app = app();
        app.enter_add_mode();
        type_text(&mut app, "   ");
        app.submit();

        assert_eq!(app.input_mode, InputMode::Adding);
        assert!(app.tasks.is_empty());
        assert_eq!(app.notice.as_ref().map(|n| n.text.as_str()), Some(BLANK_NOTE_NOTICE));
    }

    #[test]
    fn notice_expires_after_ttl() {
        let mut app = app();
        app.show_notice("hello");
        app.tick(Instant::now() + NOTICE_TTL + Duration::from_millis(1));
        assert!(app.notice.is_none());
    }

    #[test]
    fn input_is_capped() {
        let mut app = app();
        app.enter_add_mode();
        type_text(&mut app, &"y".repeat(MAX_NOTE_CHARS + 10));
        assert_eq!(app.input.chars().count(), MAX_NOTE_CHARS);
    }

    #[test]
    fn edit_flow_updates_status_and_keeps_note_when_blank() {
        let mut app = app();
        app.service.add("Walk dog").unwrap();
        app.sync_tasks();

        app.open_editor();
        assert_eq!(app.selected_status, Status::Underway);
        app.previous_status();
        assert_eq!(app.selected_status, Status::Completed);
        app.submit();

        assert_eq!(app.tasks[0].note, "Walk dog");
        assert_eq!(app.tasks[0].status, Status::Completed);
        assert_eq!(app.overview.completed, 1);
    }

    #[test]
    fn status_selector_wraps() {
        let mut app = app();
        app.selected_status = Status::Aborted;
        app.next_status();
        assert_eq!(app.selected_status, Status::Completed);
    }

    #[test]
    fn delete_from_editor_and_clear_all() {
        let mut app = app();
        app.service.add("one").unwrap();
        app.service.add("two").unwrap();
        app.sync_tasks();

        app.open_editor();
        app.delete_editing();
        assert_eq!(app.tasks.len(), 1);
        assert_eq!(app.tasks[0].note, "two");
        assert_eq!(app.input_mode, InputMode::Normal);

        app.clear_all();
        assert!(app.tasks.is_empty());
        assert_eq!(app.state.selected(), None);
        assert_eq!(app.sound.last(), Some(Cue::Clear));
    }

    #[test]
    fn cancel_writes_nothing() {
        let mut app = app();
        app.enter_add_mode();
        type_text(&mut app, "never saved");
        app.cancel();

        assert!(app.tasks.is_empty());
        assert!(app.input.is_empty());
        assert_eq!(app.sound.last(), Some(Cue::Back));
    }

    #[test]
    fn selection_wraps_both_ways() {
        let mut app = app();
        for note in ["a", "b", "c"] {
            app.service.add(note).unwrap();
        }
        app.sync_tasks();

        app.previous();
        assert_eq!(app.state.selected(), Some(2));
        app.next();
        assert_eq!(app.state.selected(), Some(0));
    }

    #[test]
    fn cursor_edits_multibyte_input() {
        let mut app = app();
        app.enter_add_mode();
        type_text(&mut app, "café");
        app.move_cursor_left();
        app.delete_char();
        assert_eq!(app.input, "caé");
        app.move_cursor_right();
        app.input_char('!');
        assert_eq!(app.input, "caé!");
    }
}
