use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Input widgets cap notes at this many characters. The store itself accepts any length.
pub const MAX_NOTE_CHARS: usize = 250;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Completed,
    Underway,
    Aborted,
}

impl Default for Status {
    fn default() -> Self {
        Status::Underway
    }
}

impl Status {
    /// Overview bar order.
    pub const ALL: [Status; 3] = [Status::Aborted, Status::Underway, Status::Completed];

    /// Order of the choices in the edit dialog.
    pub const CHOICES: [Status; 3] = [Status::Completed, Status::Underway, Status::Aborted];

    pub fn label(self) -> &'static str {
        match self {
            Status::Completed => "Completed",
            Status::Underway => "Underway",
            Status::Aborted => "Aborted",
        }
    }

    pub fn parse(input: &str) -> Option<Status> {
        match input.trim().to_lowercase().as_str() {
            "completed" | "complete" | "done" | "c" => Some(Status::Completed),
            "underway" | "u" => Some(Status::Underway),
            "aborted" | "abort" | "a" => Some(Status::Aborted),
            _ => None,
        }
    }

    // Legacy files stored status as a nullable flag: true/null/false.
    pub fn from_flag(flag: Option<bool>) -> Status {
        match flag {
            Some(true) => Status::Completed,
            None => Status::Underway,
            Some(false) => Status::Aborted,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Task {
    pub id: Uuid,
    pub sequence_number: u32,
    pub note: String,
    #[serde(default)]
    pub status: Status,
    // Carried for file compatibility; nothing sets it yet.
    #[serde(default)]
    pub completion_time: Option<f64>,
}

impl Task {
    pub fn new(sequence_number: u32, note: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            sequence_number,
            note,
            status: Status::default(),
            completion_time: None,
        }
    }
}

/// True when `note` carries no visible text.
pub fn is_blank(note: &str) -> bool {
    note.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_task_is_underway() {
        let task = Task::new(1, "Buy milk".to_string());
        assert_eq!(task.status, Status::Underway);
        assert_eq!(task.sequence_number, 1);
        assert!(task.completion_time.is_none());
    }

    #[test]
    fn legacy_flag_maps_to_each_status() {
        assert_eq!(Status::from_flag(Some(true)), Status::Completed);
        assert_eq!(Status::from_flag(None), Status::Underway);
        assert_eq!(Status::from_flag(Some(false)), Status::Aborted);
    }

    #[test]
    fn parse_accepts_labels_and_short_forms() {
        assert_eq!(Status::parse("Completed"), Some(Status::Completed));
        assert_eq!(Status::parse(" underway "), Some(Status::Underway));
        assert_eq!(Status::parse("a"), Some(Status::Aborted));
        assert_eq!(Status::parse("later"), None);
    }

    #[test]
    fn blank_detection() {
        assert!(is_blank(""));
        assert!(is_blank("   \t"));
        assert!(!is_blank(" x "));
    }
}
