use std::io::{self, Write};

/// Audio cue per kind of user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Click,
    Back,
    Clear,
    Other,
}

impl Cue {
    // Number of terminal bells per cue, so cues stay distinguishable.
    fn bells(self) -> usize {
        match self {
            Cue::Clear => 2,
            Cue::Click | Cue::Back | Cue::Other => 1,
        }
    }
}

/// Fire-and-forget cue player. Failures are ignored.
#[derive(Debug, Default)]
pub struct SoundPlayer {
    enabled: bool,
    last: Option<Cue>,
}

impl SoundPlayer {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            last: None,
        }
    }

    pub fn play(&mut self, cue: Cue) {
        self.last = Some(cue);
        if !self.enabled {
            return;
        }
        let mut stdout = io::stdout();
        let _ = stdout
            .write_all(&b"\x07".repeat(cue.bells()))
            .and_then(|_| stdout.flush());
    }

    pub fn last(&self) -> Option<Cue> {
        self.last
    }
}
