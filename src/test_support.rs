// Test support utilities for both unit and integration tests

use crate::playback::PlaybackControl;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Seek(f64),
    Play,
    Pause,
}

/// Mock media control for testing
///
/// Records every command instead of driving a media element. Clones share
/// the same log, so a test can keep one copy while the session owns another.
#[derive(Clone, Default)]
pub struct RecordingControl {
    commands: Arc<Mutex<Vec<Command>>>,
}

impl RecordingControl {
    #[allow(unused)] // Used in tests
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<Command> {
        self.commands.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.commands.lock().unwrap().clear();
    }

    fn push(&self, command: Command) {
        self.commands.lock().unwrap().push(command);
    }
}

impl PlaybackControl for RecordingControl {
    fn seek_to(&mut self, time: f64) {
        self.push(Command::Seek(time));
    }

    fn play(&mut self) {
        self.push(Command::Play);
    }

    fn pause(&mut self) {
        self.push(Command::Pause);
    }
}
