use thiserror::Error;

/// Lifecycle notifications from the attached media element
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    LoadStart,
    MetadataReady { duration: Option<f64> },
    TimeAdvanced { current_time: f64 },
    Paused { current_time: f64 },
    Error { message: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MediaError {
    #[error("Media failed to load: {0}")]
    Load(String),
    #[error("Playback was rejected: {0}")]
    PlayRejected(String),
}

/// Imperative commands the session may issue to the media element.
///
/// `play` can be refused by the platform after the call returns; implementors
/// catch and log that failure instead of surfacing it.
pub trait PlaybackControl {
    fn seek_to(&mut self, time: f64);
    fn play(&mut self);
    fn pause(&mut self);
}
