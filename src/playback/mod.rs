pub mod media;
pub mod progress;
pub mod resume;
pub mod time_source;

pub use media::{MediaError, MediaEvent, PlaybackControl};
pub use progress::{PlaybackProgress, ProgressEngine};
pub use resume::{ResumeStore, ResumeTicker};
pub use time_source::TimeSource;
