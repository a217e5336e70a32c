use tracing::debug;

/// Percent of the lesson that must be played before it counts as watched
pub const COMPLETION_THRESHOLD_PERCENT: f64 = 90.0;
/// Completion re-arms only once playback is this far from the end
pub const COMPLETION_RESET_MARGIN_SECS: f64 = 2.0;

/// Progress updates derived from playback time
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackProgress {
    Progress { percent: f64 },
    TimeUpdate { current_time: f64 },
    LessonCompleted,
}

/// Percent of `duration` covered by `t`; 0 when the duration is unknown or not positive
pub fn percent(t: f64, duration: f64) -> f64 {
    if duration.is_finite() && duration > 0.0 {
        t / duration * 100.0
    } else {
        0.0
    }
}

/// Edge-triggered completion detector for the attached lesson.
///
/// The `completed` flag is set the first time playback reaches the threshold
/// and cleared again once playback is back below both the threshold and the
/// last two seconds. `LessonCompleted` is emitted only on the false→true edge.
#[derive(Debug, Default)]
pub struct ProgressEngine {
    completed: bool,
}

impl ProgressEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn reset(&mut self) {
        self.completed = false;
    }

    pub fn on_time_advanced(&mut self, t: f64, duration: Option<f64>) -> Vec<PlaybackProgress> {
        let Some(duration) = duration.filter(|d| d.is_finite() && *d > 0.0) else {
            return vec![
                PlaybackProgress::Progress { percent: 0.0 },
                PlaybackProgress::TimeUpdate { current_time: t },
            ];
        };

        let percent = percent(t, duration);
        let mut updates = vec![
            PlaybackProgress::Progress { percent },
            PlaybackProgress::TimeUpdate { current_time: t },
        ];

        if !self.completed && percent >= COMPLETION_THRESHOLD_PERCENT {
            self.completed = true;
            debug!("Completion threshold reached at {:.1}s ({:.1}%)", t, percent);
            updates.push(PlaybackProgress::LessonCompleted);
        } else if self.completed
            && percent < COMPLETION_THRESHOLD_PERCENT
            && t < duration - COMPLETION_RESET_MARGIN_SECS
        {
            debug!("Seeked back to {:.1}s, completion re-armed", t);
            self.completed = false;
        }

        updates
    }
}
