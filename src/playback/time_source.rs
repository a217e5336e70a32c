use super::media::{MediaError, MediaEvent, PlaybackControl};
use super::resume::ResumeStore;
use tracing::{debug, error, info, trace};

/// Wraps the one media resource currently attached.
///
/// Holds the last reported time and duration, forwards commands to the
/// underlying control and flushes the resume position on pause and teardown.
pub struct TimeSource<C: PlaybackControl> {
    control: C,
    resume: ResumeStore,
    attached: Option<String>,
    current_time: f64,
    duration: Option<f64>,
    error: Option<MediaError>,
}

impl<C: PlaybackControl> TimeSource<C> {
    pub fn new(control: C, resume: ResumeStore) -> Self {
        Self {
            control,
            resume,
            attached: None,
            current_time: 0.0,
            duration: None,
            error: None,
        }
    }

    /// Attach the media for a lesson. Time, duration and error state start over.
    pub fn attach(&mut self, lesson_id: &str) {
        debug!("Attaching media for {}", lesson_id);
        self.attached = Some(lesson_id.to_string());
        self.current_time = 0.0;
        self.duration = None;
        self.error = None;
    }

    pub fn attached(&self) -> Option<&str> {
        self.attached.as_deref()
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn error(&self) -> Option<&MediaError> {
        self.error.as_ref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn resume_store(&self) -> &ResumeStore {
        &self.resume
    }

    pub fn control(&self) -> &C {
        &self.control
    }

    /// Seek within the attached media. No-op until metadata is known.
    pub fn seek_to(&mut self, time: f64) {
        if self.attached.is_none() {
            debug!("Seek to {:.1}s ignored, no media attached", time);
            return;
        }
        let Some(duration) = self.duration else {
            debug!("Seek to {:.1}s ignored, media not seekable yet", time);
            return;
        };
        let time = if time.is_finite() {
            time.clamp(0.0, duration)
        } else {
            0.0
        };
        self.control.seek_to(time);
        self.current_time = time;
    }

    /// Send the media back to zero. Always in range, so unlike `seek_to`
    /// this goes out before metadata is known.
    pub fn rewind(&mut self) {
        if self.attached.is_none() {
            return;
        }
        self.control.seek_to(0.0);
        self.current_time = 0.0;
    }

    pub fn play(&mut self) {
        if self.attached.is_some() {
            self.control.play();
        }
    }

    pub fn pause(&mut self) {
        if self.attached.is_some() {
            self.control.pause();
        }
    }

    /// Apply a media event to the tracked state
    pub fn handle_event(&mut self, event: &MediaEvent) {
        match event {
            MediaEvent::LoadStart => {
                trace!("Media load started");
                self.error = None;
            }
            MediaEvent::MetadataReady { duration } => {
                self.duration = duration.filter(|d| d.is_finite() && *d > 0.0);
                info!("Media metadata ready, duration {:?}", self.duration);
            }
            MediaEvent::TimeAdvanced { current_time } => {
                if current_time.is_finite() {
                    self.current_time = current_time.max(0.0);
                }
            }
            MediaEvent::Paused { current_time } => {
                if current_time.is_finite() {
                    self.current_time = current_time.max(0.0);
                }
                // Nothing worth saving before the media is seekable
                if self.duration.is_some() {
                    self.flush();
                }
            }
            MediaEvent::Error { message } => {
                error!("Media error: {}", message);
                self.error = Some(MediaError::Load(message.clone()));
            }
        }
    }

    fn flush(&self) {
        if let Some(lesson_id) = &self.attached {
            self.resume.save(lesson_id, self.current_time);
        }
    }

    /// Save only once playback is past zero, keeping any earlier position
    pub fn flush_if_started(&self) {
        if self.current_time > 0.0 {
            self.flush();
        }
    }

    pub fn on_resume_tick(&self) {
        self.flush_if_started();
    }

    /// Unload hook
    pub fn teardown(&mut self) {
        self.flush_if_started();
        debug!("Time source torn down");
    }
}
