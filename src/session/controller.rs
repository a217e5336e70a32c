use super::auto_advance::{AutoAdvance, AutoAdvanceTicket};
use crate::catalog::{CatalogError, Chapter, Course, Lesson, TranscriptCue};
use crate::notes::{Note, NoteRejected, NotesManager, NotesState};
use crate::playback::{
    MediaError, MediaEvent, PlaybackControl, PlaybackProgress, ProgressEngine, ResumeStore,
    TimeSource,
};
use crate::storage::{self, SharedStore};
use crate::transcript::{self, ChapterStatus, TranscriptSync};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What the UI needs to react to after a media event
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Progress { percent: f64 },
    TimeUpdate { current_time: f64 },
    CueChanged { index: Option<usize> },
    LessonCompleted { lesson_id: String },
    AutoAdvanceScheduled(AutoAdvanceTicket),
    MediaFailed { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    Switched,
    Locked,
    Unknown,
}

/// Sidebar row state, in precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LessonStatus {
    Locked,
    Current,
    Completed,
    Available,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourseProgress {
    pub completed: usize,
    pub unlocked_total: usize,
}

impl CourseProgress {
    pub fn percent(&self) -> f64 {
        if self.unlocked_total == 0 {
            return 0.0;
        }
        self.completed as f64 / self.unlocked_total as f64 * 100.0
    }

    pub fn is_complete(&self) -> bool {
        self.percent() >= crate::playback::progress::COMPLETION_THRESHOLD_PERCENT
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResumeOffer {
    pub lesson_id: String,
    pub position: f64,
}

/// Root of the player core.
///
/// Owns the current lesson, the append-only completed set and the pending
/// auto-advance. Media events come in through `handle_media_event`, commands
/// go out through the `TimeSource`.
pub struct LessonSession<C: PlaybackControl> {
    course: Arc<Course>,
    current: Lesson,
    current_time: f64,
    sidebar_open: bool,
    completed: BTreeSet<String>,
    storage_available: bool,
    time_source: TimeSource<C>,
    progress: ProgressEngine,
    transcript: TranscriptSync,
    notes: NotesManager,
    auto_advance: AutoAdvance,
    /// Read once per visit, so saves made during the visit don't show up
    resume_offer: Option<ResumeOffer>,
}

impl<C: PlaybackControl> LessonSession<C> {
    /// Open the session on the first unlocked lesson
    pub fn new(course: Arc<Course>, control: C, store: SharedStore) -> Result<Self, CatalogError> {
        let first = course
            .first_unlocked()
            .or_else(|| course.lessons.first())
            .cloned()
            .ok_or_else(|| CatalogError::Invalid("course has no lessons".to_string()))?;

        let storage_available = storage::probe(store.as_ref());
        let mut time_source = TimeSource::new(control, ResumeStore::new(store.clone()));
        time_source.attach(&first.id);

        let mut notes = NotesManager::new(store);
        notes.set_duration_limit(Some(first.duration_sec));
        notes.load(&first.id);
        let resume_offer = saved_offer(time_source.resume_store(), &first.id);

        info!(
            "Session started on '{}' ({} lessons, storage {})",
            first.title,
            course.lessons.len(),
            if storage_available { "available" } else { "unavailable" }
        );

        Ok(Self {
            course,
            current: first,
            current_time: 0.0,
            sidebar_open: false,
            completed: BTreeSet::new(),
            storage_available,
            time_source,
            progress: ProgressEngine::new(),
            transcript: TranscriptSync::new(),
            notes,
            auto_advance: AutoAdvance::new(),
            resume_offer,
        })
    }

    /// Make `lesson_id` the current lesson.
    ///
    /// Locked and unknown lessons are refused without touching any state.
    /// Re-selecting the current lesson restarts it from zero but keeps its
    /// notes and any pending auto-advance.
    pub fn select_lesson(&mut self, lesson_id: &str) -> SelectOutcome {
        let Some(lesson) = self.course.lesson(lesson_id) else {
            warn!("Select of unknown lesson {} ignored", lesson_id);
            return SelectOutcome::Unknown;
        };
        if lesson.locked {
            debug!("Select of locked lesson {} ignored", lesson_id);
            return SelectOutcome::Locked;
        }
        let lesson = lesson.clone();

        if lesson.id != self.current.id {
            self.auto_advance.cancel();
            self.time_source.flush_if_started();
            info!("Switching lesson {} -> {}", self.current.id, lesson.id);
            self.time_source.attach(&lesson.id);
            self.notes.set_duration_limit(Some(lesson.duration_sec));
            self.notes.load(&lesson.id);
            self.resume_offer = saved_offer(self.time_source.resume_store(), &lesson.id);
            self.current = lesson;
        } else {
            debug!("Restarting lesson {}", lesson.id);
        }

        self.time_source.rewind();
        self.current_time = 0.0;
        self.sidebar_open = false;
        self.progress.reset();
        self.transcript.reset();
        SelectOutcome::Switched
    }

    /// Apply an event from the media element playing `lesson_id`.
    /// Events from media that is no longer current are dropped.
    pub fn handle_media_event(&mut self, lesson_id: &str, event: MediaEvent) -> Vec<SessionEvent> {
        if lesson_id != self.current.id {
            debug!(
                "Ignoring {:?} for {} while {} is current",
                event, lesson_id, self.current.id
            );
            return Vec::new();
        }

        self.time_source.handle_event(&event);
        let mut events = Vec::new();

        match event {
            MediaEvent::LoadStart => {}
            MediaEvent::MetadataReady { .. } => {
                if let Some(duration) = self.time_source.duration() {
                    self.notes.set_duration_limit(Some(duration));
                }
            }
            MediaEvent::TimeAdvanced { .. } => {
                let t = self.time_source.current_time();
                self.current_time = t;

                for update in self.progress.on_time_advanced(t, self.time_source.duration()) {
                    match update {
                        PlaybackProgress::Progress { percent } => {
                            events.push(SessionEvent::Progress { percent })
                        }
                        PlaybackProgress::TimeUpdate { current_time } => {
                            events.push(SessionEvent::TimeUpdate { current_time })
                        }
                        PlaybackProgress::LessonCompleted => self.mark_completed(&mut events),
                    }
                }

                let cues = self.course.transcript(&self.current.id);
                if self.transcript.update(cues, t) {
                    events.push(SessionEvent::CueChanged {
                        index: self.transcript.active(),
                    });
                }
            }
            MediaEvent::Paused { .. } => {
                self.current_time = self.time_source.current_time();
            }
            MediaEvent::Error { message } => {
                events.push(SessionEvent::MediaFailed { message });
            }
        }

        events
    }

    fn mark_completed(&mut self, events: &mut Vec<SessionEvent>) {
        let lesson_id = self.current.id.clone();
        if !self.completed.insert(lesson_id.clone()) {
            debug!("Lesson {} already completed", lesson_id);
            return;
        }
        info!("Lesson {} completed", lesson_id);
        events.push(SessionEvent::LessonCompleted {
            lesson_id: lesson_id.clone(),
        });

        let Some(next_id) = self
            .course
            .next_unlocked_after(&lesson_id)
            .map(|lesson| lesson.id.clone())
        else {
            info!("{} is the last unlocked lesson, nothing to advance to", lesson_id);
            return;
        };
        let ticket = self.auto_advance.schedule(&lesson_id, &next_id);
        events.push(SessionEvent::AutoAdvanceScheduled(ticket));
    }

    /// Run a scheduled advance once its delay has elapsed.
    /// Returns false if it was superseded in the meantime.
    pub fn fire_auto_advance(&mut self, ticket: &AutoAdvanceTicket) -> bool {
        if !self.auto_advance.take_if_current(ticket) {
            debug!(
                "Stale auto-advance {} -> {} dropped",
                ticket.from_lesson_id, ticket.target_lesson_id
            );
            return false;
        }
        if ticket.from_lesson_id != self.current.id {
            return false;
        }
        info!(
            "Auto-advancing {} -> {}",
            ticket.from_lesson_id, ticket.target_lesson_id
        );
        self.select_lesson(&ticket.target_lesson_id) == SelectOutcome::Switched
    }

    pub fn pending_auto_advance(&self) -> Option<&AutoAdvanceTicket> {
        self.auto_advance.pending()
    }

    pub fn seek(&mut self, time: f64) {
        self.time_source.seek_to(time);
        self.current_time = self.time_source.current_time();
        let cues = self.course.transcript(&self.current.id);
        self.transcript.update(cues, self.current_time);
    }

    pub fn play(&mut self) {
        self.time_source.play();
    }

    pub fn pause(&mut self) {
        self.time_source.pause();
    }

    /// Position saved by an earlier visit to the current lesson
    pub fn resume_offer(&self) -> Option<ResumeOffer> {
        self.resume_offer.clone()
    }

    /// Seek to the offered position and start playing.
    /// The offer stays up until the media can seek.
    pub fn resume(&mut self) -> bool {
        if self.time_source.duration().is_none() {
            debug!("Resume deferred, media not seekable yet");
            return false;
        }
        let Some(offer) = self.resume_offer.take() else {
            return false;
        };
        info!("Resuming {} at {:.1}s", offer.lesson_id, offer.position);
        self.seek(offer.position);
        self.play();
        true
    }

    pub fn add_note(&mut self, text: &str) -> Result<Note, NoteRejected> {
        self.notes.add_note(text, self.current_time).cloned()
    }

    pub fn delete_note(&mut self, note_id: &str) -> Result<bool, NoteRejected> {
        self.notes.delete_note(note_id)
    }

    pub fn notes(&self) -> &[Note] {
        self.notes.notes()
    }

    /// Notes ordered by video timestamp
    pub fn sorted_notes(&self) -> Vec<Note> {
        self.notes.sorted()
    }

    pub fn notes_state(&self) -> &NotesState {
        self.notes.state()
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_open = !self.sidebar_open;
    }

    pub fn close_sidebar(&mut self) {
        self.sidebar_open = false;
    }

    pub fn on_resume_tick(&self) {
        self.time_source.on_resume_tick();
    }

    pub fn clear_media_error(&mut self) {
        self.time_source.clear_error();
    }

    /// Unload hook: drop any pending advance and save the position
    pub fn teardown(&mut self) {
        self.auto_advance.cancel();
        self.time_source.teardown();
    }

    pub fn course(&self) -> &Course {
        &self.course
    }

    pub fn current_lesson(&self) -> &Lesson {
        &self.current
    }

    pub fn current_lesson_id(&self) -> &str {
        &self.current.id
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn has_started(&self) -> bool {
        self.current_time > 0.0
    }

    pub fn duration(&self) -> Option<f64> {
        self.time_source.duration()
    }

    pub fn sidebar_open(&self) -> bool {
        self.sidebar_open
    }

    pub fn storage_available(&self) -> bool {
        self.storage_available
    }

    pub fn media_error(&self) -> Option<&MediaError> {
        self.time_source.error()
    }

    pub fn control(&self) -> &C {
        self.time_source.control()
    }

    pub fn completed(&self) -> &BTreeSet<String> {
        &self.completed
    }

    pub fn is_completed(&self, lesson_id: &str) -> bool {
        self.completed.contains(lesson_id)
    }

    pub fn chapters(&self) -> &[Chapter] {
        self.course.chapters(&self.current.id)
    }

    pub fn transcript(&self) -> &[TranscriptCue] {
        self.course.transcript(&self.current.id)
    }

    pub fn active_cue(&self) -> Option<usize> {
        self.transcript.active()
    }

    pub fn active_chapter(&self) -> Option<usize> {
        transcript::active_chapter_index(self.chapters(), self.current_time)
    }

    pub fn chapter_status(&self, index: usize) -> ChapterStatus {
        transcript::chapter_status(self.chapters(), index, self.current_time)
    }

    pub fn lesson_status(&self, lesson: &Lesson) -> LessonStatus {
        if lesson.locked {
            LessonStatus::Locked
        } else if lesson.id == self.current.id {
            LessonStatus::Current
        } else if self.completed.contains(&lesson.id) {
            LessonStatus::Completed
        } else {
            LessonStatus::Available
        }
    }

    pub fn course_progress(&self) -> CourseProgress {
        CourseProgress {
            completed: self.completed.len(),
            unlocked_total: self.course.unlocked_count(),
        }
    }
}

fn saved_offer(resume: &ResumeStore, lesson_id: &str) -> Option<ResumeOffer> {
    let position = resume.offer(lesson_id)?;
    Some(ResumeOffer {
        lesson_id: lesson_id.to_string(),
        position,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::test_support::{Command, RecordingControl};

    fn session() -> (RecordingControl, LessonSession<RecordingControl>) {
        let control = RecordingControl::new();
        let course = Arc::new(Course::embedded().unwrap());
        let session =
            LessonSession::new(course, control.clone(), Arc::new(MemoryStore::new())).unwrap();
        (control, session)
    }

    fn play_through(session: &mut LessonSession<RecordingControl>, duration: f64) -> Vec<SessionEvent> {
        let id = session.current_lesson_id().to_string();
        session.handle_media_event(&id, MediaEvent::MetadataReady { duration: Some(duration) });
        let mut events = Vec::new();
        let mut t = 0.0;
        while t <= duration {
            events.extend(session.handle_media_event(&id, MediaEvent::TimeAdvanced { current_time: t }));
            t += 1.0;
        }
        events
    }

    #[test]
    fn test_starts_on_first_unlocked_lesson() {
        let (_, session) = session();
        assert_eq!(session.current_lesson_id(), "l1");
        assert_eq!(session.current_time(), 0.0);
        assert!(session.storage_available());
        assert!(matches!(session.notes_state(), NotesState::Ready { .. }));
    }

    #[test]
    fn test_locked_and_unknown_selection_is_noop() {
        let (control, mut session) = session();
        assert_eq!(session.select_lesson("l5"), SelectOutcome::Locked);
        assert_eq!(session.select_lesson("zzz"), SelectOutcome::Unknown);
        assert_eq!(session.current_lesson_id(), "l1");
        assert!(control.commands().is_empty());
    }

    #[test]
    fn test_select_resets_time_and_closes_sidebar() {
        let (control, mut session) = session();
        play_through(&mut session, 30.0);
        session.toggle_sidebar();
        assert!(session.sidebar_open());
        control.clear();

        assert_eq!(session.select_lesson("l2"), SelectOutcome::Switched);
        assert_eq!(control.commands(), vec![Command::Seek(0.0)]);
        assert_eq!(session.current_lesson_id(), "l2");
        assert_eq!(session.current_time(), 0.0);
        assert!(!session.sidebar_open());
        assert_eq!(session.active_cue(), None);
    }

    #[test]
    fn test_reselect_current_seeks_to_start() {
        let (control, mut session) = session();
        play_through(&mut session, 30.0);
        control.clear();
        session.select_lesson("l1");
        assert_eq!(control.commands(), vec![Command::Seek(0.0)]);
        assert_eq!(session.current_time(), 0.0);
    }

    #[test]
    fn test_resume_offer_is_fixed_for_the_visit() {
        let (control, mut session) = session();
        assert_eq!(session.resume_offer(), None);

        session.handle_media_event("l1", MediaEvent::MetadataReady { duration: Some(180.0) });
        for t in 1..=30 {
            session.handle_media_event("l1", MediaEvent::TimeAdvanced { current_time: t as f64 });
            if t == 9 {
                session.on_resume_tick();
            }
        }
        assert_eq!(session.resume_offer(), None);

        session.select_lesson("l2");
        session.select_lesson("l1");
        let offer = session.resume_offer().unwrap();
        assert_eq!(offer.position, 30.0);

        // Not seekable yet: the offer stays
        assert!(!session.resume());
        assert!(session.resume_offer().is_some());

        session.handle_media_event("l1", MediaEvent::MetadataReady { duration: Some(180.0) });
        control.clear();
        assert!(session.resume());
        assert_eq!(control.commands(), vec![Command::Seek(30.0), Command::Play]);
        assert_eq!(session.resume_offer(), None);
    }

    #[test]
    fn test_completion_is_recorded_once_and_schedules_advance() {
        let (_, mut session) = session();
        let events = play_through(&mut session, 180.0);
        let completions = events
            .iter()
            .filter(|e| matches!(e, SessionEvent::LessonCompleted { .. }))
            .count();
        assert_eq!(completions, 1);
        assert!(session.is_completed("l1"));
        let ticket = session.pending_auto_advance().unwrap();
        assert_eq!(ticket.target_lesson_id, "l2");

        // seek back and cross again: the set doesn't change, nothing new is scheduled
        let events = play_through(&mut session, 180.0);
        assert!(!events
            .iter()
            .any(|e| matches!(e, SessionEvent::AutoAdvanceScheduled(_))));
        assert_eq!(session.course_progress().completed, 1);
    }

    #[test]
    fn test_stale_media_events_are_ignored() {
        let (_, mut session) = session();
        session.select_lesson("l2");
        let events =
            session.handle_media_event("l1", MediaEvent::TimeAdvanced { current_time: 170.0 });
        assert!(events.is_empty());
        assert_eq!(session.current_time(), 0.0);
    }

    #[test]
    fn test_cue_changes_are_reported() {
        let (_, mut session) = session();
        let events = play_through(&mut session, 40.0);
        let cue_changes: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::CueChanged { index } => Some(*index),
                _ => None,
            })
            .collect();
        assert_eq!(cue_changes.first(), Some(&Some(0)));
        assert!(cue_changes.windows(2).all(|w| w[0] != w[1]));
    }

    #[test]
    fn test_lesson_status_precedence() {
        let (_, mut session) = session();
        play_through(&mut session, 180.0);
        let course = session.course().clone();
        let status = |id: &str| session.lesson_status(course.lesson(id).unwrap());
        assert_eq!(status("l1"), LessonStatus::Current);
        assert_eq!(status("l2"), LessonStatus::Available);
        assert_eq!(status("l5"), LessonStatus::Locked);

        session.select_lesson("l2");
        let status = |id: &str| session.lesson_status(course.lesson(id).unwrap());
        assert_eq!(status("l1"), LessonStatus::Completed);
        assert_eq!(status("l2"), LessonStatus::Current);
    }

    #[test]
    fn test_course_progress() {
        let progress = CourseProgress {
            completed: 1,
            unlocked_total: 4,
        };
        assert_eq!(progress.percent(), 25.0);
        assert!(!progress.is_complete());
        assert_eq!(
            CourseProgress {
                completed: 0,
                unlocked_total: 0
            }
            .percent(),
            0.0
        );
        assert!(CourseProgress {
            completed: 4,
            unlocked_total: 4
        }
        .is_complete());
    }

    #[test]
    fn test_media_error_surfaces_and_clears() {
        let (_, mut session) = session();
        let events = session.handle_media_event(
            "l1",
            MediaEvent::Error {
                message: "network".to_string(),
            },
        );
        assert_eq!(
            events,
            vec![SessionEvent::MediaFailed {
                message: "network".to_string()
            }]
        );
        assert!(session.media_error().is_some());
        session.clear_media_error();
        assert!(session.media_error().is_none());
    }
}
