#![allow(dead_code)]

use lectern::catalog::Course;
use lectern::playback::MediaEvent;
use lectern::session::{AutoAdvanceTicket, LessonSession, SessionEvent};
use lectern::storage::SharedStore;
use lectern::test_support::RecordingControl;
use std::sync::Arc;

/// Initialize tracing for tests with proper test output handling
pub fn tracing_init() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

pub fn new_session(store: SharedStore) -> (RecordingControl, LessonSession<RecordingControl>) {
    let course = Arc::new(Course::embedded().expect("embedded course"));
    let control = RecordingControl::new();
    let session = LessonSession::new(course, control.clone(), store).expect("session");
    (control, session)
}

/// Report metadata for the current lesson using its catalog duration
pub fn load_metadata(session: &mut LessonSession<RecordingControl>) -> Vec<SessionEvent> {
    let lesson = session.current_lesson().clone();
    session.handle_media_event(
        &lesson.id,
        MediaEvent::MetadataReady {
            duration: Some(lesson.duration_sec),
        },
    )
}

/// Feed whole-second time updates from 1s up to `until` for the current lesson
pub fn play_until(session: &mut LessonSession<RecordingControl>, until: f64) -> Vec<SessionEvent> {
    let lesson_id = session.current_lesson_id().to_string();
    let mut events = Vec::new();
    let mut t = 1.0;
    while t <= until {
        events.extend(
            session.handle_media_event(&lesson_id, MediaEvent::TimeAdvanced { current_time: t }),
        );
        t += 1.0;
    }
    events
}

/// Load metadata and play the current lesson to its end
pub fn play_to_end(session: &mut LessonSession<RecordingControl>) -> Vec<SessionEvent> {
    let duration = session.current_lesson().duration_sec;
    load_metadata(session);
    play_until(session, duration)
}

pub fn scheduled_ticket(events: &[SessionEvent]) -> Option<AutoAdvanceTicket> {
    events.iter().find_map(|event| match event {
        SessionEvent::AutoAdvanceScheduled(ticket) => Some(ticket.clone()),
        _ => None,
    })
}
