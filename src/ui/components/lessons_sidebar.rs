use dioxus::prelude::*;

use super::use_session;
use crate::catalog::Lesson;
use crate::format::format_time;
use crate::session::{LessonStatus, SelectOutcome};

/// Lesson list with per-lesson status and the unlocked-lessons progress bar.
/// Slides in as an overlay on narrow windows.
#[component]
pub fn LessonsSidebar() -> Element {
    let mut session = use_session();

    let rows = use_memo(move || {
        let session = session.read();
        session
            .course()
            .lessons
            .iter()
            .map(|lesson| (lesson.clone(), session.lesson_status(lesson)))
            .collect::<Vec<_>>()
    });
    let progress = use_memo(move || session.read().course_progress());
    let is_open = use_memo(move || session.read().sidebar_open());

    let percent = progress().percent();

    rsx! {
        button {
            class: "sidebar-toggle",
            onclick: move |_| session.write().toggle_sidebar(),
            "☰"
        }
        if is_open() {
            div {
                class: "sidebar-overlay",
                onclick: move |_| session.write().close_sidebar(),
            }
        }
        aside { class: if is_open() { "sidebar sidebar-open" } else { "sidebar" },
            div { class: "sidebar-header",
                h2 { "Lessons" }
                button {
                    class: "sidebar-close",
                    onclick: move |_| session.write().close_sidebar(),
                    "✕"
                }
            }
            div { class: "lesson-list",
                for (lesson, status) in rows() {
                    LessonRow { key: "{lesson.id}", lesson, status }
                }
            }
            div { class: "sidebar-progress",
                div { class: "sidebar-progress-label",
                    span { "Progress" }
                    span { "{progress().completed} / {progress().unlocked_total}" }
                }
                div { class: "progress-track",
                    div { class: "progress-fill progress-fill-done", style: "width: {percent}%;" }
                }
            }
        }
    }
}

#[component]
fn LessonRow(lesson: Lesson, status: LessonStatus) -> Element {
    let mut session = use_session();
    let locked = status == LessonStatus::Locked;
    let lesson_id = lesson.id.clone();

    let (row_class, icon) = match status {
        LessonStatus::Current => ("lesson-row lesson-current", "●"),
        LessonStatus::Completed => ("lesson-row lesson-completed", "✓"),
        LessonStatus::Locked => ("lesson-row lesson-locked", "🔒"),
        LessonStatus::Available => ("lesson-row", "○"),
    };

    rsx! {
        button {
            class: row_class,
            disabled: locked,
            onclick: move |_| {
                if session.write().select_lesson(&lesson_id) != SelectOutcome::Switched {
                    tracing::debug!("Lesson {} not selectable", lesson_id);
                }
            },
            span { class: "lesson-icon", "{icon}" }
            div { class: "lesson-row-body",
                h3 { class: "lesson-row-title", "{lesson.title}" }
                p { class: "lesson-row-duration", "{format_time(lesson.duration_sec)}" }
            }
        }
    }
}
