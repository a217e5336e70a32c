use dioxus::prelude::*;

use super::use_session;

#[component]
pub fn CourseProgressCard() -> Element {
    let session = use_session();
    let progress = use_memo(move || session.read().course_progress());

    let progress = progress();
    let percent = progress.percent();
    let badge = if progress.is_complete() {
        "Completed".to_string()
    } else {
        format!("{:.0}% Completed", percent)
    };

    rsx! {
        div { class: "card course-progress",
            div { class: "course-progress-header",
                span { "Course progress" }
                span { class: if progress.is_complete() { "badge badge-done" } else { "badge" }, "{badge}" }
            }
            div { class: "progress-track",
                div { class: "progress-fill", style: "width: {percent}%;" }
            }
            p { class: "course-progress-count",
                "{progress.completed} of {progress.unlocked_total} lessons"
            }
        }
    }
}
