use dioxus::prelude::*;

use super::{
    use_session, Breadcrumbs, ChapterMarkers, CourseProgressCard, LessonTabs, LessonsSidebar,
    VideoPlayer,
};

/// Player column plus the lessons sidebar
#[component]
pub fn LessonPage() -> Element {
    let session = use_session();
    let course_title = use_memo(move || session.read().course().title.clone());
    let lesson_title = use_memo(move || session.read().current_lesson().title.clone());

    rsx! {
        main { class: "lesson-page",
            div { class: "lesson-main",
                Breadcrumbs { course_title: course_title(), lesson_title: lesson_title() }
                VideoPlayer {}
                ChapterMarkers {}
                LessonTabs {}
                CourseProgressCard {}
            }
            LessonsSidebar {}
        }
    }
}
