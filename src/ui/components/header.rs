use dioxus::prelude::*;

use super::use_session;

#[component]
pub fn Header() -> Element {
    let session = use_session();
    let course_title = use_memo(move || session.read().course().title.clone());

    rsx! {
        header { class: "header",
            h1 { class: "header-title", "{course_title}" }
            nav { class: "header-nav",
                "Home > My Courses > "
                span { class: "header-nav-current", "{course_title}" }
            }
        }
    }
}

#[component]
pub fn Breadcrumbs(course_title: String, lesson_title: String) -> Element {
    rsx! {
        nav { class: "breadcrumbs",
            span { class: "breadcrumb-link", "Courses" }
            span { class: "breadcrumb-sep", "/" }
            span { class: "breadcrumb-link", "{course_title}" }
            span { class: "breadcrumb-sep", "/" }
            span { class: "breadcrumb-current", "{lesson_title}" }
        }
    }
}
