use dioxus::prelude::*;

use super::use_session;
use crate::format::format_time;
use crate::ui::media_bridge::VIDEO_ELEMENT_ID;

#[component]
pub fn VideoPlayer() -> Element {
    let mut session = use_session();

    let lesson_id = use_memo(move || session.read().current_lesson_id().to_string());
    let src = use_memo(move || session.read().current_lesson().url.clone());
    let error = use_memo(move || session.read().media_error().map(|e| e.to_string()));
    let resume_offer = use_memo(move || session.read().resume_offer());

    rsx! {
        div { class: "video-player",
            div { class: "video-frame",
                video {
                    id: VIDEO_ELEMENT_ID,
                    class: "video",
                    "data-lesson": "{lesson_id}",
                    src: "{src}",
                    controls: true,
                    preload: "metadata",
                }
                if let Some(message) = error() {
                    div { class: "video-error",
                        p { class: "video-error-title", "This lesson's video could not be loaded." }
                        p { class: "video-error-detail", "{message}" }
                        button {
                            class: "button button-primary",
                            onclick: move |_| {
                                session.write().clear_media_error();
                                session.read().control().reload();
                            },
                            "Reload"
                        }
                    }
                }
            }
            if let Some(offer) = resume_offer() {
                div { class: "resume-card",
                    div {
                        p { class: "resume-title", "Resume from {format_time(offer.position)}" }
                        p { class: "resume-hint", "You left off here last time" }
                    }
                    button {
                        class: "button button-primary",
                        onclick: move |_| {
                            session.write().resume();
                        },
                        "Resume"
                    }
                }
            }
        }
    }
}
