use dioxus::prelude::*;

use super::use_session;
use crate::format::format_time;
use crate::transcript::ChapterStatus;

#[derive(Clone, PartialEq)]
struct ChapterRow {
    index: usize,
    at_sec: f64,
    label: String,
    status: ChapterStatus,
}

fn chapter_class(status: ChapterStatus) -> &'static str {
    match status {
        ChapterStatus::Active => "chapter chapter-active",
        ChapterStatus::Past => "chapter chapter-past",
        ChapterStatus::Upcoming => "chapter",
    }
}

#[component]
pub fn ChapterMarkers() -> Element {
    let mut session = use_session();

    let rows = use_memo(move || {
        let session = session.read();
        session
            .chapters()
            .iter()
            .enumerate()
            .map(|(index, chapter)| ChapterRow {
                index,
                at_sec: chapter.at_sec,
                label: chapter.label.clone(),
                status: session.chapter_status(index),
            })
            .collect::<Vec<_>>()
    });

    if rows.read().is_empty() {
        return rsx! {};
    }

    rsx! {
        div { class: "chapters",
            h3 { class: "section-title", "Chapters" }
            div { class: "chapter-list",
                for row in rows() {
                    button {
                        key: "{row.index}",
                        class: chapter_class(row.status),
                        onclick: move |_| session.write().seek(row.at_sec),
                        span { class: "chapter-time", "{format_time(row.at_sec)}" }
                        span { class: "chapter-label", "{row.label}" }
                        if row.status == ChapterStatus::Active {
                            div { class: "chapter-pulse" }
                        }
                    }
                }
            }
        }
    }
}
