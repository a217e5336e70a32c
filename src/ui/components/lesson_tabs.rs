use dioxus::prelude::*;
use tracing::debug;

use super::use_session;
use crate::format::{format_created_at, format_minutes, format_time};
use crate::notes::NotesState;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Tab {
    Overview,
    Transcript,
    Notes,
}

const SCROLL_ACTIVE_CUE: &str =
    "document.querySelector('.cue-active')?.scrollIntoView({ behavior: 'smooth', block: 'center' });";

#[component]
pub fn LessonTabs() -> Element {
    let session = use_session();
    let mut active_tab = use_signal(|| Tab::Overview);

    let active_cue = use_memo(move || session.read().active_cue());
    let notes_label = use_memo(move || {
        let session = session.read();
        match session.notes_state() {
            NotesState::Ready { .. } => format!("Notes ({})", session.notes().len()),
            _ => "Notes (...)".to_string(),
        }
    });

    // Keep the highlighted cue in view while the transcript is open
    use_effect(move || {
        if active_tab() == Tab::Transcript && active_cue().is_some() {
            let _ = document::eval(SCROLL_ACTIVE_CUE);
        }
    });

    let tab_class = move |tab: Tab| {
        if active_tab() == tab {
            "tab tab-active"
        } else {
            "tab"
        }
    };

    rsx! {
        div { class: "card lesson-tabs",
            div { class: "tab-bar",
                button {
                    class: tab_class(Tab::Overview),
                    onclick: move |_| active_tab.set(Tab::Overview),
                    "Overview"
                }
                button {
                    class: tab_class(Tab::Transcript),
                    onclick: move |_| active_tab.set(Tab::Transcript),
                    "Transcript"
                }
                button {
                    class: tab_class(Tab::Notes),
                    onclick: move |_| active_tab.set(Tab::Notes),
                    "{notes_label}"
                }
            }
            div { class: "tab-body",
                {match active_tab() {
                    Tab::Overview => rsx! { OverviewPanel {} },
                    Tab::Transcript => rsx! { TranscriptPanel {} },
                    Tab::Notes => rsx! { NotesPanel {} },
                }}
            }
        }
    }
}

#[component]
fn OverviewPanel() -> Element {
    let session = use_session();
    let lesson = use_memo(move || session.read().current_lesson().clone());
    let lesson = lesson.read();

    rsx! {
        div { class: "overview",
            h2 { class: "overview-title", "{lesson.title}" }
            p { class: "overview-description", "{lesson.description_or_default()}" }
            div { class: "overview-meta",
                span { "{format_minutes(lesson.duration_sec)}" }
                span { class: "dot" }
                span { "{lesson.instructor_or_default()}" }
            }
        }
    }
}

#[component]
fn TranscriptPanel() -> Element {
    let mut session = use_session();
    let cues = use_memo(move || session.read().transcript().to_vec());
    let active_cue = use_memo(move || session.read().active_cue());

    rsx! {
        div { class: "transcript",
            if cues.read().is_empty() {
                p { class: "empty", "No transcript for this lesson." }
            }
            for (index, cue) in cues().into_iter().enumerate() {
                div {
                    key: "{index}",
                    class: if active_cue() == Some(index) { "cue cue-active" } else { "cue" },
                    onclick: move |_| session.write().seek(cue.at_sec),
                    span { class: "cue-time", "{format_time(cue.at_sec)}" }
                    p { class: "cue-text", "{cue.text}" }
                }
            }
        }
    }
}

#[component]
fn NotesPanel() -> Element {
    let mut session = use_session();
    let mut draft = use_signal(String::new);

    let started = use_memo(move || session.read().has_started());
    let current_time = use_memo(move || session.read().current_time());
    let loading = use_memo(move || !matches!(session.read().notes_state(), NotesState::Ready { .. }));
    let storage_available = use_memo(move || session.read().storage_available());
    let notes = use_memo(move || session.read().sorted_notes());

    let mut submit = move || {
        let text = draft.read().clone();
        match session.write().add_note(&text) {
            Ok(note) => {
                debug!("Added note {} at {:.1}s", note.id, note.timestamp);
                draft.set(String::new());
            }
            Err(e) => debug!("Note not added: {}", e),
        }
    };

    rsx! {
        div { class: "notes",
            if !storage_available() {
                p { class: "notes-warning", "Notes can't be saved on this device and will be lost when you close the player." }
            }
            div { class: "note-form",
                if !started() {
                    div { class: "note-empty",
                        h3 { "Start the video first" }
                        p {
                            "You need to start playing the video before you can add notes. "
                            "Notes are automatically timestamped to the current video position."
                        }
                        ul { class: "note-help",
                            li { "Start playing the video" }
                            li { "Pause at the moment you want to note" }
                            li { "Type your note and click \"Add\"" }
                            li { "Click the timestamp to jump back to that moment" }
                        }
                    }
                } else {
                    div { class: "note-input-row",
                        input {
                            r#type: "text",
                            class: "note-input",
                            placeholder: "Add a note at current time...",
                            value: "{draft}",
                            disabled: loading(),
                            oninput: move |evt| draft.set(evt.value()),
                            onkeydown: move |evt| {
                                if evt.key() == Key::Enter {
                                    submit();
                                }
                            },
                        }
                        button {
                            class: "button button-primary",
                            disabled: draft.read().trim().is_empty() || loading(),
                            onclick: move |_| submit(),
                            "Add"
                        }
                    }
                    p { class: "note-clock", "Current time: {format_time(current_time())}" }
                }
            }
            if loading() {
                p { class: "empty", "Loading notes..." }
            } else {
                div { class: "note-list",
                    for note in notes() {
                        div { key: "{note.id}", class: "note",
                            div { class: "note-body",
                                div { class: "note-meta",
                                    button {
                                        class: "note-time",
                                        onclick: move |_| session.write().seek(note.timestamp),
                                        "{format_time(note.timestamp)}"
                                    }
                                    span { class: "note-date", "{format_created_at(&note.created_at)}" }
                                }
                                p { class: "note-text", "{note.text}" }
                            }
                            button {
                                class: "note-delete",
                                title: "Delete note",
                                onclick: {
                                    let id = note.id.clone();
                                    move |_| {
                                        if let Err(e) = session.write().delete_note(&id) {
                                            debug!("Note not deleted: {}", e);
                                        }
                                    }
                                },
                                "✕"
                            }
                        }
                    }
                }
            }
        }
    }
}
