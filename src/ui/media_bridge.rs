use crate::playback::{MediaError, MediaEvent, PlaybackControl};
use crate::session::{auto_advance, LessonSession, SessionEvent};
use dioxus::prelude::*;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub const VIDEO_ELEMENT_ID: &str = "lesson-video";

pub type SessionSignal = Signal<LessonSession<WebviewMedia>>;

/// Attaches listeners to the lesson `<video>` and forwards its events.
///
/// Every message carries the lesson id read from `data-lesson` at dispatch
/// time, so events from a source that was just replaced can be told apart.
const LISTENER_SCRIPT: &str = r#"
const attach = (video) => {
    const lesson = () => video.dataset.lesson;
    video.addEventListener("loadstart", () =>
        dioxus.send({ kind: "load_start", lesson: lesson() }));
    video.addEventListener("loadedmetadata", () =>
        dioxus.send({ kind: "metadata_ready", lesson: lesson(), duration: video.duration }));
    video.addEventListener("timeupdate", () =>
        dioxus.send({ kind: "time_advanced", lesson: lesson(), current_time: video.currentTime }));
    video.addEventListener("pause", () =>
        dioxus.send({ kind: "paused", lesson: lesson(), current_time: video.currentTime }));
    video.addEventListener("error", () => {
        const err = video.error;
        dioxus.send({
            kind: "error",
            lesson: lesson(),
            message: err ? (err.message || "media error " + err.code) : "unknown media error",
        });
    });
    video.addEventListener("lectern-play-rejected", (e) =>
        dioxus.send({ kind: "play_rejected", lesson: lesson(), message: String(e.detail) }));
    window.addEventListener("beforeunload", () => dioxus.send({ kind: "unload" }));
    // Metadata may already be in by the time listeners are attached
    if (video.readyState >= 1) {
        dioxus.send({ kind: "metadata_ready", lesson: lesson(), duration: video.duration });
    }
};
const find = () => {
    const video = document.getElementById("{id}");
    if (video) {
        attach(video);
    } else {
        requestAnimationFrame(find);
    }
};
find();
await new Promise(() => {});
"#;

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum BridgeMessage {
    LoadStart {
        lesson: String,
    },
    MetadataReady {
        lesson: String,
        duration: Option<f64>,
    },
    TimeAdvanced {
        lesson: String,
        current_time: f64,
    },
    Paused {
        lesson: String,
        current_time: f64,
    },
    Error {
        lesson: String,
        message: String,
    },
    PlayRejected {
        lesson: String,
        message: String,
    },
    Unload,
}

impl BridgeMessage {
    /// Split into the source lesson and the media event, if it is one
    fn into_media_event(self) -> Option<(String, MediaEvent)> {
        let pair = match self {
            BridgeMessage::LoadStart { lesson } => (lesson, MediaEvent::LoadStart),
            BridgeMessage::MetadataReady { lesson, duration } => {
                (lesson, MediaEvent::MetadataReady { duration })
            }
            BridgeMessage::TimeAdvanced {
                lesson,
                current_time,
            } => (lesson, MediaEvent::TimeAdvanced { current_time }),
            BridgeMessage::Paused {
                lesson,
                current_time,
            } => (lesson, MediaEvent::Paused { current_time }),
            BridgeMessage::Error { lesson, message } => (lesson, MediaEvent::Error { message }),
            BridgeMessage::PlayRejected { .. } | BridgeMessage::Unload => return None,
        };
        Some(pair)
    }
}

/// `PlaybackControl` backed by the webview's `<video>` element
#[derive(Debug, Clone, Default)]
pub struct WebviewMedia;

impl WebviewMedia {
    pub fn new() -> Self {
        Self
    }

    fn run(&self, body: &str) {
        let script = format!(
            "const video = document.getElementById(\"{}\"); if (video) {{ {} }}",
            VIDEO_ELEMENT_ID, body
        );
        let _ = document::eval(&script);
    }

    /// Reload the current source after a load failure
    pub fn reload(&self) {
        debug!("Reloading media element");
        self.run("video.load();");
    }
}

impl PlaybackControl for WebviewMedia {
    fn seek_to(&mut self, time: f64) {
        self.run(&format!("video.currentTime = {};", time));
    }

    fn play(&mut self) {
        // Rejections come back through the listener as play_rejected
        self.run(
            "video.play().catch((e) => video.dispatchEvent(\
             new CustomEvent(\"lectern-play-rejected\", { detail: String(e) })));",
        );
    }

    fn pause(&mut self) {
        self.run("video.pause();");
    }
}

/// Pump media events into the session until the bridge closes
pub async fn listen(mut session: SessionSignal, auto_advance_delay: Duration) {
    let script = LISTENER_SCRIPT.replace("{id}", VIDEO_ELEMENT_ID);
    let mut eval = document::eval(&script);
    info!("Media bridge listening on #{}", VIDEO_ELEMENT_ID);

    loop {
        let message = match eval.recv::<BridgeMessage>().await {
            Ok(message) => message,
            Err(e) => {
                error!("Media bridge closed: {:?}", e);
                break;
            }
        };

        match message {
            BridgeMessage::Unload => {
                session.write().teardown();
                continue;
            }
            BridgeMessage::PlayRejected { lesson, message } => {
                warn!("{} ({})", MediaError::PlayRejected(message), lesson);
                continue;
            }
            other => {
                let Some((lesson, event)) = other.into_media_event() else {
                    continue;
                };
                let events = session.write().handle_media_event(&lesson, event);
                for event in events {
                    if let SessionEvent::AutoAdvanceScheduled(ticket) = event {
                        spawn(async move {
                            let ticket = auto_advance::wait(ticket, auto_advance_delay).await;
                            session.write().fire_auto_advance(&ticket);
                        });
                    }
                }
            }
        }
    }
}
