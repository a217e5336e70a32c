use dioxus::prelude::*;
use tracing::error;

use crate::playback::ResumeTicker;
use crate::session::LessonSession;
use crate::ui::components::*;
use crate::ui::media_bridge::{self, SessionSignal, WebviewMedia};
use crate::AppContext;

pub const MAIN_CSS: Asset = asset!("/assets/main.css");

#[cfg(feature = "desktop")]
pub fn make_config() -> dioxus::desktop::Config {
    dioxus::desktop::Config::default().with_window(make_window())
}

#[cfg(feature = "desktop")]
fn make_window() -> dioxus::desktop::WindowBuilder {
    dioxus::desktop::WindowBuilder::new()
        .with_title("lectern")
        .with_always_on_top(false)
        .with_inner_size(dioxus::desktop::LogicalSize::new(1280, 860))
}

#[component]
pub fn App() -> Element {
    let app_context = use_context::<AppContext>();

    let session = use_hook(move || {
        LessonSession::new(
            app_context.course.clone(),
            WebviewMedia::new(),
            app_context.store.clone(),
        )
        .map(Signal::new)
        .map_err(|e| e.to_string())
    });

    let body = match session {
        Ok(session) => rsx! {
            Player { session }
        },
        Err(e) => rsx! {
            div { class: "fatal",
                h1 { "Unable to open the course" }
                p { "{e}" }
            }
        },
    };

    rsx! {
        document::Link { rel: "stylesheet", href: MAIN_CSS }
        {body}
    }
}

/// Wires the session into context and runs the media bridge and resume ticker
#[component]
fn Player(session: SessionSignal) -> Element {
    let app_context = use_context::<AppContext>();
    use_context_provider(|| session);

    let auto_advance_delay = app_context.config.auto_advance_delay;
    use_future(move || media_bridge::listen(session, auto_advance_delay));

    let resume_interval = app_context.config.resume_save_interval;
    use_future(move || async move {
        ResumeTicker::new(resume_interval)
            .run(move || session.read().on_resume_tick())
            .await
    });

    use_drop(move || {
        let mut session = session;
        match session.try_write() {
            Ok(mut session) => session.teardown(),
            Err(e) => error!("Could not tear down session: {:?}", e),
        };
    });

    rsx! {
        div { class: "app",
            Header {}
            LessonPage {}
        }
    }
}
