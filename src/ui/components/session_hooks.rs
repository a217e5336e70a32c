use crate::ui::media_bridge::SessionSignal;
use dioxus::prelude::*;

/// Hook to access the lesson session provided by the player
pub fn use_session() -> SessionSignal {
    use_context::<SessionSignal>()
}
