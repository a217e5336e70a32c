pub mod app;
pub mod app_context;
pub mod components;
pub mod media_bridge;

pub use app::*;
pub use app_context::AppContext;
pub use components::*;

// Re-export constants from app module
pub use app::MAIN_CSS;
