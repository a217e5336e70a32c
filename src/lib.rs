// Library exports for the desktop app and integration tests

// Internal modules needed for compilation (hidden from docs)
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod ui;

// Re-export AppContext at crate root for easier access
pub use ui::AppContext;

pub mod catalog;
pub mod format;
pub mod notes;
pub mod playback;
pub mod session;
pub mod storage;
pub mod transcript;

// Test support (only available with test-utils feature)
#[cfg(any(test, feature = "test-utils"))]
pub mod test_support;
