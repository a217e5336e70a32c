use lectern::catalog::Course;
use lectern::config::Config;
use lectern::storage::{FileStore, MemoryStore, SharedStore};
use lectern::ui::{make_config, App};
use lectern::AppContext;
use std::sync::Arc;
use tracing::{error, info, warn};

fn main() {
    // Use RUST_LOG env var if set, otherwise default to info level
    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt().with_env_filter(log_filter).init();

    info!("Starting lectern");

    let config = Config::load();

    let course = match &config.course_path {
        Some(path) => Course::from_path(path),
        None => Course::embedded(),
    };
    let course = match course {
        Ok(course) => Arc::new(course),
        Err(e) => {
            error!("Failed to load course catalog: {}", e);
            std::process::exit(1);
        }
    };

    let store = open_store(&config);

    let context = AppContext {
        config,
        course,
        store,
    };

    dioxus::LaunchBuilder::desktop()
        .with_cfg(make_config())
        .with_context(context)
        .launch(App);
}

/// File-backed store, or an in-memory one if the file can't be used
fn open_store(config: &Config) -> SharedStore {
    let path = match config.resolve_storage_path() {
        Ok(path) => path,
        Err(e) => {
            warn!("{}, notes and resume positions won't persist", e);
            return Arc::new(MemoryStore::new());
        }
    };

    match FileStore::open(&path) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!(
                "Could not open store at {}: {}, notes and resume positions won't persist",
                path.display(),
                e
            );
            Arc::new(MemoryStore::new())
        }
    }
}
