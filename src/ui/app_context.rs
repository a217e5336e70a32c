use crate::catalog::Course;
use crate::config;
use crate::storage::SharedStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppContext {
    pub config: config::Config,
    pub course: Arc<Course>,
    pub store: SharedStore,
}
