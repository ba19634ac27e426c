use std::sync::Arc;

use crate::config::Config;
use crate::core::Coordinator;

#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<Coordinator>,
    pub config: Arc<Config>,
}
