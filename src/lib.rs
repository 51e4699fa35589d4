pub mod api;
pub mod backend;
pub mod cli;
pub mod client;
pub mod config;
pub mod models;
pub mod session;

use config::Config;
use std::sync::Arc;

use crate::backend::Backend;

pub struct AppState {
    pub config: Config,
    pub backend: Arc<dyn Backend>,
}

impl AppState {
    pub fn new(config: Config, backend: Arc<dyn Backend>) -> Self {
        Self { config, backend }
    }
}
