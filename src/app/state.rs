use std::sync::Arc;

use crate::app::config::Config;
use crate::services::OverlayService;

pub struct AppState {
    pub service: Arc<OverlayService>,
    pub config: Config,
}

impl AppState {
    pub fn new(service: Arc<OverlayService>, config: Config) -> Self {
        Self { service, config }
    }
}
