use cinevision::{AnalysisService, Config};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub service: AnalysisService,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(service: AnalysisService, max_body_bytes: usize) -> Self {
        Self {
            service,
            max_body_bytes,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(AnalysisService::from_config(config), config.max_body_bytes)
    }
}
