use std::sync::Arc;

use crate::service::TtsService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<TtsService>,
    /// Map error kinds to HTTP status codes on `/tts` instead of always 200.
    pub strict_status: bool,
}

impl AppState {
    pub fn new(service: TtsService) -> Self {
        Self {
            service: Arc::new(service),
            strict_status: false,
        }
    }

    pub fn with_strict_status(mut self, strict: bool) -> Self {
        self.strict_status = strict;
        self
    }
}
