use std::sync::Arc;

use crate::config::Config;
use crate::ml::classifier::ResumeClassifier;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    /// Built once at startup; retrained artifacts need a restart.
    pub classifier: Arc<ResumeClassifier>,
    pub config: Arc<Config>,
}
