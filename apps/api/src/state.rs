use std::sync::Arc;

use crate::auth::AuthProvider;
use crate::concurrency::{InFlight, UserLocks};
use crate::generation::generator::ContentGenerator;
use crate::resume::store::ResumeStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ResumeStore>,
    pub auth: Arc<dyn AuthProvider>,
    /// Offline or live, fixed at startup.
    pub generator: ContentGenerator,
    /// Serializes create/save per user.
    pub user_locks: UserLocks,
    /// At most one generation per user.
    pub in_flight: InFlight,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ResumeStore>,
        auth: Arc<dyn AuthProvider>,
        generator: ContentGenerator,
    ) -> Self {
        Self {
            store,
            auth,
            generator,
            user_locks: UserLocks::default(),
            in_flight: InFlight::default(),
        }
    }
}
