//! Application state.

use std::sync::Arc;

use stockroom_core::{CivilClock, LedgerError};
use stockroom_store::Store;

use crate::config::ServiceConfig;
use crate::engine::BorrowEngine;
use crate::notify::{NotificationDispatcher, StoreDispatcher};
use crate::scheduler::ReminderScheduler;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend.
    pub store: Arc<dyn Store>,

    /// The borrow/return engine.
    pub engine: Arc<BorrowEngine>,

    /// Notification dispatcher.
    pub notifier: Arc<dyn NotificationDispatcher>,

    /// Civil wall-clock.
    pub clock: CivilClock,

    /// Service configuration.
    pub config: ServiceConfig,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Configuration`] if the configured civil
    /// offset is invalid.
    pub fn new(
        store: Arc<dyn Store>,
        scheduler: Arc<dyn ReminderScheduler>,
        config: ServiceConfig,
    ) -> Result<Self, LedgerError> {
        let clock = CivilClock::new(config.civil_offset_hours)?;

        if config.gateway_api_key.is_none() {
            tracing::warn!("No gateway API key configured - identity headers are trusted as-is");
        }

        let engine = Arc::new(BorrowEngine::new(
            Arc::clone(&store),
            scheduler,
            clock,
        ));
        let notifier = Arc::new(StoreDispatcher::new(Arc::clone(&store)));

        Ok(Self {
            store,
            engine,
            notifier,
            clock,
            config,
        })
    }
}
