//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::RescaleService;
use crate::config::Settings;
use crate::infrastructure::traits::{FileSystem, Prompter, RealFileSystem, StdinPrompter};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Interactive prompt abstraction
    pub prompter: Arc<dyn Prompter>,

    pub rescale: RescaleService,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem), Arc::new(StdinPrompter))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        prompter: Arc<dyn Prompter>,
    ) -> Self {
        let settings = Arc::new(settings);
        let rescale = RescaleService::new(fs);

        Self {
            settings,
            prompter,
            rescale,
        }
    }
}
