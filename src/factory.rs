//! Registry construction from configuration
//!
//! Keeps the wiring of clock and number source in one place for the binary
//! and integration tests.

use crate::{
    config::{GameConfig, NumberSourceKind},
    games::{
        clock::{Clock, SystemClock},
        number_source::{NumberSource, RandomNumberSource},
        registry::SessionRegistry,
        vrf_engine::VRFGameEngine,
    },
};
use std::sync::Arc;
use tracing::info;

/// Factory for session registries
pub struct RegistryFactory;

impl RegistryFactory {
    /// Registry on the system clock with the configured number source
    pub fn create_registry(config: GameConfig) -> Arc<SessionRegistry> {
        Self::create_registry_with_clock(config, Arc::new(SystemClock))
    }

    pub fn create_registry_with_clock(
        config: GameConfig,
        clock: Arc<dyn Clock>,
    ) -> Arc<SessionRegistry> {
        let numbers = Self::number_source(config.number_source);
        info!(number_source = numbers.name(), "Creating session registry");
        Arc::new(SessionRegistry::new(config, clock, numbers))
    }

    pub fn number_source(kind: NumberSourceKind) -> Arc<dyn NumberSource> {
        match kind {
            NumberSourceKind::Random => Arc::new(RandomNumberSource),
            NumberSourceKind::Vrf => {
                let engine = VRFGameEngine::new_random();
                info!(public_key = %engine.public_key_hex(), "Generated VRF keypair");
                Arc::new(engine)
            }
        }
    }
}
