pub mod clock;
pub mod number_source;
pub mod registry;
pub mod settlement;
pub mod types;
pub mod vrf_engine;

pub use clock::{Clock, ManualClock, SystemClock};
pub use number_source::{Draw, FixedNumberSource, NumberSource, RandomNumberSource};
pub use registry::SessionRegistry;
pub use settlement::SettlementSummary;
pub use types::*;
pub use vrf_engine::VRFGameEngine;
