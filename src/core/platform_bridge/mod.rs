//=========================================================================
// Platform Bridge
//=========================================================================
//
// Bridges the platform layer (winit) with the core thread.
//
// Components:
// - `interface`: event and error types (the contract)
// - `event_collector`: core-side draining of the bridge channel
//
//=========================================================================

//=== Module Declarations =================================================

pub(crate) mod event_collector;
pub(crate) mod interface;

//=== Public API ==========================================================

pub use event_collector::{EventCollector, TickControl};
pub use interface::{PlatformError, PlatformEvent};
