//=========================================================================
// Arcade Engine — Library Root
//
// Frame-coordination core for a sprite-based 2D arcade console.
//
// Responsibilities:
// - Expose the engine facade (`EngineBuilder`, `Engine`)
// - Expose `core` (scenes, sprites, scheduler, rendering) for games that
//   drive frames themselves or extend scenes
// - Expose `serial` for line-oriented device I/O
// - Keep `platform` (Winit integration) hidden from end users
//
// Typical usage:
// ```no_run
// use arcade_engine::EngineBuilder;
//
// fn main() -> Result<(), arcade_engine::EngineError> {
//     arcade_engine::logging::init_logging(Default::default());
//     EngineBuilder::new().build().run()
// }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------

pub mod core;
pub mod logging;
pub mod prelude;
pub mod serial;

//--- Internal Modules ----------------------------------------------------
//
// `platform` owns the window and the Winit event loop and is not part of
// the public API surface.
//
mod engine;
mod platform;

//--- Public Exports ------------------------------------------------------

pub use engine::{Engine, EngineBuilder, EngineError};
