//=========================================================================
// Core Systems
//=========================================================================
//
// Everything that runs on the core (non-platform) thread.
//
// Architecture:
//   CoreRuntime (core thread)
//     └─ Game
//          ├─ Console (controller, power, screen)   shared by scenes
//          └─ Scene stack
//               └─ Scene
//                    ├─ EventContext<Scene>   prioritized frame handlers
//                    ├─ SpriteRegistry        ids, kinds, deferred removal
//                    ├─ OverlapRegistry       kind pairs and handlers
//                    ├─ PhysicsEngine         overlap/edge detection
//                    └─ Camera, Background, cached frame
//
// The platform thread only talks to the runtime through the
// `platform_bridge` channel.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod console;
pub mod controller;
pub mod diagnostics;
pub mod game;
pub mod overlap;
pub mod physics;
pub mod platform_bridge;
pub mod power;
pub mod render;
pub(crate) mod runtime;
pub mod scene;
pub mod scheduler;
pub mod sprite;
pub mod time;

//=== Public API ==========================================================

pub use console::{Console, ConsoleHandle};
pub use controller::{Button, ButtonEvent, ControllerState};
pub use game::Game;
pub use overlap::{CollisionSide, OverlapRegistry};
pub use physics::{OverlapPhysics, PhysicsEngine, PhysicsWorld};
pub use runtime::GameSetup;
pub use scene::{ForeverStep, Scene, SceneConfig, SceneInitializers, SceneTransition};
pub use scheduler::EventContext;
pub use sprite::{Sprite, SpriteId, SpriteKind, SpriteLike, SpriteRegistry};
pub use time::{FrameClock, FrameTime};
