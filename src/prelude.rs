//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use arcade_engine::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Engine facade
pub use crate::engine::{Engine, EngineBuilder, EngineError};

// Game and scenes
pub use crate::core::game::Game;
pub use crate::core::scene::{ForeverStep, Scene, SceneConfig, SceneFlags, SceneTransition};

// Sprites and interactions
pub use crate::core::overlap::CollisionSide;
pub use crate::core::sprite::{Sprite, SpriteId, SpriteKind, SpriteLike};

// Rendering
pub use crate::core::render::{Image, Rect, ScreenSink};

// Input
pub use crate::core::controller::Button;

// Serial
pub use crate::serial::{Delimiter, Serial};
