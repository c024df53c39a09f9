//=========================================================================
// Sprites
//=========================================================================
//
// Sprite capability trait, identifiers, and a ready-made image sprite.
//
// Architecture:
//   SpriteRegistry
//     ├─ sprites: Vec<Box<dyn SpriteLike>>   (registration or (z, id) order)
//     ├─ by_kind: HashMap<SpriteKind, BTreeSet<SpriteId>>
//     └─ pending_removals: Vec<SpriteId>     (drained by the physics pass)
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::render::{Camera, Image, Rect};

//=== Module Declarations =================================================

mod registry;

//=== Public API ==========================================================

pub use registry::SpriteRegistry;

//=== Identifiers =========================================================

/// Scene-unique sprite identifier, assigned by the registry.
///
/// Ids start at 0 and are never reused within a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SpriteId(pub u32);

/// Integer tag classifying sprites for overlap, collision and lifecycle
/// dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpriteKind(pub i32);

//=== SpriteLike ==========================================================

/// Capability set every registered sprite provides.
///
/// Only `id`, `set_id`, `update` and `draw` are required. The remaining
/// hooks default to "no kind, no bounds, never destroyed" so decorative
/// sprites stay small.
pub trait SpriteLike {
    /// Identifier assigned at registration.
    fn id(&self) -> SpriteId;

    /// Called exactly once by the registry.
    fn set_id(&mut self, id: SpriteId);

    /// Render sort key; higher values draw on top.
    fn z(&self) -> f32 {
        0.0
    }

    /// Kind used for overlap and lifecycle dispatch. Read once at
    /// registration.
    fn kind(&self) -> Option<SpriteKind> {
        None
    }

    /// World-space hitbox used by overlap tests and camera follow.
    fn bounds(&self) -> Option<Rect> {
        None
    }

    /// Receives controller-driven velocity.
    fn set_velocity(&mut self, _vx: f32, _vy: f32) {}

    /// Sprites reporting `true` are removed at the start of the next
    /// physics pass.
    fn is_destroyed(&self) -> bool {
        false
    }

    /// Simulation step.
    fn update(&mut self, camera: &Camera, dt: f32);

    /// Render step.
    fn draw(&self, camera: &Camera, target: &mut Image);
}

//=== Sprite ==============================================================

/// Image sprite with a top-left position and a linear velocity.
#[derive(Debug, Clone)]
pub struct Sprite {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub z: f32,
    id: SpriteId,
    kind: Option<SpriteKind>,
    image: Image,
    destroyed: bool,
}

impl Sprite {
    pub fn new(image: Image) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            z: 0.0,
            id: SpriteId::default(),
            kind: None,
            image,
            destroyed: false,
        }
    }

    pub fn with_kind(mut self, kind: SpriteKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn with_z(mut self, z: f32) -> Self {
        self.z = z;
        self
    }

    pub fn image(&self) -> &Image {
        &self.image
    }

    /// Marks the sprite for removal at the next physics pass.
    pub fn destroy(&mut self) {
        self.destroyed = true;
    }
}

impl SpriteLike for Sprite {
    fn id(&self) -> SpriteId {
        self.id
    }

    fn set_id(&mut self, id: SpriteId) {
        self.id = id;
    }

    fn z(&self) -> f32 {
        self.z
    }

    fn kind(&self) -> Option<SpriteKind> {
        self.kind
    }

    fn bounds(&self) -> Option<Rect> {
        Some(Rect::new(
            self.x,
            self.y,
            self.image.width() as f32,
            self.image.height() as f32,
        ))
    }

    fn set_velocity(&mut self, vx: f32, vy: f32) {
        self.vx = vx;
        self.vy = vy;
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    fn update(&mut self, _camera: &Camera, dt: f32) {
        self.x += self.vx * dt;
        self.y += self.vy * dt;
    }

    fn draw(&self, camera: &Camera, target: &mut Image) {
        let (sx, sy) = camera.world_to_screen(self.x, self.y);
        target.draw_transparent(&self.image, sx, sy);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
