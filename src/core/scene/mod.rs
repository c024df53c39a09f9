//=========================================================================
// Scene
//=========================================================================
//
// Per-frame coordination of one game screen.
//
// Architecture:
//   Scene
//     ├─ event_context: EventContext<Scene>   (supplied by the owner)
//     ├─ sprites: Option<SpriteRegistry>      (None until init)
//     ├─ overlaps: OverlapRegistry
//     ├─ physics: Box<dyn PhysicsEngine>
//     ├─ camera / background / screen
//     ├─ forever: GameForeverHandlers
//     ├─ data: SceneData                      (extension state)
//     └─ console: ConsoleHandle               (shared with other scenes)
//
// Frame (one EventContext dispatch):
//   8 controller → 13 controlled sprites → 14 camera follow
//   → 15 physics + sprite update → 19 intervals → 20 update + forever
//   → 90 render → 150 diagnostics + flag reset → 200 screen flush
//
// Lifecycle: new() → init() (idempotent) → tick()* → destroy(self)
//
//=========================================================================

//=== External Dependencies ===============================================

use std::rc::Rc;
use std::time::Duration;

use log::{debug, warn};

//=== Internal Dependencies ===============================================

use crate::core::console::{Console, ConsoleHandle};
use crate::core::controller::{move_controlled_sprites, ControlledSprite};
use crate::core::diagnostics::Diagnostics;
use crate::core::overlap::OverlapRegistry;
use crate::core::physics::{OverlapPhysics, PhysicsEngine, PhysicsWorld};
use crate::core::render::{Background, Camera, Image, Rect};
use crate::core::scheduler::{priority, EventContext};
use crate::core::sprite::{SpriteId, SpriteLike, SpriteRegistry};
use crate::core::time::FrameTime;

//=== Module Declarations =================================================

mod data;
mod flags;
mod forever;
mod initializers;
mod transition;

//=== Public API ==========================================================

pub use data::{SceneData, SceneExtension};
pub use flags::SceneFlags;
pub use forever::{ForeverBody, ForeverStep, GameForeverHandlers};
pub use initializers::{SceneInitializer, SceneInitializers};
pub use transition::{SceneSetup, SceneTransition, TransitionQueue};

//=== SceneConfig =========================================================

/// Per-scene settings applied at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub screen_width: u32,
    pub screen_height: u32,

    /// Collect [`FrameStats`](crate::core::diagnostics::FrameStats) every frame.
    pub stats: bool,

    /// Draw physics debug visualization after rendering.
    pub debug: bool,

    /// World extent for edge collisions. `None` disables them.
    pub world_bounds: Option<Rect>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            screen_width: 160,
            screen_height: 120,
            stats: false,
            debug: false,
            world_bounds: None,
        }
    }
}

//=== Hook Types ==========================================================

/// Priority-20 update hook, receives the frame delta in seconds.
pub type UpdateHook = Box<dyn FnMut(&mut Scene, f32)>;

struct IntervalHook {
    period_ms: f64,
    last_ms: f64,
    body: Box<dyn FnMut(&mut Scene)>,
}

//=== Scene ===============================================================

pub struct Scene {
    event_context: EventContext<Scene>,
    background: Background,
    camera: Camera,
    sprites: Option<SpriteRegistry>,
    overlaps: OverlapRegistry,
    physics: Box<dyn PhysicsEngine>,
    controlled: Vec<ControlledSprite>,
    forever: GameForeverHandlers,
    update_hooks: Vec<UpdateHook>,
    interval_hooks: Vec<IntervalHook>,
    flags: SceneFlags,
    millis: f64,
    data: SceneData,
    screen: Image,
    cached_render: Option<Rc<Image>>,
    /// `screen` holds a finished frame that `render()` may snapshot as is.
    frame_drawn: bool,
    console: ConsoleHandle,
    initializers: SceneInitializers,
    diagnostics: Diagnostics,
    world_bounds: Option<Rect>,
    transitions: TransitionQueue,
}

impl Scene {
    //--- Construction -----------------------------------------------------

    /// Creates a dormant scene. Nothing runs until [`init`](Self::init).
    ///
    /// The event context is owned by the scene from here on but is built
    /// by the caller, so hosts can pre-register their own handlers.
    pub fn new(
        event_context: EventContext<Scene>,
        config: SceneConfig,
        console: ConsoleHandle,
        initializers: SceneInitializers,
    ) -> Self {
        Self {
            event_context,
            background: Background::new(),
            camera: Camera::new(config.screen_width, config.screen_height),
            sprites: None,
            overlaps: OverlapRegistry::new(),
            physics: Box::new(OverlapPhysics::new()),
            controlled: Vec::new(),
            forever: GameForeverHandlers::new(),
            update_hooks: Vec::new(),
            interval_hooks: Vec::new(),
            flags: SceneFlags::EMPTY,
            millis: 0.0,
            data: SceneData::new(),
            screen: Image::new(config.screen_width, config.screen_height),
            cached_render: None,
            frame_drawn: false,
            console,
            initializers,
            diagnostics: Diagnostics::new(config.stats, config.debug),
            world_bounds: config.world_bounds,
            transitions: TransitionQueue::new(),
        }
    }

    /// Scene with its own headless console and no initializers.
    pub fn detached(config: SceneConfig) -> Self {
        Self::new(
            EventContext::new(),
            config,
            Console::headless().into_handle(),
            SceneInitializers::new(),
        )
    }

    //--- Lifecycle --------------------------------------------------------

    /// Wires the frame handlers and runs the scene initializers.
    ///
    /// Calling `init` again is a no-op.
    pub fn init(&mut self) {
        if self.sprites.is_some() {
            return;
        }
        self.sprites = Some(SpriteRegistry::new());

        let events = &mut self.event_context;

        events.register_frame_handler(priority::CONTROLLER, |scene: &mut Scene, frame: &FrameTime| {
            scene.millis += frame.dt_millis();
            scene.console.borrow_mut().update(frame.dt);
        });

        events.register_frame_handler(priority::CONTROLLER_SPRITES, |scene: &mut Scene, _: &FrameTime| {
            let console = scene.console.borrow();
            if let Some(sprites) = scene.sprites.as_mut() {
                move_controlled_sprites(console.controller(), &scene.controlled, sprites);
            }
        });

        events.register_frame_handler(priority::FOLLOW_SPRITE, |scene: &mut Scene, _: &FrameTime| {
            scene.follow_pass();
        });

        events.register_frame_handler(priority::PHYSICS, |scene: &mut Scene, frame: &FrameTime| {
            scene.physics_pass(frame.dt);
        });

        events.register_frame_handler(priority::UPDATE_INTERVAL, |scene: &mut Scene, _: &FrameTime| {
            scene.run_interval_hooks();
        });

        events.register_frame_handler(priority::UPDATE, |scene: &mut Scene, frame: &FrameTime| {
            scene.run_update_hooks(frame.dt);
            GameForeverHandlers::run(scene);
        });

        events.register_frame_handler(priority::RENDER_SPRITES, |scene: &mut Scene, _: &FrameTime| {
            scene.cached_render = None;
            scene.render_core();
            scene.frame_drawn = true;
        });

        events.register_frame_handler(priority::RENDER_DIAGNOSTICS, |scene: &mut Scene, frame: &FrameTime| {
            scene.diagnostics_pass(frame);
        });

        events.register_frame_handler(priority::UPDATE_SCREEN, |scene: &mut Scene, _: &FrameTime| {
            scene.console.borrow_mut().present(&scene.screen);
        });

        debug!(target: "scene", "Scene initialized, running {} initializer(s)", self.initializers.len());

        let initializers = self.initializers.clone();
        initializers.run_all(self);
    }

    pub fn is_initialized(&self) -> bool {
        self.sprites.is_some()
    }

    /// Runs one frame: every registered handler once, in priority order.
    pub fn tick(&mut self, frame: &FrameTime) {
        EventContext::dispatch(self, |scene| &mut scene.event_context, frame);
    }

    /// Releases the scene and everything it owns.
    ///
    /// Handlers are not deregistered; they are dropped with the scene's
    /// event context.
    pub fn destroy(self) {
        debug!(
            target: "scene",
            "Destroying scene ({} sprite(s), {} handler(s))",
            self.sprite_count(),
            self.event_context.handler_count()
        );
    }

    //--- Rendering --------------------------------------------------------

    /// Current frame, overlays included. Cached until the next render pass
    /// invalidates it.
    pub fn render(&mut self) -> Rc<Image> {
        if let Some(cached) = &self.cached_render {
            return Rc::clone(cached);
        }

        if !self.frame_drawn {
            self.render_core();
            self.frame_drawn = true;
        }
        let frame = Rc::new(self.screen.clone());
        self.cached_render = Some(Rc::clone(&frame));
        frame
    }

    /// Frame buffer as last drawn (including debug overlays).
    pub fn screen(&self) -> &Image {
        &self.screen
    }

    /// Re-sort sprites by (z, id) before the next draw.
    pub fn request_sorting(&mut self) {
        self.flags.insert(SceneFlags::NEEDS_SORTING);
    }

    pub fn flags(&self) -> SceneFlags {
        self.flags
    }

    pub fn flags_mut(&mut self) -> &mut SceneFlags {
        &mut self.flags
    }

    //--- Sprites ----------------------------------------------------------

    /// Registers a sprite and returns its id, or `None` before `init`.
    pub fn add_sprite(&mut self, sprite: Box<dyn SpriteLike>) -> Option<SpriteId> {
        let Some(sprites) = self.sprites.as_mut() else {
            warn!(target: "scene", "add_sprite called before init, sprite dropped");
            return None;
        };
        Some(sprites.add(sprite))
    }

    /// Registers a sprite and fires the created handlers of its kind.
    pub fn create_sprite(&mut self, sprite: Box<dyn SpriteLike>) -> Option<SpriteId> {
        let id = self.add_sprite(sprite)?;
        if let Some(sprite) = self.sprites.as_mut().and_then(|sprites| sprites.get_mut(id)) {
            self.overlaps.fire_created(sprite);
        }
        Some(id)
    }

    /// Queues the sprite for removal at the start of the next physics pass.
    pub fn destroy_sprite(&mut self, id: SpriteId) {
        if let Some(sprites) = self.sprites.as_mut() {
            sprites.queue_removal(id);
        }
    }

    pub fn sprites(&self) -> Option<&SpriteRegistry> {
        self.sprites.as_ref()
    }

    pub fn sprites_mut(&mut self) -> Option<&mut SpriteRegistry> {
        self.sprites.as_mut()
    }

    pub fn sprite_count(&self) -> usize {
        self.sprites.as_ref().map_or(0, SpriteRegistry::len)
    }

    pub fn overlaps(&self) -> &OverlapRegistry {
        &self.overlaps
    }

    pub fn overlaps_mut(&mut self) -> &mut OverlapRegistry {
        &mut self.overlaps
    }

    pub fn set_physics_engine(&mut self, physics: Box<dyn PhysicsEngine>) {
        self.physics = physics;
    }

    pub fn set_world_bounds(&mut self, bounds: Option<Rect>) {
        self.world_bounds = bounds;
    }

    /// Drives the sprite's velocity from the dpad. Replaces any earlier
    /// binding of the same sprite.
    pub fn move_sprite_with_buttons(&mut self, id: SpriteId, vx: f32, vy: f32) {
        self.controlled.retain(|binding| binding.id != id);
        self.controlled.push(ControlledSprite { id, vx, vy });
    }

    /// Keeps the camera centered on the sprite.
    pub fn follow(&mut self, id: SpriteId) {
        self.camera.follow(id);
    }

    //--- Hooks ------------------------------------------------------------

    /// Runs `hook` every frame at the update priority.
    pub fn on_update<F>(&mut self, hook: F)
    where
        F: FnMut(&mut Scene, f32) + 'static,
    {
        self.update_hooks.push(Box::new(hook));
    }

    /// Runs `body` whenever at least `period` of scene time has passed
    /// since its last run.
    pub fn on_update_interval<F>(&mut self, period: Duration, body: F)
    where
        F: FnMut(&mut Scene) + 'static,
    {
        self.interval_hooks.push(IntervalHook {
            period_ms: period.as_secs_f64() * 1000.0,
            last_ms: self.millis,
            body: Box::new(body),
        });
    }

    /// Adds a forever handler driven at the update priority.
    pub fn add_forever<F>(&mut self, body: F)
    where
        F: FnMut(&mut Scene) -> ForeverStep + 'static,
    {
        self.forever.add(body);
    }

    pub fn forever(&self) -> &GameForeverHandlers {
        &self.forever
    }

    fn forever_mut(&mut self) -> &mut GameForeverHandlers {
        &mut self.forever
    }

    //--- Transitions ------------------------------------------------------

    /// Queues a stack operation applied by the game after this frame.
    pub fn request_transition(&mut self, transition: SceneTransition) {
        self.transitions.push(transition);
    }

    pub(crate) fn take_transitions(&mut self) -> Vec<SceneTransition> {
        self.transitions.take()
    }

    //--- Accessors --------------------------------------------------------

    /// Scene time in ms, advanced by the controller handler.
    pub fn millis(&self) -> f64 {
        self.millis
    }

    pub fn data(&self) -> &SceneData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut SceneData {
        &mut self.data
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn background_mut(&mut self) -> &mut Background {
        &mut self.background
    }

    pub fn console(&self) -> &ConsoleHandle {
        &self.console
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    pub fn event_context(&self) -> &EventContext<Scene> {
        &self.event_context
    }

    /// Lets the owner register extra frame handlers.
    pub fn event_context_mut(&mut self) -> &mut EventContext<Scene> {
        &mut self.event_context
    }

    //--- Frame Passes -----------------------------------------------------

    fn follow_pass(&mut self) {
        let (Some(id), Some(sprites)) = (self.camera.followed(), self.sprites.as_ref()) else {
            return;
        };
        if let Some(bounds) = sprites.get(id).and_then(|sprite| sprite.bounds()) {
            let (x, y) = bounds.center();
            self.camera.center_on(x, y);
        }
    }

    fn physics_pass(&mut self, dt: f32) {
        let Some(sprites) = self.sprites.as_mut() else {
            return;
        };

        let removed = sprites.drain_removals();
        for mut sprite in removed {
            let id = sprite.id();
            self.overlaps.fire_destroyed(sprite.as_mut());
            self.controlled.retain(|binding| binding.id != id);
            if self.camera.followed() == Some(id) {
                self.camera.stop_following();
            }
        }

        self.physics.step(
            PhysicsWorld {
                sprites: &mut *sprites,
                overlaps: &mut self.overlaps,
                bounds: self.world_bounds,
            },
            dt,
        );

        self.camera.update();
        for sprite in sprites.iter_mut() {
            sprite.update(&self.camera, dt);
        }
    }

    fn run_interval_hooks(&mut self) {
        let mut hooks = std::mem::take(&mut self.interval_hooks);
        for hook in hooks.iter_mut() {
            if self.millis - hook.last_ms >= hook.period_ms {
                hook.last_ms = self.millis;
                (hook.body)(self);
            }
        }
        hooks.append(&mut self.interval_hooks);
        self.interval_hooks = hooks;
    }

    fn run_update_hooks(&mut self, dt: f32) {
        let mut hooks = std::mem::take(&mut self.update_hooks);
        for hook in hooks.iter_mut() {
            hook(self, dt);
        }
        hooks.append(&mut self.update_hooks);
        self.update_hooks = hooks;
    }

    fn render_core(&mut self) {
        self.background.draw(&self.camera, &mut self.screen);

        let Some(sprites) = self.sprites.as_mut() else {
            return;
        };
        if self.flags.contains(SceneFlags::NEEDS_SORTING) {
            sprites.sort_by_z();
        }
        for sprite in sprites.iter().filter(|sprite| !sprite.is_destroyed()) {
            sprite.draw(&self.camera, &mut self.screen);
        }
    }

    fn diagnostics_pass(&mut self, frame: &FrameTime) {
        let sprite_count = self.sprite_count();
        self.diagnostics.record(frame, sprite_count, self.millis);

        if self.diagnostics.debug_enabled() {
            if let Some(sprites) = self.sprites.as_ref() {
                self.physics.draw(sprites, &self.camera, &mut self.screen);
                self.cached_render = None;
            }
        }

        self.flags.clear();
        self.console.borrow_mut().check_deep_sleep();
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
