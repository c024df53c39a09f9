//=========================================================================
// Arcade Engine
//
// Main entry point and coordinator for the engine.
//
// Architecture:
// ```text
//     EngineBuilder  ──build()──>  Engine  ──run()──>  [Runtime]
//         │                          │
//         ├─ with_fps()              ├─ init(): game setup closures
//         ├─ with_screen_size()      └─ run(): spawns core thread,
//         ├─ with_screen()                     runs platform,
//         └─ with_scene_initializer()          blocks until exit
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use std::io;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, Sender};
use log::{error, info};
use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::core::game::Game;
use crate::core::platform_bridge::{PlatformError, PlatformEvent};
use crate::core::render::{Rect, ScreenSink};
use crate::core::runtime::CoreRuntime;
use crate::core::scene::Scene;
use crate::platform::Platform;

//=== EngineError =========================================================

/// Fatal errors surfaced by [`Engine::run`].
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error("failed to spawn core thread: {0}")]
    CoreThreadSpawn(#[source] io::Error),

    #[error("core thread panicked")]
    CoreThreadPanicked,
}

//=== EngineBuilder =======================================================

/// Builder for configuring and constructing an [`Engine`].
///
/// # Default Values
///
/// - **FPS**: 60.0
/// - **Channel capacity**: 128 events
/// - **Screen**: 160x120, discarded (`NullScreen`)
/// - **Stats / debug**: off
/// - **Deep sleep**: never
///
/// # Examples
///
/// ```no_run
/// use arcade_engine::prelude::*;
///
/// EngineBuilder::new()
///     .with_fps(30.0)
///     .with_screen_size(160, 128)
///     .build()
///     .init(|game| {
///         let scene = game.current_scene_mut();
///         let hero = Sprite::new(Image::filled(8, 8, 3)).at(40.0, 40.0);
///         if let Some(id) = scene.add_sprite(Box::new(hero)) {
///             scene.move_sprite_with_buttons(id, 60.0, 60.0);
///         }
///     })
///     .run()
///     .expect("engine failed");
/// ```
pub struct EngineBuilder {
    runtime: CoreRuntime,
    channel_capacity: usize,
    title: String,
}

impl EngineBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            runtime: CoreRuntime::new(),
            channel_capacity: 128,
            title: "Arcade Engine".to_string(),
        }
    }

    //--- Frame Loop -------------------------------------------------------

    /// Sets the target frame rate of the core thread.
    ///
    /// # Panics
    ///
    /// Panics if `fps <= 0.0`.
    pub fn with_fps(mut self, fps: f64) -> Self {
        assert!(fps > 0.0, "FPS must be positive, got {}", fps);
        self.runtime.fps = fps;
        self
    }

    /// Sets the channel capacity for platform → core communication.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Channel capacity must be positive");
        self.channel_capacity = capacity;
        self
    }

    //--- Scene Defaults ---------------------------------------------------

    /// Sets the logical screen size every scene renders at.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn with_screen_size(mut self, width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "Screen size must be non-zero");
        self.runtime.scene_config.screen_width = width;
        self.runtime.scene_config.screen_height = height;
        self
    }

    pub fn with_stats(mut self, enabled: bool) -> Self {
        self.runtime.scene_config.stats = enabled;
        self
    }

    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.runtime.scene_config.debug = enabled;
        self
    }

    /// Enables edge collisions against `bounds`.
    pub fn with_world_bounds(mut self, bounds: Rect) -> Self {
        self.runtime.scene_config.world_bounds = Some(bounds);
        self
    }

    //--- Console ----------------------------------------------------------

    /// Puts the console into deep sleep after `idle` without button input.
    pub fn with_deep_sleep_after(mut self, idle: Duration) -> Self {
        self.runtime.deep_sleep_after = Some(idle);
        self
    }

    /// Sets where finished frames are presented.
    pub fn with_screen<S>(mut self, screen: S) -> Self
    where
        S: ScreenSink + Send + 'static,
    {
        self.runtime.screen = Box::new(screen);
        self
    }

    /// Registers an initializer run on every scene after its built-in
    /// handlers are installed.
    pub fn with_scene_initializer<F>(mut self, initializer: F) -> Self
    where
        F: Fn(&mut Scene) + Send + Sync + 'static,
    {
        self.runtime.initializers.register(initializer);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Builds the engine instance.
    pub fn build(self) -> Engine {
        info!(
            target: "engine",
            "Building engine (FPS: {}, channel: {}, screen: {}x{})",
            self.runtime.fps,
            self.channel_capacity,
            self.runtime.scene_config.screen_width,
            self.runtime.scene_config.screen_height
        );

        Engine {
            runtime: self.runtime,
            channel_capacity: self.channel_capacity,
            title: self.title,
        }
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//=== Engine ==============================================================

/// Arcade engine runtime.
///
/// ```text
/// Engine (Main Thread)
///   ├─► CoreRuntime (Core Thread @ FPS)
///   │     └─► Console, Game, Scenes
///   │
///   └─► Platform (Event Loop)
///         └─► Window, Button Polling
///
/// Communication: crossbeam channel (PlatformEvent)
/// ```
pub struct Engine {
    runtime: CoreRuntime,
    channel_capacity: usize,
    title: String,
}

impl Engine {
    //--- Initialization ---------------------------------------------------

    /// Queues a setup closure run against the [`Game`] on the core thread
    /// before the first frame. May be called more than once; closures run
    /// in call order.
    pub fn init<F>(mut self, init_fn: F) -> Self
    where
        F: FnOnce(&mut Game) + Send + 'static,
    {
        self.runtime.setups.push(Box::new(init_fn));
        self
    }

    //--- Execution --------------------------------------------------------

    /// Starts the engine and blocks until the window closes.
    ///
    /// # Errors
    ///
    /// [`EngineError`] if the core thread cannot be spawned, the platform
    /// event loop fails, or the core thread panics.
    pub fn run(self) -> Result<(), EngineError> {
        info!(target: "engine", "Starting engine runtime (FPS: {})", self.runtime.fps);

        //--- 1. Create communication channel -----------------------------
        let (tx, rx): (Sender<PlatformEvent>, Receiver<PlatformEvent>) =
            bounded(self.channel_capacity);

        //--- 2. Spawn the core thread ------------------------------------
        let (width, height) = (
            self.runtime.scene_config.screen_width,
            self.runtime.scene_config.screen_height,
        );
        let core_handle = self
            .runtime
            .spawn_core_thread(rx)
            .map_err(EngineError::CoreThreadSpawn)?;
        info!(target: "engine", "Core thread spawned");

        //--- 3. Launch the platform subsystem ----------------------------
        let platform = Platform::new(tx, self.title, window_size(width, height));
        let platform_result = platform.run();
        if let Err(e) = &platform_result {
            error!(target: "engine", "Platform error: {}", e);
        }
        info!(target: "engine", "Platform event loop exited");

        //--- 4. Wait for the core thread ---------------------------------
        let core_result = core_handle.join().map_err(|_| {
            error!(target: "engine", "Core thread panicked");
            EngineError::CoreThreadPanicked
        });

        platform_result?;
        core_result?;
        info!(target: "engine", "Engine shutdown complete");
        Ok(())
    }
}

/// Window size for a logical screen: integer-scaled to at least 640 wide.
fn window_size(width: u32, height: u32) -> (u32, u32) {
    let scale = (640 / width.max(1)).max(1);
    (width * scale, height * scale)
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::render::NullScreen;

    //=====================================================================
    // EngineBuilder Tests
    //=====================================================================

    #[test]
    fn builder_defaults() {
        let builder = EngineBuilder::new();
        assert_eq!(builder.runtime.fps, 60.0);
        assert_eq!(builder.channel_capacity, 128);
        assert_eq!(builder.runtime.scene_config.screen_width, 160);
        assert!(builder.runtime.deep_sleep_after.is_none());
    }

    #[test]
    fn builder_with_fps() {
        let builder = EngineBuilder::new().with_fps(120.0);
        assert_eq!(builder.runtime.fps, 120.0);
    }

    #[test]
    #[should_panic(expected = "FPS must be positive")]
    fn builder_with_fps_panics_on_zero() {
        EngineBuilder::new().with_fps(0.0);
    }

    #[test]
    #[should_panic(expected = "FPS must be positive")]
    fn builder_with_fps_panics_on_negative() {
        EngineBuilder::new().with_fps(-60.0);
    }

    #[test]
    fn builder_with_channel_capacity() {
        let builder = EngineBuilder::new().with_channel_capacity(256);
        assert_eq!(builder.channel_capacity, 256);
    }

    #[test]
    #[should_panic(expected = "Channel capacity must be positive")]
    fn builder_with_channel_capacity_panics_on_zero() {
        EngineBuilder::new().with_channel_capacity(0);
    }

    #[test]
    #[should_panic(expected = "Screen size must be non-zero")]
    fn builder_with_screen_size_panics_on_zero() {
        EngineBuilder::new().with_screen_size(0, 120);
    }

    #[test]
    fn builder_scene_settings_reach_config() {
        let bounds = Rect::new(0.0, 0.0, 320.0, 240.0);
        let builder = EngineBuilder::new()
            .with_screen_size(320, 240)
            .with_stats(true)
            .with_debug(true)
            .with_world_bounds(bounds)
            .with_deep_sleep_after(Duration::from_secs(30))
            .with_screen(NullScreen)
            .with_scene_initializer(|_| {})
            .with_title("Demo");

        let config = &builder.runtime.scene_config;
        assert_eq!((config.screen_width, config.screen_height), (320, 240));
        assert!(config.stats && config.debug);
        assert_eq!(config.world_bounds, Some(bounds));
        assert_eq!(builder.runtime.deep_sleep_after, Some(Duration::from_secs(30)));
        assert_eq!(builder.runtime.initializers.len(), 1);
        assert_eq!(builder.title, "Demo");
    }

    #[test]
    fn builder_fluent_api_chaining() {
        let engine = EngineBuilder::new()
            .with_fps(120.0)
            .with_channel_capacity(256)
            .build()
            .init(|_| {})
            .init(|_| {});

        assert_eq!(engine.runtime.fps, 120.0);
        assert_eq!(engine.channel_capacity, 256);
        assert_eq!(engine.runtime.setups.len(), 2);
    }

    #[test]
    fn window_size_scales_small_screens() {
        assert_eq!(window_size(160, 120), (640, 480));
        assert_eq!(window_size(800, 600), (800, 600));
    }
}
