//=========================================================================
// Console
//=========================================================================
//
// Hardware shared by every scene of a game.
//
// Architecture:
//   ConsoleHandle = Rc<RefCell<Console>>
//     ├─ controller: ControllerState   (latched by priority 8)
//     ├─ power: PowerMonitor           (checked by priority 150)
//     └─ screen: Box<dyn ScreenSink>   (flushed by priority 200)
//
// The handle is cloned into each scene. Scenes only borrow it inside a
// single handler, never across one.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

//=== Internal Dependencies ===============================================

use crate::core::controller::{ButtonEvent, ControllerState};
use crate::core::power::PowerMonitor;
use crate::core::render::{Image, NullScreen, ScreenSink};

//=== Console =============================================================

/// Shared, single-threaded console handle.
pub type ConsoleHandle = Rc<RefCell<Console>>;

pub struct Console {
    controller: ControllerState,
    power: PowerMonitor,
    screen: Box<dyn ScreenSink>,
    uptime_ms: f64,
    presented: u64,
}

impl Console {
    pub fn new(screen: Box<dyn ScreenSink>, deep_sleep_after: Option<Duration>) -> Self {
        Self {
            controller: ControllerState::new(),
            power: PowerMonitor::new(deep_sleep_after),
            screen,
            uptime_ms: 0.0,
            presented: 0,
        }
    }

    /// Console with no display and deep sleep disabled.
    pub fn headless() -> Self {
        Self::new(Box::new(NullScreen), None)
    }

    pub fn into_handle(self) -> ConsoleHandle {
        Rc::new(RefCell::new(self))
    }

    //--- Input ------------------------------------------------------------

    /// Feeds a platform button transition. Counts as activity.
    pub fn apply_input(&mut self, event: ButtonEvent) {
        self.controller.apply(event);
        self.power.poke(self.uptime_ms);
    }

    /// Advances uptime and latches controller state for the frame.
    pub fn update(&mut self, dt: f32) {
        self.uptime_ms += f64::from(dt) * 1000.0;
        self.controller.update(dt);
    }

    pub fn controller(&self) -> &ControllerState {
        &self.controller
    }

    //--- Power ------------------------------------------------------------

    pub fn check_deep_sleep(&mut self) -> bool {
        self.power.check_deep_sleep(self.uptime_ms)
    }

    pub fn is_sleeping(&self) -> bool {
        self.power.is_sleeping()
    }

    pub fn power(&self) -> &PowerMonitor {
        &self.power
    }

    pub fn uptime_ms(&self) -> f64 {
        self.uptime_ms
    }

    //--- Screen -----------------------------------------------------------

    pub fn present(&mut self, frame: &Image) {
        self.screen.present(frame);
        self.presented += 1;
    }

    /// Frames flushed to the screen so far.
    pub fn presented_frames(&self) -> u64 {
        self.presented
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::headless()
    }
}

impl fmt::Debug for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Console")
            .field("controller", &self.controller)
            .field("power", &self.power)
            .field("uptime_ms", &self.uptime_ms)
            .field("presented", &self.presented)
            .finish_non_exhaustive()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
