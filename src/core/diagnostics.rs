//=========================================================================
// Diagnostics
//=========================================================================
//
// Frame statistics and the debug switch read by the diagnostics handler.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;

use log::debug;

//=== Internal Dependencies ===============================================

use crate::core::time::FrameTime;

//=== FrameStats ==========================================================

/// Snapshot taken at the end of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameStats {
    pub frame_index: u64,

    /// Smoothed frames per second.
    pub fps: f32,

    pub sprite_count: usize,

    /// Scene time in ms.
    pub millis: f64,
}

/// Receives stats every frame while stats are enabled.
pub type StatsHook = Box<dyn FnMut(&FrameStats)>;

//=== Diagnostics =========================================================

#[derive(Default)]
pub struct Diagnostics {
    stats_enabled: bool,
    debug_enabled: bool,
    fps: f32,
    last: Option<FrameStats>,
    hook: Option<StatsHook>,
}

impl Diagnostics {
    /// Weight of the newest sample in the fps average.
    const FPS_SMOOTHING: f32 = 0.1;

    /// Frames between `debug!` stat lines.
    const LOG_INTERVAL: u64 = 300;

    pub fn new(stats_enabled: bool, debug_enabled: bool) -> Self {
        Self {
            stats_enabled,
            debug_enabled,
            ..Self::default()
        }
    }

    //--- Switches ---------------------------------------------------------

    pub fn stats_enabled(&self) -> bool {
        self.stats_enabled
    }

    pub fn set_stats_enabled(&mut self, enabled: bool) {
        self.stats_enabled = enabled;
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug_enabled
    }

    pub fn set_debug_enabled(&mut self, enabled: bool) {
        self.debug_enabled = enabled;
    }

    pub fn set_stats_hook<F>(&mut self, hook: F)
    where
        F: FnMut(&FrameStats) + 'static,
    {
        self.hook = Some(Box::new(hook));
    }

    //--- Recording --------------------------------------------------------

    /// Records one frame. No-op while stats are disabled.
    pub fn record(&mut self, frame: &FrameTime, sprite_count: usize, millis: f64) {
        if !self.stats_enabled {
            return;
        }

        let sample = if frame.dt > 0.0 { 1.0 / frame.dt } else { 0.0 };
        self.fps = if self.last.is_none() {
            sample
        } else {
            self.fps + (sample - self.fps) * Self::FPS_SMOOTHING
        };

        let stats = FrameStats {
            frame_index: frame.frame_index,
            fps: self.fps,
            sprite_count,
            millis,
        };

        if frame.frame_index % Self::LOG_INTERVAL == 0 {
            debug!(target: "scene", "{}", stats);
        }
        if let Some(hook) = self.hook.as_mut() {
            hook(&stats);
        }
        self.last = Some(stats);
    }

    pub fn last_stats(&self) -> Option<&FrameStats> {
        self.last.as_ref()
    }
}

impl fmt::Display for FrameStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "frame {} | {:.1} fps | {} sprites | {:.0} ms",
            self.frame_index, self.fps, self.sprite_count, self.millis
        )
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
