//=========================================================================
// Frame Time
//=========================================================================
//
// Frame timing snapshots and the clock that produces them.
//
// The core thread ticks a `FrameClock` once per frame and hands the
// resulting `FrameTime` to the active scene. Tests build `FrameTime`
// values directly with `FrameTime::fixed()` so frame pacing stays
// deterministic.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::{Duration, Instant};

//=== FrameTime ===========================================================

/// Timing snapshot for a single frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Seconds elapsed since the previous frame.
    pub dt: f32,

    /// Monotonic frame counter, starting at 0.
    pub frame_index: u64,
}

impl FrameTime {
    /// Builds a snapshot with an explicit delta time.
    pub fn fixed(dt: f32, frame_index: u64) -> Self {
        Self { dt, frame_index }
    }

    /// Delta time in milliseconds.
    pub fn dt_millis(&self) -> f64 {
        f64::from(self.dt) * 1000.0
    }
}

//=== FrameClock ==========================================================

/// Clock producing clamped [`FrameTime`] snapshots.
///
/// Delta time is clamped so a debugger pause or a long stall does not
/// push a huge step through physics.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    /// Creates a clock with default clamps (0.1 ms .. 250 ms).
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    /// Creates a clock with custom delta-time clamps.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: Instant::now(),
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Resets the baseline, e.g. after waking from deep sleep.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// Advances the clock and returns the snapshot for the new frame.
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);
        self.last = now;

        let frame = FrameTime::fixed(dt.as_secs_f32(), self.frame_index);
        self.frame_index = self.frame_index.wrapping_add(1);
        frame
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
