//=========================================================================
// Power Monitor
//=========================================================================
//
// Idle tracking for deep sleep. Input pokes the monitor; the diagnostics
// handler checks it once per frame. Times are console uptime in ms.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

use log::info;

//=== PowerMonitor ========================================================

#[derive(Debug, Clone, Default)]
pub struct PowerMonitor {
    deep_sleep_after: Option<Duration>,
    last_activity_ms: f64,
    sleeping: bool,
}

impl PowerMonitor {
    /// `None` disables deep sleep.
    pub fn new(deep_sleep_after: Option<Duration>) -> Self {
        Self {
            deep_sleep_after,
            last_activity_ms: 0.0,
            sleeping: false,
        }
    }

    pub fn deep_sleep_after(&self) -> Option<Duration> {
        self.deep_sleep_after
    }

    /// Records activity at `now_ms`, waking the console if asleep.
    pub fn poke(&mut self, now_ms: f64) {
        self.last_activity_ms = now_ms;
        if self.sleeping {
            info!(target: "engine", "Leaving deep sleep");
            self.sleeping = false;
        }
    }

    /// Enters deep sleep once the idle period elapsed. Returns the current
    /// sleep state.
    pub fn check_deep_sleep(&mut self, now_ms: f64) -> bool {
        let Some(limit) = self.deep_sleep_after else {
            return false;
        };

        if !self.sleeping && now_ms - self.last_activity_ms >= limit.as_secs_f64() * 1000.0 {
            info!(
                target: "engine",
                "Entering deep sleep after {:.0} ms idle",
                now_ms - self.last_activity_ms
            );
            self.sleeping = true;
        }
        self.sleeping
    }

    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
