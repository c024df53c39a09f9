//=========================================================================
// Forever Handlers
//=========================================================================
//
// Long-lived per-frame tasks that may suspend across frames.
//
// Each entry carries an atomic busy lock:
//   lock clear  → acquire, start a new iteration
//   lock held   → iteration in flight; skip this tick unless its wake
//                 time has been reached, in which case resume it
//
// A body returns `ForeverStep::Done` to finish its iteration (lock
// released) or `ForeverStep::Pause(d)` to suspend for `d` of scene time
// (lock kept). Skipped ticks are dropped, never queued, and a body is
// never started while a previous iteration is still in flight.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::trace;

//=== Internal Dependencies ===============================================

use super::Scene;

//=== ForeverStep =========================================================

/// Outcome of one call into a forever body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForeverStep {
    /// Iteration finished; the next tick starts a fresh one.
    Done,

    /// Suspend for the given scene time, then call the body again.
    Pause(Duration),
}

/// Forever body. Bodies that pause keep their own progress between calls.
pub type ForeverBody = Box<dyn FnMut(&mut Scene) -> ForeverStep>;

struct ForeverEntry {
    body: ForeverBody,
    busy: AtomicBool,
    wake_at_ms: f64,
}

//=== GameForeverHandlers =================================================

#[derive(Default)]
pub struct GameForeverHandlers {
    entries: Vec<ForeverEntry>,
    skipped: u64,
}

impl GameForeverHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<F>(&mut self, body: F)
    where
        F: FnMut(&mut Scene) -> ForeverStep + 'static,
    {
        self.entries.push(ForeverEntry {
            body: Box::new(body),
            busy: AtomicBool::new(false),
            wake_at_ms: 0.0,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ticks skipped so far because an iteration was still suspended.
    pub fn skipped_ticks(&self) -> u64 {
        self.skipped
    }

    /// Number of entries whose lock is currently held.
    pub fn busy_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.busy.load(Ordering::Acquire))
            .count()
    }

    //--- Driver -----------------------------------------------------------

    /// Runs one tick of every forever handler of `scene`.
    ///
    /// The handler list is lifted out of the scene while bodies run;
    /// handlers added by a body join the list afterwards and first run on
    /// the next tick.
    pub fn run(scene: &mut Scene) {
        let mut handlers = std::mem::take(scene.forever_mut());
        handlers.tick(scene);

        let added = std::mem::take(scene.forever_mut());
        handlers.entries.extend(added.entries);
        handlers.skipped += added.skipped;
        *scene.forever_mut() = handlers;
    }

    fn tick(&mut self, scene: &mut Scene) {
        for entry in self.entries.iter_mut() {
            if entry.busy.load(Ordering::Acquire) {
                if scene.millis() < entry.wake_at_ms {
                    self.skipped += 1;
                    continue;
                }
                trace!(target: "scene", "Resuming forever handler at {:.1} ms", scene.millis());
            } else if entry
                .busy
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                self.skipped += 1;
                continue;
            }

            match (entry.body)(scene) {
                ForeverStep::Done => entry.busy.store(false, Ordering::Release),
                ForeverStep::Pause(duration) => {
                    entry.wake_at_ms = scene.millis() + duration.as_secs_f64() * 1000.0;
                }
            }
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
