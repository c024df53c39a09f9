//=========================================================================
// Frame Scheduler
//=========================================================================
//
// Ordered registry of (priority, callback) frame handlers.
//
// Architecture:
//   register_frame_handler(priority, f) → handlers (sorted, stable)
//                                            ↓
//   dispatch(target, frame) ──────────────→ f(target, frame) for each
//
// Handlers run once per tick in ascending priority; equal priorities run
// in registration order. Handlers registered while a dispatch is running
// are parked and join the table after the pass, so they first run on the
// next tick. There is no removal API: a table lives as long as its owner.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use log::trace;

use crate::core::time::FrameTime;

//=== Module Declarations =================================================

pub mod priority;

//=== Frame Handler =======================================================

/// Boxed frame callback receiving the dispatch target and frame timing.
pub type FrameCallback<T> = Box<dyn FnMut(&mut T, &FrameTime)>;

struct FrameHandler<T> {
    priority: i32,
    callback: FrameCallback<T>,
}

//=== EventContext ========================================================

/// Per-frame tick source driving a table of prioritized handlers.
///
/// The context is generic over the dispatch target so the owner (usually
/// a [`Scene`](crate::core::scene::Scene)) can store the context inside
/// itself and still hand `&mut self` to every handler.
///
/// # Example
///
/// ```rust
/// # use arcade_engine::core::scheduler::EventContext;
/// # use arcade_engine::core::time::FrameTime;
/// struct Counter {
///     events: EventContext<Counter>,
///     log: Vec<i32>,
/// }
///
/// let mut counter = Counter { events: EventContext::new(), log: Vec::new() };
/// counter.events.register_frame_handler(20, |c: &mut Counter, _| c.log.push(20));
/// counter.events.register_frame_handler(8, |c: &mut Counter, _| c.log.push(8));
///
/// EventContext::dispatch(&mut counter, |c| &mut c.events, &FrameTime::fixed(0.016, 0));
/// assert_eq!(counter.log, vec![8, 20]);
/// ```
pub struct EventContext<T> {
    handlers: Vec<FrameHandler<T>>,
    parked: Vec<FrameHandler<T>>,
    /// Priorities of the table lifted out by a running dispatch.
    lifted: Vec<i32>,
    dispatching: bool,
    delta_time: f32,
    frame_count: u64,
}

impl<T> EventContext<T> {
    //--- Construction -----------------------------------------------------

    /// Creates an empty handler table.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
            parked: Vec::new(),
            lifted: Vec::new(),
            dispatching: false,
            delta_time: 0.0,
            frame_count: 0,
        }
    }

    //--- Registration -----------------------------------------------------

    /// Registers a callback fired once per tick at `priority`.
    ///
    /// Lower priorities run earlier. Ties are broken by registration order.
    pub fn register_frame_handler<F>(&mut self, priority: i32, callback: F)
    where
        F: FnMut(&mut T, &FrameTime) + 'static,
    {
        let handler = FrameHandler {
            priority,
            callback: Box::new(callback),
        };

        if self.dispatching {
            trace!(target: "scheduler", "Parking handler at priority {} until end of tick", priority);
            self.parked.push(handler);
        } else {
            self.insert_sorted(handler);
        }
    }

    //--- Dispatch ---------------------------------------------------------

    /// Runs every registered handler once against `target`.
    ///
    /// `access` locates the context inside `target`; the handler table is
    /// lifted out for the duration of the pass so each handler can borrow
    /// the target mutably.
    pub fn dispatch<A>(target: &mut T, access: A, frame: &FrameTime)
    where
        A: Fn(&mut T) -> &mut EventContext<T>,
    {
        let mut handlers = {
            let context = access(target);
            debug_assert!(!context.dispatching, "EventContext::dispatch is not re-entrant");
            context.delta_time = frame.dt;
            context.dispatching = true;
            context.lifted = context.handlers.iter().map(|h| h.priority).collect();
            std::mem::take(&mut context.handlers)
        };

        for handler in handlers.iter_mut() {
            (handler.callback)(target, frame);
        }

        let context = access(target);
        context.dispatching = false;
        context.lifted.clear();
        context.frame_count += 1;
        context.handlers = handlers;

        for handler in std::mem::take(&mut context.parked) {
            context.insert_sorted(handler);
        }
    }

    //--- Queries ----------------------------------------------------------

    /// Delta time (seconds) of the most recent dispatch.
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Number of completed dispatches.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Number of registered handlers, parked ones included. Accurate from
    /// inside a running dispatch.
    pub fn handler_count(&self) -> usize {
        self.handlers.len() + self.lifted.len() + self.parked.len()
    }

    /// Priorities of the registered handlers in execution order, parked
    /// ones at the place they will take after the current pass.
    pub fn priorities(&self) -> Vec<i32> {
        let mut priorities: Vec<i32> = self
            .handlers
            .iter()
            .map(|h| h.priority)
            .chain(self.lifted.iter().copied())
            .chain(self.parked.iter().map(|h| h.priority))
            .collect();
        priorities.sort_unstable();
        priorities
    }

    //--- Internal Helpers -------------------------------------------------

    fn insert_sorted(&mut self, handler: FrameHandler<T>) {
        // Insert after every handler of equal priority to keep registration order
        let index = self
            .handlers
            .partition_point(|existing| existing.priority <= handler.priority);
        self.handlers.insert(index, handler);
    }
}

impl<T> Default for EventContext<T> {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
