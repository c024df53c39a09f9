//=========================================================================
// Event Collector
//=========================================================================
//
// Core-side draining of the platform channel.
//
// Architecture:
//   Receiver<PlatformEvent> → collect_frame() / wait() → buttons → TickControl
//
// Draining is bounded so a flooded channel cannot starve the frame. While
// the console sleeps the core thread parks in `wait()` instead of ticking
// at full rate; any input wakes it.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};
use log::warn;

//=== Internal Dependencies ===============================================

use super::PlatformEvent;
use crate::core::controller::ButtonEvent;

//=== TickControl =========================================================

/// Update loop control signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    Exit,
}

//=== EventCollector ======================================================

pub struct EventCollector {
    receiver: Receiver<PlatformEvent>,
    buttons: Vec<ButtonEvent>,
}

impl EventCollector {
    const MAX_EVENTS_PER_FRAME: usize = 100;

    pub fn new(receiver: Receiver<PlatformEvent>) -> Self {
        Self {
            receiver,
            buttons: Vec::with_capacity(16),
        }
    }

    /// Drains pending platform events without blocking.
    pub fn collect_frame(&mut self) -> TickControl {
        self.buttons.clear();
        self.drain()
    }

    /// Blocks up to `timeout` for the first event, then drains the rest.
    pub fn wait(&mut self, timeout: Duration) -> TickControl {
        self.buttons.clear();

        match self.receiver.recv_timeout(timeout) {
            Ok(event) => {
                if self.handle_event(event) == TickControl::Exit {
                    return TickControl::Exit;
                }
            }
            Err(RecvTimeoutError::Disconnected) => return TickControl::Exit,
            Err(RecvTimeoutError::Timeout) => return TickControl::Continue,
        }

        self.drain()
    }

    /// Button transitions collected by the last call, in arrival order.
    pub fn buttons(&self) -> &[ButtonEvent] {
        &self.buttons
    }

    pub fn take_buttons(&mut self) -> Vec<ButtonEvent> {
        std::mem::take(&mut self.buttons)
    }

    //--- Internal Helpers -------------------------------------------------

    fn drain(&mut self) -> TickControl {
        let mut drained = 0;

        while drained < Self::MAX_EVENTS_PER_FRAME {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.handle_event(event) == TickControl::Exit {
                        return TickControl::Exit;
                    }
                    drained += 1;
                }
                Err(TryRecvError::Disconnected) => return TickControl::Exit,
                Err(TryRecvError::Empty) => break,
            }
        }

        if drained >= Self::MAX_EVENTS_PER_FRAME {
            warn!(target: "engine", "Event queue backlog: drained {} events this frame", drained);
        }

        TickControl::Continue
    }

    fn handle_event(&mut self, event: PlatformEvent) -> TickControl {
        match event {
            PlatformEvent::Buttons(buttons) => {
                self.buttons.extend(buttons);
                TickControl::Continue
            }
            PlatformEvent::WindowClosed => TickControl::Exit,
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    use crate::core::controller::Button;

    #[test]
    fn collect_handles_empty_queue() {
        let (_tx, rx) = unbounded::<PlatformEvent>();
        let mut collector = EventCollector::new(rx);

        assert_eq!(collector.collect_frame(), TickControl::Continue);
        assert!(collector.buttons().is_empty());
    }

    #[test]
    fn collect_concatenates_batches_in_order() {
        let (tx, rx) = unbounded();
        let mut collector = EventCollector::new(rx);

        tx.send(PlatformEvent::Buttons(vec![ButtonEvent::Pressed(Button::A)]))
            .unwrap();
        tx.send(PlatformEvent::Buttons(vec![
            ButtonEvent::Released(Button::A),
            ButtonEvent::Pressed(Button::Left),
        ]))
        .unwrap();

        assert_eq!(collector.collect_frame(), TickControl::Continue);
        assert_eq!(
            collector.take_buttons(),
            vec![
                ButtonEvent::Pressed(Button::A),
                ButtonEvent::Released(Button::A),
                ButtonEvent::Pressed(Button::Left),
            ]
        );
    }

    #[test]
    fn collect_clears_previous_buttons() {
        let (tx, rx) = unbounded();
        let mut collector = EventCollector::new(rx);

        tx.send(PlatformEvent::Buttons(vec![ButtonEvent::Pressed(Button::B)]))
            .unwrap();
        collector.collect_frame();
        assert_eq!(collector.buttons().len(), 1);

        collector.collect_frame();
        assert!(collector.buttons().is_empty());
    }

    #[test]
    fn collect_returns_exit_on_window_closed() {
        let (tx, rx) = unbounded();
        let mut collector = EventCollector::new(rx);

        tx.send(PlatformEvent::WindowClosed).unwrap();

        assert_eq!(collector.collect_frame(), TickControl::Exit);
    }

    #[test]
    fn collect_returns_exit_on_disconnect() {
        let (tx, rx) = unbounded::<PlatformEvent>();
        let mut collector = EventCollector::new(rx);

        drop(tx);

        assert_eq!(collector.collect_frame(), TickControl::Exit);
    }

    #[test]
    fn wait_times_out_quietly() {
        let (_tx, rx) = unbounded::<PlatformEvent>();
        let mut collector = EventCollector::new(rx);

        assert_eq!(collector.wait(Duration::from_millis(5)), TickControl::Continue);
        assert!(collector.buttons().is_empty());
    }

    #[test]
    fn wait_returns_on_first_event() {
        let (tx, rx) = unbounded();
        let mut collector = EventCollector::new(rx);
        tx.send(PlatformEvent::Buttons(vec![ButtonEvent::Pressed(Button::Menu)]))
            .unwrap();

        assert_eq!(collector.wait(Duration::from_secs(5)), TickControl::Continue);
        assert_eq!(collector.buttons(), &[ButtonEvent::Pressed(Button::Menu)]);
    }
}
