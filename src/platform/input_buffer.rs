//=========================================================================
// Input Buffer
//=========================================================================
//
// Collects button transitions between two redraws. Flushed as a single
// `PlatformEvent::Buttons` batch at the frame boundary.
//
// Transitions keep their arrival order; a press immediately followed by
// its release survives, so taps shorter than a core frame still latch.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::controller::ButtonEvent;

//=== InputBuffer =========================================================

#[derive(Debug)]
pub(crate) struct InputBuffer {
    events: Vec<ButtonEvent>,
}

impl InputBuffer {
    pub(crate) fn new() -> Self {
        Self {
            events: Vec::with_capacity(16),
        }
    }

    /// Appends a transition, dropping an exact repeat of the previous one.
    pub(crate) fn push(&mut self, event: ButtonEvent) {
        if self.events.last() != Some(&event) {
            self.events.push(event);
        }
    }

    /// Takes the buffered transitions, or `None` if nothing happened.
    pub(crate) fn drain(&mut self) -> Option<Vec<ButtonEvent>> {
        if self.events.is_empty() {
            return None;
        }
        Some(std::mem::take(&mut self.events))
    }

    pub(crate) fn len(&self) -> usize {
        self.events.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::controller::Button;

    #[test]
    fn empty_buffer_drains_to_none() {
        let mut buffer = InputBuffer::new();
        assert!(buffer.is_empty());
        assert_eq!(buffer.drain(), None);
    }

    #[test]
    fn consecutive_duplicates_are_dropped() {
        let mut buffer = InputBuffer::new();
        buffer.push(ButtonEvent::Pressed(Button::A));
        buffer.push(ButtonEvent::Pressed(Button::A));
        buffer.push(ButtonEvent::Released(Button::A));
        buffer.push(ButtonEvent::Pressed(Button::A));

        assert_eq!(buffer.len(), 3);
    }

    #[test]
    fn drain_preserves_order_and_clears() {
        let mut buffer = InputBuffer::new();
        buffer.push(ButtonEvent::Pressed(Button::Up));
        buffer.push(ButtonEvent::Released(Button::Up));

        assert_eq!(
            buffer.drain(),
            Some(vec![
                ButtonEvent::Pressed(Button::Up),
                ButtonEvent::Released(Button::Up)
            ])
        );
        assert!(buffer.is_empty());
    }
}
