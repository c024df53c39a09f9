//=========================================================================
// Input Processor
//=========================================================================
//
// Converts winit keyboard events into console button transitions.
//
// Architecture:
//   KeyEvent → InputProcessor → ButtonEvent → InputBuffer
//
// Default layout:
//   Arrows / WASD     → dpad
//   Z / Space         → A
//   X / Backspace     → B
//   Enter / Escape    → Menu
//
// Several keys can drive one button; the button is released only when
// the last of its keys goes up. OS key repeat is filtered.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::{HashMap, HashSet};

use winit::{
    event::{ElementState, KeyEvent},
    keyboard::{KeyCode, PhysicalKey},
};

//=== Internal Dependencies ===============================================

use crate::core::controller::{Button, ButtonEvent};

//=== InputProcessor ======================================================

#[derive(Debug, Default)]
pub(crate) struct InputProcessor {
    held: HashMap<Button, HashSet<KeyCode>>,
}

impl InputProcessor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    //--- Event Processing -------------------------------------------------

    /// Converts a winit key event (unmapped keys and repeats yield `None`).
    pub(crate) fn process_key_event(&mut self, key_event: &KeyEvent) -> Option<ButtonEvent> {
        let PhysicalKey::Code(code) = key_event.physical_key else {
            return None;
        };
        self.process_key(code, key_event.state, key_event.repeat)
    }

    pub(crate) fn process_key(
        &mut self,
        code: KeyCode,
        state: ElementState,
        repeat: bool,
    ) -> Option<ButtonEvent> {
        if repeat {
            return None;
        }
        let button = button_for(code)?;
        let keys = self.held.entry(button).or_default();

        match state {
            ElementState::Pressed => {
                let first = keys.is_empty();
                keys.insert(code);
                first.then_some(ButtonEvent::Pressed(button))
            }
            ElementState::Released => {
                let removed = keys.remove(&code);
                (removed && keys.is_empty()).then_some(ButtonEvent::Released(button))
            }
        }
    }
}

//=== Key Mapping =========================================================

/// Console button bound to a physical key, if any.
pub(crate) fn button_for(code: KeyCode) -> Option<Button> {
    match code {
        KeyCode::ArrowLeft | KeyCode::KeyA => Some(Button::Left),
        KeyCode::ArrowRight | KeyCode::KeyD => Some(Button::Right),
        KeyCode::ArrowUp | KeyCode::KeyW => Some(Button::Up),
        KeyCode::ArrowDown | KeyCode::KeyS => Some(Button::Down),
        KeyCode::KeyZ | KeyCode::Space => Some(Button::A),
        KeyCode::KeyX | KeyCode::Backspace => Some(Button::B),
        KeyCode::Enter | KeyCode::Escape => Some(Button::Menu),
        _ => None,
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_covers_every_button() {
        assert_eq!(button_for(KeyCode::ArrowLeft), Some(Button::Left));
        assert_eq!(button_for(KeyCode::KeyD), Some(Button::Right));
        assert_eq!(button_for(KeyCode::KeyW), Some(Button::Up));
        assert_eq!(button_for(KeyCode::ArrowDown), Some(Button::Down));
        assert_eq!(button_for(KeyCode::Space), Some(Button::A));
        assert_eq!(button_for(KeyCode::KeyX), Some(Button::B));
        assert_eq!(button_for(KeyCode::Escape), Some(Button::Menu));
        assert_eq!(button_for(KeyCode::F5), None);
    }

    #[test]
    fn press_and_release_map_to_button_events() {
        let mut processor = InputProcessor::new();
        assert_eq!(
            processor.process_key(KeyCode::KeyZ, ElementState::Pressed, false),
            Some(ButtonEvent::Pressed(Button::A))
        );
        assert_eq!(
            processor.process_key(KeyCode::KeyZ, ElementState::Released, false),
            Some(ButtonEvent::Released(Button::A))
        );
    }

    #[test]
    fn repeats_and_unmapped_keys_are_ignored() {
        let mut processor = InputProcessor::new();
        processor.process_key(KeyCode::ArrowUp, ElementState::Pressed, false);

        assert_eq!(processor.process_key(KeyCode::ArrowUp, ElementState::Pressed, true), None);
        assert_eq!(processor.process_key(KeyCode::F1, ElementState::Pressed, false), None);
    }

    #[test]
    fn shared_button_released_by_last_key() {
        let mut processor = InputProcessor::new();
        processor.process_key(KeyCode::ArrowLeft, ElementState::Pressed, false);
        assert_eq!(processor.process_key(KeyCode::KeyA, ElementState::Pressed, false), None);

        assert_eq!(processor.process_key(KeyCode::ArrowLeft, ElementState::Released, false), None);
        assert_eq!(
            processor.process_key(KeyCode::KeyA, ElementState::Released, false),
            Some(ButtonEvent::Released(Button::Left))
        );
    }

    #[test]
    fn stray_release_is_ignored() {
        let mut processor = InputProcessor::new();
        assert_eq!(processor.process_key(KeyCode::KeyX, ElementState::Released, false), None);
    }
}
