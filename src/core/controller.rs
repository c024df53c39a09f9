//=========================================================================
// Controller
//=========================================================================
//
// Console button state and dpad-driven sprite movement.
//
// Platform events flip the raw button bits as they arrive. Once per frame
// the controller-state handler latches raw → current, so every handler in
// a tick sees the same snapshot and edge queries (`just_pressed`) are
// relative to the previous frame. A press released before the latch still
// shows as pressed for one frame.
//
// Mapping physical keys to buttons belongs to the platform layer.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::sprite::{SpriteId, SpriteRegistry};

//=== Button ==============================================================

/// Console buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Left,
    Up,
    Right,
    Down,
    A,
    B,
    Menu,
}

impl Button {
    pub const ALL: [Button; 7] = [
        Button::Left,
        Button::Up,
        Button::Right,
        Button::Down,
        Button::A,
        Button::B,
        Button::Menu,
    ];

    #[inline]
    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Raw button transition delivered by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonEvent {
    Pressed(Button),
    Released(Button),
}

//=== ControllerState =====================================================

#[derive(Debug, Clone, Default)]
pub struct ControllerState {
    raw: u8,
    /// Buttons pressed since the last latch, even if already released.
    tapped: u8,
    current: u8,
    previous: u8,
    held_ms: [f64; 7],
}

impl ControllerState {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Input ------------------------------------------------------------

    /// Records a raw transition. Visible after the next [`update`](Self::update).
    pub fn apply(&mut self, event: ButtonEvent) {
        match event {
            ButtonEvent::Pressed(button) => {
                self.raw |= button.bit();
                self.tapped |= button.bit();
            }
            ButtonEvent::Released(button) => self.raw &= !button.bit(),
        }
    }

    /// Latches the raw state for this frame and advances hold timers.
    pub fn update(&mut self, dt: f32) {
        self.previous = self.current;
        self.current = self.raw | self.tapped;
        self.tapped = 0;

        let dt_ms = f64::from(dt) * 1000.0;
        for button in Button::ALL {
            let slot = &mut self.held_ms[button as usize];
            if self.current & button.bit() != 0 {
                *slot += dt_ms;
            } else {
                *slot = 0.0;
            }
        }
    }

    //--- Queries ----------------------------------------------------------

    pub fn is_pressed(&self, button: Button) -> bool {
        self.current & button.bit() != 0
    }

    pub fn just_pressed(&self, button: Button) -> bool {
        self.is_pressed(button) && self.previous & button.bit() == 0
    }

    pub fn just_released(&self, button: Button) -> bool {
        !self.is_pressed(button) && self.previous & button.bit() != 0
    }

    /// Milliseconds the button has been held, 0 if released.
    pub fn held_ms(&self, button: Button) -> f64 {
        self.held_ms[button as usize]
    }

    /// True if the latched state differs from the previous frame.
    pub fn changed(&self) -> bool {
        self.current != self.previous
    }

    /// Horizontal dpad axis scaled by `speed` (left negative).
    pub fn dx(&self, speed: f32) -> f32 {
        self.axis(Button::Left, Button::Right) * speed
    }

    /// Vertical dpad axis scaled by `speed` (up negative).
    pub fn dy(&self, speed: f32) -> f32 {
        self.axis(Button::Up, Button::Down) * speed
    }

    fn axis(&self, negative: Button, positive: Button) -> f32 {
        let mut value = 0.0;
        if self.is_pressed(negative) {
            value -= 1.0;
        }
        if self.is_pressed(positive) {
            value += 1.0;
        }
        value
    }
}

//=== ControlledSprite ====================================================

/// Sprite whose velocity follows the dpad.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlledSprite {
    pub id: SpriteId,
    pub vx: f32,
    pub vy: f32,
}

/// Pushes dpad velocities into every controlled sprite still alive.
///
/// A zero speed on an axis leaves that axis under the sprite's control.
pub fn move_controlled_sprites(
    controller: &ControllerState,
    controlled: &[ControlledSprite],
    sprites: &mut SpriteRegistry,
) {
    for binding in controlled {
        let Some(sprite) = sprites.get_mut(binding.id) else {
            continue;
        };
        if sprite.is_destroyed() {
            continue;
        }
        let vx = controller.dx(binding.vx);
        let vy = controller.dy(binding.vy);
        sprite.set_velocity(vx, vy);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::render::{Camera, Image};
    use crate::core::sprite::Sprite;

    //--- Latching ---------------------------------------------------------

    #[test]
    fn raw_input_is_visible_after_update() {
        let mut controller = ControllerState::new();
        controller.apply(ButtonEvent::Pressed(Button::A));
        assert!(!controller.is_pressed(Button::A));

        controller.update(0.016);
        assert!(controller.is_pressed(Button::A));
        assert!(controller.just_pressed(Button::A));
        assert!(controller.changed());
    }

    #[test]
    fn edges_last_one_frame() {
        let mut controller = ControllerState::new();
        controller.apply(ButtonEvent::Pressed(Button::B));
        controller.update(0.016);
        controller.update(0.016);

        assert!(controller.is_pressed(Button::B));
        assert!(!controller.just_pressed(Button::B));

        controller.apply(ButtonEvent::Released(Button::B));
        controller.update(0.016);
        assert!(controller.just_released(Button::B));
    }

    #[test]
    fn tap_within_one_frame_latches_once() {
        let mut controller = ControllerState::new();
        controller.apply(ButtonEvent::Pressed(Button::A));
        controller.apply(ButtonEvent::Released(Button::A));

        controller.update(0.016);
        assert!(controller.just_pressed(Button::A));

        controller.update(0.016);
        assert!(!controller.is_pressed(Button::A));
        assert!(controller.just_released(Button::A));
    }

    #[test]
    fn hold_time_accumulates_and_resets() {
        let mut controller = ControllerState::new();
        controller.apply(ButtonEvent::Pressed(Button::Up));
        controller.update(0.5);
        controller.update(0.25);
        assert!((controller.held_ms(Button::Up) - 750.0).abs() < 1e-6);

        controller.apply(ButtonEvent::Released(Button::Up));
        controller.update(0.1);
        assert_eq!(controller.held_ms(Button::Up), 0.0);
    }

    //--- Axes -------------------------------------------------------------

    #[test]
    fn opposite_directions_cancel() {
        let mut controller = ControllerState::new();
        controller.apply(ButtonEvent::Pressed(Button::Left));
        controller.apply(ButtonEvent::Pressed(Button::Right));
        controller.apply(ButtonEvent::Pressed(Button::Down));
        controller.update(0.016);

        assert_eq!(controller.dx(100.0), 0.0);
        assert_eq!(controller.dy(50.0), 50.0);
    }

    //--- Controlled Sprites -----------------------------------------------

    #[test]
    fn controlled_sprite_follows_dpad() {
        let mut sprites = SpriteRegistry::new();
        let id = sprites.add(Box::new(Sprite::new(Image::new(1, 1))));
        let mut controller = ControllerState::new();
        controller.apply(ButtonEvent::Pressed(Button::Right));
        controller.update(0.016);

        move_controlled_sprites(
            &controller,
            &[ControlledSprite { id, vx: 10.0, vy: 10.0 }],
            &mut sprites,
        );
        sprites.get_mut(id).unwrap().update(&Camera::new(1, 1), 1.0);

        let bounds = sprites.get(id).unwrap().bounds().unwrap();
        assert_eq!((bounds.x, bounds.y), (10.0, 0.0));
    }

    #[test]
    fn missing_controlled_sprite_is_ignored() {
        let mut sprites = SpriteRegistry::new();
        let controller = ControllerState::new();
        move_controlled_sprites(
            &controller,
            &[ControlledSprite { id: SpriteId(99), vx: 1.0, vy: 1.0 }],
            &mut sprites,
        );
    }
}
