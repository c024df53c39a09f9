//=========================================================================
// Camera
//=========================================================================
//
// View transform shared by every sprite update and draw.
//
// `offset_*` is the world position of the screen's top-left corner and may
// change at any time during a frame. `update()` snapshots it into the
// integer draw offset that rendering uses, so every draw in a frame sees
// the same transform.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::sprite::SpriteId;

//=== Camera ==============================================================

#[derive(Debug, Clone)]
pub struct Camera {
    /// World x of the screen's left edge.
    pub offset_x: f32,

    /// World y of the screen's top edge.
    pub offset_y: f32,

    draw_offset_x: i32,
    draw_offset_y: i32,
    screen_width: u32,
    screen_height: u32,
    follow: Option<SpriteId>,
}

impl Camera {
    //--- Construction -----------------------------------------------------

    /// Creates a camera at the world origin for a screen of the given size.
    pub fn new(screen_width: u32, screen_height: u32) -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            draw_offset_x: 0,
            draw_offset_y: 0,
            screen_width,
            screen_height,
            follow: None,
        }
    }

    //--- Transform --------------------------------------------------------

    /// Latches the current offset into the draw transform.
    pub fn update(&mut self) {
        self.draw_offset_x = self.offset_x.floor() as i32;
        self.draw_offset_y = self.offset_y.floor() as i32;
    }

    /// Draw offset latched by the last [`Camera::update`].
    pub fn draw_offset(&self) -> (i32, i32) {
        (self.draw_offset_x, self.draw_offset_y)
    }

    /// Converts a world position to screen pixels, saturating at the
    /// `i32` range.
    pub fn world_to_screen(&self, x: f32, y: f32) -> (i32, i32) {
        (
            (x.floor() as i32).saturating_sub(self.draw_offset_x),
            (y.floor() as i32).saturating_sub(self.draw_offset_y),
        )
    }

    /// Moves the offset so `(x, y)` sits in the middle of the screen.
    pub fn center_on(&mut self, x: f32, y: f32) {
        self.offset_x = x - self.screen_width as f32 * 0.5;
        self.offset_y = y - self.screen_height as f32 * 0.5;
    }

    pub fn screen_size(&self) -> (u32, u32) {
        (self.screen_width, self.screen_height)
    }

    //--- Follow -----------------------------------------------------------

    /// Keeps the given sprite centered, starting with the next follow pass.
    pub fn follow(&mut self, sprite: SpriteId) {
        self.follow = Some(sprite);
    }

    pub fn stop_following(&mut self) {
        self.follow = None;
    }

    pub fn followed(&self) -> Option<SpriteId> {
        self.follow
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
