//=========================================================================
// Background
//=========================================================================
//
// Static layer drawn before any sprite: a solid color plus an optional
// image. The image scrolls with the camera scaled by `parallax`
// (0.0 = pinned to the screen, 1.0 = moves with the world).
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::{Camera, Image};

//=== Background ==========================================================

#[derive(Debug, Clone, Default)]
pub struct Background {
    color: u8,
    image: Option<Image>,
    parallax: f32,
}

impl Background {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color(&self) -> u8 {
        self.color
    }

    pub fn set_color(&mut self, color: u8) {
        self.color = color;
    }

    pub fn image(&self) -> Option<&Image> {
        self.image.as_ref()
    }

    /// Sets (or clears) the background image and its parallax factor.
    pub fn set_image(&mut self, image: Option<Image>, parallax: f32) {
        self.image = image;
        self.parallax = parallax;
    }

    /// Paints the layer into `target` through the camera transform.
    pub fn draw(&self, camera: &Camera, target: &mut Image) {
        target.fill(self.color);

        if let Some(image) = &self.image {
            let (dx, dy) = camera.draw_offset();
            let x = -((dx as f32) * self.parallax).floor() as i32;
            let y = -((dy as f32) * self.parallax).floor() as i32;
            target.draw_transparent(image, x, y);
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
