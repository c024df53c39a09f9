//=========================================================================
// Render Primitives
//=========================================================================
//
// Pixel buffers, the camera transform and the static background layer.
// The frame pipeline itself (cache, sort, draw) lives on the scene.
//
//=========================================================================

//=== Module Declarations =================================================

mod background;
mod camera;
mod image;
mod rect;

//=== Public API ==========================================================

pub use background::Background;
pub use camera::Camera;
pub use image::Image;
pub use rect::Rect;

//=== ScreenSink ==========================================================

/// Destination of finished frames (display driver, window, test capture).
///
/// Called once per tick from the screen-flush handler.
pub trait ScreenSink {
    fn present(&mut self, frame: &Image);
}

/// Sink that discards every frame.
#[derive(Debug, Default)]
pub struct NullScreen;

impl ScreenSink for NullScreen {
    fn present(&mut self, _frame: &Image) {}
}
