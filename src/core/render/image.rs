//=========================================================================
// Image
//=========================================================================
//
// Palette-indexed pixel buffer used for sprites, backgrounds and the
// scene's frame buffer. Color 0 is transparent when blitting.
//
//=========================================================================

//=== Image ===============================================================

/// Palette-indexed image. Each pixel is a color index (0..=15 by convention).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Image {
    /// Color index treated as transparent by [`Image::draw_transparent`].
    pub const TRANSPARENT: u8 = 0;

    //--- Construction -----------------------------------------------------

    /// Creates an image filled with color 0.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width as usize) * (height as usize)],
        }
    }

    /// Creates an image filled with `color`.
    pub fn filled(width: u32, height: u32, color: u8) -> Self {
        let mut image = Self::new(width, height);
        image.fill(color);
        image
    }

    //--- Accessors --------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw pixel indices in row-major order.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Color at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: i32, y: i32) -> Option<u8> {
        self.index_of(x, y).map(|i| self.pixels[i])
    }

    //--- Drawing ----------------------------------------------------------

    /// Sets the color at `(x, y)`. Out-of-bounds writes are ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: u8) {
        if let Some(i) = self.index_of(x, y) {
            self.pixels[i] = color;
        }
    }

    /// Fills the whole image.
    pub fn fill(&mut self, color: u8) {
        self.pixels.fill(color);
    }

    /// Fills a rectangle, clipped to the image.
    pub fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: u8) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = x.saturating_add(width).min(self.width as i32);
        let y1 = y.saturating_add(height).min(self.height as i32);

        for py in y0..y1 {
            for px in x0..x1 {
                let i = (py as usize) * (self.width as usize) + (px as usize);
                self.pixels[i] = color;
            }
        }
    }

    /// Draws a one-pixel rectangle outline, clipped to the image.
    pub fn draw_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: u8) {
        if width <= 0 || height <= 0 {
            return;
        }
        self.fill_rect(x, y, width, 1, color);
        self.fill_rect(x, y.saturating_add(height - 1), width, 1, color);
        self.fill_rect(x, y, 1, height, color);
        self.fill_rect(x.saturating_add(width - 1), y, 1, height, color);
    }

    /// Copies `source` with its top-left corner at `(x, y)`, skipping
    /// transparent pixels. Only the part overlapping this image is visited.
    pub fn draw_transparent(&mut self, source: &Image, x: i32, y: i32) {
        let (x, y) = (i64::from(x), i64::from(y));
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + i64::from(source.width)).min(i64::from(self.width));
        let y1 = (y + i64::from(source.height)).min(i64::from(self.height));

        for py in y0..y1 {
            let sy = (py - y) as usize;
            for px in x0..x1 {
                let sx = (px - x) as usize;
                let color = source.pixels[sy * (source.width as usize) + sx];
                if color != Self::TRANSPARENT {
                    self.pixels[(py as usize) * (self.width as usize) + px as usize] = color;
                }
            }
        }
    }

    //--- Internal Helpers -------------------------------------------------

    fn index_of(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some((y as usize) * (self.width as usize) + (x as usize))
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
