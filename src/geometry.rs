//! Pixel-space rectangles and cropping.

use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in screenshot pixels.
///
/// The origin may be negative for inferred regions that overhang the image;
/// cropping clamps to the image bounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub fn center_y(&self) -> f32 {
        self.y as f32 + self.height as f32 / 2.0
    }

    /// Whether a horizontal line at `y` crosses this box, edges included.
    pub fn spans_y(&self, y: f32) -> bool {
        y >= self.y as f32 && y <= self.bottom() as f32
    }

    /// Copies the part of `img` under this box.
    ///
    /// Returns an empty image when the box lies entirely outside.
    pub fn crop(&self, img: &RgbaImage) -> RgbaImage {
        let (w, h) = img.dimensions();
        let x0 = self.x.clamp(0, w as i32) as u32;
        let y0 = self.y.clamp(0, h as i32) as u32;
        let x1 = self.right().clamp(0, w as i32) as u32;
        let y1 = self.bottom().clamp(0, h as i32) as u32;

        image::imageops::crop_imm(img, x0, y0, x1 - x0, y1 - y0).to_image()
    }
}
