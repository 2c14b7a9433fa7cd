use image::imageops;
use image::{GrayImage, RgbaImage};

use crate::identify::hash::luma;

/// Standard deviation matching a 3×3 Gaussian kernel.
const BLUR_SIGMA: f32 = 0.8;

/// The top-right quarter of an icon, where the experience counter sits.
pub fn top_right_quadrant(icon: &RgbaImage) -> RgbaImage {
    let (w, h) = icon.dimensions();
    let x0 = w / 2;
    imageops::crop_imm(icon, x0, 0, w - x0, h / 2).to_image()
}

/// Grayscale and lightly blurred counter region, ready for OCR.
pub fn prepare_exp_region(icon: &RgbaImage) -> GrayImage {
    let corner = top_right_quadrant(icon);
    let gray = luma(&corner, false);
    if gray.width() == 0 || gray.height() == 0 {
        return gray;
    }
    imageops::blur(&gray, BLUR_SIGMA)
}
