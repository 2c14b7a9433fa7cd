//! Average-hash signatures of icon images.

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, RgbaImage};

use crate::catalog::Signature;
use crate::config::CropMargins;
use crate::error::EngineError;

/// Converts to 8-bit luma with ITU-R 601-2 weights.
///
/// With `swap_red_blue` the red and blue weights trade places, matching
/// signatures that were computed from BGR buffers.
pub fn luma(img: &RgbaImage, swap_red_blue: bool) -> GrayImage {
    let (wr, wb) = if swap_red_blue { (114, 299) } else { (299, 114) };
    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        let p = img.get_pixel(x, y);
        let sum = u32::from(p[0]) * wr + u32::from(p[1]) * 587 + u32::from(p[2]) * wb;
        Luma([((sum + 500) / 1000) as u8])
    })
}

/// Hashes an icon on a `hash_size`×`hash_size` grid.
///
/// The icon is reduced to luma, Lanczos-resampled to the grid, and each cell
/// becomes a 1 bit when it is strictly brighter than the grid mean.
pub fn average_hash(
    img: &RgbaImage,
    hash_size: u32,
    swap_red_blue: bool,
) -> Result<Signature, EngineError> {
    if hash_size == 0 || hash_size * hash_size > crate::catalog::signature::MAX_BITS {
        return Err(EngineError::UnsupportedHashSize(hash_size));
    }

    let gray = luma(img, swap_red_blue);
    let small = imageops::resize(&gray, hash_size, hash_size, FilterType::Lanczos3);

    let values: Vec<u8> = small.pixels().map(|p| p[0]).collect();
    let mean = values.iter().map(|&v| f64::from(v)).sum::<f64>() / values.len() as f64;
    let cells: Vec<bool> = values.iter().map(|&v| f64::from(v) > mean).collect();

    Signature::from_bits(&cells)
}

/// Central part of an icon, trimming `margins` of each dimension from
/// both sides.
///
/// Returns the whole icon when the margins would leave nothing.
pub fn central_region(img: &RgbaImage, margins: CropMargins) -> RgbaImage {
    let (w, h) = img.dimensions();
    let mx = margins.x.clamp(0.0, 0.5);
    let my = margins.y.clamp(0.0, 0.5);

    let x0 = (w as f32 * mx) as u32;
    let y0 = (h as f32 * my) as u32;
    let cw = w.saturating_sub(2 * x0);
    let ch = h.saturating_sub(2 * y0);

    if cw == 0 || ch == 0 {
        return img.clone();
    }
    imageops::crop_imm(img, x0, y0, cw, ch).to_image()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_luma_weights() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([255, 0, 0, 255]));
        assert_eq!(luma(&img, false).get_pixel(0, 0)[0], 76);
        assert_eq!(luma(&img, true).get_pixel(0, 0)[0], 29);
    }

    #[test]
    fn test_uniform_image_hashes_to_zero() {
        let img = RgbaImage::from_pixel(32, 32, Rgba([120, 120, 120, 255]));
        let sig = average_hash(&img, 10, true).unwrap();
        assert_eq!(sig.len(), 100);
        assert_eq!(sig.to_string(), "0000000000000000000000000");
    }

    #[test]
    fn test_bright_bottom_half() {
        let img = RgbaImage::from_fn(40, 40, |_, y| {
            if y >= 20 {
                Rgba([250, 250, 250, 255])
            } else {
                Rgba([10, 10, 10, 255])
            }
        });
        let sig = average_hash(&img, 10, true).unwrap();
        // Top five rows dark, bottom five rows bright.
        assert_eq!(sig.to_string(), "0000000000003ffffffffffff");
    }

    #[test]
    fn test_hash_size_limits() {
        let img = RgbaImage::new(8, 8);
        assert!(average_hash(&img, 0, false).is_err());
        assert!(average_hash(&img, 12, false).is_err());
        assert_eq!(average_hash(&img, 11, false).unwrap().len(), 121);
    }

    #[test]
    fn test_central_region() {
        let img = RgbaImage::new(100, 40);
        let middle = central_region(&img, CropMargins { x: 0.2, y: 0.45 });
        assert_eq!(middle.dimensions(), (60, 4));

        let clamped = central_region(&img, CropMargins { x: 0.9, y: -1.0 });
        // x clamps to 0.5, which leaves nothing, so the icon is kept whole.
        assert_eq!(clamped.dimensions(), (100, 40));
    }
}
