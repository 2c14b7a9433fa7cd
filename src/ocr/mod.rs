//! Experience counter reading.

pub mod candidate;
pub mod engine;
pub mod preprocess;

pub use candidate::{OcrCandidate, parse_exp};
pub use engine::TesseractEngine;
pub use preprocess::prepare_exp_region;

use anyhow::Result;
use image::RgbaImage;

/// Reads the experience counter of one genre icon with Tesseract.
pub fn read_exp_candidates(engine: &TesseractEngine, icon: &RgbaImage) -> Result<Vec<OcrCandidate>> {
    let prepared = prepare_exp_region(icon);
    if prepared.width() == 0 || prepared.height() == 0 {
        return Ok(Vec::new());
    }
    engine.recognize_digits(&prepared)
}
