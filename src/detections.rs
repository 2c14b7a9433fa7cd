//! Detector output for one screenshot.
//!
//! Placement rows, icon boxes and star counts come from upstream detectors
//! as a JSON file. Experience text may be included per slot; slots without
//! it are read with Tesseract when an engine is available.

use anyhow::{Context, Result};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::ocr::{OcrCandidate, TesseractEngine, read_exp_candidates};
use crate::player::{DetectedBoxes, MatchInput, Placement, SlotKey, SlotReader};

/// Per-slot readings supplied by the detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotDetection {
    pub rank: u32,
    pub slot: usize,
    pub stars: u8,
    /// OCR candidates for the experience counter, if already read.
    #[serde(default)]
    pub exp: Option<Vec<OcrCandidate>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionFile {
    #[serde(default)]
    pub reporter: Option<String>,
    #[serde(default)]
    pub placements: Vec<Placement>,
    #[serde(default)]
    pub boxes: DetectedBoxes,
    #[serde(default)]
    pub slots: Vec<SlotDetection>,
}

impl DetectionFile {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read detections: {}", path.display()))?;
        let file: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse detections: {}", path.display()))?;
        info!(
            "Loaded {} placements, {} boxes, {} slots from {}",
            file.placements.len(),
            file.boxes.total(),
            file.slots.len(),
            path.display()
        );
        Ok(file)
    }

    /// Splits into the pipeline input and a reader for the slot data.
    pub fn into_parts(self, engine: Option<TesseractEngine>) -> (MatchInput, DetectionReader) {
        let mut reader = DetectionReader {
            stars: HashMap::new(),
            exps: HashMap::new(),
            engine,
        };
        for slot in self.slots {
            let key = SlotKey {
                rank: slot.rank,
                slot: slot.slot,
            };
            reader.stars.insert(key, slot.stars);
            if let Some(exp) = slot.exp {
                reader.exps.insert(key, exp);
            }
        }

        let input = MatchInput {
            placements: self.placements,
            reporter: self.reporter,
            boxes: self.boxes,
        };
        (input, reader)
    }
}

/// [`SlotReader`] over detector output, falling back to Tesseract for
/// experience text.
#[derive(Debug, Clone)]
pub struct DetectionReader {
    stars: HashMap<SlotKey, u8>,
    exps: HashMap<SlotKey, Vec<OcrCandidate>>,
    engine: Option<TesseractEngine>,
}

impl SlotReader for DetectionReader {
    fn count_stars(&self, _icon: &RgbaImage, key: SlotKey) -> Result<u8> {
        Ok(self.stars.get(&key).copied().unwrap_or_else(|| {
            warn!(?key, "no star count detected, assuming 0");
            0
        }))
    }

    fn read_exp(&self, icon: &RgbaImage, key: SlotKey) -> Result<Vec<OcrCandidate>> {
        if let Some(candidates) = self.exps.get(&key) {
            return Ok(candidates.clone());
        }
        match &self.engine {
            Some(engine) => read_exp_candidates(engine, icon),
            None => Ok(Vec::new()),
        }
    }
}
