use anyhow::{Context, Result, anyhow};
use image::GrayImage;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::NamedTempFile;
use tracing::{debug, trace};

use super::candidate::OcrCandidate;
use crate::paths;

/// Runs the Tesseract command-line tool restricted to digits.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    executable: PathBuf,
    tessdata: Option<PathBuf>,
}

impl TesseractEngine {
    pub fn new(executable: impl Into<PathBuf>, tessdata: Option<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            tessdata,
        }
    }

    /// Uses `explicit` if given, then a bundled copy next to the executable,
    /// then whatever `tesseract` resolves to on the PATH.
    pub fn locate(explicit: Option<&Path>) -> Self {
        if let Some(path) = explicit {
            return Self::new(path, None);
        }

        let bundled_dir = paths::get_tesseract_dir();
        let bundled = bundled_dir.join(if cfg!(windows) { "tesseract.exe" } else { "tesseract" });
        if bundled.exists() {
            let tessdata = bundled_dir.join("tessdata");
            debug!("Using bundled Tesseract at {}", bundled.display());
            return Self::new(bundled, tessdata.exists().then_some(tessdata));
        }

        Self::new("tesseract", None)
    }

    /// Recognizes digit words in a preprocessed grayscale image.
    pub fn recognize_digits(&self, img: &GrayImage) -> Result<Vec<OcrCandidate>> {
        let temp_input = NamedTempFile::with_suffix(".png")?;
        img.save(temp_input.path())
            .context("Failed to write OCR input image")?;

        // Tesseract appends .tsv to the output base
        let temp_output = NamedTempFile::new()?;
        let output_base = temp_output.path().to_string_lossy().to_string();

        let mut command = Command::new(&self.executable);
        command.arg(temp_input.path()).arg(&output_base);
        if let Some(tessdata) = &self.tessdata {
            command.arg("--tessdata-dir").arg(tessdata);
        }
        let output = command
            .arg("--psm")
            .arg("7") // Single text line
            .arg("-c")
            .arg("tessedit_char_whitelist=0123456789")
            .arg("tsv")
            .output()
            .with_context(|| format!("Failed to run {}", self.executable.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("Tesseract failed: {}", stderr));
        }

        let tsv_path = format!("{}.tsv", output_base);
        let tsv_content = std::fs::read_to_string(&tsv_path)
            .map_err(|e| anyhow!("Failed to read Tesseract output: {}", e))?;
        let _ = std::fs::remove_file(&tsv_path);

        let words = parse_tsv_words(&tsv_content);
        trace!(?words, "tesseract words");
        Ok(words)
    }
}

/// Extracts word-level entries from Tesseract TSV output.
///
/// Rows are `level page block par line word left top width height conf text`;
/// only level 5 (word) rows with text and a non-negative confidence are kept.
fn parse_tsv_words(tsv: &str) -> Vec<OcrCandidate> {
    tsv.lines()
        .skip(1) // Header
        .filter_map(|line| {
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 12 {
                return None;
            }
            let level: i32 = fields[0].parse().unwrap_or(-1);
            let conf: f32 = fields[10].parse().unwrap_or(-1.0);
            let text = fields[11].trim();
            (level == 5 && !text.is_empty() && conf >= 0.0)
                .then(|| OcrCandidate::new(text, conf))
        })
        .collect()
}
