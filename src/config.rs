//! Engine configuration.
//!
//! Loads tuning values from a JSON file at startup. Every field has a default,
//! so a partial file only overrides what it names and a missing or broken
//! file falls back to the built-in values.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::catalog::Category;

/// Exclusive Hamming-distance limits per category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub artifact: u32,
    pub hero: u32,
    #[serde(rename = "trait")]
    pub traits: u32,
    pub genre: u32,
}

impl Thresholds {
    pub fn for_category(&self, category: Category) -> u32 {
        match category {
            Category::Artifact => self.artifact,
            Category::Hero => self.hero,
            Category::Trait => self.traits,
            Category::Genre => self.genre,
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            artifact: 15,
            hero: 10,
            traits: 25,
            genre: 25,
        }
    }
}

/// Fractions of an icon trimmed from each side before hashing.
/// Values are clamped to 0.0..=0.5.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropMargins {
    pub x: f32,
    pub y: f32,
}

impl Default for CropMargins {
    fn default() -> Self {
        Self { x: 0.2, y: 0.45 }
    }
}

/// A named reference color used to guess a trait's color tag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteColor {
    pub name: String,
    pub rgb: [u8; 3],
}

impl PaletteColor {
    fn new(name: &str, rgb: [u8; 3]) -> Self {
        Self {
            name: name.to_string(),
            rgb,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IdentifyConfig {
    /// Side of the hash grid; signatures have `hash_size²` bits.
    #[serde(default = "default_hash_size")]
    pub hash_size: u32,
    #[serde(default)]
    pub thresholds: Thresholds,
    /// Central region used for genre icons.
    #[serde(default)]
    pub genre_crop: CropMargins,
    /// Reference signatures were hashed from BGR buffers read as RGB.
    #[serde(default = "default_swap_red_blue")]
    pub swap_red_blue: bool,
    #[serde(default = "default_trait_palette")]
    pub trait_palette: Vec<PaletteColor>,
    /// Per-channel tolerance when matching palette colors.
    #[serde(default = "default_color_tolerance")]
    pub color_tolerance: u8,
}

fn default_hash_size() -> u32 {
    10
}

fn default_swap_red_blue() -> bool {
    true
}

fn default_color_tolerance() -> u8 {
    20
}

fn default_trait_palette() -> Vec<PaletteColor> {
    // Channels stay below 255 so the tolerance band is symmetric.
    vec![
        PaletteColor::new("blue", [55, 83, 254]),
        PaletteColor::new("red", [246, 54, 86]),
        PaletteColor::new("yellow", [254, 221, 65]),
        PaletteColor::new("green", [220, 254, 65]),
    ]
}

impl Default for IdentifyConfig {
    fn default() -> Self {
        Self {
            hash_size: default_hash_size(),
            thresholds: Thresholds::default(),
            genre_crop: CropMargins::default(),
            swap_red_blue: default_swap_red_blue(),
            trait_palette: default_trait_palette(),
            color_tolerance: default_color_tolerance(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairConfig {
    /// Highest experience reading trusted outright, per slot.
    #[serde(default = "default_confident_exp")]
    pub confident_exp: Vec<u32>,
    /// Readings below this are never trusted to override a level.
    #[serde(default = "default_confident_exp_floor")]
    pub confident_exp_floor: u32,
    /// Ceiling for slots past the end of `confident_exp`.
    #[serde(default = "default_confident_exp_fallback")]
    pub confident_exp_fallback: u32,
    /// Tie-break order when several experience values fit a window.
    #[serde(default = "default_preferred_digits")]
    pub preferred_digits: Vec<u32>,
}

fn default_confident_exp() -> Vec<u32> {
    vec![100, 100, 60, 60, 50, 50, 50, 50]
}

fn default_confident_exp_floor() -> u32 {
    30
}

fn default_confident_exp_fallback() -> u32 {
    50
}

fn default_preferred_digits() -> Vec<u32> {
    vec![7, 9, 8, 6, 5, 4, 3]
}

impl RepairConfig {
    pub fn confident_ceiling(&self, slot: usize) -> u32 {
        self.confident_exp
            .get(slot)
            .copied()
            .unwrap_or(self.confident_exp_fallback)
    }

    /// Whether a reading is trusted enough to override its slot's level.
    pub fn is_confident(&self, slot: usize, exp: u32) -> bool {
        exp >= self.confident_exp_floor && exp <= self.confident_ceiling(slot)
    }
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            confident_exp: default_confident_exp(),
            confident_exp_floor: default_confident_exp_floor(),
            confident_exp_fallback: default_confident_exp_fallback(),
            preferred_digits: default_preferred_digits(),
        }
    }
}

/// Geometry of the genre strip, relative to the artifact row width.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub gap_after_artifacts: f32,
    pub slot_width: f32,
    pub slot_spacing: f32,
    /// Pixels added around each inferred slot.
    pub padding: i32,
    pub slots: usize,
    /// Players with more artifact boxes than this get no genre slots.
    pub max_artifacts: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            gap_after_artifacts: 0.059_574_4,
            slot_width: 0.251_063_8,
            slot_spacing: 0.043,
            padding: 3,
            slots: 8,
            max_artifacts: 3,
        }
    }
}

/// Complete engine configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub identify: IdentifyConfig,
    #[serde(default)]
    pub repair: RepairConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub genres: GenreConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreConfig {
    /// Players that must share a genre set before it counts as the match's set.
    #[serde(default = "default_min_main_genre_players")]
    pub min_main_genre_players: usize,
}

fn default_min_main_genre_players() -> usize {
    3
}

impl Default for GenreConfig {
    fn default() -> Self {
        Self {
            min_main_genre_players: default_min_main_genre_players(),
        }
    }
}

/// Loads configuration from `path`, or returns defaults.
pub fn load_config(path: &Path) -> EngineConfig {
    info!("Looking for config at: {}", path.display());

    if !path.exists() {
        info!("No config file found, using defaults");
        return EngineConfig::default();
    }

    match fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(config) => {
                info!("Config loaded from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                EngineConfig::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {}: {}. Using defaults.", path.display(), e);
            EngineConfig::default()
        }
    }
}
