use serde::{Deserialize, Serialize};

use crate::catalog::Category;
use crate::genre::Reading;
use crate::geometry::BoundingBox;
use crate::identify::{IdentificationResult, MatchOutcome};

/// One line of the placement board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub rank: u32,
    pub name: String,
    #[serde(default)]
    pub confidence: f32,
    /// Vertical center of the player's row in screenshot pixels.
    pub y_center: f32,
}

/// A genre slot before and after repair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreSlot {
    pub bbox: BoundingBox,
    pub identification: IdentificationResult,
    /// Star count as read.
    pub initial_level: u8,
    pub initial_exp: Reading,
    pub level: u8,
    pub exp: Reading,
    pub level_changed: bool,
    pub exp_changed: bool,
}

impl GenreSlot {
    pub fn new(
        bbox: BoundingBox,
        identification: IdentificationResult,
        stars: u8,
        exp: Reading,
    ) -> Self {
        Self {
            bbox,
            identification,
            initial_level: stars,
            initial_exp: exp,
            level: stars,
            exp,
            level_changed: false,
            exp_changed: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.identification.name
    }
}

/// Everything known about one player in one match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Player {
    pub placement: Placement,
    pub hero_box: Option<BoundingBox>,
    pub artifact_boxes: Vec<BoundingBox>,
    pub trait_boxes: Vec<BoundingBox>,
    pub genre_boxes: Vec<BoundingBox>,
    pub hero: IdentificationResult,
    pub artifacts: Vec<IdentificationResult>,
    pub traits: Vec<IdentificationResult>,
    pub genres: Vec<GenreSlot>,
}

impl Player {
    pub fn new(placement: Placement) -> Self {
        Self {
            placement,
            hero_box: None,
            artifact_boxes: Vec::new(),
            trait_boxes: Vec::new(),
            genre_boxes: Vec::new(),
            hero: IdentificationResult::unknown(Category::Hero, None, MatchOutcome::NoMatch),
            artifacts: Vec::new(),
            traits: Vec::new(),
            genres: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.placement.name
    }

    pub fn rank(&self) -> u32 {
        self.placement.rank
    }

    pub fn genre_guesses(&self) -> impl Iterator<Item = &IdentificationResult> {
        self.genres.iter().map(|slot| &slot.identification)
    }

    pub fn levels(&self) -> Vec<u8> {
        self.genres.iter().map(|slot| slot.level).collect()
    }

    pub fn exps(&self) -> Vec<Reading> {
        self.genres.iter().map(|slot| slot.exp).collect()
    }

    /// Sorts artifact and trait boxes left to right.
    pub fn order_boxes(&mut self) {
        self.artifact_boxes.sort_by_key(|b| b.x);
        self.trait_boxes.sort_by_key(|b| b.x);
    }
}
