//! Per-match driver: identification, then genre reconciliation.
//!
//! Players are independent until the match-wide genre roster is needed, so
//! identification runs across players in parallel, the roster is inferred
//! from every player's genre guesses, and the repairs run in parallel again.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use image::RgbaImage;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::association::{DetectedBoxes, Unassociated, associate};
use super::layout::{infer_genre_boxes, reference_span};
use super::record::{GenreSlot, Placement, Player};
use crate::catalog::{Catalog, Category, Filter};
use crate::config::{EngineConfig, RepairConfig};
use crate::genre::{Reading, Repair, banned_genres, fix_genre_names, infer_main_genres, repair_exps, repair_levels};
use crate::identify::color::dominant_color;
use crate::identify::{IdentificationResult, Identifier};
use crate::ocr::{OcrCandidate, parse_exp};

/// Known traits a hero needs before it is inferred from them.
const MIN_TRAITS_FOR_HERO: usize = 3;

/// Identifies one genre slot for the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotKey {
    /// Placement rank of the slot's player.
    pub rank: u32,
    pub slot: usize,
}

/// Reads the star count and experience counter of a genre icon.
pub trait SlotReader: Send + Sync {
    fn count_stars(&self, icon: &RgbaImage, key: SlotKey) -> Result<u8>;

    fn read_exp(&self, icon: &RgbaImage, key: SlotKey) -> Result<Vec<OcrCandidate>>;
}

/// Everything detected on one screenshot before identification.
#[derive(Debug, Clone, Default)]
pub struct MatchInput {
    pub placements: Vec<Placement>,
    pub reporter: Option<String>,
    pub boxes: DetectedBoxes,
}

/// Fully identified and repaired match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchReport {
    /// Ordered by placement.
    pub players: Vec<Player>,
    pub reporter: Option<String>,
    pub main_genres: Vec<String>,
    pub banned_genres: Vec<String>,
    pub unassociated: Unassociated,
}

pub struct Aggregator<'a, R: SlotReader> {
    identifier: Identifier<'a>,
    config: &'a EngineConfig,
    reader: &'a R,
}

impl<'a, R: SlotReader> Aggregator<'a, R> {
    pub fn new(catalog: &'a Catalog, config: &'a EngineConfig, reader: &'a R) -> Self {
        Self {
            identifier: Identifier::new(catalog, &config.identify),
            config,
            reader,
        }
    }

    pub fn run(&self, screenshot: &RgbaImage, input: MatchInput) -> Result<MatchReport> {
        let mut players: Vec<Player> = input.placements.into_iter().map(Player::new).collect();
        players.sort_by_key(|p| p.rank());
        info!(players = players.len(), boxes = input.boxes.total(), "processing match");

        let unassociated = associate(&mut players, &input.boxes);

        match reference_span(&input.boxes.artifacts) {
            Some(span) => {
                for player in players.iter_mut() {
                    player.genre_boxes =
                        infer_genre_boxes(&player.artifact_boxes, span, &self.config.layout);
                }
            }
            None => warn!("no artifact boxes, genre slots cannot be placed"),
        }

        players
            .par_iter_mut()
            .try_for_each(|player| self.identify_player(screenshot, player))?;

        let main_genres = infer_main_genres(
            players.iter().map(|p| p.genre_guesses()),
            self.config.genres.min_main_genre_players,
        );
        let banned = banned_genres(&main_genres);
        info!(main = ?main_genres, banned = ?banned, "match genres");

        players
            .par_iter_mut()
            .for_each(|player| reconcile_genres(player, &main_genres, &self.config.repair));

        Ok(MatchReport {
            players,
            reporter: input.reporter,
            main_genres,
            banned_genres: banned,
            unassociated,
        })
    }

    fn identify_player(&self, screenshot: &RgbaImage, player: &mut Player) -> Result<()> {
        let none = Filter::none();

        if let Some(bbox) = player.hero_box {
            player.hero = self
                .identifier
                .identify_region(screenshot, bbox, Category::Hero, &none)?;
        }

        player.artifacts = player
            .artifact_boxes
            .iter()
            .map(|&bbox| {
                self.identifier
                    .identify_region(screenshot, bbox, Category::Artifact, &none)
            })
            .collect::<Result<_, _>>()?;

        let known_hero = (!player.hero.is_unknown()).then(|| player.hero.name.clone());
        let mut traits = Vec::with_capacity(player.trait_boxes.len());
        for bbox in &player.trait_boxes {
            let icon = bbox.crop(screenshot);
            let filter = self.trait_filter(&icon, known_hero.as_deref());
            traits.push(self.identifier.identify(&icon, Category::Trait, &filter)?);
        }
        player.traits = traits;

        if player.hero.is_unknown() {
            if let Some(hero) = infer_hero(&player.traits) {
                info!(player = %player.name(), %hero, "hero inferred from traits");
                player.hero =
                    IdentificationResult::inferred(Category::Hero, hero, player.hero.signature);
            }
        }

        let mut slots = Vec::with_capacity(player.genre_boxes.len());
        for (index, &bbox) in player.genre_boxes.iter().enumerate() {
            let key = SlotKey {
                rank: player.rank(),
                slot: index,
            };
            let icon = bbox.crop(screenshot);
            let identification = self.identifier.identify(&icon, Category::Genre, &none)?;
            let stars = self
                .reader
                .count_stars(&icon, key)
                .with_context(|| format!("Failed to count stars for {:?}", key))?;
            let exp = match self.reader.read_exp(&icon, key) {
                Ok(candidates) => parse_exp(&candidates),
                Err(e) => {
                    warn!(?key, "experience could not be read: {:#}", e);
                    Reading::Unrecognized
                }
            };
            slots.push(GenreSlot::new(bbox, identification, stars, exp));
        }
        player.genres = slots;

        debug!(
            player = %player.name(),
            hero = %player.hero.name,
            artifacts = player.artifacts.len(),
            traits = player.traits.len(),
            genres = player.genres.len(),
            "player identified"
        );
        Ok(())
    }

    fn trait_filter(&self, icon: &RgbaImage, hero: Option<&str>) -> Filter {
        let identify = self.identifier.config();
        let filter = hero.map_or_else(Filter::none, |name| Filter::hero(name));
        match dominant_color(icon, &identify.trait_palette, identify.color_tolerance) {
            Some(color) => filter.with_color(color.name.as_str()),
            None => filter,
        }
    }
}

/// The hero most of a player's known traits belong to.
///
/// Needs at least [`MIN_TRAITS_FOR_HERO`] traits of that hero and no more
/// traits of other heroes combined.
pub fn infer_hero(traits: &[IdentificationResult]) -> Option<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for hero in traits
        .iter()
        .filter(|t| !t.is_unknown())
        .filter_map(|t| t.hero.as_deref())
    {
        *counts.entry(hero).or_default() += 1;
    }

    let total: usize = counts.values().sum();
    let (hero, count) = counts
        .into_iter()
        .max_by(|(a, ca), (b, cb)| ca.cmp(cb).then_with(|| b.cmp(a)))?;
    (count >= MIN_TRAITS_FOR_HERO && count >= total - count).then(|| hero.to_string())
}

/// Fixes genre names, then levels, then experience, in that order.
fn reconcile_genres(player: &mut Player, main_genres: &[String], config: &RepairConfig) {
    let guesses: Vec<IdentificationResult> = player.genre_guesses().cloned().collect();
    if let Repair::Repaired(fixed) = fix_genre_names(&guesses, main_genres) {
        for (slot, identification) in player.genres.iter_mut().zip(fixed) {
            slot.identification = identification;
        }
    }

    let initial_levels: Vec<u8> = player.genres.iter().map(|s| s.initial_level).collect();
    let initial_exps: Vec<Reading> = player.genres.iter().map(|s| s.initial_exp).collect();

    let levels = repair_levels(&initial_levels, &initial_exps, config);
    let exps = repair_exps(&initial_exps, &levels.levels, config);

    for (i, slot) in player.genres.iter_mut().enumerate() {
        slot.level = levels.levels[i];
        slot.level_changed = levels.changed[i];
        slot.exp = exps.exps[i];
        slot.exp_changed = exps.changed[i];
    }
}
