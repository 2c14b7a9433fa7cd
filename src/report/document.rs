//! JSON export of a processed match.

use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use super::summary::{Scores, scores};
use crate::genre::{Reading, genre_code};
use crate::player::{MatchReport, Player, Unassociated};

const DATA_VERSION: &str = "1";

#[derive(Debug, Clone, Serialize)]
pub struct GenreDocument<'a> {
    pub name: &'a str,
    pub code: &'a str,
    pub level: u8,
    pub exp: Reading,
    pub initial_level: u8,
    pub initial_exp: Reading,
    pub level_changed: bool,
    pub exp_changed: bool,
    pub distance: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerDocument<'a> {
    pub name: &'a str,
    pub placement: u32,
    pub hero: &'a str,
    pub traits: Vec<&'a str>,
    pub artifacts: Vec<&'a str>,
    pub genres: Vec<GenreDocument<'a>>,
}

impl<'a> PlayerDocument<'a> {
    fn new(player: &'a Player) -> Self {
        Self {
            name: player.name(),
            placement: player.rank(),
            hero: &player.hero.name,
            traits: player.traits.iter().map(|t| t.name.as_str()).collect(),
            artifacts: player.artifacts.iter().map(|a| a.name.as_str()).collect(),
            genres: player
                .genres
                .iter()
                .map(|slot| GenreDocument {
                    name: slot.name(),
                    code: genre_code(slot.name()),
                    level: slot.level,
                    exp: slot.exp,
                    initial_level: slot.initial_level,
                    initial_exp: slot.initial_exp,
                    level_changed: slot.level_changed,
                    exp_changed: slot.exp_changed,
                    distance: slot.identification.distance,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchDocument<'a> {
    pub generated_at: String,
    pub submitter: &'a str,
    pub players: Vec<&'a str>,
    pub genres: &'a [String],
    pub genres_banned: &'a [String],
    pub info: Vec<PlayerDocument<'a>>,
    pub scores: Scores,
    pub unassociated: Unassociated,
    pub data_version: &'static str,
}

impl<'a> MatchDocument<'a> {
    pub fn new(report: &'a MatchReport) -> Self {
        Self {
            generated_at: Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
            submitter: report.reporter.as_deref().unwrap_or("UNKNOWN"),
            players: report.players.iter().map(|p| p.name()).collect(),
            genres: &report.main_genres,
            genres_banned: &report.banned_genres,
            info: report.players.iter().map(PlayerDocument::new).collect(),
            scores: scores(report),
            unassociated: report.unassociated,
            data_version: DATA_VERSION,
        }
    }
}

/// Writes the match document, pretty-printed.
pub fn export_to_json(report: &MatchReport, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&MatchDocument::new(report))
        .context("Failed to serialize match report to JSON")?;

    let mut file = File::create(output_path)
        .with_context(|| format!("Failed to create JSON file: {}", output_path.display()))?;

    file.write_all(json.as_bytes())
        .context("Failed to write JSON data")?;

    Ok(())
}
