//! Human-readable match summary and identification scores.

use serde::Serialize;
use std::fmt::Write;

use crate::genre::{MAIN_GENRE_COUNT, shorthand};
use crate::identify::IdentificationResult;
use crate::player::{MatchReport, Player};

/// How many icons stayed unidentified, against how many were expected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Scores {
    pub heroes_unknown: usize,
    pub heroes: usize,
    pub artifacts_unknown: usize,
    pub artifacts: usize,
    pub traits_unknown: usize,
    pub traits: usize,
    /// Missing slots count as unknown.
    pub genres_unknown: usize,
    pub genres: usize,
}

fn known<'a>(results: impl IntoIterator<Item = &'a IdentificationResult>) -> usize {
    results.into_iter().filter(|r| !r.is_unknown()).count()
}

pub fn scores(report: &MatchReport) -> Scores {
    let players = &report.players;
    let heroes = players.len();
    let artifacts: usize = players.iter().map(|p| p.artifacts.len()).sum();
    let traits: usize = players.iter().map(|p| p.traits.len()).sum();
    let genres = players.len() * MAIN_GENRE_COUNT;

    let known_genres = players
        .iter()
        .map(|p| known(p.genre_guesses()).min(MAIN_GENRE_COUNT))
        .sum::<usize>();

    Scores {
        heroes_unknown: heroes - known(players.iter().map(|p| &p.hero)),
        heroes,
        artifacts_unknown: artifacts - known(players.iter().flat_map(|p| &p.artifacts)),
        artifacts,
        traits_unknown: traits - known(players.iter().flat_map(|p| &p.traits)),
        traits,
        genres_unknown: genres - known_genres,
        genres,
    }
}

fn signature_text(result: &IdentificationResult) -> String {
    result
        .signature
        .map_or_else(|| "-".to_string(), |s| s.to_string())
}

/// Multi-line summary: players, match genres, then one block per player.
pub fn to_text(report: &MatchReport) -> String {
    let names: Vec<&str> = report.players.iter().map(|p| p.name()).collect();
    let mut text = String::new();
    let _ = writeln!(text, "Players: {:?}", names);
    let _ = write!(
        text,
        "Genres: {:?} (Banned: {:?})",
        report.main_genres, report.banned_genres
    );

    for player in &report.players {
        let marker = if report.reporter.as_deref() == Some(player.name()) {
            "*"
        } else {
            ""
        };
        let _ = write!(
            text,
            "\n#{} - {}{} - {} - {}",
            player.rank(),
            player.name(),
            marker,
            player.hero.name,
            signature_text(&player.hero)
        );

        let artifacts: Vec<&str> = player.artifacts.iter().map(|a| a.name.as_str()).collect();
        let _ = write!(text, "\n\tArtifacts: {:?}", artifacts);
        let traits: Vec<&str> = player.traits.iter().map(|t| t.name.as_str()).collect();
        let _ = write!(text, "\n\tTraits: {:?}", traits);

        let codes: Vec<String> = player
            .genres
            .iter()
            .map(|slot| shorthand(slot.name(), slot.level, slot.exp))
            .collect();
        let _ = write!(text, "\n\t{} Genres: {:?}", distinct_genres(player), codes);
    }
    text
}

fn distinct_genres(player: &Player) -> usize {
    let mut names: Vec<&str> = player
        .genre_guesses()
        .filter(|g| !g.is_unknown())
        .map(|g| g.name.as_str())
        .collect();
    names.sort_unstable();
    names.dedup();
    names.len()
}
