//! Tab-separated match table, one row per player.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::genre::{GENRE_ROSTER, Reading};
use crate::player::{MatchReport, Player};

const TRAIT_COLUMNS: usize = 6;
const ARTIFACT_COLUMNS: usize = 3;
const BAN_COLUMNS: usize = 4;

/// Columns before the per-genre level and experience columns.
const LEADING_HEADER: [&str; 18] = [
    "placement",
    "player",
    "hero",
    "trait_1",
    "trait_2",
    "trait_3",
    "trait_4",
    "trait_5",
    "trait_6",
    "artifact_1",
    "artifact_2",
    "artifact_3",
    "is_reporter",
    "reporter_name",
    "ban1",
    "ban2",
    "ban3",
    "ban4",
];

/// Full header: fixed columns, then `<genre>_lvl` and `<genre>_exp` for
/// every genre in roster order.
pub fn header() -> Vec<String> {
    let levels = GENRE_ROSTER
        .iter()
        .map(|(name, _)| format!("{}_lvl", name.to_lowercase()));
    let exps = GENRE_ROSTER
        .iter()
        .map(|(name, _)| format!("{}_exp", name.to_lowercase()));
    LEADING_HEADER
        .iter()
        .map(|s| s.to_string())
        .chain(levels)
        .chain(exps)
        .collect()
}

/// Repaired level of each roster genre; 0 for genres the player lacks.
pub fn genre_level_row(player: &Player) -> [u8; 12] {
    let mut row = [0; 12];
    for (i, (genre, _)) in GENRE_ROSTER.iter().enumerate() {
        if let Some(slot) = player.genres.iter().rev().find(|s| s.name() == *genre) {
            row[i] = slot.level;
        }
    }
    row
}

/// Repaired experience of each roster genre; 0 when missing or unreadable.
pub fn genre_exp_row(player: &Player) -> [u32; 12] {
    let mut row = [0; 12];
    for (i, (genre, _)) in GENRE_ROSTER.iter().enumerate() {
        if let Some(slot) = player.genres.iter().rev().find(|s| s.name() == *genre) {
            row[i] = match slot.exp {
                Reading::Recognized(exp) => exp,
                Reading::Unrecognized => 0,
            };
        }
    }
    row
}

fn padded<'a>(names: impl Iterator<Item = &'a str>, width: usize) -> Vec<String> {
    let mut cells: Vec<String> = names.take(width).map(str::to_string).collect();
    cells.resize(width, String::new());
    cells
}

pub fn player_row(report: &MatchReport, player: &Player) -> Vec<String> {
    let reporter = report.reporter.as_deref().unwrap_or("");
    let is_reporter = report.reporter.as_deref() == Some(player.name());

    let mut bans = report.banned_genres.clone();
    bans.sort();

    let mut row = vec![
        player.rank().to_string(),
        player.name().to_string(),
        player.hero.name.clone(),
    ];
    row.extend(padded(player.traits.iter().map(|t| t.name.as_str()), TRAIT_COLUMNS));
    row.extend(padded(
        player.artifacts.iter().map(|a| a.name.as_str()),
        ARTIFACT_COLUMNS,
    ));
    row.push(if is_reporter { "True" } else { "" }.to_string());
    row.push(reporter.to_string());
    row.extend(padded(bans.iter().map(String::as_str), BAN_COLUMNS));
    row.extend(genre_level_row(player).iter().map(u8::to_string));
    row.extend(genre_exp_row(player).iter().map(u32::to_string));
    row
}

/// Header plus one line per player, tab separated.
pub fn to_tsv(report: &MatchReport) -> String {
    let mut text = header().join("\t");
    text.push('\n');
    for player in &report.players {
        text.push_str(&player_row(report, player).join("\t"));
        text.push('\n');
    }
    text
}

pub fn write_tsv(report: &MatchReport, path: &Path) -> Result<()> {
    let mut file = File::create(path)
        .with_context(|| format!("Failed to create TSV file: {}", path.display()))?;
    file.write_all(to_tsv(report).as_bytes())
        .context("Failed to write TSV rows")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::test_support::sample_report;
    use tempfile::tempdir;

    #[test]
    fn test_header_layout() {
        let header = header();
        assert_eq!(header.len(), 18 + 24);
        assert_eq!(header[0], "placement");
        assert_eq!(header[18], "crit_lvl");
        assert_eq!(header[29], "weaponry_lvl");
        assert_eq!(header[30], "crit_exp");
        assert_eq!(header[41], "weaponry_exp");
    }

    #[test]
    fn test_genre_rows() {
        let report = sample_report();
        let player = &report.players[0];
        let levels = genre_level_row(player);
        let exps = genre_exp_row(player);

        // Crit is first in the roster, Toxin tenth.
        assert_eq!(levels[0], 3);
        assert_eq!(exps[0], 27);
        assert_eq!(levels[9], 1);
        assert_eq!(exps[9], 0);
        // Evasion is not held.
        assert_eq!((levels[1], exps[1]), (0, 0));
    }

    #[test]
    fn test_player_row() {
        let report = sample_report();
        let row = player_row(&report, &report.players[0]);

        assert_eq!(row.len(), header().len());
        assert_eq!(&row[..4], &["1", "alice", "Ursa", "Maul"]);
        assert_eq!(row[4], "");
        assert_eq!(row[9], "Blade");
        assert_eq!(row[10], "");
        assert_eq!(row[12], "True");
        assert_eq!(row[13], "alice");
        assert_eq!(&row[14..18], &["Evasion", "Innerfire", "Vulnerable", "Weaponry"]);

        let other = player_row(&report, &report.players[1]);
        assert_eq!(other[12], "");
        assert_eq!(other[13], "alice");
    }

    #[test]
    fn test_write_tsv() {
        let report = sample_report();
        let dir = tempdir().unwrap();
        let path = dir.path().join("output.tsv");

        write_tsv(&report, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3); // header + 2 players
        assert!(lines[0].starts_with("placement\tplayer\thero"));
        assert!(lines[2].starts_with("2\tbob\t"));
    }
}
