//! Match-wide genre roster and per-player name fixes.
//!
//! A match is played with eight of the twelve genres. Most players end up
//! showing all eight, so the set that several players agree on is taken as
//! the match's roster; the other four are banned. A player whose slots name
//! seven roster genres plus one stray (unknown, banned, or a duplicate) can
//! then have the stray replaced by the missing genre.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use super::Repair;
use super::roster::genre_names;
use crate::catalog::Category;
use crate::identify::IdentificationResult;

/// Number of genres in play each match.
pub const MAIN_GENRE_COUNT: usize = 8;

/// The genre set shared by the most players, if at least `min_players` share
/// it and it names [`MAIN_GENRE_COUNT`] genres. Returns an empty list
/// otherwise.
///
/// Unknown identifications are ignored; players with no known genre do not
/// vote. Ties go to the set seen first.
pub fn infer_main_genres<'a, P, G>(players: P, min_players: usize) -> Vec<String>
where
    P: IntoIterator<Item = G>,
    G: IntoIterator<Item = &'a IdentificationResult>,
{
    let mut votes: Vec<(BTreeSet<&'a str>, usize)> = Vec::new();
    for guesses in players {
        let known: BTreeSet<&str> = guesses
            .into_iter()
            .filter(|g| !g.is_unknown())
            .map(|g| g.name.as_str())
            .collect();
        if known.is_empty() {
            continue;
        }
        match votes.iter_mut().find(|(set, _)| *set == known) {
            Some((_, count)) => *count += 1,
            None => votes.push((known, 1)),
        }
    }

    let mut winner: Option<&(BTreeSet<&str>, usize)> = None;
    for vote in &votes {
        if winner.is_none_or(|(_, best)| vote.1 > *best) {
            winner = Some(vote);
        }
    }

    match winner {
        Some((set, count)) if *count >= min_players && set.len() == MAIN_GENRE_COUNT => {
            debug!(?set, players = count, "main genres inferred");
            set.iter().map(|name| name.to_string()).collect()
        }
        Some((set, count)) => {
            debug!(?set, players = count, "no genre set is shared widely enough");
            Vec::new()
        }
        None => Vec::new(),
    }
}

/// Roster genres outside `main`, empty unless `main` is a full set.
pub fn banned_genres(main: &[String]) -> Vec<String> {
    if main.len() != MAIN_GENRE_COUNT {
        return Vec::new();
    }
    genre_names()
        .filter(|name| !main.iter().any(|m| m == name))
        .map(str::to_string)
        .collect()
}

/// Replaces one stray genre guess with the single roster genre it lacks.
///
/// Needs a full `main` set, at most one unknown guess, and exactly one main
/// genre missing. A guess outside the roster is replaced first; otherwise
/// the weaker of a duplicated pair is. More than two copies, or a pair at
/// equal distance, is ambiguous.
pub fn fix_genre_names(
    guesses: &[IdentificationResult],
    main: &[String],
) -> Repair<Vec<IdentificationResult>> {
    if main.len() != MAIN_GENRE_COUNT {
        return Repair::Unchanged;
    }
    if guesses.iter().filter(|g| g.is_unknown()).count() > 1 {
        return Repair::Unchanged;
    }

    let present: BTreeSet<&str> = guesses.iter().map(|g| g.name.as_str()).collect();
    let missing: Vec<&String> = main.iter().filter(|m| !present.contains(m.as_str())).collect();
    let [expected] = missing.as_slice() else {
        return Repair::Unchanged;
    };

    let target = match guesses
        .iter()
        .position(|g| !main.iter().any(|m| *m == g.name))
    {
        Some(stray) => stray,
        None => match weaker_duplicate(guesses) {
            Repair::Repaired(index) => index,
            Repair::Unchanged => return Repair::Unchanged,
            Repair::Ambiguous => return Repair::Ambiguous,
        },
    };

    debug!(
        slot = target,
        from = %guesses[target].name,
        to = %expected,
        "genre name fixed"
    );
    let mut fixed = guesses.to_vec();
    fixed[target] =
        IdentificationResult::inferred(Category::Genre, expected.as_str(), guesses[target].signature);
    Repair::Repaired(fixed)
}

/// Index of the duplicate to replace: the copy furthest from its signature.
fn weaker_duplicate(guesses: &[IdentificationResult]) -> Repair<usize> {
    let mut copies: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, guess) in guesses.iter().enumerate() {
        copies.entry(guess.name.as_str()).or_default().push(i);
    }

    let Some((name, indices)) = copies.into_iter().max_by_key(|(_, indices)| indices.len()) else {
        return Repair::Unchanged;
    };
    match indices.len() {
        0 | 1 => Repair::Unchanged,
        2 => {
            let (a, b) = (indices[0], indices[1]);
            let (da, db) = (guesses[a].distance, guesses[b].distance);
            if da == db {
                warn!(genre = name, distance = da, "duplicate genre copies are equally close");
                Repair::Ambiguous
            } else if da > db {
                Repair::Repaired(a)
            } else {
                Repair::Repaired(b)
            }
        }
        n => {
            warn!(genre = name, copies = n, "genre appears more than twice");
            Repair::Ambiguous
        }
    }
}
