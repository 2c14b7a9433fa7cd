//! Genre slot reconciliation.
//!
//! Each player has eight genre slots ordered strongest first. A slot carries
//! a level (star count) and an experience reading, both read independently
//! and both error-prone. The passes here use the ordering, the level/
//! experience tier table and neighboring slots to repair the two sequences
//! against each other, and to fix genre names using the match-wide roster.
//!
//! Every pass is a pure function from one sequence to the next, and each
//! repair re-runs its passes until the sequence stops changing.

use std::fmt;

use tracing::warn;

pub mod agree;
pub mod exps;
pub mod fix;
pub mod levels;
pub mod reading;
pub mod roster;
pub mod tiers;

pub use agree::agrees;
pub use exps::{ExpRepair, infer_exp, repair_exps};
pub use fix::{MAIN_GENRE_COUNT, banned_genres, fix_genre_names, infer_main_genres};
pub use levels::{LevelRepair, infer_level, repair_levels};
pub use reading::Reading;
pub use roster::{GENRE_ROSTER, genre_code, shorthand};
pub use tiers::{EXP_CEILING, MAX_LEVEL, exp_range, level_from_exp};

/// Result of trying to repair one value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Repair<T> {
    Repaired(T),
    /// Not enough evidence to change anything.
    Unchanged,
    /// Evidence points several ways.
    Ambiguous,
}

impl<T> Repair<T> {
    /// The repaired value, or `current` when nothing was decided.
    pub fn or_keep(self, current: T) -> T {
        match self {
            Repair::Repaired(value) => value,
            Repair::Unchanged | Repair::Ambiguous => current,
        }
    }
}

/// Upper bound on repair rounds before giving up on a fixpoint.
const MAX_ROUNDS: usize = 32;

/// Re-runs `round` on its own output until nothing changes.
///
/// A single round can leave work for the next one: a slot repaired late in
/// a round may make an earlier pass fire on an already visited neighbor.
fn settle<T>(start: &[T], mut round: impl FnMut(&[T]) -> Vec<T>) -> Vec<T>
where
    T: PartialEq + fmt::Debug,
{
    let mut current = round(start);
    for _ in 1..MAX_ROUNDS {
        let next = round(&current);
        if next == current {
            return current;
        }
        current = next;
    }
    warn!(?start, last = ?current, "repair did not settle after {} rounds", MAX_ROUNDS);
    current
}
