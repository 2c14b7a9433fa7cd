//! Level repair.
//!
//! Star counts are reliable individually but are occasionally misread by one
//! or two stars. A round runs five passes in order, each taking the previous
//! pass's output. Rounds repeat until the levels stop changing.
//!
//! 1. a slot whose two neighbors agree with each other takes their value;
//! 2. the first and last slots are pulled back into order;
//! 3. interior slots outside their neighbors' range are re-inferred;
//! 4. the first slot is raised to what its experience implies;
//! 5. confident experience readings override the level when consistent.

use tracing::{debug, warn};

use super::agree::{agrees, known};
use super::reading::Reading;
use super::tiers::level_from_exp;
use super::{Repair, settle};
use crate::config::RepairConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelRepair {
    pub levels: Vec<u8>,
    pub changed: Vec<bool>,
}

impl LevelRepair {
    fn unchanged(levels: &[u8]) -> Self {
        Self {
            levels: levels.to_vec(),
            changed: vec![false; levels.len()],
        }
    }
}

/// Picks a level for a slot bounded by `left` (upper) and/or `right` (lower).
///
/// The level implied by `exp` wins when it fits the bounds. Otherwise the
/// right bound is used if present, else the left. With no bounds the slot is
/// left as is.
pub fn infer_level(exp: Reading, left: Option<u8>, right: Option<u8>) -> Repair<u8> {
    let fallback = match (left, right) {
        (None, None) => return Repair::Unchanged,
        (_, Some(right)) => right,
        (Some(left), None) => left,
    };

    if let Some(exp) = exp.value() {
        let implied = level_from_exp(exp);
        let fits = left.is_none_or(|l| l >= implied) && right.is_none_or(|r| implied >= r);
        if fits {
            return Repair::Repaired(implied);
        }
    }
    Repair::Repaired(fallback)
}

/// Repairs a player's levels using their experience readings.
///
/// Sequences of two or fewer slots are returned unchanged.
pub fn repair_levels(original: &[u8], exps: &[Reading], config: &RepairConfig) -> LevelRepair {
    if original.len() <= 2 {
        return LevelRepair::unchanged(original);
    }
    if exps.len() != original.len() {
        warn!(
            levels = original.len(),
            exps = exps.len(),
            "level and experience counts differ, skipping level repair"
        );
        return LevelRepair::unchanged(original);
    }

    let levels = settle(original, |levels| repair_round(levels, exps, config));

    let changed: Vec<bool> = original.iter().zip(&levels).map(|(a, b)| a != b).collect();
    if changed.iter().any(|&c| c) {
        debug!(?original, fixed = ?levels, "levels repaired");
    }
    LevelRepair { levels, changed }
}

fn repair_round(original: &[u8], exps: &[Reading], config: &RepairConfig) -> Vec<u8> {
    let levels = bracket_pass(original);
    let levels = endpoint_pass(original, &levels, exps);
    let levels = monotonic_pass(&levels, exps);
    let levels = first_slot_pass(&levels, exps);
    confident_exp_pass(&levels, exps, config)
}

/// A slot flanked by two equal neighbors takes their value.
fn bracket_pass(original: &[u8]) -> Vec<u8> {
    let mut out = original.to_vec();
    for i in 1..original.len() - 1 {
        if original[i - 1] == original[i + 1] {
            out[i] = original[i - 1];
        }
    }
    out
}

fn endpoint_pass(original: &[u8], levels: &[u8], exps: &[Reading]) -> Vec<u8> {
    let mut out = levels.to_vec();
    let last = levels.len() - 1;

    if original[0] < levels[1] {
        out[0] = infer_level(exps[0], None, Some(levels[1])).or_keep(out[0]);
    }
    if levels[last - 1] < original[last] {
        out[last] = infer_level(exps[last], Some(levels[last - 1]), None).or_keep(out[last]);
    }
    out
}

/// Interior slots outside the range of strictly ordered neighbors.
fn monotonic_pass(levels: &[u8], exps: &[Reading]) -> Vec<u8> {
    let mut out = levels.to_vec();
    for i in 1..levels.len() - 1 {
        let (left, current, right) = (levels[i - 1], levels[i], levels[i + 1]);
        if left > right && (current > left || current < right) {
            out[i] = infer_level(exps[i], Some(left), Some(right)).or_keep(current);
        }
    }
    out
}

fn first_slot_pass(levels: &[u8], exps: &[Reading]) -> Vec<u8> {
    let mut out = levels.to_vec();
    if let Some(exp) = exps[0].value() {
        let implied = level_from_exp(exp);
        if implied > out[0] {
            out[0] = implied;
        }
    }
    out
}

/// Trusts mid-range readings over the star count when the order allows it.
fn confident_exp_pass(levels: &[u8], exps: &[Reading], config: &RepairConfig) -> Vec<u8> {
    let mut out = levels.to_vec();
    for (i, exp) in exps.iter().enumerate() {
        let Some(exp) = exp.value() else { continue };
        if !config.is_confident(i, exp) {
            continue;
        }
        let implied = level_from_exp(exp);
        if implied != out[i] && agrees(implied, i, &known(&out)) {
            out[i] = implied;
        }
    }
    out
}
