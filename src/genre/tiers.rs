//! Experience thresholds for the five genre levels.

/// Highest reachable level.
pub const MAX_LEVEL: u8 = 4;

/// Upper bound reported for the top level and for levels out of range.
pub const EXP_CEILING: u32 = 9999;

/// Minimum experience for each level, lowest first.
pub const LEVEL_MIN_EXP: [u32; 5] = [0, 4, 12, 24, 40];

/// Inclusive experience range of `level`.
///
/// Levels above [`MAX_LEVEL`] yield `(0, EXP_CEILING)`.
pub fn exp_range(level: u8) -> (u32, u32) {
    let index = usize::from(level);
    match LEVEL_MIN_EXP.get(index) {
        Some(&min) => {
            let max = LEVEL_MIN_EXP
                .get(index + 1)
                .map_or(EXP_CEILING, |next| next - 1);
            (min, max)
        }
        None => (0, EXP_CEILING),
    }
}

/// Highest level whose minimum experience is at most `exp`.
pub fn level_from_exp(exp: u32) -> u8 {
    LEVEL_MIN_EXP
        .iter()
        .rposition(|&min| min <= exp)
        .map_or(0, |level| level as u8)
}

pub fn exp_in_range(level: u8, exp: u32) -> bool {
    let (min, max) = exp_range(level);
    (min..=max).contains(&exp)
}
