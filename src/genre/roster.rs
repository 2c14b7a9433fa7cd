//! The twelve genres and their two-letter codes.

use super::reading::Reading;

/// Every genre with its shorthand code, in report column order.
pub const GENRE_ROSTER: [(&str, &str); 12] = [
    ("Crit", "CR"),
    ("Evasion", "EV"),
    ("Frost", "FR"),
    ("Heal", "HL"),
    ("Health", "HP"),
    ("Innerfire", "IF"),
    ("Mech", "ME"),
    ("Shield", "SH"),
    ("Spell", "SP"),
    ("Toxin", "TX"),
    ("Vulnerable", "VU"),
    ("Weaponry", "WP"),
];

/// Two-letter code of a genre, `??` for names outside the roster.
pub fn genre_code(name: &str) -> &'static str {
    GENRE_ROSTER
        .iter()
        .find(|(genre, _)| *genre == name)
        .map_or("??", |(_, code)| code)
}

pub fn genre_names() -> impl Iterator<Item = &'static str> {
    GENRE_ROSTER.iter().map(|(name, _)| *name)
}

/// Compact slot description, e.g. `CR3_27`.
pub fn shorthand(name: &str, level: u8, exp: Reading) -> String {
    format!("{}{}_{}", genre_code(name), level, exp)
}
