//! Output formats for a processed match.

pub mod document;
pub mod rows;
pub mod summary;

pub use document::{MatchDocument, export_to_json};
pub use rows::{to_tsv, write_tsv};
pub use summary::{Scores, scores, to_text};

#[cfg(test)]
pub(crate) mod test_support {
    use crate::catalog::Category;
    use crate::genre::Reading;
    use crate::geometry::BoundingBox;
    use crate::identify::{IdentificationResult, MatchOutcome};
    use crate::player::{GenreSlot, MatchReport, Placement, Player, Unassociated};

    fn matched(category: Category, name: &str) -> IdentificationResult {
        IdentificationResult {
            category,
            name: name.to_string(),
            hero: None,
            color: None,
            signature: None,
            distance: 4,
            outcome: MatchOutcome::Matched,
        }
    }

    fn player(rank: u32, name: &str) -> Player {
        Player::new(Placement {
            rank,
            name: name.to_string(),
            confidence: 0.9,
            y_center: rank as f32 * 100.0,
        })
    }

    /// Two players: alice (reporter, two genres) and bob (nothing identified).
    pub fn sample_report() -> MatchReport {
        let mut alice = player(1, "alice");
        alice.hero = matched(Category::Hero, "Ursa");
        alice.traits = vec![matched(Category::Trait, "Maul")];
        alice.artifacts = vec![matched(Category::Artifact, "Blade")];
        alice.genres = vec![
            GenreSlot::new(
                BoundingBox::default(),
                matched(Category::Genre, "Crit"),
                3,
                Reading::Recognized(27),
            ),
            GenreSlot::new(
                BoundingBox::default(),
                matched(Category::Genre, "Toxin"),
                2,
                Reading::Unrecognized,
            ),
        ];
        alice.genres[1].level = 1;
        alice.genres[1].level_changed = true;

        let bob = player(2, "bob");

        let main = ["Crit", "Frost", "Heal", "Health", "Mech", "Shield", "Spell", "Toxin"];
        MatchReport {
            players: vec![alice, bob],
            reporter: Some("alice".to_string()),
            main_genres: main.iter().map(|s| s.to_string()).collect(),
            banned_genres: vec![
                "Evasion".to_string(),
                "Innerfire".to_string(),
                "Vulnerable".to_string(),
                "Weaponry".to_string(),
            ],
            unassociated: Unassociated::default(),
        }
    }
}
