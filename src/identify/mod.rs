//! Icon identification against the reference catalog.
//!
//! An icon is hashed, compared by Hamming distance with every entry in the
//! relevant catalog view, and resolved to the closest entity strictly under
//! the category's threshold. Ties between different entities at the best
//! distance are reported as ambiguous rather than picked arbitrarily.

pub mod color;
pub mod hash;

use std::collections::BTreeSet;

use image::RgbaImage;
use serde::Serialize;
use tracing::trace;

use crate::catalog::{Catalog, Category, Filter, ReferenceEntry, Signature};
use crate::config::IdentifyConfig;
use crate::error::EngineError;
use crate::geometry::BoundingBox;

/// Distance reported when no catalog entry backs the result.
pub const NO_MATCH_DISTANCE: u32 = 9999;

/// How an identification was reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchOutcome {
    /// Closest entry under the threshold.
    Matched,
    /// The filtered view named a single entity, accepted at any distance.
    SingleCandidate,
    /// Name deduced from other evidence rather than from the icon.
    Inferred,
    /// Nothing under the threshold, or an empty view.
    NoMatch,
    /// Several entities tied at the best distance.
    Ambiguous { candidates: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentificationResult {
    pub category: Category,
    pub name: String,
    pub hero: Option<String>,
    pub color: Option<String>,
    /// Signature of the icon, absent when the region held no pixels.
    pub signature: Option<Signature>,
    pub distance: u32,
    pub outcome: MatchOutcome,
}

impl IdentificationResult {
    fn from_entry(
        entry: &ReferenceEntry,
        signature: Signature,
        distance: u32,
        outcome: MatchOutcome,
    ) -> Self {
        Self {
            category: entry.category,
            name: entry.name.clone(),
            hero: entry.hero.clone(),
            color: entry.color.clone(),
            signature: Some(signature),
            distance,
            outcome,
        }
    }

    pub fn unknown(category: Category, signature: Option<Signature>, outcome: MatchOutcome) -> Self {
        Self {
            category,
            name: category.unknown_name().to_string(),
            hero: None,
            color: None,
            signature,
            distance: NO_MATCH_DISTANCE,
            outcome,
        }
    }

    /// A name supplied by inference, keeping the icon's signature.
    pub fn inferred(category: Category, name: impl Into<String>, signature: Option<Signature>) -> Self {
        Self {
            category,
            name: name.into(),
            hero: None,
            color: None,
            signature,
            distance: NO_MATCH_DISTANCE,
            outcome: MatchOutcome::Inferred,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(
            self.outcome,
            MatchOutcome::NoMatch | MatchOutcome::Ambiguous { .. }
        )
    }
}

/// Matches icons against a catalog using one configuration.
#[derive(Debug, Clone, Copy)]
pub struct Identifier<'a> {
    catalog: &'a Catalog,
    config: &'a IdentifyConfig,
}

impl<'a> Identifier<'a> {
    pub fn new(catalog: &'a Catalog, config: &'a IdentifyConfig) -> Self {
        Self { catalog, config }
    }

    pub fn config(&self) -> &'a IdentifyConfig {
        self.config
    }

    /// Signature of an icon as hashed for `category`.
    pub fn signature_of(&self, icon: &RgbaImage, category: Category) -> Result<Signature, EngineError> {
        let region = match category {
            Category::Genre => hash::central_region(icon, self.config.genre_crop),
            _ => icon.clone(),
        };
        hash::average_hash(&region, self.config.hash_size, self.config.swap_red_blue)
    }

    pub fn identify(
        &self,
        icon: &RgbaImage,
        category: Category,
        filter: &Filter,
    ) -> Result<IdentificationResult, EngineError> {
        if icon.width() == 0 || icon.height() == 0 {
            return Ok(IdentificationResult::unknown(category, None, MatchOutcome::NoMatch));
        }
        let signature = self.signature_of(icon, category)?;
        self.match_signature(signature, category, filter)
    }

    /// Like [`identify`](Self::identify) with the category given by name.
    pub fn identify_named(
        &self,
        icon: &RgbaImage,
        category: &str,
        filter: &Filter,
    ) -> Result<IdentificationResult, EngineError> {
        let category: Category = category.parse()?;
        self.identify(icon, category, filter)
    }

    /// Identifies the icon under `bbox` in a full screenshot.
    pub fn identify_region(
        &self,
        screenshot: &RgbaImage,
        bbox: BoundingBox,
        category: Category,
        filter: &Filter,
    ) -> Result<IdentificationResult, EngineError> {
        self.identify(&bbox.crop(screenshot), category, filter)
    }

    /// Resolves an already computed signature.
    pub fn match_signature(
        &self,
        signature: Signature,
        category: Category,
        filter: &Filter,
    ) -> Result<IdentificationResult, EngineError> {
        let view = self.catalog.view(category, filter);

        let Some(first) = view.first() else {
            trace!(%category, ?filter, "empty catalog view");
            return Ok(IdentificationResult::unknown(
                category,
                Some(signature),
                MatchOutcome::NoMatch,
            ));
        };

        if view.iter().all(|entry| entry.name == first.name) {
            let distance = signature.distance(&first.signature)?;
            return Ok(IdentificationResult::from_entry(
                first,
                signature,
                distance,
                MatchOutcome::SingleCandidate,
            ));
        }

        let threshold = self.config.thresholds.for_category(category);
        let mut best: Option<(u32, &ReferenceEntry)> = None;
        let mut tied: BTreeSet<&str> = BTreeSet::new();

        for entry in view.iter().copied() {
            let distance = signature.distance(&entry.signature)?;
            if distance >= threshold {
                continue;
            }
            match best {
                Some((best_distance, _)) if distance > best_distance => {}
                Some((best_distance, _)) if distance == best_distance => {
                    tied.insert(entry.name.as_str());
                }
                _ => {
                    best = Some((distance, entry));
                    tied.clear();
                    tied.insert(entry.name.as_str());
                }
            }
        }

        let result = match best {
            None => IdentificationResult::unknown(category, Some(signature), MatchOutcome::NoMatch),
            Some(_) if tied.len() > 1 => {
                let candidates = tied.iter().map(|name| name.to_string()).collect();
                IdentificationResult::unknown(
                    category,
                    Some(signature),
                    MatchOutcome::Ambiguous { candidates },
                )
            }
            Some((distance, entry)) => {
                IdentificationResult::from_entry(entry, signature, distance, MatchOutcome::Matched)
            }
        };

        trace!(
            %category,
            %signature,
            name = %result.name,
            distance = result.distance,
            "identified"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_support::{entry, sig, trait_entry};
    use image::Rgba;

    fn config() -> IdentifyConfig {
        IdentifyConfig::default()
    }

    fn catalog() -> Catalog {
        Catalog::from_entries(vec![
            entry(Category::Artifact, "Anchor", sig(0)),
            entry(Category::Artifact, "Anchor", sig(40)),
            entry(Category::Artifact, "Bell", sig(20)),
            entry(Category::Artifact, "Crown", sig(60)),
            trait_entry("Blitz", "Axe", "red", sig(10)),
            trait_entry("Guard", "Axe", "blue", sig(30)),
            entry(Category::Hero, "Axe", sig(50)),
            entry(Category::Hero, "Bow", sig(70)),
        ])
        .unwrap()
    }

    #[test]
    fn test_closest_entry_under_threshold() {
        let catalog = catalog();
        let config = config();
        let id = Identifier::new(&catalog, &config);

        let result = id
            .match_signature(sig(23), Category::Artifact, &Filter::none())
            .unwrap();
        assert_eq!(result.name, "Bell");
        assert_eq!(result.distance, 3);
        assert_eq!(result.outcome, MatchOutcome::Matched);
        assert!(!result.is_unknown());
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let catalog = Catalog::from_entries(vec![
            entry(Category::Artifact, "Anchor", sig(0)),
            entry(Category::Artifact, "Bell", sig(80)),
        ])
        .unwrap();
        let config = config();
        let id = Identifier::new(&catalog, &config);

        let accepted = id
            .match_signature(sig(14), Category::Artifact, &Filter::none())
            .unwrap();
        assert_eq!(accepted.name, "Anchor");
        assert_eq!(accepted.distance, 14);

        let rejected = id
            .match_signature(sig(15), Category::Artifact, &Filter::none())
            .unwrap();
        assert_eq!(rejected.name, "UNKNOWN_ARTIFACT");
        assert_eq!(rejected.distance, NO_MATCH_DISTANCE);
        assert_eq!(rejected.outcome, MatchOutcome::NoMatch);
    }

    #[test]
    fn test_equal_distance_to_two_entities_is_ambiguous() {
        let catalog = catalog();
        let config = config();
        let id = Identifier::new(&catalog, &config);

        // Bell(20) and Anchor(40) are both 10 away from 30 ones.
        let result = id
            .match_signature(sig(30), Category::Artifact, &Filter::none())
            .unwrap();
        assert_eq!(result.name, "UNKNOWN_ARTIFACT");
        assert_eq!(result.distance, NO_MATCH_DISTANCE);
        assert_eq!(
            result.outcome,
            MatchOutcome::Ambiguous {
                candidates: vec!["Anchor".to_string(), "Bell".to_string()]
            }
        );
    }

    #[test]
    fn test_tie_under_threshold_reports_unknown() {
        let catalog = Catalog::from_entries(vec![
            entry(Category::Artifact, "Anchor", sig(22)),
            entry(Category::Artifact, "Bell", sig(38)),
            entry(Category::Artifact, "Crown", sig(80)),
        ])
        .unwrap();
        let config = config();
        let id = Identifier::new(&catalog, &config);

        // Both 8 away, under the artifact threshold of 15.
        let result = id
            .match_signature(sig(30), Category::Artifact, &Filter::none())
            .unwrap();
        assert!(result.is_unknown());
        assert_eq!(result.distance, NO_MATCH_DISTANCE);
        assert!(matches!(result.outcome, MatchOutcome::Ambiguous { .. }));
    }

    #[test]
    fn test_same_entity_twice_at_best_is_not_ambiguous() {
        let catalog = Catalog::from_entries(vec![
            entry(Category::Genre, "Crit", sig(10)),
            entry(Category::Genre, "Crit", sig(30)),
            entry(Category::Genre, "Heal", sig(90)),
        ])
        .unwrap();
        let config = config();
        let id = Identifier::new(&catalog, &config);

        let result = id
            .match_signature(sig(20), Category::Genre, &Filter::none())
            .unwrap();
        assert_eq!(result.name, "Crit");
        assert_eq!(result.distance, 10);
    }

    #[test]
    fn test_single_candidate_ignores_threshold() {
        let catalog = catalog();
        let config = config();
        let id = Identifier::new(&catalog, &config);

        let filter = Filter::hero("Axe").with_color("blue");
        let result = id.match_signature(sig(95), Category::Trait, &filter).unwrap();
        assert_eq!(result.name, "Guard");
        assert_eq!(result.distance, 65);
        assert_eq!(result.outcome, MatchOutcome::SingleCandidate);
        assert_eq!(result.hero.as_deref(), Some("Axe"));
    }

    #[test]
    fn test_empty_view_is_unknown() {
        let catalog = catalog();
        let config = config();
        let id = Identifier::new(&catalog, &config);

        let result = id
            .match_signature(sig(10), Category::Trait, &Filter::hero("Nobody"))
            .unwrap();
        assert_eq!(result.name, "UNKNOWN_TRAIT");
        assert_eq!(result.outcome, MatchOutcome::NoMatch);

        let genres = id
            .match_signature(sig(10), Category::Genre, &Filter::none())
            .unwrap();
        assert_eq!(genres.name, "UNKNOWN_GENRE");
    }

    #[test]
    fn test_invalid_category_name() {
        let catalog = catalog();
        let config = config();
        let id = Identifier::new(&catalog, &config);
        let icon = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 255]));

        assert_eq!(
            id.identify_named(&icon, "weapon", &Filter::none()),
            Err(EngineError::InvalidCategory("weapon".to_string()))
        );
        assert!(id.identify_named(&icon, "hero", &Filter::none()).is_ok());
    }

    #[test]
    fn test_identify_hashes_the_icon() {
        let catalog = catalog();
        let config = config();
        let id = Identifier::new(&catalog, &config);

        // A flat icon hashes to all zeros, which is Anchor's first signature.
        let icon = RgbaImage::from_pixel(16, 16, Rgba([90, 90, 90, 255]));
        let result = id.identify(&icon, Category::Artifact, &Filter::none()).unwrap();
        assert_eq!(result.name, "Anchor");
        assert_eq!(result.distance, 0);

        let empty = id
            .identify(&RgbaImage::new(0, 0), Category::Artifact, &Filter::none())
            .unwrap();
        assert!(empty.is_unknown());
        assert!(empty.signature.is_none());
    }
}
