//! On-disk catalog format.
//!
//! ```json
//! {
//!   "artifacts": { "Name": ["<hex>", ...] },
//!   "heroes":    { "Name": ["<hex>", ...] },
//!   "genres":    { "Name": ["<hex>", ...] },
//!   "traits":    { "Hero": { "color": { "Name": ["<hex>", ...] } } }
//! }
//! ```
//!
//! Entities with an empty signature list are allowed and never match.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{Catalog, Category, ReferenceEntry, Signature};
use crate::error::EngineError;

type NamedSignatures = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub artifacts: NamedSignatures,
    #[serde(default)]
    pub heroes: NamedSignatures,
    #[serde(default)]
    pub genres: NamedSignatures,
    #[serde(default)]
    pub traits: BTreeMap<String, BTreeMap<String, NamedSignatures>>,
}

impl CatalogFile {
    /// Flattens the nested layout into reference entries.
    pub fn into_entries(self) -> Result<Vec<ReferenceEntry>, EngineError> {
        let mut entries = Vec::new();

        for (category, group) in [
            (Category::Artifact, self.artifacts),
            (Category::Hero, self.heroes),
            (Category::Genre, self.genres),
        ] {
            for (name, hexes) in group {
                for hex in hexes {
                    entries.push(ReferenceEntry {
                        name: name.clone(),
                        category,
                        signature: Signature::from_hex(&hex)?,
                        hero: None,
                        color: None,
                    });
                }
            }
        }

        for (hero, by_color) in self.traits {
            for (color, group) in by_color {
                for (name, hexes) in group {
                    for hex in hexes {
                        entries.push(ReferenceEntry {
                            name: name.clone(),
                            category: Category::Trait,
                            signature: Signature::from_hex(&hex)?,
                            hero: Some(hero.clone()),
                            color: Some(color.clone()),
                        });
                    }
                }
            }
        }

        Ok(entries)
    }
}

impl Catalog {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(json).context("Failed to parse catalog JSON")?;
        let entries = file.into_entries().context("Catalog holds an invalid signature")?;
        Ok(Catalog::from_entries(entries)?)
    }

    /// Loads a catalog and checks its signatures have `expected_bits` bits.
    pub fn from_file(path: &Path, expected_bits: u32) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog: {}", path.display()))?;
        let catalog = Self::from_json_str(&contents)
            .with_context(|| format!("Failed to load catalog: {}", path.display()))?;

        if let Some(bits) = catalog.signature_bits() {
            if bits != expected_bits {
                let mismatch = EngineError::SignatureWidthMismatch {
                    left: expected_bits,
                    right: bits,
                };
                return Err(anyhow::Error::new(mismatch)
                    .context("Catalog signatures do not match the configured hash size"));
            }
        }

        info!(
            path = %path.display(),
            entries = catalog.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }
}
