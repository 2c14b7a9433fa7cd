//! Reference catalog of known icon signatures.
//!
//! The catalog is loaded once, validated, and indexed eagerly by
//! `(category, hero, color)` so that every filtered view used during
//! identification is a plain slice lookup. It is immutable after
//! construction and shared by reference across worker threads.

pub mod category;
pub mod loader;
pub mod signature;

pub use category::Category;
pub use loader::CatalogFile;
pub use signature::Signature;

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::EngineError;

/// One known signature of a named entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceEntry {
    pub name: String,
    pub category: Category,
    pub signature: Signature,
    /// Owning hero, traits only.
    pub hero: Option<String>,
    /// Color tag, traits only.
    pub color: Option<String>,
}

/// Optional narrowing of a category to one hero and/or one color tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Filter {
    pub hero: Option<String>,
    pub color: Option<String>,
}

impl Filter {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn hero(name: impl Into<String>) -> Self {
        Self {
            hero: Some(name.into()),
            color: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ViewKey {
    category: Category,
    filter: Filter,
}

/// Indexed, immutable set of reference entries.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<ReferenceEntry>,
    views: HashMap<ViewKey, Vec<usize>>,
    signature_bits: Option<u32>,
}

impl Catalog {
    /// Builds and indexes a catalog.
    ///
    /// Within each filtered view a repeated signature keeps only its last
    /// mapping, so two heroes sharing a trait signature each keep their own
    /// entry. All signatures must share one bit width.
    pub fn from_entries(entries: Vec<ReferenceEntry>) -> Result<Self, EngineError> {
        let mut signature_bits: Option<u32> = None;
        for entry in &entries {
            match signature_bits {
                None => signature_bits = Some(entry.signature.len()),
                Some(bits) if bits != entry.signature.len() => {
                    return Err(EngineError::SignatureWidthMismatch {
                        left: bits,
                        right: entry.signature.len(),
                    });
                }
                Some(_) => {}
            }
        }

        let mut views: HashMap<ViewKey, Vec<usize>> = HashMap::new();
        let mut positions: HashMap<(ViewKey, Signature), usize> = HashMap::new();
        for (index, entry) in entries.iter().enumerate() {
            let filters = view_filters(entry);
            let narrowest = filters.len() - 1;
            for (depth, filter) in filters.into_iter().enumerate() {
                let key = ViewKey {
                    category: entry.category,
                    filter,
                };
                let view = views.entry(key.clone()).or_default();
                match positions.entry((key, entry.signature)) {
                    Entry::Occupied(position) => {
                        let slot = &mut view[*position.get()];
                        if depth == narrowest {
                            warn!(
                                category = %entry.category,
                                signature = %entry.signature,
                                previous = %entries[*slot].name,
                                replacement = %entry.name,
                                "duplicate signature, keeping last mapping"
                            );
                        }
                        *slot = index;
                    }
                    Entry::Vacant(position) => {
                        position.insert(view.len());
                        view.push(index);
                    }
                }
            }
        }

        debug!(entries = entries.len(), views = views.len(), "catalog indexed");

        Ok(Self {
            entries,
            views,
            signature_bits,
        })
    }

    /// Entries of `category` matching `filter`, in catalog order.
    pub fn view(&self, category: Category, filter: &Filter) -> Vec<&ReferenceEntry> {
        let key = ViewKey {
            category,
            filter: filter.clone(),
        };
        self.views
            .get(&key)
            .map(|indices| indices.iter().map(|&i| &self.entries[i]).collect())
            .unwrap_or_default()
    }

    /// Bit width shared by every signature, if the catalog is not empty.
    pub fn signature_bits(&self) -> Option<u32> {
        self.signature_bits
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Every filter under which an entry is reachable.
fn view_filters(entry: &ReferenceEntry) -> Vec<Filter> {
    let mut filters = vec![Filter::none()];
    if let Some(hero) = &entry.hero {
        filters.push(Filter::hero(hero.clone()));
    }
    if let Some(color) = &entry.color {
        filters.push(Filter::none().with_color(color.clone()));
    }
    if let (Some(hero), Some(color)) = (&entry.hero, &entry.color) {
        filters.push(Filter::hero(hero.clone()).with_color(color.clone()));
    }
    filters
}
