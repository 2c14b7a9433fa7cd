//! Match Reader
//!
//! Reads an end-of-match summary screenshot into structured per-player
//! results: icons are identified against a catalog of perceptual hashes,
//! and each player's genre levels and experience are reconciled into a
//! consistent, non-increasing sequence.

pub mod catalog;
pub mod config;
pub mod detections;
pub mod error;
pub mod genre;
pub mod geometry;
pub mod identify;
pub mod ocr;
pub mod paths;
pub mod player;
pub mod report;

pub use catalog::{Catalog, Category, Filter, Signature};
pub use config::EngineConfig;
pub use error::EngineError;
pub use identify::{IdentificationResult, Identifier, MatchOutcome};
pub use player::{Aggregator, MatchReport};
