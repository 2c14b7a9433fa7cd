//! Player records and the per-match aggregation pipeline.

pub mod association;
pub mod layout;
pub mod pipeline;
pub mod record;

pub use association::{DetectedBoxes, Unassociated, associate};
pub use layout::{ReferenceSpan, infer_genre_boxes, reference_span};
pub use pipeline::{Aggregator, MatchInput, MatchReport, SlotKey, SlotReader, infer_hero};
pub use record::{GenreSlot, Placement, Player};
