//! Genre slot positions.
//!
//! Genre icons are too small and low-contrast to detect reliably, so their
//! boxes are placed relative to the artifact column: the strip starts right
//! after the rightmost artifact edge and its geometry scales with the width
//! spanned by all artifact boxes on the screen.

use tracing::warn;

use crate::config::LayoutConfig;
use crate::geometry::BoundingBox;

/// Horizontal extent of the artifact column across every player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceSpan {
    pub width: f64,
    /// Right edge of the rightmost artifact box.
    pub base_x: i32,
}

/// Span of all artifact boxes, `None` when there are none.
pub fn reference_span(artifacts: &[BoundingBox]) -> Option<ReferenceSpan> {
    let min_x = artifacts.iter().map(|b| b.x).min()?;
    let base_x = artifacts.iter().map(|b| b.right()).max()?;
    Some(ReferenceSpan {
        width: f64::from(base_x - min_x),
        base_x,
    })
}

/// Slot boxes for one player from their own artifact boxes.
///
/// A player without artifact boxes, or with more than the layout supports,
/// gets no slots.
pub fn infer_genre_boxes(
    artifacts: &[BoundingBox],
    span: ReferenceSpan,
    layout: &LayoutConfig,
) -> Vec<BoundingBox> {
    if artifacts.is_empty() {
        return Vec::new();
    }
    if artifacts.len() > layout.max_artifacts {
        warn!(
            found = artifacts.len(),
            supported = layout.max_artifacts,
            "unsupported artifact layout, skipping genre slots"
        );
        return Vec::new();
    }

    let y = artifacts.iter().map(|b| b.y).min().unwrap_or_default();
    let height = artifacts.iter().map(|b| b.height).max().unwrap_or_default();

    let start = span.width * f64::from(layout.gap_after_artifacts);
    let width = span.width * f64::from(layout.slot_width);
    let gap = span.width * f64::from(layout.slot_spacing);
    let slot_width = width.ceil() as i64 + i64::from(layout.padding);

    (0..layout.slots)
        .map(|i| {
            let x = f64::from(span.base_x) + start + i as f64 * (width + gap);
            BoundingBox::new(
                x.floor() as i32 - layout.padding,
                y,
                slot_width.max(0) as u32,
                height,
            )
        })
        .collect()
}
