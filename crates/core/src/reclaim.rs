//! Removal of slides left empty after packing.

use crate::{ReportError, ReportResult};
use lifestyle_deck::SlideDocument;
use lifestyle_types::Length;

/// Removes every slide in `lo..=hi` that has no shape whose top edge lies in
/// `top..=max_y`.
///
/// The removal set is computed against the original slide indices before anything
/// is removed, and slides are then removed from the highest index down so earlier
/// indices stay valid.
///
/// # Arguments
///
/// * `doc` - Document to edit.
/// * `lo`, `hi` - Inclusive slide range to inspect.
/// * `top`, `max_y` - Vertical content band of a slide.
///
/// # Returns
///
/// The removed slides' original indices, ascending.
///
/// # Errors
///
/// Returns [`ReportError::SectionOutOfRange`] if the range does not lie within the
/// document, or a deck error if a removal fails.
pub fn reclaim_empty<D: SlideDocument + ?Sized>(
    doc: &mut D,
    lo: usize,
    hi: usize,
    top: Length,
    max_y: Length,
) -> ReportResult<Vec<usize>> {
    let count = doc.slide_count();
    if lo > hi || hi >= count {
        return Err(ReportError::SectionOutOfRange {
            section: "reclaim".into(),
            start: lo,
            end: hi,
            count,
        });
    }

    let mut empty = Vec::new();
    for index in lo..=hi {
        let occupied = doc
            .shapes(index)?
            .iter()
            .any(|shape| shape.frame.y >= top && shape.frame.y <= max_y);
        if !occupied {
            empty.push(index);
        }
    }

    for index in empty.iter().rev() {
        doc.remove_slide(*index)?;
    }

    if !empty.is_empty() {
        tracing::info!("removed {} empty slide(s): {:?}", empty.len(), empty);
    }
    Ok(empty)
}
