//! Sections: contiguous slide ranges reserved for one group of cards.

use crate::{ReportError, ReportResult};
use lifestyle_types::Length;

/// A contiguous, inclusive range of slides with a shared vertical layout.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Section {
    pub name: String,
    /// First slide index (0-based).
    pub start: usize,
    /// Last slide index, inclusive.
    pub end: usize,
    /// Horizontal origin of every card.
    pub start_x: Length,
    /// Cursor position at the top of each slide.
    pub top: Length,
    /// Bottom bound no card may cross.
    pub max_y: Length,
    /// Vertical gap after each card.
    pub gap: Length,
}

impl Section {
    /// Usable vertical span of one slide.
    pub fn span(&self) -> Length {
        self.max_y - self.top
    }

    /// Cursor at the top of the first slide.
    pub fn initial_cursor(&self) -> Cursor {
        Cursor {
            slide: self.start,
            y: self.top,
        }
    }

    /// Checks the range against itself and against a deck of `slide_count` slides.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::InvalidInput`] for an inverted range or empty span, and
    /// [`ReportError::SectionOutOfRange`] if `end` is past the last slide.
    pub fn validate(&self, slide_count: usize) -> ReportResult<()> {
        if self.start > self.end {
            return Err(ReportError::InvalidInput(format!(
                "section {:?} starts after it ends ({} > {})",
                self.name, self.start, self.end
            )));
        }
        if self.max_y <= self.top {
            return Err(ReportError::InvalidInput(format!(
                "section {:?} has no usable height",
                self.name
            )));
        }
        if self.end >= slide_count {
            return Err(ReportError::SectionOutOfRange {
                section: self.name.clone(),
                start: self.start,
                end: self.end,
                count: slide_count,
            });
        }
        Ok(())
    }
}

/// Packing position: the active slide and the next free vertical offset on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub slide: usize,
    pub y: Length,
}
