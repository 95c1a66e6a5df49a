//! The document adapter contract consumed by the layout engine.

use crate::DeckError;
use lifestyle_types::{Frame, StyledText};
use std::path::Path;

/// Coarse shape classification reported by [`SlideDocument::shapes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeType {
    Picture,
    TextBox,
    /// Pre-existing template artwork.
    Decoration,
}

/// Position and type of one shape on a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeInfo {
    pub frame: Frame,
    pub kind: ShapeType,
}

/// Slide-level editing primitives.
///
/// Slide indices are 0-based and always refer to the document's current slide
/// order, so [`remove_slide`](SlideDocument::remove_slide) shifts every later index
/// down by one.
pub trait SlideDocument {
    fn slide_count(&self) -> usize;

    /// Adds a picture sourced from `source` at `frame` on slide `slide`.
    fn add_image(&mut self, slide: usize, frame: Frame, source: &Path) -> Result<(), DeckError>;

    /// Adds a word-wrapped text box at `frame` on slide `slide`.
    fn add_textbox(
        &mut self,
        slide: usize,
        frame: Frame,
        text: StyledText,
    ) -> Result<(), DeckError>;

    /// Removes slide `index` from the slide order.
    fn remove_slide(&mut self, index: usize) -> Result<(), DeckError>;

    /// Lists shapes on slide `slide` in z-order.
    fn shapes(&self, slide: usize) -> Result<Vec<ShapeInfo>, DeckError>;
}
