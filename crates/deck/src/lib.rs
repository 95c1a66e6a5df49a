//! Lifestyle Deck
//!
//! This crate is the document I/O boundary of the report generator. The layout engine
//! only ever talks to the [`SlideDocument`] trait; [`Deck`] is the concrete document
//! used by the batch runner.
//!
//! ## Document Model
//!
//! A deck is an ordered list of slides, each holding positioned shapes:
//!
//! ```text
//! deck
//! ├── fields         # normalised demographic fields for placeholder rendering
//! └── slides[]
//!     └── shapes[]   # picture | text_box | decoration, each with a frame
//! ```
//!
//! Decks persist as JSON. Template decks carry `decoration` shapes (headers, logos)
//! that the generator never touches; generated content is appended as pictures and
//! text boxes.
//!
//! ## Example Usage
//!
//! ```no_run
//! use lifestyle_deck::{Deck, SlideDocument};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let deck = Deck::instantiate_template(
//!     Path::new("assets/lifestyle_template.json"),
//!     Path::new("outputs/KHGLBS782_report.json"),
//! )?;
//! println!("{} slides", deck.slide_count());
//! # Ok(())
//! # }
//! ```

mod deck;
mod document;

pub use deck::{Deck, Shape, ShapeContent, Slide};
pub use document::{ShapeInfo, ShapeType, SlideDocument};

/// Errors that can occur during deck operations
#[derive(Debug, thiserror::Error)]
pub enum DeckError {
    /// The deck or template file does not exist
    #[error("Deck not found: {0}")]
    NotFound(std::path::PathBuf),

    /// A slide index outside the deck was addressed
    #[error("Slide index {index} out of range (deck has {count} slides)")]
    SlideOutOfRange { index: usize, count: usize },

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Deck JSON could not be parsed or written
    #[error("Deck serialisation error: {0}")]
    Json(#[from] serde_json::Error),
}
