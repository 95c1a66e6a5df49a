//! Shared value types for the lifestyle report workspace.
//!
//! These types cross crate boundaries: the deck adapter stores [`Frame`]s and
//! [`StyledText`], while the layout engine in `lifestyle-core` classifies by
//! [`Severity`] and measures everything in [`Length`].

mod length;
mod severity;
mod styled;

pub use length::{Frame, Length, EMU_PER_CM};
pub use severity::{Severity, SeverityError};
pub use styled::{Font, Paragraph, Rgb, StyledText, TextRun};
