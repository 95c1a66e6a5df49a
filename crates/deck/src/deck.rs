//! JSON-persisted slide deck.
//!
//! [`Deck`] is a plain in-memory document: an ordered list of [`Slide`]s plus a
//! map of text fields. It is loaded from and saved to JSON, and implements
//! [`SlideDocument`] so the layout engine can place content on it.
//!
//! # Persistence
//!
//! - `open` reads the whole document; a missing file is [`DeckError::NotFound`]
//! - `save` stamps `saved_at`, writes to a sibling temporary file and renames it
//!   over the target, so an interrupted save never leaves half a deck behind
//! - `instantiate_template` copies a template to the output location first, so
//!   templates are never modified

use crate::document::{ShapeInfo, ShapeType, SlideDocument};
use crate::DeckError;
use chrono::{DateTime, Utc};
use lifestyle_types::{Frame, StyledText};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Content of a shape.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeContent {
    Picture { source: PathBuf },
    TextBox { text: StyledText },
    Decoration { name: String },
}

/// A positioned shape.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Shape {
    pub frame: Frame,
    #[serde(flatten)]
    pub content: ShapeContent,
}

impl Shape {
    fn info(&self) -> ShapeInfo {
        let kind = match self.content {
            ShapeContent::Picture { .. } => ShapeType::Picture,
            ShapeContent::TextBox { .. } => ShapeType::TextBox,
            ShapeContent::Decoration { .. } => ShapeType::Decoration,
        };
        ShapeInfo {
            frame: self.frame,
            kind,
        }
    }
}

/// One slide.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Slide {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub shapes: Vec<Shape>,
}

/// An ordered collection of slides.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Deck {
    /// Text fields for downstream placeholder rendering, keyed without whitespace.
    #[serde(default)]
    pub fields: BTreeMap<String, String>,

    #[serde(default)]
    pub slides: Vec<Slide>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl Deck {
    /// Creates a deck with `count` empty slides.
    pub fn with_blank_slides(count: usize) -> Self {
        Self {
            slides: vec![Slide::default(); count],
            ..Self::default()
        }
    }

    /// Reads a deck from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `DeckError` if:
    /// - the file does not exist ([`DeckError::NotFound`])
    /// - the file cannot be read (I/O)
    /// - the content is not a valid deck document (JSON)
    pub fn open(path: &Path) -> Result<Self, DeckError> {
        let contents = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => DeckError::NotFound(path.to_path_buf()),
            _ => DeckError::Io(e),
        })?;
        let deck: Deck = serde_json::from_str(&contents)?;
        tracing::debug!("opened deck {} ({} slides)", path.display(), deck.slides.len());
        Ok(deck)
    }

    /// Writes the deck to `path`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns `DeckError` if serialisation, directory creation, the temporary
    /// write or the final rename fails.
    pub fn save(&mut self, path: &Path) -> Result<(), DeckError> {
        self.saved_at = Some(Utc::now());
        let json = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut tmp_name = path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    /// Copies `template` to `target` and opens the copy.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::NotFound`] if the template is missing, or any error
    /// from copying or [`Deck::open`].
    pub fn instantiate_template(template: &Path, target: &Path) -> Result<Self, DeckError> {
        if !template.is_file() {
            return Err(DeckError::NotFound(template.to_path_buf()));
        }
        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::copy(template, target)?;
        Self::open(target)
    }

    pub fn set_field(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Shapes of slide `index`, for inspection.
    pub fn slide(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    fn slide_mut(&mut self, index: usize) -> Result<&mut Slide, DeckError> {
        let count = self.slides.len();
        self.slides
            .get_mut(index)
            .ok_or(DeckError::SlideOutOfRange { index, count })
    }
}

impl SlideDocument for Deck {
    fn slide_count(&self) -> usize {
        self.slides.len()
    }

    fn add_image(&mut self, slide: usize, frame: Frame, source: &Path) -> Result<(), DeckError> {
        self.slide_mut(slide)?.shapes.push(Shape {
            frame,
            content: ShapeContent::Picture {
                source: source.to_path_buf(),
            },
        });
        Ok(())
    }

    fn add_textbox(
        &mut self,
        slide: usize,
        frame: Frame,
        text: StyledText,
    ) -> Result<(), DeckError> {
        self.slide_mut(slide)?.shapes.push(Shape {
            frame,
            content: ShapeContent::TextBox { text },
        });
        Ok(())
    }

    fn remove_slide(&mut self, index: usize) -> Result<(), DeckError> {
        let count = self.slides.len();
        if index >= count {
            return Err(DeckError::SlideOutOfRange { index, count });
        }
        self.slides.remove(index);
        Ok(())
    }

    fn shapes(&self, slide: usize) -> Result<Vec<ShapeInfo>, DeckError> {
        let count = self.slides.len();
        let slide = self
            .slides
            .get(slide)
            .ok_or(DeckError::SlideOutOfRange { index: slide, count })?;
        Ok(slide.shapes.iter().map(Shape::info).collect())
    }
}
