//! Asset and text resolution.
//!
//! Given a (condition, severity) pair, the resolver finds the card image in a
//! per-severity folder and pulls text out of condition × severity lookup tables.
//! Every miss resolves to "nothing" (no image, empty text) rather than an error;
//! callers decide what a miss means for the card.

use crate::catalog::TextKind;
use crate::condition::{normalise_key, ConditionName};
use crate::constants::{BULLET_DELIMITER, BULLET_GLYPH};
use crate::table::Table;
use crate::{ReportError, ReportResult};
use lifestyle_types::Severity;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Source of card images and card text.
///
/// The packer only needs these two lookups, so tests can supply fixtures without
/// touching the filesystem.
pub trait AssetSource {
    /// Image for the card, or `None` if no asset matches.
    fn image(&self, condition: &ConditionName, severity: Severity) -> Option<PathBuf>;

    /// Text for one of the card's text blocks; empty when nothing matches.
    fn text(&self, condition: &ConditionName, severity: Severity, kind: TextKind) -> String;
}

/// How an image filename is matched against a condition name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// File stem starts with the condition name.
    #[default]
    Prefix,
    /// File stem contains the condition name anywhere.
    Contains,
}

/// Where and how to look for card images.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageLookup {
    pub root: PathBuf,
    pub policy: MatchPolicy,
    /// Required extension (case-insensitive, without the dot), if any.
    pub extension: Option<String>,
}

impl ImageLookup {
    /// Finds the image for `condition` under `<root>/<severity>`.
    ///
    /// Both the display label (`Moderate to High`) and the slug
    /// (`Moderate_to_High`) are tried as folder names. Entries are scanned in
    /// lexical order and the first match wins, so ambiguous names resolve
    /// deterministically.
    pub fn find(&self, condition: &ConditionName, severity: Severity) -> Option<PathBuf> {
        let wanted = condition.as_str().to_lowercase();
        let mut folders = vec![severity.label()];
        if severity.slug() != severity.label() {
            folders.push(severity.slug());
        }

        for folder in folders {
            let dir = self.root.join(folder);
            let Ok(entries) = fs::read_dir(&dir) else {
                continue;
            };

            let mut files: Vec<PathBuf> = entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| path.is_file())
                .collect();
            files.sort();

            if let Some(found) = files.into_iter().find(|path| self.accepts(path, &wanted)) {
                return Some(found);
            }
        }
        None
    }

    fn accepts(&self, path: &Path, wanted_lower: &str) -> bool {
        if let Some(required) = &self.extension {
            let ext_ok = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(required));
            if !ext_ok {
                return false;
            }
        }

        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            return false;
        };
        let stem = normalise_key(stem).to_lowercase();
        match self.policy {
            MatchPolicy::Prefix => stem.starts_with(wanted_lower),
            MatchPolicy::Contains => stem.contains(wanted_lower),
        }
    }
}

/// A condition-keyed lookup table with one column per severity label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextTable {
    table: Table,
    key_column: String,
}

impl TextTable {
    pub fn new(table: Table, key_column: impl Into<String>) -> Self {
        Self {
            table,
            key_column: key_column.into(),
        }
    }

    /// Loads a table, or returns an empty one if the file does not exist.
    ///
    /// A missing table only means its text is never rendered, so it is logged rather
    /// than treated as fatal.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Table::load`] other than a missing file.
    pub fn load_or_empty(path: &Path, key_column: &str) -> ReportResult<Self> {
        match Table::load(path) {
            Ok(table) => Ok(Self::new(table, key_column)),
            Err(ReportError::SourceNotFound(missing)) => {
                tracing::warn!("lookup table not found, text will be empty: {}", missing.display());
                Ok(Self::new(Table::default(), key_column))
            }
            Err(e) => Err(e),
        }
    }

    /// Non-empty cells in the severity column of every row keyed by `condition`.
    pub fn cells<'a>(
        &'a self,
        condition: &'a ConditionName,
        severity: Severity,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.table
            .rows()
            .filter(move |row| {
                row.get(&self.key_column)
                    .is_some_and(|key| condition.matches(key))
            })
            .filter_map(move |row| row.get(severity.label()))
            .filter(|cell| !cell.trim().is_empty())
    }

    /// Bullet-formatted recommendations for `condition` at `severity`.
    pub fn recommendations(&self, condition: &ConditionName, severity: Severity) -> String {
        format_recommendations(self.cells(condition, severity))
    }

    /// The first non-empty cell for `condition` at `severity`, verbatim.
    pub fn first_text(&self, condition: &ConditionName, severity: Severity) -> String {
        self.cells(condition, severity)
            .next()
            .map(str::to_string)
            .unwrap_or_default()
    }
}

/// Splits `$`-delimited cells into capitalised bullet lines joined by newlines.
pub fn format_recommendations<'a>(cells: impl IntoIterator<Item = &'a str>) -> String {
    cells
        .into_iter()
        .flat_map(|cell| cell.split(BULLET_DELIMITER))
        .map(str::trim)
        .filter(|point| !point.is_empty())
        .map(|point| format!("{BULLET_GLYPH} {}", capitalise(point)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Upper-cases the first character and lower-cases the rest.
fn capitalise(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Filesystem-backed [`AssetSource`].
#[derive(Debug, Clone)]
pub struct Resolver {
    images: ImageLookup,
    first_text: Arc<TextTable>,
    recommendations: Arc<TextTable>,
}

impl Resolver {
    pub fn new(
        images: ImageLookup,
        first_text: Arc<TextTable>,
        recommendations: Arc<TextTable>,
    ) -> Self {
        Self {
            images,
            first_text,
            recommendations,
        }
    }
}

impl AssetSource for Resolver {
    fn image(&self, condition: &ConditionName, severity: Severity) -> Option<PathBuf> {
        self.images.find(condition, severity)
    }

    fn text(&self, condition: &ConditionName, severity: Severity, kind: TextKind) -> String {
        match kind {
            TextKind::FirstText => self.first_text.first_text(condition, severity),
            TextKind::Recommendations => self.recommendations.recommendations(condition, severity),
        }
    }
}
