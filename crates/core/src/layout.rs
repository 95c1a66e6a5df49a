//! Report layout configuration.
//!
//! Everything geometric about a report lives here: which slides each section
//! occupies, the card catalogs, the intolerance and vitamin slide positions and
//! the minimum template size. The built-in defaults match the standard lifestyle
//! template; a YAML file can override any part of it.
//!
//! ```yaml
//! min_slide_count: 44
//! parallelograms:
//!   section: { name: parallelograms, start: 8, end: 31, start_x: 0.7, top: 4.5, max_y: 27.0, gap: 0.5 }
//! ```
//!
//! Omitted fields keep their defaults. Lengths are written in centimetres.

use crate::catalog::{default_diet_catalog, default_parallelogram_catalog, Catalog};
use crate::intolerance::IntoleranceLayout;
use crate::resolver::MatchPolicy;
use crate::section::Section;
use crate::vitamins::VitaminLayout;
use crate::{ReportError, ReportResult};
use lifestyle_types::{Length, Severity};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

fn section(name: &str, start: usize, end: usize, start_x: f64, top: f64, max_y: f64, gap: f64) -> Section {
    Section {
        name: name.to_string(),
        start,
        end,
        start_x: Length::from_cm(start_x),
        top: Length::from_cm(top),
        max_y: Length::from_cm(max_y),
        gap: Length::from_cm(gap),
    }
}

/// Diet cards: concerns and other conditions packed into separate sections.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DietLayout {
    pub concerns: Section,
    pub others: Section,
    pub tiers: Vec<Severity>,
    pub image_match: MatchPolicy,
    pub image_extension: Option<String>,
    pub catalog: Catalog,
}

impl Default for DietLayout {
    fn default() -> Self {
        Self {
            concerns: section("diet concerns", 30, 33, 1.0, 9.0, 27.0, 1.0),
            others: section("diet others", 34, 38, 1.0, 9.0, 27.0, 1.0),
            tiers: vec![Severity::ModerateToHigh, Severity::Moderate, Severity::Mild],
            image_match: MatchPolicy::Contains,
            image_extension: None,
            catalog: default_diet_catalog(),
        }
    }
}

/// Parallelogram cards: every classified condition in one section.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ParallelogramLayout {
    pub section: Section,
    pub tiers: Vec<Severity>,
    pub image_match: MatchPolicy,
    pub image_extension: Option<String>,
    pub catalog: Catalog,
    /// Remove section slides left empty once every placement is done.
    pub reclaim_empty: bool,
}

impl Default for ParallelogramLayout {
    fn default() -> Self {
        Self {
            section: section("parallelograms", 8, 29, 0.7, 4.5, 27.0, 0.5),
            tiers: Severity::PRECEDENCE.to_vec(),
            image_match: MatchPolicy::Prefix,
            image_extension: Some("png".to_string()),
            catalog: default_parallelogram_catalog(),
            reclaim_empty: true,
        }
    }
}

/// Complete report geometry.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Templates with fewer slides are rejected before any placement.
    pub min_slide_count: usize,
    pub diet: DietLayout,
    pub parallelograms: ParallelogramLayout,
    pub intolerance: IntoleranceLayout,
    pub vitamins: VitaminLayout,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_slide_count: 42,
            diet: DietLayout::default(),
            parallelograms: ParallelogramLayout::default(),
            intolerance: IntoleranceLayout::default(),
            vitamins: VitaminLayout::default(),
        }
    }
}

impl LayoutConfig {
    /// Reads a YAML layout file and validates it.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if:
    /// - the file does not exist (`SourceNotFound`) or cannot be read (`FileRead`)
    /// - the YAML does not describe a layout (`YamlDeserialization`)
    /// - the layout is inconsistent (see [`LayoutConfig::validate`])
    pub fn load(path: &Path) -> ReportResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ReportError::SourceNotFound(path.to_path_buf()),
            _ => ReportError::FileRead(e),
        })?;
        let layout: Self =
            serde_yaml::from_str(&contents).map_err(ReportError::YamlDeserialization)?;
        layout.validate()?;
        tracing::info!("loaded layout overrides from {}", path.display());
        Ok(layout)
    }

    /// Serialises the layout as YAML.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::YamlSerialization` if serialisation fails.
    pub fn to_yaml(&self) -> ReportResult<String> {
        serde_yaml::to_string(self).map_err(ReportError::YamlSerialization)
    }

    /// Checks the layout against a template of `min_slide_count` slides.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if:
    /// - a section is inverted, has no height or ends past `min_slide_count`
    /// - a catalog footprint is taller than its section (`CardExceedsCanvas`)
    /// - an intolerance or vitamin slide is past `min_slide_count`
    /// - a classifier tier list is empty (`InvalidInput`)
    pub fn validate(&self) -> ReportResult<()> {
        let diet = &self.diet;
        for section in [&diet.concerns, &diet.others] {
            section.validate(self.min_slide_count)?;
            diet.catalog.validate_for(section)?;
        }

        let parallelograms = &self.parallelograms;
        parallelograms.section.validate(self.min_slide_count)?;
        parallelograms.catalog.validate_for(&parallelograms.section)?;

        for (name, tiers) in [("diet", &diet.tiers), ("parallelograms", &parallelograms.tiers)] {
            if tiers.is_empty() {
                return Err(ReportError::InvalidInput(format!(
                    "{name} layout has no severity tiers"
                )));
            }
        }

        let fixed_slides = self
            .intolerance
            .slides
            .iter()
            .map(|s| ("intolerance", s.slide))
            .chain(std::iter::once(("vitamins", self.vitamins.slide)));
        for (name, slide) in fixed_slides {
            if slide >= self.min_slide_count {
                return Err(ReportError::SectionOutOfRange {
                    section: name.to_string(),
                    start: slide,
                    end: slide,
                    count: self.min_slide_count,
                });
            }
        }

        Ok(())
    }
}
