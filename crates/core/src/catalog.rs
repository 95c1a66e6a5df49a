//! Card size catalog.
//!
//! Cards come in a fixed set of footprints: one default per severity tier, plus an
//! optional override for a named set of "specific" conditions at that tier. Each
//! footprint also fixes where its text boxes sit relative to the card origin.

use crate::condition::ConditionName;
use crate::section::Section;
use crate::{ReportError, ReportResult};
use lifestyle_types::{Length, Severity};
use std::collections::BTreeMap;

/// Which resolved text a block shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextKind {
    /// Short label: the first non-empty cell for the condition.
    FirstText,
    /// `$`-delimited cell split into bullet points.
    Recommendations,
}

/// How text inside a block is formatted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextStyle {
    /// One paragraph per line.
    #[default]
    Plain,
    /// One run per word, bold where the word is a severity keyword.
    SeverityKeywords,
}

fn default_font_size() -> f32 {
    11.0
}

/// A text box attached to a card, positioned relative to the card origin.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextBlockLayout {
    pub kind: TextKind,
    pub offset_x: Length,
    pub offset_y: Length,
    pub width: Length,
    pub height: Length,
    #[serde(default = "default_font_size")]
    pub font_size_pt: f32,
    #[serde(default)]
    pub style: TextStyle,
}

/// Footprint of one card.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CardLayout {
    pub width: Length,
    pub height: Length,
    #[serde(default)]
    pub text_blocks: Vec<TextBlockLayout>,
}

/// Footprint override for a named set of conditions.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SpecificLayout {
    pub conditions: Vec<String>,
    pub layout: CardLayout,
}

/// All footprints for one tier.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TierLayout {
    pub default: CardLayout,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specific: Option<SpecificLayout>,
}

/// Immutable severity → footprint mapping.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    tiers: BTreeMap<Severity, TierLayout>,
}

impl Catalog {
    pub fn new(tiers: impl IntoIterator<Item = (Severity, TierLayout)>) -> Self {
        Self {
            tiers: tiers.into_iter().collect(),
        }
    }

    /// Footprint for `condition` at `severity`.
    ///
    /// A matching specific override always wins over the tier default. Returns
    /// `None` when the tier has no entry.
    pub fn card(&self, severity: Severity, condition: &ConditionName) -> Option<&CardLayout> {
        let tier = self.tiers.get(&severity)?;
        match &tier.specific {
            Some(specific) if specific.conditions.iter().any(|c| condition.matches(c)) => {
                Some(&specific.layout)
            }
            _ => Some(&tier.default),
        }
    }

    pub fn tiers(&self) -> impl Iterator<Item = Severity> + '_ {
        self.tiers.keys().copied()
    }

    /// Checks that every footprint fits inside `section`'s usable span.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::CardExceedsCanvas`] for the first footprint taller
    /// than `section.max_y - section.top`.
    pub fn validate_for(&self, section: &Section) -> ReportResult<()> {
        let span = section.span();
        for (severity, tier) in &self.tiers {
            let layouts = std::iter::once(&tier.default)
                .chain(tier.specific.as_ref().map(|s| &s.layout));
            for layout in layouts {
                if layout.height > span {
                    return Err(ReportError::CardExceedsCanvas {
                        section: section.name.clone(),
                        severity: *severity,
                        height: layout.height,
                        span,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Conditions whose Moderate diet card carries a longer recommendation block.
const DIET_MODERATE_SPECIFIC: [&str; 6] = [
    "Cardiac_Health",
    "Cholesterol_Disorders",
    "High_Blood_Pressure",
    "Glomerular_Diseases",
    "Allergies",
    "Gut_Health",
];

/// Conditions whose Moderate to High diet card carries a longer recommendation block.
const DIET_MODERATE_TO_HIGH_SPECIFIC: [&str; 9] = [
    "Allergies",
    "Cardiac_Health",
    "Cardiomyopathy",
    "Cholesterol_Disorders",
    "Diabetes",
    "Gut_Health",
    "High_Blood_Pressure",
    "Obesity",
    "Stroke",
];

fn cm(value: f64) -> Length {
    Length::from_cm(value)
}

fn recommendations_block(x: f64, y: f64, width: f64, height: f64) -> TextBlockLayout {
    TextBlockLayout {
        kind: TextKind::Recommendations,
        offset_x: cm(x),
        offset_y: cm(y),
        width: cm(width),
        height: cm(height),
        font_size_pt: 11.0,
        style: TextStyle::Plain,
    }
}

fn diet_card(width: f64, height: f64, block: TextBlockLayout) -> CardLayout {
    CardLayout {
        width: cm(width),
        height: cm(height),
        text_blocks: vec![block],
    }
}

/// Diet cards: image plus one recommendations block.
pub fn default_diet_catalog() -> Catalog {
    Catalog::new([
        (
            Severity::Mild,
            TierLayout {
                default: diet_card(19.16, 5.25, recommendations_block(2.6, 1.0, 16.09, 3.8)),
                specific: None,
            },
        ),
        (
            Severity::Moderate,
            TierLayout {
                default: diet_card(19.18, 5.04, recommendations_block(2.7, 1.0, 15.98, 3.7)),
                specific: Some(SpecificLayout {
                    conditions: DIET_MODERATE_SPECIFIC.iter().map(|s| s.to_string()).collect(),
                    layout: diet_card(19.17, 6.84, recommendations_block(2.5, 1.0, 15.98, 5.3)),
                }),
            },
        ),
        (
            Severity::ModerateToHigh,
            TierLayout {
                default: diet_card(19.18, 5.54, recommendations_block(2.5, 1.15, 16.25, 4.0)),
                specific: Some(SpecificLayout {
                    conditions: DIET_MODERATE_TO_HIGH_SPECIFIC
                        .iter()
                        .map(|s| s.to_string())
                        .collect(),
                    layout: diet_card(19.13, 8.26, recommendations_block(2.5, 1.15, 16.25, 6.5)),
                }),
            },
        ),
    ])
}

/// Text block offsets are house defaults: the template's parallelogram slides
/// carry no text frames to copy them from.
fn parallelogram_card(height: f64) -> CardLayout {
    CardLayout {
        width: cm(19.43),
        height: cm(height),
        text_blocks: vec![
            TextBlockLayout {
                kind: TextKind::FirstText,
                offset_x: cm(1.2),
                offset_y: cm(0.6),
                width: cm(17.0),
                height: cm(1.0),
                font_size_pt: 12.0,
                style: TextStyle::SeverityKeywords,
            },
            TextBlockLayout {
                kind: TextKind::Recommendations,
                offset_x: cm(1.2),
                offset_y: cm(1.8),
                width: cm(17.0),
                height: cm(height - 2.4),
                font_size_pt: 10.0,
                style: TextStyle::Plain,
            },
        ],
    }
}

/// Parallelogram cards: image plus a first-text label and recommendations.
pub fn default_parallelogram_catalog() -> Catalog {
    Catalog::new([
        (Severity::ModerateToHigh, TierLayout { default: parallelogram_card(9.35), specific: None }),
        (Severity::Moderate, TierLayout { default: parallelogram_card(7.0), specific: None }),
        (Severity::Mild, TierLayout { default: parallelogram_card(7.0), specific: None }),
        (Severity::Low, TierLayout { default: parallelogram_card(5.0), specific: None }),
    ])
}
