//! Intolerance scale placement.
//!
//! A patient's `<code>_intolerance.json` maps intolerance keys such as
//! `"Lactose_Intolerance"` to a severity label. Each configured key gets a
//! thermometer scale picture for its severity and a red label naming the tier, at
//! fixed positions on the intolerance slides.

use crate::condition::ConditionName;
use crate::{ReportError, ReportResult};
use lifestyle_deck::SlideDocument;
use lifestyle_types::{Font, Frame, Length, Rgb, Severity};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Position of one intolerance on its slide.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct IntoleranceEntry {
    pub key: String,
    pub image_top: Length,
    pub label_top: Length,
}

/// Intolerances shown on one slide.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct IntoleranceSlide {
    pub slide: usize,
    pub entries: Vec<IntoleranceEntry>,
}

/// Geometry of the intolerance slides.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct IntoleranceLayout {
    pub slides: Vec<IntoleranceSlide>,
    pub image_left: Length,
    pub image_width: Length,
    pub image_height: Length,
    pub label_left: Length,
    pub label_width: Length,
    pub label_height: Length,
    pub label_font_size_pt: f32,
    /// Scale picture per tier, relative to the scales directory.
    pub scale_images: BTreeMap<Severity, PathBuf>,
}

impl Default for IntoleranceLayout {
    fn default() -> Self {
        let cm = Length::from_cm;
        let entry = |key: &str, image_top: f64, label_top: f64| IntoleranceEntry {
            key: key.to_string(),
            image_top: cm(image_top),
            label_top: cm(label_top),
        };

        Self {
            slides: vec![
                IntoleranceSlide {
                    slide: 39,
                    entries: vec![
                        entry("Carbohydrate_Intolerance", 4.62, 8.91),
                        entry("Lipid_Intolerance", 12.4, 16.63),
                        entry("Protein_Intolerance", 21.09, 25.38),
                    ],
                },
                IntoleranceSlide {
                    slide: 40,
                    entries: vec![
                        entry("Lactose_Intolerance", 5.29, 9.58),
                        entry("Gluten_Intolerance", 12.88, 17.17),
                        entry("Insulin_Resistance", 20.53, 24.82),
                    ],
                },
            ],
            image_left: cm(16.0),
            image_width: cm(1.54),
            image_height: cm(5.59),
            label_left: cm(17.2),
            label_width: cm(2.41),
            label_height: cm(0.77),
            label_font_size_pt: 12.0,
            scale_images: BTreeMap::from([
                (Severity::Low, PathBuf::from("Low.png")),
                (Severity::Mild, PathBuf::from("Mild.png")),
                (Severity::Moderate, PathBuf::from("Moderate.png")),
                (Severity::ModerateToHigh, PathBuf::from("Moderatetohigh.png")),
            ]),
        }
    }
}

/// Intolerance key → severity label, as read from the patient's JSON.
pub type IntoleranceLevels = BTreeMap<String, String>;

/// Reads an intolerance JSON file.
///
/// Entries whose value is not a string (`null`, numbers, nested objects) are
/// logged and dropped; the remaining entries are still returned.
///
/// # Errors
///
/// Returns [`ReportError::SourceNotFound`] if the file does not exist,
/// [`ReportError::FileRead`] if it cannot be read and
/// [`ReportError::Deserialization`] if it is not a JSON object.
pub fn load_intolerance_levels(path: &Path) -> ReportResult<IntoleranceLevels> {
    let contents = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ReportError::SourceNotFound(path.to_path_buf()),
        _ => ReportError::FileRead(e),
    })?;
    let raw: BTreeMap<String, serde_json::Value> =
        serde_json::from_str(&contents).map_err(ReportError::Deserialization)?;

    Ok(raw
        .into_iter()
        .filter_map(|(key, value)| match value {
            serde_json::Value::String(level) => Some((key, level)),
            other => {
                tracing::warn!("ignoring intolerance {key}: expected a severity label, got {other}");
                None
            }
        })
        .collect())
}

/// Places a scale picture and severity label for every configured intolerance.
///
/// Keys absent from `levels`, unrecognised severity labels and tiers without a
/// scale picture are logged and skipped.
///
/// # Returns
///
/// The number of intolerances placed.
///
/// # Errors
///
/// Returns a deck error if a configured slide does not exist.
pub fn place_intolerance_scales<D: SlideDocument + ?Sized>(
    doc: &mut D,
    layout: &IntoleranceLayout,
    scales_dir: &Path,
    levels: &IntoleranceLevels,
) -> ReportResult<usize> {
    let mut placed = 0;

    for slide in &layout.slides {
        for entry in &slide.entries {
            let Some(raw) = lookup(levels, &entry.key) else {
                tracing::warn!("no intolerance level for {}", entry.key);
                continue;
            };
            let severity = match raw.parse::<Severity>() {
                Ok(severity) => severity,
                Err(e) => {
                    tracing::warn!("skipping {}: {e}", entry.key);
                    continue;
                }
            };
            let Some(image) = layout.scale_images.get(&severity) else {
                tracing::warn!("no scale image configured for {severity}");
                continue;
            };

            doc.add_image(
                slide.slide,
                Frame::new(
                    layout.image_left,
                    entry.image_top,
                    layout.image_width,
                    layout.image_height,
                ),
                &scales_dir.join(image),
            )?;

            let font = Font::arial(layout.label_font_size_pt)
                .bold(true)
                .color(Rgb::RED);
            doc.add_textbox(
                slide.slide,
                Frame::new(
                    layout.label_left,
                    entry.label_top,
                    layout.label_width,
                    layout.label_height,
                ),
                crate::styling::lines_with_font([severity.label()], &font),
            )?;

            tracing::debug!("placed {} scale ({severity}) on slide {}", entry.key, slide.slide);
            placed += 1;
        }
    }

    Ok(placed)
}

/// Exact key first, then a normalised case-insensitive match.
fn lookup<'a>(levels: &'a IntoleranceLevels, key: &str) -> Option<&'a str> {
    if let Some(value) = levels.get(key) {
        return Some(value.as_str());
    }
    let wanted = ConditionName::normalise(key)?;
    levels
        .iter()
        .find(|(k, _)| wanted.matches(k))
        .map(|(_, v)| v.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifestyle_deck::{Deck, ShapeContent};
    use tempfile::TempDir;

    fn levels(pairs: &[(&str, &str)]) -> IntoleranceLevels {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn places_scale_and_label_per_intolerance() {
        let mut deck = Deck::with_blank_slides(42);
        let layout = IntoleranceLayout::default();
        let levels = levels(&[
            ("Carbohydrate_Intolerance", "Moderate to High"),
            ("Lipid_Intolerance", "Low"),
            ("Protein_Intolerance", "Mild"),
            ("Lactose_Intolerance", "Moderate"),
            ("Gluten_Intolerance", "Low"),
            ("Insulin_Resistance", "Mild"),
        ]);

        let placed =
            place_intolerance_scales(&mut deck, &layout, Path::new("scales"), &levels).unwrap();
        assert_eq!(placed, 6);

        let slide = deck.slide(39).unwrap();
        assert_eq!(slide.shapes.len(), 6);
        assert_eq!(
            slide.shapes[0].content,
            ShapeContent::Picture {
                source: PathBuf::from("scales/Moderatetohigh.png")
            }
        );
        assert_eq!(slide.shapes[0].frame, Frame::from_cm(16.0, 4.62, 1.54, 5.59));

        let ShapeContent::TextBox { text } = &slide.shapes[1].content else {
            panic!("expected label");
        };
        assert_eq!(text.plain_text(), "Moderate to High");
        let font = &text.paragraphs[0].runs[0].font;
        assert!(font.bold);
        assert_eq!(font.color, Some(Rgb::RED));
        assert_eq!(font.size_pt, 12.0);
        assert_eq!(slide.shapes[1].frame, Frame::from_cm(17.2, 8.91, 2.41, 0.77));
    }

    #[test]
    fn missing_or_unknown_levels_are_skipped() {
        let mut deck = Deck::with_blank_slides(42);
        let levels = levels(&[
            ("carbohydrate intolerance", "mild"),
            ("Lipid_Intolerance", "Severe"),
        ]);

        let placed = place_intolerance_scales(
            &mut deck,
            &IntoleranceLayout::default(),
            Path::new("scales"),
            &levels,
        )
        .unwrap();

        assert_eq!(placed, 1);
        assert_eq!(deck.slide(39).unwrap().shapes.len(), 2);
        assert!(deck.slide(40).unwrap().shapes.is_empty());
    }

    #[test]
    fn load_reports_missing_file_as_source_not_found() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("ABC_intolerance.json");

        assert!(matches!(
            load_intolerance_levels(&path),
            Err(ReportError::SourceNotFound(_))
        ));

        fs::write(&path, r#"{"Gluten_Intolerance": "Mild"}"#).unwrap();
        let levels = load_intolerance_levels(&path).unwrap();
        assert_eq!(levels["Gluten_Intolerance"], "Mild");
    }

    #[test]
    fn non_string_levels_are_dropped_not_fatal() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("KH1_intolerance.json");
        fs::write(
            &path,
            r#"{"Gluten_Intolerance": "Mild", "Lactose_Intolerance": null, "Lipid_Intolerance": 3}"#,
        )
        .unwrap();

        let levels = load_intolerance_levels(&path).unwrap();
        assert_eq!(levels.len(), 1);
        assert_eq!(levels["Gluten_Intolerance"], "Mild");

        fs::write(&path, r#"["Mild"]"#).unwrap();
        assert!(matches!(
            load_intolerance_levels(&path),
            Err(ReportError::Deserialization(_))
        ));
    }
}
