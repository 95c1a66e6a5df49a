//! Gender and age specific fitness advice.
//!
//! Two sheets (men, women) hold one row per age range with comma-separated
//! do's and don'ts. A patient's gender picks the sheet and their age picks every
//! row whose range contains it. The points are de-duplicated in sheet order and
//! the first [`FITNESS_DO_POINTS`] do's and [`FITNESS_DONT_POINTS`] don'ts become
//! the `dopointN` and `dontpointN` deck fields, filled in downstream.

use crate::constants::{
    AGE_FIELD, FITNESS_AGE_COLUMN, FITNESS_DONT_COLUMN, FITNESS_DONT_FIELD, FITNESS_DONT_POINTS,
    FITNESS_DO_COLUMN, FITNESS_DO_FIELD, FITNESS_DO_POINTS, GENDER_FIELD,
};
use crate::records::Demographics;
use crate::table::Table;
use crate::{ReportError, ReportResult};
use std::collections::BTreeSet;
use std::path::Path;

/// Which fitness sheet applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    /// Maps a demographic gender value; anything not recognised as female is male.
    pub fn from_gender(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "women" | "woman" | "female" | "f" => Sex::Female,
            _ => Sex::Male,
        }
    }
}

/// The selected points for one patient.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FitnessAdvice {
    pub dos: Vec<String>,
    pub donts: Vec<String>,
}

impl FitnessAdvice {
    /// Collects the points of every row whose age range contains `age`.
    ///
    /// Rows whose age cell is not a `min-max` range are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::InvalidInput`] if the age, do's or don'ts column is
    /// missing.
    pub fn select(sheet: &Table, age: f64) -> ReportResult<Self> {
        let age_column = find_header(sheet, FITNESS_AGE_COLUMN)?;
        let do_column = find_header(sheet, FITNESS_DO_COLUMN)?;
        let dont_column = find_header(sheet, FITNESS_DONT_COLUMN)?;

        let mut dos = Vec::new();
        let mut donts = Vec::new();
        for row in sheet.rows() {
            let Some((min, max)) = row.get(&age_column).and_then(parse_age_range) else {
                continue;
            };
            if age < f64::from(min) || age > f64::from(max) {
                continue;
            }
            dos.extend(split_points(row.get(&do_column)));
            donts.extend(split_points(row.get(&dont_column)));
        }

        Ok(Self {
            dos: first_unique(dos, FITNESS_DO_POINTS),
            donts: first_unique(donts, FITNESS_DONT_POINTS),
        })
    }

    /// `dopoint1..` and `dontpoint1..` deck fields; missing points are empty.
    pub fn fields(&self) -> Vec<(String, String)> {
        let numbered = |prefix: &str, points: &[String], count: usize| {
            (0..count)
                .map(|i| {
                    (
                        format!("{prefix}{}", i + 1),
                        points.get(i).cloned().unwrap_or_default(),
                    )
                })
                .collect::<Vec<_>>()
        };

        let mut fields = numbered(FITNESS_DO_FIELD, &self.dos, FITNESS_DO_POINTS);
        fields.extend(numbered(FITNESS_DONT_FIELD, &self.donts, FITNESS_DONT_POINTS));
        fields
    }
}

/// The men's and women's sheets, loaded once.
#[derive(Debug, Clone, Default)]
pub struct FitnessSheets {
    pub male: Option<Table>,
    pub female: Option<Table>,
}

impl FitnessSheets {
    /// Loads both sheets; a missing file is logged and left out.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if a sheet exists but cannot be read.
    pub fn load(male: &Path, female: &Path) -> ReportResult<Self> {
        Ok(Self {
            male: load_sheet(male)?,
            female: load_sheet(female)?,
        })
    }

    pub fn sheet(&self, sex: Sex) -> Option<&Table> {
        match sex {
            Sex::Male => self.male.as_ref(),
            Sex::Female => self.female.as_ref(),
        }
    }

    /// Selects the advice for a patient.
    ///
    /// Returns `Ok(None)` when no sheet is loaded, or the sheet for the
    /// patient's gender is not.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::InvalidInput`] if the demographics have no usable
    /// age or gender, or the sheet is missing a column.
    pub fn advice(&self, demographics: &Demographics) -> ReportResult<Option<FitnessAdvice>> {
        if self.male.is_none() && self.female.is_none() {
            return Ok(None);
        }

        let age_text = demographic(demographics, AGE_FIELD)
            .ok_or_else(|| ReportError::InvalidInput("demographics have no age".into()))?;
        let age: f64 = age_text.trim().parse().map_err(|_| {
            ReportError::InvalidInput(format!("age {age_text:?} is not a number"))
        })?;
        let sex = demographic(demographics, GENDER_FIELD)
            .map(Sex::from_gender)
            .ok_or_else(|| ReportError::InvalidInput("demographics have no gender".into()))?;

        let Some(sheet) = self.sheet(sex) else {
            tracing::warn!("no fitness sheet loaded for {sex:?}, skipping fitness advice");
            return Ok(None);
        };
        FitnessAdvice::select(sheet, age).map(Some)
    }
}

fn load_sheet(path: &Path) -> ReportResult<Option<Table>> {
    match Table::load(path) {
        Ok(table) => Ok(Some(table)),
        Err(ReportError::SourceNotFound(path)) => {
            tracing::warn!("fitness sheet not found: {}", path.display());
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Case-insensitive demographic lookup; blank values count as absent.
fn demographic<'a>(demographics: &'a Demographics, name: &str) -> Option<&'a str> {
    demographics
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
        .filter(|value| !value.trim().is_empty())
}

/// Sheet headers use typographic apostrophes, sometimes mis-decoded.
fn normalise_header(header: &str) -> String {
    header
        .trim()
        .replace("\u{e2}\u{20ac}\u{2122}", "'")
        .replace('\u{2019}', "'")
        .to_lowercase()
}

fn find_header(sheet: &Table, wanted: &str) -> ReportResult<String> {
    let wanted_norm = normalise_header(wanted);
    sheet
        .headers()
        .iter()
        .find(|header| normalise_header(header) == wanted_norm)
        .cloned()
        .ok_or_else(|| ReportError::InvalidInput(format!("fitness sheet has no {wanted:?} column")))
}

/// `"18-25"`, `"18 - 25 yrs"` → `(18, 25)`; anything else → `None`.
fn parse_age_range(raw: &str) -> Option<(u32, u32)> {
    if !raw.contains('-') {
        return None;
    }
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-')
        .collect();
    let (min, max) = cleaned.split_once('-')?;
    Some((min.parse().ok()?, max.parse().ok()?))
}

fn split_points(cell: Option<&str>) -> Vec<String> {
    cell.map(|cell| {
        cell.split(',')
            .map(str::trim)
            .filter(|point| !point.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

fn first_unique(points: Vec<String>, limit: usize) -> Vec<String> {
    let mut seen = BTreeSet::new();
    points
        .into_iter()
        .filter(|point| seen.insert(point.clone()))
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sheet() -> Table {
        Table::from_rows(
            ["Age", "Do\u{2019}s", "Don't's "],
            vec![
                vec!["18-25", "walk daily, stretch, walk daily", "skip breakfast"],
                vec!["18 - 40 yrs", "swim, cycle, lift weights, row", "smoke, binge, skip sleep"],
                vec!["41-60", "yoga", "sprint"],
                vec!["60+", "garden", "lift heavy"],
            ],
        )
    }

    fn demographics(pairs: &[(&str, &str)]) -> Demographics {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn selects_every_matching_age_range_in_sheet_order() {
        let advice = FitnessAdvice::select(&sheet(), 22.0).unwrap();

        assert_eq!(advice.dos, vec!["walk daily", "stretch", "swim", "cycle"]);
        assert_eq!(
            advice.donts,
            vec!["skip breakfast", "smoke", "binge", "skip sleep"]
        );
    }

    #[test]
    fn range_bounds_are_inclusive_and_open_ranges_ignored() {
        assert_eq!(FitnessAdvice::select(&sheet(), 41.0).unwrap().dos, vec!["yoga"]);
        assert_eq!(FitnessAdvice::select(&sheet(), 70.0).unwrap(), FitnessAdvice::default());
    }

    #[test]
    fn fields_are_numbered_and_padded() {
        let advice = FitnessAdvice {
            dos: vec!["swim".into()],
            donts: vec!["smoke".into(), "binge".into()],
        };
        let fields = advice.fields();

        assert_eq!(fields.len(), FITNESS_DO_POINTS + FITNESS_DONT_POINTS);
        assert_eq!(fields[0], ("dopoint1".to_string(), "swim".to_string()));
        assert_eq!(fields[3], ("dopoint4".to_string(), String::new()));
        assert_eq!(fields[5], ("dontpoint2".to_string(), "binge".to_string()));
        assert_eq!(fields[8], ("dontpoint5".to_string(), String::new()));
    }

    #[test]
    fn gender_picks_the_sheet() {
        let sheets = FitnessSheets {
            male: None,
            female: Some(sheet()),
        };

        let advice = sheets
            .advice(&demographics(&[("Age", "45"), ("Gender", "Women")]))
            .unwrap()
            .unwrap();
        assert_eq!(advice.dos, vec!["yoga"]);

        assert_eq!(
            sheets
                .advice(&demographics(&[("age", "45"), ("gender", "Men")]))
                .unwrap(),
            None
        );
        assert_eq!(Sex::from_gender(" female "), Sex::Female);
        assert_eq!(Sex::from_gender("unknown"), Sex::Male);
    }

    #[test]
    fn unusable_demographics_are_invalid_input() {
        let sheets = FitnessSheets {
            male: Some(sheet()),
            female: None,
        };

        for pairs in [
            vec![("gender", "men")],
            vec![("age", "forty"), ("gender", "men")],
            vec![("age", "40")],
        ] {
            assert!(matches!(
                sheets.advice(&demographics(&pairs)),
                Err(ReportError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn missing_columns_are_invalid_input() {
        let table = Table::from_rows(["Age", "Do's"], vec![vec!["18-25", "walk"]]);
        assert!(matches!(
            FitnessAdvice::select(&table, 20.0),
            Err(ReportError::InvalidInput(_))
        ));
    }

    #[test]
    fn missing_sheet_files_load_as_none() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let sheets = FitnessSheets::load(
            &temp_dir.path().join("male.xlsx"),
            &temp_dir.path().join("female.xlsx"),
        )
        .unwrap();

        assert!(sheets.male.is_none());
        assert!(sheets.female.is_none());
        assert_eq!(sheets.advice(&Demographics::new()).unwrap(), None);
    }
}
