//! Patient record store.
//!
//! Patients live under a single root, one directory per patient code:
//!
//! ```text
//! <patients>/
//!   <code>.json                      demographics (legacy location)
//!   <code>/
//!     <code>.json                    demographics
//!     <code>_Scoring_chart*.xlsx     scoring chart (optional here)
//!     <code>_intolerance.json
//!     <code>_vitamin_sheet.xlsx
//! ```
//!
//! Scoring charts not kept in the patient directory are found by a recursive walk
//! of the scoring charts root, visiting directories in lexical order so the result
//! does not depend on filesystem enumeration order.

use crate::condition::normalise_key;
use crate::constants::{
    INTOLERANCE_FILE_SUFFIX, SCORING_CHART_EXTENSION, SCORING_CHART_MARKER, VITAMIN_SHEET_SUFFIX,
};
use crate::validation::validate_patient_code;
use crate::{ReportError, ReportResult};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Demographic fields keyed without whitespace (`"Patient Name"` → `"Patient_Name"`).
pub type Demographics = BTreeMap<String, String>;

/// Read access to patient inputs.
#[derive(Clone, Debug)]
pub struct PatientRecords {
    patients_dir: PathBuf,
    scoring_charts_dir: PathBuf,
}

impl PatientRecords {
    pub fn new(patients_dir: impl Into<PathBuf>, scoring_charts_dir: impl Into<PathBuf>) -> Self {
        Self {
            patients_dir: patients_dir.into(),
            scoring_charts_dir: scoring_charts_dir.into(),
        }
    }

    pub fn patients_dir(&self) -> &Path {
        &self.patients_dir
    }

    /// Directory of one patient.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidInput` if `code` is not a valid patient code.
    pub fn patient_dir(&self, code: &str) -> ReportResult<PathBuf> {
        validate_patient_code(code)?;
        Ok(self.patients_dir.join(code))
    }

    /// Lists patient codes that have a demographics file, sorted.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::SourceNotFound` if the patients directory does not
    /// exist, or `ReportError::FileRead` if it cannot be read.
    pub fn list_codes(&self) -> ReportResult<Vec<String>> {
        let entries = fs::read_dir(&self.patients_dir).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ReportError::SourceNotFound(self.patients_dir.clone()),
            _ => ReportError::FileRead(e),
        })?;

        let mut codes = BTreeSet::new();
        for entry in entries {
            let path = entry.map_err(ReportError::FileRead)?.path();
            let code = if path.is_dir() {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .filter(|code| path.join(format!("{code}.json")).is_file())
            } else if path.extension().is_some_and(|ext| ext == "json") {
                path.file_stem().and_then(|n| n.to_str())
            } else {
                None
            };

            match code {
                Some(code) if validate_patient_code(code).is_ok() => {
                    codes.insert(code.to_string());
                }
                Some(code) => tracing::debug!("ignoring {code:?}: not a patient code"),
                None => {}
            }
        }

        Ok(codes.into_iter().collect())
    }

    /// Demographics file: `<patients>/<code>/<code>.json`, else `<patients>/<code>.json`.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::SourceNotFound` if neither file exists.
    pub fn demographics_path(&self, code: &str) -> ReportResult<PathBuf> {
        let file_name = format!("{code}.json");
        let in_patient_dir = self.patient_dir(code)?.join(&file_name);
        if in_patient_dir.is_file() {
            return Ok(in_patient_dir);
        }
        let at_root = self.patients_dir.join(&file_name);
        if at_root.is_file() {
            return Ok(at_root);
        }
        Err(ReportError::SourceNotFound(in_patient_dir))
    }

    /// Loads the patient's demographic fields.
    ///
    /// Keys are normalised with [`normalise_key`]. String values are kept verbatim,
    /// `null` becomes empty and other JSON values keep their JSON text.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if:
    /// - no demographics file exists (`SourceNotFound`)
    /// - it cannot be read (`FileRead`)
    /// - it is not a JSON object (`Deserialization` or `InvalidInput`)
    pub fn load_demographics(&self, code: &str) -> ReportResult<Demographics> {
        let path = self.demographics_path(code)?;
        let contents = fs::read_to_string(&path).map_err(ReportError::FileRead)?;
        let value: serde_json::Value =
            serde_json::from_str(&contents).map_err(ReportError::Deserialization)?;

        let serde_json::Value::Object(object) = value else {
            return Err(ReportError::InvalidInput(format!(
                "demographics in {} is not a JSON object",
                path.display()
            )));
        };

        Ok(object
            .into_iter()
            .map(|(key, value)| {
                let text = match value {
                    serde_json::Value::String(s) => s,
                    serde_json::Value::Null => String::new(),
                    other => other.to_string(),
                };
                (normalise_key(&key), text)
            })
            .collect())
    }

    /// Locates `<code>_Scoring_chart*.xlsx`.
    ///
    /// The patient directory is searched first, then the scoring charts root
    /// recursively, directories in lexical order; the first match wins.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::SourceNotFound` if no chart exists, or
    /// `ReportError::FileRead` if a directory cannot be read.
    pub fn scoring_chart(&self, code: &str) -> ReportResult<PathBuf> {
        let patient_dir = self.patient_dir(code)?;
        let prefix = format!("{code}{SCORING_CHART_MARKER}");

        if patient_dir.is_dir() {
            if let Some(found) = find_chart(&patient_dir, &prefix, false)? {
                return Ok(found);
            }
        }
        if self.scoring_charts_dir.is_dir() {
            if let Some(found) = find_chart(&self.scoring_charts_dir, &prefix, true)? {
                return Ok(found);
            }
        }

        Err(ReportError::SourceNotFound(
            self.scoring_charts_dir
                .join(format!("{prefix}.{SCORING_CHART_EXTENSION}")),
        ))
    }

    /// `<patients>/<code>/<code>_intolerance.json`; may not exist.
    pub fn intolerance_path(&self, code: &str) -> ReportResult<PathBuf> {
        Ok(self
            .patient_dir(code)?
            .join(format!("{code}{INTOLERANCE_FILE_SUFFIX}")))
    }

    /// `<patients>/<code>/<code>_vitamin_sheet.xlsx`; may not exist.
    pub fn vitamin_sheet_path(&self, code: &str) -> ReportResult<PathBuf> {
        Ok(self
            .patient_dir(code)?
            .join(format!("{code}{VITAMIN_SHEET_SUFFIX}")))
    }
}

fn is_chart(path: &Path, prefix: &str) -> bool {
    let name_matches = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(prefix));
    let ext_matches = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(SCORING_CHART_EXTENSION));
    name_matches && ext_matches && path.is_file()
}

/// Files of `dir` before its subdirectories, each group in lexical order.
///
/// Symlinked directories are not descended into, so a link cycle under the
/// charts root cannot recurse forever.
fn find_chart(dir: &Path, prefix: &str, recurse: bool) -> ReportResult<Option<PathBuf>> {
    let mut entries: Vec<(PathBuf, bool)> = fs::read_dir(dir)
        .map_err(ReportError::FileRead)?
        .map(|entry| {
            let entry = entry?;
            let is_link = entry.file_type()?.is_symlink();
            Ok((entry.path(), is_link))
        })
        .collect::<Result<_, std::io::Error>>()
        .map_err(ReportError::FileRead)?;
    entries.sort();

    if let Some((found, _)) = entries.iter().find(|(path, _)| is_chart(path, prefix)) {
        return Ok(Some(found.clone()));
    }

    if recurse {
        for (sub, is_link) in &entries {
            if !sub.is_dir() {
                continue;
            }
            if *is_link {
                tracing::debug!("not following symlinked directory {}", sub.display());
                continue;
            }
            if let Some(found) = find_chart(sub, prefix, true)? {
                return Ok(Some(found));
            }
        }
    }

    Ok(None)
}
