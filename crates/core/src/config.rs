//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. Services never read environment variables themselves: binaries
//! collect the raw values and hand them to the `*_from_env_value` helpers here, which keeps
//! behaviour consistent across the runner, the CLI and test harnesses.

use crate::constants::{
    env, DEFAULT_DIET_FILE, DEFAULT_DIET_PICTURES_DIR, DEFAULT_FEMALE_FITNESS_FILE,
    DEFAULT_FIRST_TEXT_FILE, DEFAULT_MALE_FITNESS_FILE, DEFAULT_OUTPUT_DIR, DEFAULT_PARALLELOGRAM_DIR, DEFAULT_PATIENTS_DIR,
    DEFAULT_RECOMMENDATIONS_FILE, DEFAULT_SCALES_DIR, DEFAULT_SCORING_CHARTS_DIR,
    DEFAULT_TEMPLATE_PATH,
};
use crate::layout::LayoutConfig;
use crate::{ReportError, ReportResult};
use std::path::{Path, PathBuf};

/// Filesystem locations of report inputs and outputs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportPaths {
    pub patients_dir: PathBuf,
    pub template: PathBuf,
    pub output_dir: PathBuf,
    pub scoring_charts_dir: PathBuf,
    pub parallelogram_dir: PathBuf,
    pub diet_pictures_dir: PathBuf,
    pub scales_dir: PathBuf,
    pub recommendations_file: PathBuf,
    pub first_text_file: PathBuf,
    pub diet_file: PathBuf,
    pub male_fitness_file: PathBuf,
    pub female_fitness_file: PathBuf,
}

impl Default for ReportPaths {
    fn default() -> Self {
        Self {
            patients_dir: DEFAULT_PATIENTS_DIR.into(),
            template: DEFAULT_TEMPLATE_PATH.into(),
            output_dir: DEFAULT_OUTPUT_DIR.into(),
            scoring_charts_dir: DEFAULT_SCORING_CHARTS_DIR.into(),
            parallelogram_dir: DEFAULT_PARALLELOGRAM_DIR.into(),
            diet_pictures_dir: DEFAULT_DIET_PICTURES_DIR.into(),
            scales_dir: DEFAULT_SCALES_DIR.into(),
            recommendations_file: DEFAULT_RECOMMENDATIONS_FILE.into(),
            first_text_file: DEFAULT_FIRST_TEXT_FILE.into(),
            diet_file: DEFAULT_DIET_FILE.into(),
            male_fitness_file: DEFAULT_MALE_FITNESS_FILE.into(),
            female_fitness_file: DEFAULT_FEMALE_FITNESS_FILE.into(),
        }
    }
}

impl ReportPaths {
    /// Builds paths from raw environment values, falling back to defaults.
    ///
    /// `lookup` receives a variable name from [`crate::constants::env`] and returns its
    /// value, if set. Binaries pass `|key| std::env::var(key).ok()`.
    pub fn from_env_values(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let path = |key: &str, default: PathBuf| path_from_env_value(lookup(key), default);

        Self {
            patients_dir: path(env::PATIENTS_DIR, defaults.patients_dir),
            template: path(env::TEMPLATE, defaults.template),
            output_dir: path(env::OUTPUT_DIR, defaults.output_dir),
            scoring_charts_dir: path(env::SCORING_CHARTS_DIR, defaults.scoring_charts_dir),
            parallelogram_dir: path(env::PARALLELOGRAM_DIR, defaults.parallelogram_dir),
            diet_pictures_dir: path(env::DIET_PICTURES_DIR, defaults.diet_pictures_dir),
            scales_dir: path(env::SCALES_DIR, defaults.scales_dir),
            recommendations_file: path(env::RECOMMENDATIONS_FILE, defaults.recommendations_file),
            first_text_file: path(env::FIRST_TEXT_FILE, defaults.first_text_file),
            diet_file: path(env::DIET_FILE, defaults.diet_file),
            male_fitness_file: path(env::MALE_FITNESS_FILE, defaults.male_fitness_file),
            female_fitness_file: path(env::FEMALE_FITNESS_FILE, defaults.female_fitness_file),
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct ReportConfig {
    paths: ReportPaths,
    layout: LayoutConfig,
}

impl ReportConfig {
    /// Create a new `ReportConfig`.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if:
    /// - the template is not a file (`SourceNotFound`)
    /// - the layout is inconsistent (see [`LayoutConfig::validate`])
    pub fn new(paths: ReportPaths, layout: LayoutConfig) -> ReportResult<Self> {
        if !paths.template.is_file() {
            return Err(ReportError::SourceNotFound(paths.template.clone()));
        }
        layout.validate()?;

        Ok(Self { paths, layout })
    }

    pub fn paths(&self) -> &ReportPaths {
        &self.paths
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn template(&self) -> &Path {
        &self.paths.template
    }

    pub fn output_dir(&self) -> &Path {
        &self.paths.output_dir
    }
}

/// Parse a path from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns `default`.
pub fn path_from_env_value(value: Option<String>, default: PathBuf) -> PathBuf {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or(default)
}

/// Parse the selected patient codes from an optional comma-separated value.
///
/// Entries are trimmed and empty entries dropped; `None` yields an empty list.
pub fn selected_patients_from_env_value(value: Option<String>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|code| !code.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Resolve the layout from an optional YAML file path.
///
/// If `value` is `None` or empty/whitespace, returns the built-in layout.
///
/// # Errors
///
/// Returns any error from [`LayoutConfig::load`].
pub fn layout_from_env_value(value: Option<String>) -> ReportResult<LayoutConfig> {
    match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        Some(path) => LayoutConfig::load(Path::new(&path)),
        None => Ok(LayoutConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn env_values_override_defaults() {
        let vars = HashMap::from([
            (env::PATIENTS_DIR, "/data/patients"),
            (env::TEMPLATE, "  "),
            (env::FEMALE_FITNESS_FILE, "/data/female.xlsx"),
        ]);
        let paths = ReportPaths::from_env_values(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(paths.patients_dir, PathBuf::from("/data/patients"));
        assert_eq!(paths.template, PathBuf::from(DEFAULT_TEMPLATE_PATH));
        assert_eq!(paths.diet_file, PathBuf::from(DEFAULT_DIET_FILE));
        assert_eq!(paths.female_fitness_file, PathBuf::from("/data/female.xlsx"));
        assert_eq!(paths.male_fitness_file, PathBuf::from(DEFAULT_MALE_FITNESS_FILE));
    }

    #[test]
    fn selected_patients_are_trimmed() {
        assert_eq!(
            selected_patients_from_env_value(Some(" KH1, ,KH2 ,".into())),
            vec!["KH1", "KH2"]
        );
        assert!(selected_patients_from_env_value(None).is_empty());
    }

    #[test]
    fn layout_defaults_without_value() {
        assert_eq!(
            layout_from_env_value(Some("".into())).unwrap(),
            LayoutConfig::default()
        );
        assert!(matches!(
            layout_from_env_value(Some("/no/such/layout.yaml".into())),
            Err(ReportError::SourceNotFound(_))
        ));
    }

    #[test]
    fn config_requires_existing_template() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let template = temp_dir.path().join("template.json");
        let paths = ReportPaths {
            template: template.clone(),
            ..ReportPaths::default()
        };

        assert!(matches!(
            ReportConfig::new(paths.clone(), LayoutConfig::default()),
            Err(ReportError::SourceNotFound(_))
        ));

        fs::write(&template, "{}").unwrap();
        let cfg = ReportConfig::new(paths, LayoutConfig::default()).unwrap();
        assert_eq!(cfg.template(), template.as_path());
    }
}
