//! Report generation pipeline.
//!
//! One report per patient, strictly sequential:
//!
//! 1. load inputs (demographics and scoring chart are required; intolerance and
//!    vitamin sheets are optional)
//! 2. copy the template deck to `<outputs>/<code>_report.json`
//! 3. demographic and fitness advice fields
//! 4. diet cards: concerns and other conditions into their own sections
//! 5. intolerance scales, then vitamin risk tables
//! 6. parallelogram cards
//! 7. remove parallelogram slides left empty
//! 8. save
//!
//! Steps 3 to 7 are independent components. One that fails (a malformed
//! scoring chart, a template too short for its slides) is logged, recorded in
//! [`PlacementSummary::skipped`] and the rest still run, so the saved report is
//! at worst partially populated.
//!
//! Reclaiming runs last because removing slides shifts every later index, and
//! every other placement addresses slides by their template index.

use crate::classifier::{Classifier, ClassifierMode};
use crate::condition::ClassifiedCondition;
use crate::config::ReportConfig;
use crate::constants::{REPORT_FILE_SUFFIX, TEXT_TABLE_KEY_COLUMN};
use crate::fitness::{FitnessAdvice, FitnessSheets};
use crate::intolerance::{load_intolerance_levels, place_intolerance_scales, IntoleranceLevels};
use crate::packer::{PackReport, Packer};
use crate::reclaim::reclaim_empty;
use crate::records::{Demographics, PatientRecords};
use crate::resolver::{ImageLookup, Resolver, TextTable};
use crate::table::Table;
use crate::validation::validate_patient_code;
use crate::vitamins::{place_vitamin_tables, VitaminRisks};
use crate::{ReportError, ReportResult};
use lifestyle_deck::{Deck, SlideDocument};
use std::path::PathBuf;
use std::sync::Arc;

/// Everything read from the record store for one patient.
#[derive(Debug, Clone)]
pub struct PatientInputs {
    pub code: String,
    pub demographics: Demographics,
    pub scoring_chart: Table,
    pub intolerance: Option<IntoleranceLevels>,
    pub vitamins: Option<VitaminRisks>,
}

/// Classified conditions for each card set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientConditions {
    pub diet_concerns: Vec<ClassifiedCondition>,
    pub diet_others: Vec<ClassifiedCondition>,
    pub parallelograms: Vec<ClassifiedCondition>,
}

/// A report component left out because it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedComponent {
    pub component: &'static str,
    pub reason: String,
}

/// What [`ReportService::render`] did to a deck.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlacementSummary {
    /// Packed sections, in placement order: diet concerns, diet others,
    /// parallelograms. Skipped sections are absent.
    pub sections: Vec<PackReport>,
    /// `None` when the patient has no intolerance file or the component failed.
    pub intolerance_placed: Option<usize>,
    /// `None` when the patient has no vitamin sheet or the component failed.
    pub vitamin_boxes: Option<usize>,
    /// Original indices of removed slides.
    pub removed_slides: Vec<usize>,
    /// Components that failed, in the order they ran.
    pub skipped: Vec<SkippedComponent>,
}

impl PlacementSummary {
    pub fn cards_placed(&self) -> usize {
        self.sections.iter().map(PackReport::placed).sum()
    }

    pub fn cards_skipped(&self) -> usize {
        self.sections
            .iter()
            .map(|s| s.cards.len() - s.placed())
            .sum()
    }

    fn skip(&mut self, code: &str, component: &'static str, error: &ReportError) {
        tracing::warn!("{code}: skipping {component}: {error}");
        self.skipped.push(SkippedComponent {
            component,
            reason: error.to_string(),
        });
    }
}

/// Result of generating one report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSummary {
    pub code: String,
    pub output: PathBuf,
    pub placements: PlacementSummary,
    /// `None` when no fitness sheet applied or the component failed.
    pub fitness: Option<FitnessAdvice>,
}

/// Result of a batch run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub generated: Vec<ReportSummary>,
    pub failed: Vec<(String, ReportError)>,
}

/// Generates lifestyle reports.
///
/// Lookup tables are loaded once at construction and shared by every report.
#[derive(Clone, Debug)]
pub struct ReportService {
    cfg: Arc<ReportConfig>,
    records: PatientRecords,
    parallelogram_assets: Resolver,
    diet_assets: Resolver,
    fitness: Arc<FitnessSheets>,
}

impl ReportService {
    /// Creates a service, loading the first-text, recommendation, diet and fitness
    /// tables.
    ///
    /// Missing tables are logged and treated as empty.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if a table exists but cannot be read.
    pub fn new(cfg: Arc<ReportConfig>) -> ReportResult<Self> {
        let paths = cfg.paths();
        let layout = cfg.layout();

        let first_text = Arc::new(TextTable::load_or_empty(
            &paths.first_text_file,
            TEXT_TABLE_KEY_COLUMN,
        )?);
        let recommendations = Arc::new(TextTable::load_or_empty(
            &paths.recommendations_file,
            TEXT_TABLE_KEY_COLUMN,
        )?);
        let diet = Arc::new(TextTable::load_or_empty(
            &paths.diet_file,
            TEXT_TABLE_KEY_COLUMN,
        )?);
        let fitness = FitnessSheets::load(&paths.male_fitness_file, &paths.female_fitness_file)?;

        let parallelogram_assets = Resolver::new(
            ImageLookup {
                root: paths.parallelogram_dir.clone(),
                policy: layout.parallelograms.image_match,
                extension: layout.parallelograms.image_extension.clone(),
            },
            Arc::clone(&first_text),
            recommendations,
        );
        let diet_assets = Resolver::new(
            ImageLookup {
                root: paths.diet_pictures_dir.clone(),
                policy: layout.diet.image_match,
                extension: layout.diet.image_extension.clone(),
            },
            first_text,
            diet,
        );

        Ok(Self::from_parts(cfg, parallelogram_assets, diet_assets).with_fitness(fitness))
    }

    /// Creates a service from already-built resolvers, without fitness sheets.
    pub fn from_parts(
        cfg: Arc<ReportConfig>,
        parallelogram_assets: Resolver,
        diet_assets: Resolver,
    ) -> Self {
        let records = PatientRecords::new(
            cfg.paths().patients_dir.clone(),
            cfg.paths().scoring_charts_dir.clone(),
        );
        Self {
            cfg,
            records,
            parallelogram_assets,
            diet_assets,
            fitness: Arc::new(FitnessSheets::default()),
        }
    }

    /// Replaces the fitness sheets.
    pub fn with_fitness(mut self, fitness: FitnessSheets) -> Self {
        self.fitness = Arc::new(fitness);
        self
    }

    pub fn records(&self) -> &PatientRecords {
        &self.records
    }

    /// `<outputs>/<code>_report.json`.
    pub fn report_path(&self, code: &str) -> PathBuf {
        self.cfg
            .output_dir()
            .join(format!("{code}{REPORT_FILE_SUFFIX}"))
    }

    /// Reads a patient's inputs from the record store.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if:
    /// - `code` is not a valid patient code (`InvalidInput`)
    /// - demographics or the scoring chart are missing (`SourceNotFound`)
    /// - any present input cannot be read or parsed
    pub fn load_inputs(&self, code: &str) -> ReportResult<PatientInputs> {
        validate_patient_code(code)?;

        let demographics = self.records.load_demographics(code)?;
        let chart_path = self.records.scoring_chart(code)?;
        tracing::debug!("scoring chart for {code}: {}", chart_path.display());
        let scoring_chart = Table::load(&chart_path)?;

        let intolerance = optional(load_intolerance_levels(
            &self.records.intolerance_path(code)?,
        ))?;
        let vitamins = optional(Table::load(&self.records.vitamin_sheet_path(code)?))?
            .map(|table| VitaminRisks::from_table(&table))
            .transpose()?;

        Ok(PatientInputs {
            code: code.to_string(),
            demographics,
            scoring_chart,
            intolerance,
            vitamins,
        })
    }

    /// Classifies a scoring chart for both card sets.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidInput` if the chart has no condition column or a
    /// configured tier list is empty.
    pub fn conditions(&self, scoring_chart: &Table) -> ReportResult<PatientConditions> {
        let (diet_concerns, diet_others) = self.diet_conditions(scoring_chart)?;
        Ok(PatientConditions {
            diet_concerns,
            diet_others,
            parallelograms: self.parallelogram_conditions(scoring_chart)?,
        })
    }

    fn diet_conditions(
        &self,
        scoring_chart: &Table,
    ) -> ReportResult<(Vec<ClassifiedCondition>, Vec<ClassifiedCondition>)> {
        Ok(
            Classifier::new(&self.cfg.layout().diet.tiers, ClassifierMode::ConcernSplit)?
                .classify(scoring_chart)?
                .into_split(),
        )
    }

    fn parallelogram_conditions(&self, scoring_chart: &Table) -> ReportResult<Vec<ClassifiedCondition>> {
        Ok(
            Classifier::new(&self.cfg.layout().parallelograms.tiers, ClassifierMode::Single)?
                .classify(scoring_chart)?
                .into_all(),
        )
    }

    /// Places every report component on `doc`.
    ///
    /// A component that fails is logged and listed in
    /// [`PlacementSummary::skipped`]; the others still run. Empty parallelogram
    /// slides are only reclaimed when the parallelogram section was packed.
    pub fn render<D: SlideDocument + ?Sized>(
        &self,
        doc: &mut D,
        inputs: &PatientInputs,
    ) -> PlacementSummary {
        let layout = self.cfg.layout();
        let paths = self.cfg.paths();
        let code = inputs.code.as_str();
        let mut summary = PlacementSummary::default();

        if doc.slide_count() < layout.min_slide_count {
            tracing::warn!(
                "{code}: template has {} slide(s) but the layout expects {}; components past the end are skipped",
                doc.slide_count(),
                layout.min_slide_count
            );
        }

        let diet = &layout.diet;
        match self.diet_conditions(&inputs.scoring_chart) {
            Ok((concerns, others)) => {
                for (name, section, cards) in [
                    ("diet concerns", &diet.concerns, concerns),
                    ("diet others", &diet.others, others),
                ] {
                    match Packer::new(section, &diet.catalog, &self.diet_assets).pack(doc, &cards) {
                        Ok(report) => summary.sections.push(report),
                        Err(e) => summary.skip(code, name, &e),
                    }
                }
            }
            Err(e) => summary.skip(code, "diet", &e),
        }

        if let Some(levels) = &inputs.intolerance {
            match place_intolerance_scales(doc, &layout.intolerance, &paths.scales_dir, levels) {
                Ok(placed) => summary.intolerance_placed = Some(placed),
                Err(e) => summary.skip(code, "intolerance", &e),
            }
        }

        if let Some(risks) = &inputs.vitamins {
            match place_vitamin_tables(doc, &layout.vitamins, risks) {
                Ok(boxes) => summary.vitamin_boxes = Some(boxes),
                Err(e) => summary.skip(code, "vitamins", &e),
            }
        }

        let parallelograms = &layout.parallelograms;
        let packed = self
            .parallelogram_conditions(&inputs.scoring_chart)
            .and_then(|cards| {
                Packer::new(
                    &parallelograms.section,
                    &parallelograms.catalog,
                    &self.parallelogram_assets,
                )
                .pack(doc, &cards)
            });
        match packed {
            Ok(report) => {
                summary.sections.push(report);
                if parallelograms.reclaim_empty {
                    let section = &parallelograms.section;
                    match reclaim_empty(doc, section.start, section.end, section.top, section.max_y)
                    {
                        Ok(removed) => summary.removed_slides = removed,
                        Err(e) => summary.skip(code, "reclaim", &e),
                    }
                }
            }
            Err(e) => summary.skip(code, "parallelograms", &e),
        }

        summary
    }

    /// Instantiates the template for `inputs.code`, fills and renders it and saves it.
    ///
    /// Component failures do not prevent the save; see [`ReportService::render`].
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if the template cannot be copied or opened, or the
    /// report cannot be saved.
    pub fn generate_from_inputs(&self, inputs: &PatientInputs) -> ReportResult<ReportSummary> {
        let output = self.report_path(&inputs.code);
        let mut deck = Deck::instantiate_template(self.cfg.template(), &output)?;

        for (key, value) in &inputs.demographics {
            deck.set_field(key.clone(), value.clone());
        }

        let fitness = self.fitness.advice(&inputs.demographics);
        if let Ok(Some(advice)) = &fitness {
            for (key, value) in advice.fields() {
                deck.set_field(key, value);
            }
        }

        let mut placements = self.render(&mut deck, inputs);
        let fitness = match fitness {
            Ok(advice) => advice,
            Err(e) => {
                placements.skip(&inputs.code, "fitness", &e);
                None
            }
        };

        deck.save(&output)?;

        tracing::info!(
            "report for {}: {} card(s) placed, {} skipped, {} slide(s) removed, {} component(s) skipped -> {}",
            inputs.code,
            placements.cards_placed(),
            placements.cards_skipped(),
            placements.removed_slides.len(),
            placements.skipped.len(),
            output.display()
        );

        Ok(ReportSummary {
            code: inputs.code.clone(),
            output,
            placements,
            fitness,
        })
    }

    /// Generates the report for one patient.
    ///
    /// # Errors
    ///
    /// See [`ReportService::load_inputs`] and [`ReportService::generate_from_inputs`].
    pub fn generate(&self, code: &str) -> ReportResult<ReportSummary> {
        tracing::info!("generating report for {code}");
        let inputs = self.load_inputs(code)?;
        self.generate_from_inputs(&inputs)
    }

    /// Generates reports for `codes` in order, continuing past failures.
    pub fn generate_batch(&self, codes: &[String]) -> BatchSummary {
        let mut summary = BatchSummary::default();
        for code in codes {
            match self.generate(code) {
                Ok(report) => summary.generated.push(report),
                Err(e) => {
                    tracing::error!("skipping {code}: {e}");
                    summary.failed.push((code.clone(), e));
                }
            }
        }
        tracing::info!(
            "batch finished: {} generated, {} failed",
            summary.generated.len(),
            summary.failed.len()
        );
        summary
    }
}

/// Maps a missing optional input to `None`.
fn optional<T>(result: ReportResult<T>) -> ReportResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ReportError::SourceNotFound(path)) => {
            tracing::warn!("optional input not found, skipping: {}", path.display());
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReportPaths;
    use crate::layout::LayoutConfig;
    use crate::packer::CardOutcome;
    use crate::resolver::MatchPolicy;
    use lifestyle_deck::ShapeContent;
    use lifestyle_types::Severity;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const SEVERITY_HEADERS: [&str; 5] = ["Condition", "Low", "Mild", "Moderate", "Moderate to High"];

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"png").unwrap();
    }

    fn service(temp_dir: &TempDir) -> ReportService {
        let root = temp_dir.path();
        let template = root.join("template.json");
        Deck::with_blank_slides(42).save(&template).unwrap();

        let paths = ReportPaths {
            patients_dir: root.join("patients"),
            template,
            output_dir: root.join("out"),
            scoring_charts_dir: root.join("charts"),
            parallelogram_dir: root.join("parallelograms"),
            diet_pictures_dir: root.join("diet"),
            scales_dir: root.join("scales"),
            recommendations_file: root.join("absent.xlsx"),
            first_text_file: root.join("absent.xlsx"),
            diet_file: root.join("absent.xlsx"),
            male_fitness_file: root.join("absent.xlsx"),
            female_fitness_file: root.join("absent.xlsx"),
        };

        touch(&root.join("parallelograms/Moderate_to_High/Diabetes.png"));
        touch(&root.join("parallelograms/Mild/Gut_Health.png"));
        touch(&root.join("parallelograms/Low/Thyroid_card.png"));
        touch(&root.join("diet/Moderate to High/diabetes_plate.png"));
        touch(&root.join("diet/Mild/Gut_Health_plate.png"));

        let first_text = Arc::new(TextTable::new(
            Table::from_rows(
                SEVERITY_HEADERS,
                vec![vec!["Diabetes", "", "", "", "Moderate to High risk of diabetes"]],
            ),
            TEXT_TABLE_KEY_COLUMN,
        ));
        let recommendations = Arc::new(TextTable::new(
            Table::from_rows(
                SEVERITY_HEADERS,
                vec![vec!["Gut Health", "", "eat fibre$drink water", "", ""]],
            ),
            TEXT_TABLE_KEY_COLUMN,
        ));
        let diet = Arc::new(TextTable::new(
            Table::from_rows(
                SEVERITY_HEADERS,
                vec![vec!["Diabetes", "", "", "", "cut sugar"]],
            ),
            TEXT_TABLE_KEY_COLUMN,
        ));

        let cfg = Arc::new(ReportConfig::new(paths.clone(), LayoutConfig::default()).unwrap());
        let parallelogram_assets = Resolver::new(
            ImageLookup {
                root: paths.parallelogram_dir.clone(),
                policy: MatchPolicy::Prefix,
                extension: Some("png".into()),
            },
            Arc::clone(&first_text),
            recommendations,
        );
        let diet_assets = Resolver::new(
            ImageLookup {
                root: paths.diet_pictures_dir.clone(),
                policy: MatchPolicy::Contains,
                extension: None,
            },
            first_text,
            diet,
        );
        ReportService::from_parts(cfg, parallelogram_assets, diet_assets)
    }

    fn inputs(code: &str) -> PatientInputs {
        PatientInputs {
            code: code.to_string(),
            demographics: Demographics::from([("Patient_Name".to_string(), "A. Patient".to_string())]),
            scoring_chart: Table::from_rows(
                ["Medical Condition ", "Low", "Mild", "Moderate", "Moderate to High", "concerns"],
                vec![
                    vec!["Diabetes", "", "", "", "y", "y"],
                    vec!["Thyroid", "y", "", "", "", ""],
                    vec!["Gut Health", "", "y", "", "", ""],
                ],
            ),
            intolerance: Some(IntoleranceLevels::from([(
                "Carbohydrate_Intolerance".to_string(),
                "Mild".to_string(),
            )])),
            vitamins: Some(
                VitaminRisks::from_table(&Table::from_rows(
                    ["Risk", "Condition", "HOM_DAM", "HOM_TOL", "HET_DAM"],
                    vec![vec!["2", "Folate deficiency", "MTHFR", "", ""]],
                ))
                .unwrap(),
            ),
        }
    }

    #[test]
    fn conditions_use_configured_tiers() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = service(&temp_dir);

        let conditions = service.conditions(&inputs("KH1").scoring_chart).unwrap();
        let severities =
            |items: &[ClassifiedCondition]| items.iter().map(|c| c.severity).collect::<Vec<_>>();

        assert_eq!(severities(&conditions.diet_concerns), vec![Severity::ModerateToHigh]);
        // Low is not a diet tier.
        assert_eq!(severities(&conditions.diet_others), vec![Severity::Mild]);
        assert_eq!(
            severities(&conditions.parallelograms),
            vec![Severity::ModerateToHigh, Severity::Mild, Severity::Low]
        );
    }

    #[test]
    fn render_places_every_component_then_reclaims() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = service(&temp_dir);
        let mut deck = Deck::with_blank_slides(42);

        let summary = service.render(&mut deck, &inputs("KH1"));

        assert!(summary.skipped.is_empty());
        assert_eq!(summary.sections.len(), 3);
        assert_eq!(summary.cards_placed(), 5);
        assert_eq!(summary.cards_skipped(), 0);
        assert_eq!(summary.intolerance_placed, Some(1));
        assert_eq!(summary.vitamin_boxes, Some(9));

        // Parallelograms fit on slide 8, so 9..=29 are reclaimed.
        assert_eq!(summary.removed_slides, (9..=29).collect::<Vec<_>>());
        assert_eq!(deck.slide_count(), 21);

        let parallelograms = &summary.sections[2];
        assert!(parallelograms
            .cards
            .iter()
            .all(|c| matches!(c.outcome, CardOutcome::Placed { slide: 8, .. })));
        // Three images, each with two text boxes.
        assert_eq!(deck.slide(8).unwrap().shapes.len(), 9);

        let ShapeContent::TextBox { text } = &deck.slide(8).unwrap().shapes[1].content else {
            panic!("expected first text box");
        };
        assert_eq!(text.plain_text(), "Moderate to High risk of diabetes");

        // Diet concern slide 30 shifted down to 9 by the reclaim.
        let diet_slide = deck.slide(9).unwrap();
        assert_eq!(diet_slide.shapes.len(), 2);
        assert_eq!(diet_slide.shapes[0].frame.height, lifestyle_types::Length::from_cm(8.26));
        let ShapeContent::TextBox { text } = &diet_slide.shapes[1].content else {
            panic!("expected recommendations");
        };
        assert_eq!(text.plain_text(), "\u{2022} Cut sugar");

        // Vitamins: template slide 41.
        assert_eq!(deck.slide(20).unwrap().shapes.len(), 9);
    }

    #[test]
    fn render_without_optional_inputs_skips_them() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = service(&temp_dir);
        let mut deck = Deck::with_blank_slides(42);
        let inputs = PatientInputs {
            intolerance: None,
            vitamins: None,
            ..inputs("KH1")
        };

        let summary = service.render(&mut deck, &inputs);
        assert!(summary.skipped.is_empty());
        assert_eq!(summary.intolerance_placed, None);
        assert_eq!(summary.vitamin_boxes, None);
    }

    fn skipped_names(summary: &PlacementSummary) -> Vec<&'static str> {
        summary.skipped.iter().map(|s| s.component).collect()
    }

    #[test]
    fn short_template_skips_only_components_past_its_end() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = service(&temp_dir);
        let mut deck = Deck::with_blank_slides(30);

        let summary = service.render(&mut deck, &inputs("KH1"));

        assert_eq!(
            skipped_names(&summary),
            vec!["diet concerns", "diet others", "intolerance", "vitamins"]
        );
        assert_eq!(summary.sections.len(), 1);
        assert_eq!(summary.sections[0].section, "parallelograms");
        assert_eq!(summary.cards_placed(), 3);
        assert_eq!(summary.removed_slides, (9..=29).collect::<Vec<_>>());
    }

    #[test]
    fn malformed_scoring_chart_keeps_the_other_components() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = service(&temp_dir);
        let inputs = PatientInputs {
            scoring_chart: Table::from_rows(
                ["Condition Name", "Mild"],
                vec![vec!["Gut Health", "y"]],
            ),
            ..inputs("KH1")
        };

        let summary = service.generate_from_inputs(&inputs).unwrap();

        assert_eq!(skipped_names(&summary.placements), vec!["diet", "parallelograms"]);
        assert!(summary.placements.sections.is_empty());
        assert_eq!(summary.placements.intolerance_placed, Some(1));
        assert_eq!(summary.placements.vitamin_boxes, Some(9));
        // Nothing is reclaimed without a packed parallelogram section.
        assert!(summary.placements.removed_slides.is_empty());

        let report = Deck::open(&summary.output).unwrap();
        assert_eq!(report.fields["Patient_Name"], "A. Patient");
        assert_eq!(report.slide_count(), 42);
        assert_eq!(report.slide(39).unwrap().shapes.len(), 2);
        assert_eq!(report.slide(41).unwrap().shapes.len(), 9);
    }

    #[test]
    fn generate_from_inputs_writes_report_and_keeps_template() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = service(&temp_dir);

        let summary = service.generate_from_inputs(&inputs("KH1")).unwrap();

        assert_eq!(summary.output, temp_dir.path().join("out/KH1_report.json"));
        let report = Deck::open(&summary.output).unwrap();
        assert_eq!(report.fields["Patient_Name"], "A. Patient");
        assert_eq!(report.slide_count(), 21);
        assert!(report.saved_at.is_some());

        let template = Deck::open(&temp_dir.path().join("template.json")).unwrap();
        assert_eq!(template.slide_count(), 42);
        assert!(template.fields.is_empty());
    }

    #[test]
    fn fitness_advice_becomes_deck_fields() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = service(&temp_dir).with_fitness(FitnessSheets {
            male: Some(Table::from_rows(
                ["Age", "Do's", "Don't's"],
                vec![
                    vec!["18-40", "walk, swim, walk", "smoke"],
                    vec!["41-60", "yoga", "sprint"],
                ],
            )),
            female: None,
        });
        let mut inputs = inputs("KH1");
        inputs.demographics.insert("Age".into(), "35".into());
        inputs.demographics.insert("Gender".into(), "Men".into());

        let summary = service.generate_from_inputs(&inputs).unwrap();

        let advice = summary.fitness.unwrap();
        assert_eq!(advice.dos, vec!["walk", "swim"]);
        let report = Deck::open(&summary.output).unwrap();
        assert_eq!(report.fields["dopoint1"], "walk");
        assert_eq!(report.fields["dopoint2"], "swim");
        assert_eq!(report.fields["dopoint3"], "");
        assert_eq!(report.fields["dontpoint1"], "smoke");
        assert_eq!(report.fields["dontpoint5"], "");
    }

    #[test]
    fn unusable_fitness_demographics_skip_only_fitness() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = service(&temp_dir).with_fitness(FitnessSheets {
            male: Some(Table::from_rows(["Age", "Do's", "Don't's"], vec![vec!["18-40", "walk", ""]])),
            female: None,
        });

        // The fixture demographics carry no age.
        let summary = service.generate_from_inputs(&inputs("KH1")).unwrap();

        assert_eq!(summary.fitness, None);
        assert_eq!(skipped_names(&summary.placements), vec!["fitness"]);
        assert_eq!(summary.placements.cards_placed(), 5);
        let report = Deck::open(&summary.output).unwrap();
        assert!(!report.fields.contains_key("dopoint1"));
    }

    #[test]
    fn batch_continues_past_missing_patients() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = service(&temp_dir);

        let summary = service.generate_batch(&["KH1".to_string(), "../x".to_string()]);

        assert!(summary.generated.is_empty());
        assert_eq!(summary.failed.len(), 2);
        assert!(matches!(summary.failed[0].1, ReportError::SourceNotFound(_)));
        assert!(matches!(summary.failed[1].1, ReportError::InvalidInput(_)));
    }

    #[test]
    fn missing_optional_inputs_load_as_none() {
        assert!(matches!(
            optional::<()>(Err(ReportError::SourceNotFound(PathBuf::from("x")))),
            Ok(None)
        ));
        assert!(optional::<()>(Err(ReportError::InvalidInput("bad".into()))).is_err());
    }
}
