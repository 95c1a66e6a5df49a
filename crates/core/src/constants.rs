//! Constants used throughout the lifestyle core crate.
//!
//! This module contains default paths, filename patterns and spreadsheet
//! headers so that the conventions of the patient record store live in one place.

/// Default directory holding one sub-directory per patient.
pub const DEFAULT_PATIENTS_DIR: &str = "patients";

/// Default deck template.
pub const DEFAULT_TEMPLATE_PATH: &str = "assets/lifestyle_template.json";

/// Default directory for generated reports.
pub const DEFAULT_OUTPUT_DIR: &str = "generated_outputs";

/// Default root searched recursively for scoring charts.
pub const DEFAULT_SCORING_CHARTS_DIR: &str = "scoring_charts";

/// Default parallelogram card images, one sub-directory per severity.
pub const DEFAULT_PARALLELOGRAM_DIR: &str = "assets/lifestyleinputs/parallelograms";

/// Default diet card images, one sub-directory per severity.
pub const DEFAULT_DIET_PICTURES_DIR: &str = "assets/lifestyleinputs/diet_pics";

/// Default directory of risk scale images.
pub const DEFAULT_SCALES_DIR: &str = "assets/scales_thermo";

/// Default medical recommendations table.
pub const DEFAULT_RECOMMENDATIONS_FILE: &str = "assets/Medical_Recommendations_sheet.xlsx";

/// Default medical first-text table.
pub const DEFAULT_FIRST_TEXT_FILE: &str = "assets/Medical_First_Text_sheet.xlsx";

/// Default diet recommendations table.
pub const DEFAULT_DIET_FILE: &str = "assets/Diet_Sheet.xlsx";

/// Default fitness do's and don'ts for men, one row per age range.
pub const DEFAULT_MALE_FITNESS_FILE: &str = "assets/Male_Fitness_Nutrition_Data.xlsx";

/// Default fitness do's and don'ts for women.
pub const DEFAULT_FEMALE_FITNESS_FILE: &str = "assets/Female_Fitness_Nutrition_Data.xlsx";

/// Suffix of a generated report, appended to the patient code.
pub const REPORT_FILE_SUFFIX: &str = "_report.json";

/// Marker in scoring chart filenames (`<code>_Scoring_chart*.xlsx`).
pub const SCORING_CHART_MARKER: &str = "_Scoring_chart";

/// Extension of scoring chart spreadsheets.
pub const SCORING_CHART_EXTENSION: &str = "xlsx";

/// Suffix of the intolerance JSON in a patient directory.
pub const INTOLERANCE_FILE_SUFFIX: &str = "_intolerance.json";

/// Suffix of the vitamin risk sheet in a patient directory.
pub const VITAMIN_SHEET_SUFFIX: &str = "_vitamin_sheet.xlsx";

/// Condition-name header of scoring charts (matched trimmed, case-insensitively).
pub const CONDITION_COLUMN: &str = "Medical Condition";

/// Primary-concern header of scoring charts.
pub const CONCERNS_COLUMN: &str = "concerns";

/// Key column of recommendation and first-text tables.
pub const TEXT_TABLE_KEY_COLUMN: &str = "Condition";

/// Delimiter between bullet points in recommendation cells.
pub const BULLET_DELIMITER: char = '$';

/// Glyph prefixed to each recommendation bullet.
pub const BULLET_GLYPH: &str = "\u{2022}";

/// Separator used when normalising names into keys.
pub const NAME_JOINER: &str = "_";

/// Risk level header of vitamin sheets (integer 1 to 3).
pub const VITAMIN_RISK_COLUMN: &str = "Risk";

/// Condition header of vitamin sheets.
pub const VITAMIN_CONDITION_COLUMN: &str = "Condition";

/// Gene variant headers of vitamin sheets, each holding comma-separated genes.
pub const VITAMIN_GENE_COLUMNS: [&str; 3] = ["HOM_DAM", "HOM_TOL", "HET_DAM"];

/// Age range header of fitness sheets (`"18-25"`, `"26 - 35 yrs"`).
pub const FITNESS_AGE_COLUMN: &str = "Age";

/// Comma-separated do's header of fitness sheets.
pub const FITNESS_DO_COLUMN: &str = "Do's";

/// Comma-separated don'ts header of fitness sheets.
pub const FITNESS_DONT_COLUMN: &str = "Don't's";

/// Number of `dopointN` deck fields.
pub const FITNESS_DO_POINTS: usize = 4;

/// Number of `dontpointN` deck fields.
pub const FITNESS_DONT_POINTS: usize = 5;

/// Prefix of the do's deck fields (`dopoint1`..).
pub const FITNESS_DO_FIELD: &str = "dopoint";

/// Prefix of the don'ts deck fields (`dontpoint1`..).
pub const FITNESS_DONT_FIELD: &str = "dontpoint";

/// Demographic fields that select a fitness sheet and row (matched case-insensitively).
pub const AGE_FIELD: &str = "age";
pub const GENDER_FIELD: &str = "gender";

/// Environment variables read once by the binaries at startup.
pub mod env {
    pub const PATIENTS_DIR: &str = "LIFESTYLE_PATIENTS_DIR";
    pub const TEMPLATE: &str = "LIFESTYLE_TEMPLATE";
    pub const OUTPUT_DIR: &str = "LIFESTYLE_OUTPUT_DIR";
    pub const SCORING_CHARTS_DIR: &str = "LIFESTYLE_SCORING_CHARTS_DIR";
    pub const PARALLELOGRAM_DIR: &str = "LIFESTYLE_PARALLELOGRAM_DIR";
    pub const DIET_PICTURES_DIR: &str = "LIFESTYLE_DIET_PICTURES_DIR";
    pub const SCALES_DIR: &str = "LIFESTYLE_SCALES_DIR";
    pub const RECOMMENDATIONS_FILE: &str = "LIFESTYLE_RECOMMENDATIONS_FILE";
    pub const FIRST_TEXT_FILE: &str = "LIFESTYLE_FIRST_TEXT_FILE";
    pub const DIET_FILE: &str = "LIFESTYLE_DIET_FILE";
    pub const MALE_FITNESS_FILE: &str = "LIFESTYLE_MALE_FITNESS_FILE";
    pub const FEMALE_FITNESS_FILE: &str = "LIFESTYLE_FEMALE_FITNESS_FILE";
    pub const LAYOUT_FILE: &str = "LIFESTYLE_LAYOUT_FILE";
    pub const SELECTED_PATIENTS: &str = "LIFESTYLE_SELECTED_PATIENTS";
}
