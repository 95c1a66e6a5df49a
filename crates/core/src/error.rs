use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("source not found: {}", .0.display())]
    SourceNotFound(PathBuf),
    #[error("failed to read file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to read spreadsheet {}: {source}", path.display())]
    Spreadsheet {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },
    #[error("spreadsheet {} has no worksheets", .0.display())]
    EmptyWorkbook(PathBuf),
    #[error("failed to deserialize JSON: {0}")]
    Deserialization(serde_json::Error),
    #[error("failed to deserialize YAML: {0}")]
    YamlDeserialization(serde_yaml::Error),
    #[error("failed to serialize YAML: {0}")]
    YamlSerialization(serde_yaml::Error),
    #[error("deck error: {0}")]
    Deck(#[from] lifestyle_deck::DeckError),

    #[error(
        "section {section:?} spans slides {start}..={end} but the deck has {count} slides"
    )]
    SectionOutOfRange {
        section: String,
        start: usize,
        end: usize,
        count: usize,
    },
    #[error(
        "{severity} card in section {section:?} is {height} tall but only {span} is usable"
    )]
    CardExceedsCanvas {
        section: String,
        severity: lifestyle_types::Severity,
        height: lifestyle_types::Length,
        span: lifestyle_types::Length,
    },
}

pub type ReportResult<T> = std::result::Result<T, ReportError>;
