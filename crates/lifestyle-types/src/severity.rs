//! Severity tiers for medical conditions.

use std::fmt;
use std::str::FromStr;

/// Errors raised when parsing a severity label.
#[derive(Debug, thiserror::Error)]
pub enum SeverityError {
    #[error("unknown severity tier: {0:?}")]
    Unknown(String),
}

/// A medical-risk tier.
///
/// Tiers are categorical: "Moderate to High" is its own tier, not a point
/// between two others. `Ord` follows [`Severity::PRECEDENCE`], so the most
/// severe tier sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Severity {
    Low,
    Mild,
    Moderate,
    ModerateToHigh,
}

impl Severity {
    /// Placement precedence, most severe first.
    pub const PRECEDENCE: [Severity; 4] = [
        Severity::ModerateToHigh,
        Severity::Moderate,
        Severity::Mild,
        Severity::Low,
    ];

    /// Position in [`Severity::PRECEDENCE`]; lower places earlier.
    pub fn rank(self) -> usize {
        match self {
            Severity::ModerateToHigh => 0,
            Severity::Moderate => 1,
            Severity::Mild => 2,
            Severity::Low => 3,
        }
    }

    /// Column header / display label used by the scoring spreadsheets.
    pub const fn label(self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Mild => "Mild",
            Severity::Moderate => "Moderate",
            Severity::ModerateToHigh => "Moderate to High",
        }
    }

    /// Label with spaces replaced by underscores, used for asset folders.
    pub const fn slug(self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Mild => "Mild",
            Severity::Moderate => "Moderate",
            Severity::ModerateToHigh => "Moderate_to_High",
        }
    }
}

impl Ord for Severity {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for Severity {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Severity {
    type Err = SeverityError;

    /// Accepts the label, the slug or the variant name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .split(|c: char| c.is_whitespace() || c == '_')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("")
            .to_ascii_lowercase();

        Severity::PRECEDENCE
            .into_iter()
            .find(|tier| tier.slug().replace('_', "").to_ascii_lowercase() == wanted)
            .ok_or_else(|| SeverityError::Unknown(s.to_string()))
    }
}
