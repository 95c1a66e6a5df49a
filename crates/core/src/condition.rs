//! Condition identity.

use crate::constants::NAME_JOINER;
use lifestyle_types::Severity;
use std::fmt;

/// A medical condition name normalised for key and filename lookups.
///
/// Internal whitespace runs collapse to a single `_` and surrounding whitespace is
/// dropped, so `"High Blood Pressure"` becomes `"High_Blood_Pressure"`. Casing is
/// preserved for display; comparisons via [`ConditionName::matches`] ignore it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ConditionName(String);

impl ConditionName {
    /// Normalises `raw`. Returns `None` when nothing but whitespace remains.
    pub fn normalise(raw: &str) -> Option<Self> {
        let joined = normalise_key(raw);
        if joined.is_empty() {
            None
        } else {
            Some(Self(joined))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against a raw or normalised name.
    pub fn matches(&self, other: &str) -> bool {
        normalise_key(other).eq_ignore_ascii_case(&self.0)
    }
}

impl fmt::Display for ConditionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Collapses whitespace runs in `raw` into `_`.
pub fn normalise_key(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(NAME_JOINER)
}

/// One classified row of a scoring chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedCondition {
    pub severity: Severity,
    pub condition: ConditionName,
    pub is_concern: bool,
}
