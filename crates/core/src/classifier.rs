//! Condition classification from scoring charts.
//!
//! A scoring chart has one row per medical condition, a condition-name column, one
//! `"y"`-marker column per severity tier and an optional `concerns` marker column.
//! Classification turns it into severity-ordered sequences of
//! [`ClassifiedCondition`]s:
//!
//! - each row contributes at most once: tiers are tried in precedence order and
//!   the first marked tier wins
//! - output is stably sorted by tier precedence, so rows keep their sheet order
//!   within a tier
//! - [`ClassifierMode::ConcernSplit`] partitions rows by the `concerns` marker

use crate::condition::{ClassifiedCondition, ConditionName};
use crate::constants::{CONCERNS_COLUMN, CONDITION_COLUMN};
use crate::table::Table;
use crate::{ReportError, ReportResult};
use lifestyle_types::Severity;

/// Whether to keep one sequence or split by the concerns marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierMode {
    Single,
    ConcernSplit,
}

/// Classification result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Single(Vec<ClassifiedCondition>),
    Split {
        concerns: Vec<ClassifiedCondition>,
        others: Vec<ClassifiedCondition>,
    },
}

impl Classification {
    pub fn is_empty(&self) -> bool {
        match self {
            Classification::Single(all) => all.is_empty(),
            Classification::Split { concerns, others } => concerns.is_empty() && others.is_empty(),
        }
    }

    /// Total number of classified conditions.
    pub fn len(&self) -> usize {
        match self {
            Classification::Single(all) => all.len(),
            Classification::Split { concerns, others } => concerns.len() + others.len(),
        }
    }

    /// Every condition in placement order; split results put concerns first.
    pub fn into_all(self) -> Vec<ClassifiedCondition> {
        match self {
            Classification::Single(all) => all,
            Classification::Split {
                mut concerns,
                others,
            } => {
                concerns.extend(others);
                concerns
            }
        }
    }

    /// `(concerns, others)`; a single sequence is treated as all others.
    pub fn into_split(self) -> (Vec<ClassifiedCondition>, Vec<ClassifiedCondition>) {
        match self {
            Classification::Single(all) => (Vec::new(), all),
            Classification::Split { concerns, others } => (concerns, others),
        }
    }
}

/// Classifies scoring chart rows into severity tiers.
#[derive(Debug, Clone)]
pub struct Classifier {
    tiers: Vec<Severity>,
    mode: ClassifierMode,
}

impl Classifier {
    /// Creates a classifier considering `tiers` only.
    ///
    /// The tiers are re-ordered by precedence and de-duplicated, so the caller's
    /// order never changes which tier a row lands in.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::InvalidInput`] if `tiers` is empty.
    pub fn new(tiers: &[Severity], mode: ClassifierMode) -> ReportResult<Self> {
        let mut tiers = tiers.to_vec();
        tiers.sort_by_key(|tier| tier.rank());
        tiers.dedup();
        if tiers.is_empty() {
            return Err(ReportError::InvalidInput(
                "classifier needs at least one severity tier".into(),
            ));
        }
        Ok(Self { tiers, mode })
    }

    pub fn tiers(&self) -> &[Severity] {
        &self.tiers
    }

    /// Classifies every row of `table`.
    ///
    /// Rows with an empty condition name or no marked tier are skipped. Tier columns
    /// missing from the sheet are treated as unmarked.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::InvalidInput`] if the condition column is missing.
    pub fn classify(&self, table: &Table) -> ReportResult<Classification> {
        if table.column(CONDITION_COLUMN).is_none() {
            return Err(ReportError::InvalidInput(format!(
                "scoring chart has no {CONDITION_COLUMN:?} column"
            )));
        }

        let mut all = Vec::new();
        for row in table.rows() {
            let Some(condition) = row.get(CONDITION_COLUMN).and_then(ConditionName::normalise)
            else {
                continue;
            };

            let Some(severity) = self
                .tiers
                .iter()
                .copied()
                .find(|tier| row.is_marked(tier.label()))
            else {
                tracing::debug!("no severity marked for {condition}");
                continue;
            };

            all.push(ClassifiedCondition {
                severity,
                condition,
                is_concern: row.is_marked(CONCERNS_COLUMN),
            });
        }

        // Vec::sort_by_key is stable: sheet order survives within a tier.
        all.sort_by_key(|c| c.severity.rank());

        Ok(match self.mode {
            ClassifierMode::Single => Classification::Single(all),
            ClassifierMode::ConcernSplit => {
                let (concerns, others) = all.into_iter().partition(|c| c.is_concern);
                Classification::Split { concerns, others }
            }
        })
    }
}
