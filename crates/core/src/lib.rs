//! # Lifestyle Core
//!
//! Core business logic for lifestyle report generation.
//!
//! This crate turns a patient's scoring chart into cards placed on a slide deck:
//! - Classification of scoring chart rows into severity tiers
//! - Image and text lookup per (condition, severity)
//! - Greedy vertical packing of cards across a section's slides
//! - Intolerance scales and vitamin risk tables at fixed positions
//! - Gender and age specific fitness advice
//! - Removal of slides left empty
//!
//! **No document format concerns**: slide storage lives behind
//! [`lifestyle_deck::SlideDocument`], implemented by the `lifestyle-deck` crate.

pub mod catalog;
pub mod classifier;
pub mod condition;
pub mod config;
pub mod constants;
mod error;
pub mod fitness;
pub mod intolerance;
pub mod layout;
pub mod packer;
pub mod reclaim;
pub mod records;
pub mod report;
pub mod resolver;
pub mod section;
pub mod styling;
pub mod table;
pub mod validation;
pub mod vitamins;

pub use catalog::{Catalog, CardLayout, TextBlockLayout, TextKind, TextStyle, TierLayout};
pub use classifier::{Classification, Classifier, ClassifierMode};
pub use condition::{ClassifiedCondition, ConditionName};
pub use config::{ReportConfig, ReportPaths};
pub use error::{ReportError, ReportResult};
pub use fitness::{FitnessAdvice, FitnessSheets};
pub use layout::LayoutConfig;
pub use packer::{CardOutcome, CardReport, PackReport, Packer};
pub use reclaim::reclaim_empty;
pub use records::PatientRecords;
pub use report::{
    BatchSummary, PatientConditions, PatientInputs, PlacementSummary, ReportService, ReportSummary,
    SkippedComponent,
};
pub use resolver::{AssetSource, ImageLookup, MatchPolicy, Resolver, TextTable};
pub use section::{Cursor, Section};
pub use table::Table;

pub use lifestyle_types::{Frame, Length, Severity};
