//! Input validation utilities.
//!
//! This module contains functions for validating user inputs to ensure they meet
//! safety and correctness requirements before being used in operations.

use crate::{ReportError, ReportResult};

/// Validates that a patient code is safe to embed in file and directory names.
///
/// Patient codes name the patient directory, the demographics file and the
/// generated report, so they are joined onto configured roots:
/// - Rejects empty or whitespace-only strings
/// - Bounds the length to avoid pathological inputs
/// - Restricts characters to ASCII alphanumerics, `-` and `_`, which excludes path
///   separators and `..`
///
/// # Arguments
///
/// * `code` - The patient code to validate.
///
/// # Errors
///
/// Returns a `ReportError::InvalidInput` if the code is invalid.
pub fn validate_patient_code(code: &str) -> ReportResult<()> {
    const MAX_CODE_LEN: usize = 64;

    if code.trim().is_empty() {
        return Err(ReportError::InvalidInput(
            "patient code cannot be empty".into(),
        ));
    }

    if code.len() > MAX_CODE_LEN {
        return Err(ReportError::InvalidInput(format!(
            "patient code exceeds maximum length of {} characters",
            MAX_CODE_LEN
        )));
    }

    let ok = code
        .bytes()
        .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'-' | b'_'));

    if !ok {
        return Err(ReportError::InvalidInput(format!(
            "patient code {code:?} contains invalid characters (only alphanumeric, '-', '_' allowed)"
        )));
    }

    Ok(())
}
