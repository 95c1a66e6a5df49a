use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lifestyle_core::config::{
    layout_from_env_value, selected_patients_from_env_value, ReportPaths,
};
use lifestyle_core::constants::env;
use lifestyle_core::{ReportConfig, ReportService};

/// Main entry point for the lifestyle report runner
///
/// Generates one report per selected patient, sequentially. A failing patient is
/// logged and skipped; the run only fails if configuration cannot be resolved.
///
/// # Environment Variables
/// - `LIFESTYLE_SELECTED_PATIENTS`: comma-separated patient codes (default: every patient
///   with demographics under the patients directory)
/// - `LIFESTYLE_LAYOUT_FILE`: optional YAML layout override
/// - `LIFESTYLE_PATIENTS_DIR`, `LIFESTYLE_TEMPLATE`, `LIFESTYLE_OUTPUT_DIR` and the other
///   `LIFESTYLE_*` path variables: input and output locations
///
/// # Returns
/// * `Ok(())` - If every patient was attempted
/// * `Err(anyhow::Error)` - If configuration or the patient listing fails
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lifestyle=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let read_env = |key: &str| std::env::var(key).ok();

    let paths = ReportPaths::from_env_values(read_env);
    let layout = layout_from_env_value(read_env(env::LAYOUT_FILE))?;
    let cfg = Arc::new(ReportConfig::new(paths, layout)?);

    tracing::info!("++ Template: {}", cfg.template().display());
    tracing::info!("++ Output: {}", cfg.output_dir().display());

    let service = ReportService::new(cfg)?;

    let mut codes = selected_patients_from_env_value(read_env(env::SELECTED_PATIENTS));
    if codes.is_empty() {
        codes = service.records().list_codes()?;
    }
    tracing::info!("++ Generating {} report(s)", codes.len());

    let summary = service.generate_batch(&codes);
    for report in &summary.generated {
        tracing::info!("report generated: {}", report.output.display());
    }
    if !summary.failed.is_empty() {
        tracing::warn!("{} patient(s) skipped", summary.failed.len());
    }

    Ok(())
}
