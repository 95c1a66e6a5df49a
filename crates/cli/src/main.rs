use clap::{Parser, Subcommand};
use lifestyle_core::config::{
    layout_from_env_value, selected_patients_from_env_value, ReportPaths,
};
use lifestyle_core::constants::env;
use lifestyle_core::{ClassifiedCondition, ReportConfig, ReportService, Table};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "lifestyle")]
#[command(about = "Lifestyle report generator CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List patients with demographics on file
    List,
    /// Generate reports
    Generate {
        /// Patient codes (defaults to LIFESTYLE_SELECTED_PATIENTS, then every patient)
        codes: Vec<String>,
    },
    /// Show how a patient's scoring chart is classified
    Conditions {
        /// Patient code
        code: String,
    },
    /// Print the effective layout as YAML
    Layout,
}

fn read_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn report_service() -> Result<ReportService, Box<dyn std::error::Error>> {
    let paths = ReportPaths::from_env_values(read_env);
    let layout = layout_from_env_value(read_env(env::LAYOUT_FILE))?;
    let cfg = Arc::new(ReportConfig::new(paths, layout)?);
    Ok(ReportService::new(cfg)?)
}

fn print_conditions(title: &str, items: &[ClassifiedCondition]) {
    println!("{title} ({}):", items.len());
    for item in items {
        println!("  {:<18} {}", item.severity.label(), item.condition);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lifestyle=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::List) => {
            let service = report_service()?;
            let codes = service.records().list_codes()?;
            if codes.is_empty() {
                println!("No patients found.");
            } else {
                for code in codes {
                    println!("{code}");
                }
            }
        }
        Some(Commands::Generate { codes }) => {
            let service = report_service()?;
            let codes = if !codes.is_empty() {
                codes
            } else {
                let selected = selected_patients_from_env_value(read_env(env::SELECTED_PATIENTS));
                if selected.is_empty() {
                    service.records().list_codes()?
                } else {
                    selected
                }
            };

            let summary = service.generate_batch(&codes);
            for report in &summary.generated {
                println!(
                    "{}: {} card(s) placed, {} skipped -> {}",
                    report.code,
                    report.placements.cards_placed(),
                    report.placements.cards_skipped(),
                    report.output.display()
                );
                for skipped in &report.placements.skipped {
                    println!("  skipped {}: {}", skipped.component, skipped.reason);
                }
            }
            for (code, e) in &summary.failed {
                eprintln!("Error generating report for {}: {}", code, e);
            }
        }
        Some(Commands::Conditions { code }) => {
            let service = report_service()?;
            let chart = service.records().scoring_chart(&code)?;
            let conditions = service.conditions(&Table::load(&chart)?)?;

            println!("Scoring chart: {}", chart.display());
            print_conditions("Diet concerns", &conditions.diet_concerns);
            print_conditions("Diet others", &conditions.diet_others);
            print_conditions("Parallelograms", &conditions.parallelograms);
        }
        Some(Commands::Layout) => {
            let layout = layout_from_env_value(read_env(env::LAYOUT_FILE))?;
            print!("{}", layout.to_yaml()?);
        }
        None => {
            println!("Use 'lifestyle --help' for commands");
        }
    }

    Ok(())
}
