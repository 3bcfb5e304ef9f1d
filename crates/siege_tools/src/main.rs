//! Lane Siege - Development Tools

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "siege-tools")]
#[command(about = "Development tools for Lane Siege")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a unit catalog file or a directory of them
    Validate {
        /// Catalog file or directory
        #[arg(default_value = "data")]
        path: PathBuf,

        /// Print a RON report to stdout
        #[arg(long)]
        report: bool,
    },

    /// Write the built-in roster as an editable catalog
    Export {
        /// Output file
        #[arg(default_value = "data/units.ron")]
        path: PathBuf,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { path, report } => {
            tracing::info!("Validating unit catalogs in: {}", path.display());
            match siege_tools::validate::validate_path(&path) {
                Ok(reports) => {
                    let warnings: usize = reports.iter().map(|r| r.warnings.len()).sum();
                    tracing::info!(files = reports.len(), warnings, "Validation passed");
                    if report {
                        let pretty = ron::ser::PrettyConfig::default();
                        match ron::ser::to_string_pretty(&reports, pretty) {
                            Ok(text) => println!("{text}"),
                            Err(e) => tracing::error!("Failed to render report: {e}"),
                        }
                    }
                }
                Err(e) => {
                    tracing::error!("Validation failed: {e}");
                    std::process::exit(1);
                }
            }
        }
        Commands::Export { path } => match siege_tools::validate::export_standard(&path) {
            Ok(()) => tracing::info!("Wrote built-in roster to {}", path.display()),
            Err(e) => {
                tracing::error!("Export failed: {e}");
                std::process::exit(1);
            }
        },
    }
}
