/*!
chartmaker Command Line Interface

Validates chart requests, previews them as Vega-Lite and exports them to BI platforms.
*/

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chartmaker::writer::{VegaLiteWriter, Writer};
use chartmaker::{all_types, example, validate, ExportMode, Platform, Specification, VERSION};

#[derive(Parser)]
#[command(name = "chartmaker")]
#[command(about = "Translate chart requests into Vega-Lite and BI platform artifacts")]
#[command(version = VERSION)]
pub struct Cli {
    /// Log debug output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List accepted chart type identifiers
    Types,

    /// List export platforms
    Platforms,

    /// Print an example request for a chart type
    Example {
        /// Registered chart type identifier
        chart_type: String,
    },

    /// Validate a chart request file
    Validate {
        /// Path to a JSON chart request
        file: PathBuf,
    },

    /// Render a chart request as Vega-Lite
    Preview {
        /// Path to a JSON chart request
        file: PathBuf,

        /// Output file path (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Export a chart request to a BI platform
    Export {
        /// Path to a JSON chart request
        file: PathBuf,

        /// Target platform (powerbi, tableau, looker, looker_studio)
        #[arg(long)]
        platform: Platform,

        /// Destination path
        #[arg(long)]
        output: PathBuf,

        /// Bundle multi-file artifacts into a single archive
        #[arg(long)]
        packaged: bool,
    },
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "chartmaker=debug" } else { "chartmaker=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn read_request(file: &Path) -> anyhow::Result<Value> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", file.display()))
}

/// Validate a request, printing every violation; `None` when invalid
fn load_spec(file: &Path) -> anyhow::Result<Option<Specification>> {
    let raw = read_request(file)?;
    match validate(&raw) {
        Ok(spec) => Ok(Some(spec)),
        Err(e) => {
            eprintln!("{} is not a valid chart request:", file.display());
            for violation in e.violations() {
                eprintln!("  {} [{}]: {}", violation.field, violation.kind, violation.message);
            }
            Ok(None)
        }
    }
}

fn print_types() {
    let mut current = None;
    let mut aliases: Vec<&str> = Vec::new();
    for chart_type in all_types() {
        let kind = chart_type.kind();
        if current != Some(kind) {
            if let Some(previous) = current {
                println!("{:<20} {}", previous.name(), aliases.join(", "));
            }
            current = Some(kind);
            aliases.clear();
        }
        aliases.push(chart_type.id());
    }
    if let Some(last) = current {
        println!("{:<20} {}", last.name(), aliases.join(", "));
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Types => print_types(),

        Commands::Platforms => {
            for platform in Platform::ALL {
                println!(
                    "{:<14} {:<14} .{}",
                    platform.key(),
                    platform.display_name(),
                    platform.default_extension()
                );
            }
        }

        Commands::Example { chart_type } => match example(&chart_type) {
            Some(request) => println!("{}", serde_json::to_string_pretty(&request)?),
            None => {
                eprintln!("Unknown chart type '{}'; run `chartmaker types` for the list", chart_type);
                std::process::exit(1);
            }
        },

        Commands::Validate { file } => match load_spec(&file)? {
            Some(spec) => println!("{} is valid ({})", file.display(), spec.chart_type()),
            None => std::process::exit(1),
        },

        Commands::Preview { file, output } => {
            let Some(spec) = load_spec(&file)? else {
                std::process::exit(1);
            };
            let json_output = VegaLiteWriter::new().write(&spec)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &json_output)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Vega-Lite JSON written to: {}", path.display());
                }
                None => println!("{}", json_output),
            }
        }

        Commands::Export {
            file,
            platform,
            output,
            packaged,
        } => {
            let Some(spec) = load_spec(&file)? else {
                std::process::exit(1);
            };
            let mode = if packaged {
                ExportMode::Packaged
            } else {
                ExportMode::Project
            };
            if !platform.exporter(mode).export(&spec, &output) {
                eprintln!("{} export failed", platform);
                std::process::exit(1);
            }
            println!("{} artifact written to: {}", platform, output.display());
        }
    }

    Ok(())
}
