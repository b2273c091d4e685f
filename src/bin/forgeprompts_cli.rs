//! ForgePrompts CLI - Bridge interface for the dashboard backend
//!
//! Commands: contexts, classify, resolve, compose, validate
//! Outputs JSON to stdout, logs to stderr
//! Returns 2 when a prompt fails validation

use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use forgeprompts_core::{
    classify, ComposerConfig, CompositionPipeline, CompositionRequest, ContextPreset,
    PartialGenerationSettings, ProductCategory, ProductSpecification, Validator,
};

#[derive(Parser)]
#[command(name = "forgeprompts-cli")]
#[command(about = "ForgePrompts CLI - Product Prompt Compiler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a composer config JSON file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// List context presets
    Contexts,

    /// Classify a product specification
    Classify {
        /// JSON payload (ProductSpecification)
        #[arg(short, long)]
        payload: String,
    },

    /// Resolve partial generation settings
    Resolve {
        /// JSON payload (partial GenerationSettings)
        #[arg(short, long)]
        payload: String,

        /// Product category used for defaults
        #[arg(long, default_value = "general")]
        category: String,
    },

    /// Compose and validate a prompt
    Compose {
        /// JSON payload (CompositionRequest)
        #[arg(short, long)]
        payload: String,
    },

    /// Validate prompt text
    Validate {
        /// Prompt text
        #[arg(short, long)]
        text: String,

        /// Override the configured length ceiling
        #[arg(long)]
        max_length: Option<usize>,
    },
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_json<T: Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => print_error(format!("Failed to serialize output: {}", e)),
    }
}

fn print_error(message: String) -> ExitCode {
    println!("{}", serde_json::json!({ "error": message }));
    ExitCode::FAILURE
}

fn parse_payload<T: serde::de::DeserializeOwned>(payload: &str) -> Result<T, ExitCode> {
    serde_json::from_str(payload).map_err(|e| print_error(format!("Invalid payload: {}", e)))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match ComposerConfig::load_or_default(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => return print_error(format!("Failed to load config: {}", e)),
    };
    let pipeline = CompositionPipeline::new(config);

    match cli.command {
        Commands::Contexts => {
            let contexts: Vec<_> = ContextPreset::ALL
                .iter()
                .map(|preset| {
                    let rule = preset.rule();
                    serde_json::json!({
                        "id": preset.id(),
                        "aspectRatio": format!("{}:{}", rule.aspect_ratio[0], rule.aspect_ratio[1]),
                        "pixelDimensions": rule.pixel_dimensions,
                        "baseline": *preset == ContextPreset::SAFE_BASELINE,
                    })
                })
                .collect();
            print_json(&contexts)
        }

        Commands::Classify { payload } => {
            let spec: ProductSpecification = match parse_payload(&payload) {
                Ok(s) => s,
                Err(code) => return code,
            };
            if let Err(e) = spec.validate() {
                return print_error(e.to_string());
            }
            print_json(&classify(&spec))
        }

        Commands::Resolve { payload, category } => {
            let partial: PartialGenerationSettings = match parse_payload(&payload) {
                Ok(p) => p,
                Err(code) => return code,
            };
            let category = ProductCategory::from_str_lossy(&category);
            print_json(&pipeline.resolver().resolve(&partial, category))
        }

        Commands::Compose { payload } => {
            let request: CompositionRequest = match parse_payload(&payload) {
                Ok(r) => r,
                Err(code) => return code,
            };
            match pipeline.compile(&request) {
                Ok(manifest) => {
                    let code = print_json(&manifest);
                    if manifest.validation.is_valid {
                        code
                    } else {
                        ExitCode::from(2) // Validation failure
                    }
                }
                Err(e) => print_error(e.to_string()),
            }
        }

        Commands::Validate { text, max_length: override_max } => {
            let report = match override_max {
                Some(max) => Validator::new(max).validate(&text),
                None => pipeline.validator().validate(&text),
            };
            let code = print_json(&report);
            if report.is_valid {
                code
            } else {
                ExitCode::from(2)
            }
        }
    }
}
