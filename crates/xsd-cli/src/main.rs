//! # xsd-cli
//!
//! Command-line interface for inspecting resolved XML Schema documents.

mod render;

use anyhow::Context;
use clap::{ArgAction, Parser as ClapParser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use xsd_ir::Schema;
use xsd_schema::{Parser, ParserConfig};

#[derive(ClapParser)]
#[command(name = "xsd")]
#[command(about = "XML Schema inspection CLI")]
#[command(version)]
struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Skip structural validation against the schema-of-schemas
    #[arg(long, global = true)]
    no_validate: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved types and root elements of a schema
    Inspect {
        /// Schema file path
        input: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Parse the first schema embedded in a host document (WSDL)
        #[arg(long)]
        embedded: bool,
    },

    /// Parse and resolve a schema, reporting success or the first error
    Check {
        /// Schema file path
        input: PathBuf,

        /// Parse the first schema embedded in a host document (WSDL)
        #[arg(long)]
        embedded: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let parser = Parser::new(load_config(cli.config.as_deref(), cli.no_validate)?);

    match &cli.command {
        Commands::Inspect {
            input,
            format,
            pretty,
            embedded,
        } => {
            tracing::info!("Inspecting {}", input.display());
            let schema = parse_input(&parser, input, *embedded)?;
            let output = match format {
                OutputFormat::Text => render::text(&schema),
                OutputFormat::Json if *pretty => serde_json::to_string_pretty(&schema.summary())?,
                OutputFormat::Json => serde_json::to_string(&schema.summary())?,
            };
            println!("{output}");
        }
        Commands::Check { input, embedded } => {
            tracing::info!("Checking {}", input.display());
            let schema = parse_input(&parser, input, *embedded)?;
            println!(
                "OK: {} types, {} root elements",
                schema.types().len(),
                schema.root_elements().len()
            );
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>, no_validate: bool) -> anyhow::Result<ParserConfig> {
    let mut config = match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            ParserConfig::from_yaml(&text)
                .with_context(|| format!("Invalid config file {}", path.display()))?
        }
        None => ParserConfig::default(),
    };

    if no_validate {
        config.validate_structure = false;
    }
    Ok(config)
}

fn parse_input(parser: &Parser, input: &Path, embedded: bool) -> anyhow::Result<Schema> {
    let schema = if embedded {
        parser.parse_embedded_path(input)
    } else {
        parser.parse_path(input)
    };
    schema.with_context(|| format!("Failed to parse schema {}", input.display()))
}
