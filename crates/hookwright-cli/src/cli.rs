//! CLI structure and command definitions.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use hookwright_core::Config;
use hookwright_types::{CoreVersion, GeneratorConfig, LogLevel};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hookwright")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Code generator for CMS extension modules", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to ~/.hookwright/config.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Target framework major version
    #[arg(long, global = true)]
    pub core: Option<u32>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate an extension from a request file
    Generate {
        /// YAML or JSON file with the request data
        request: PathBuf,

        /// Component type of the request
        #[arg(short = 't', long = "type", default_value = "module")]
        component_type: String,

        /// Extension directory to write to (defaults to ./<root_name>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Existing extension to merge with (defaults to the output directory)
        #[arg(short, long)]
        existing: Option<PathBuf>,

        /// Show what would be written without writing
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Print generated files to stdout instead of writing them
        #[arg(long)]
        stdout: bool,

        /// Metadata table to use instead of the built-in one
        #[arg(long)]
        metadata: Option<PathBuf>,
    },

    /// Show the request schema of a component type
    Schema {
        /// Component type
        component_type: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = SchemaFormat::Yaml)]
        format: SchemaFormat,
    },

    /// List component types
    Components {
        /// Include types that can only be requested by other components
        #[arg(short, long)]
        all: bool,
    },

    /// List known hooks
    Hooks {
        /// Only hooks in this group
        #[arg(short, long)]
        group: Option<String>,
    },
}

/// Serialization of the schema command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SchemaFormat {
    Yaml,
    Json,
}

impl Cli {
    /// Log level implied by the output flags, if any.
    pub fn log_level(&self) -> Option<LogLevel> {
        if self.quiet {
            Some(LogLevel::Error)
        } else if self.debug {
            Some(LogLevel::Debug)
        } else if self.verbose {
            Some(LogLevel::Info)
        } else {
            None
        }
    }

    /// Layered configuration with command-line overrides applied.
    pub fn generator_config(&self) -> Result<GeneratorConfig> {
        let config = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => Config::load_default().context("Failed to load default config")?,
        };
        let mut generator = config.typed().context("Invalid configuration")?;
        if let Some(core) = self.core {
            generator.core_version = CoreVersion::new(core)?;
        }
        Ok(generator)
    }

    pub fn execute(&self) -> Result<()> {
        use crate::commands::*;

        match &self.command {
            Commands::Generate {
                request,
                component_type,
                output,
                existing,
                dry_run,
                stdout,
                metadata,
            } => generate::execute(
                &generate::GenerateOptions {
                    request,
                    component_type,
                    output: output.as_deref(),
                    existing: existing.as_deref(),
                    dry_run: *dry_run,
                    stdout: *stdout,
                    metadata: metadata.as_deref(),
                    quiet: self.quiet,
                },
                self.generator_config()?,
            ),
            Commands::Schema { component_type, format } => {
                schema::execute(component_type, *format, self.generator_config()?)
            }
            Commands::Components { all } => list::components(*all),
            Commands::Hooks { group } => list::hooks(group.as_deref()),
        }
    }
}
