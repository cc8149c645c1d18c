//! Command-line argument parsing with clap.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use uuid::Uuid;

use crate::conf::ParserConfig;
use crate::filter::{ErrorDisposition, FilterSpec};

/// Parse a workflow execution log and browse its activities.
#[derive(Parser, Debug, Clone)]
#[command(name = "autolog")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Execution log to open
    pub file: PathBuf,

    /// Case-insensitive substring of the activity name
    #[arg(short, long, default_value = "")]
    pub activity: String,

    /// Filter on error status: any, only (yes) or none (no)
    #[arg(short, long, default_value = "any")]
    pub errors: ErrorDisposition,

    /// Store position to start the page at
    #[arg(short, long, default_value_t = 0)]
    pub offset: usize,

    /// Records per page (overrides the configured page size)
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Fill the page with matching records instead of filtering one store window
    #[arg(long)]
    pub fill: bool,

    /// Print the full payload of one record instead of a page
    #[arg(short, long, value_name = "UUID")]
    pub detail: Option<Uuid>,

    /// Documentation links file (overrides the configured one)
    #[arg(long, value_name = "FILE")]
    pub docs: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Table)]
    pub format: Format,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// Human-readable text
    #[default]
    Table,
    /// JSON for scripting
    Json,
}

impl Cli {
    pub fn filter_spec(&self) -> FilterSpec {
        FilterSpec::new(self.activity.clone(), self.errors)
    }

    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut ParserConfig) {
        if let Some(page_size) = self.page_size {
            config.page_size = page_size;
        }
        if let Some(docs) = &self.docs {
            config.docs_file = docs.display().to_string();
        }
    }
}
