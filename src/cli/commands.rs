//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Axonaut API command-line client
#[derive(Parser, Debug)]
#[command(name = "axonaut")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Settings file (JSON or YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// API key, overrides the settings file and AXONAUT_API_KEY
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// API root, overrides the settings file and AXONAUT_BASE_URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Test the API key
    Check,

    /// Fetch one record by id
    Get {
        /// Resource key or collection name (company, companies, payslip...)
        resource: String,

        /// Record identifier
        id: String,
    },

    /// List every record of a collection
    List {
        /// Resource key or collection name
        resource: String,

        /// Maximum records to print
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Search records by label
    Search {
        /// Resource key, including nested ones (address, document)
        resource: String,

        /// Case-insensitive substring the label must contain
        #[arg(long)]
        filter: Option<String>,
    },

    /// Update the record whose field equals the value, or create it
    Upsert {
        /// Resource key or collection name
        resource: String,

        /// Field identifying the record
        #[arg(long)]
        field: String,

        /// Value the field must equal, compared as a string
        #[arg(long)]
        value: String,

        /// Parse --value as JSON so numbers and booleans match typed fields
        #[arg(long)]
        json_value: bool,

        /// Fields to write, as a JSON object
        #[arg(long)]
        data: Option<String>,

        /// Fields only written on create, as a JSON object
        #[arg(long)]
        defaults: Option<String>,
    },

    /// List known resources
    Resources,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
