// CLI configuration
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use id3edit::TagWriter;

/// id3edit - ID3v2.3 tag editor
#[derive(Parser, Debug)]
#[command(name = "id3edit")]
#[command(about = "Read and edit the ID3v2.3 tags of MP3 files", long_about = None)]
#[command(version)]
#[command(author = "xwsjjctz <xwsjjctz@icloud.com>")]
pub struct Config {
    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty", global = true)]
    pub format: OutputFormat,

    /// Quiet mode (suppress progress messages)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging unless RUST_LOG is set)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Text stamped into the TXXX frame of every written tag
    #[arg(long, global = true, value_name = "TEXT")]
    pub generator: Option<String>,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Pretty,
    /// Compact JSON
    Json,
    /// Key-value pairs
    KeyValue,
    /// Table format
    Table,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read metadata from MP3 file(s)
    Read {
        /// MP3 file path(s)
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /// Output to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Edit metadata of an MP3 file
    Write {
        /// MP3 file path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Field assignment, repeatable (e.g. --set title="Blue in Green")
        #[arg(short, long = "set", value_name = "FIELD=VALUE")]
        set: Vec<String>,

        /// Metadata JSON object, keys are field names
        #[arg(short, long)]
        metadata: Option<String>,

        /// Read the metadata JSON object from a file
        #[arg(long, conflicts_with = "metadata")]
        from_file: Option<PathBuf>,

        /// Write the result here instead of replacing FILE
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Process every file matching a pattern
    Batch {
        /// Directory path
        #[arg(short, long)]
        directory: PathBuf,

        /// File pattern (e.g. "*.mp3")
        #[arg(short, long, default_value = "*.mp3")]
        pattern: String,

        /// Operation: read or write
        #[arg(value_enum)]
        operation: BatchOperation,

        /// Field assignments applied by the write operation
        #[arg(short, long = "set", value_name = "FIELD=VALUE")]
        set: Vec<String>,
    },

    /// Detect the tag version
    Detect {
        /// MP3 file path(s)
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
    },

    /// Export the cover picture
    ExportCover {
        /// MP3 file path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output directory for the image
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Set the cover picture (JPEG or PNG)
    SetCover {
        /// MP3 file path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Image file path
        #[arg(short, long)]
        image: PathBuf,

        /// MIME type (auto-detected if not specified)
        #[arg(short, long)]
        mime_type: Option<String>,

        /// Description
        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Remove the cover picture
    RemoveCover {
        /// MP3 file path(s)
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
    },

    /// Show file information
    Info {
        /// MP3 file path(s)
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /// Also list every frame that could not be decoded
        #[arg(short, long)]
        detailed: bool,
    },
}

/// Batch operation type
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BatchOperation {
    Read,
    Write,
}

impl std::fmt::Display for BatchOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchOperation::Read => write!(f, "read"),
            BatchOperation::Write => write!(f, "write"),
        }
    }
}

impl Config {
    /// Tag writer honoring --generator
    pub fn tag_writer(&self) -> TagWriter {
        match &self.generator {
            Some(generator) => TagWriter::new(generator.clone()),
            None => TagWriter::default(),
        }
    }
}
