//! Command-line configuration for ventana-slide.
//!
//! Options can also be set through environment variables with the `VENTANA_`
//! prefix:
//!
//! - `VENTANA_S3_ENDPOINT` - Custom S3 endpoint for S3-compatible services
//! - `VENTANA_S3_REGION` - AWS region (default: us-east-1)
//!
//! # Example
//!
//! ```text
//! ventana-slide probe slides/CMU-1.bif --format json
//! ventana-slide detect s3://slides/CMU-1.bif --s3-endpoint http://localhost:9000
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::io::S3Location;

// =============================================================================
// Default Values
// =============================================================================

/// Default AWS region.
pub const DEFAULT_REGION: &str = "us-east-1";

// =============================================================================
// CLI Arguments
// =============================================================================

/// ventana-slide - Inspect Ventana (Roche) whole slide images.
#[derive(Parser, Debug, Clone)]
#[command(name = "ventana-slide")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Open a slide and print its properties, associated images and levels.
    Probe(ProbeConfig),

    /// Check whether a file is a Ventana slide.
    ///
    /// Exits with 0 when it is, 2 when it is some other format, and 1 when it
    /// is a malformed Ventana slide or cannot be read.
    Detect(DetectConfig),
}

impl Cli {
    pub fn into_command(self) -> Command {
        self.command
    }
}

/// Where a slide is read from and how to reach it.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Local path or `s3://bucket/key` URI of the slide.
    pub source: String,

    /// Custom S3 endpoint URL for S3-compatible services (MinIO, etc.).
    #[arg(long, env = "VENTANA_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// AWS region for S3.
    #[arg(long, default_value = DEFAULT_REGION, env = "VENTANA_S3_REGION")]
    pub s3_region: String,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

/// A resolved slide location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlideSource {
    Local(PathBuf),
    S3(S3Location),
}

impl SourceArgs {
    /// Validate the source and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        self.resolve().map(|_| ())
    }

    /// Interpret `source` as an S3 URI or a local path.
    pub fn resolve(&self) -> Result<SlideSource, String> {
        let source = self.source.trim();
        if source.is_empty() {
            return Err("A slide path or s3:// URI is required".to_string());
        }

        if source.starts_with("s3://") {
            return S3Location::parse(source)
                .map(SlideSource::S3)
                .ok_or_else(|| {
                    format!(
                        "Invalid S3 URI '{}': expected s3://bucket/key",
                        self.source
                    )
                });
        }

        Ok(SlideSource::Local(PathBuf::from(source)))
    }
}

/// Output format for `probe`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable listing
    #[default]
    Text,

    /// JSON document
    Json,
}

#[derive(Args, Debug, Clone)]
pub struct ProbeConfig {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl ProbeConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.source.validate()
    }
}

#[derive(Args, Debug, Clone)]
pub struct DetectConfig {
    #[command(flatten)]
    pub source: SourceArgs,
}

impl DetectConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.source.validate()
    }
}

// =============================================================================
// Tests
// =============================================================================
