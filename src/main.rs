//! ventana-slide - inspect Ventana whole slide images.
//!
//! This binary opens a slide from local disk or S3 and either prints what
//! recognition found (`probe`) or reports whether it is a Ventana slide
//! (`detect`).

use std::collections::BTreeMap;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ventana_slide::{
    config::{Cli, Command, DetectConfig, OutputFormat, ProbeConfig, SlideSource, SourceArgs},
    create_s3_client, ErrorKind, FileRangeReader, RangeReader, S3RangeReader, SlideError,
    VentanaSlide,
};

/// Exit code of `detect` for files of another format.
const EXIT_NOT_VENTANA: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Probe(config) => run_probe(config).await,
        Command::Detect(config) => run_detect(config).await,
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "ventana_slide=debug"
    } else {
        "ventana_slide=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Open the byte source named on the command line.
async fn open_source(args: &SourceArgs) -> Result<Box<dyn RangeReader>, String> {
    let source = args.resolve()?;
    debug!("Opening {:?}", source);

    match source {
        SlideSource::Local(path) => FileRangeReader::open(&path)
            .await
            .map(|r| Box::new(r) as Box<dyn RangeReader>)
            .map_err(|e| e.to_string()),
        SlideSource::S3(location) => {
            let client = create_s3_client(args.s3_endpoint.as_deref(), &args.s3_region).await;
            S3RangeReader::open(client, location)
                .await
                .map(|r| Box::new(r) as Box<dyn RangeReader>)
                .map_err(|e| e.to_string())
        }
    }
}

// =============================================================================
// Probe Command
// =============================================================================

async fn run_probe(config: ProbeConfig) -> ExitCode {
    init_logging(config.source.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let reader = match open_source(&config.source).await {
        Ok(reader) => reader,
        Err(e) => {
            error!("Cannot open {}: {}", config.source.source, e);
            return ExitCode::FAILURE;
        }
    };

    let slide = match VentanaSlide::open(&reader).await {
        Ok(slide) => slide,
        Err(e) => {
            error!("{}: {}", reader.identifier(), e);
            return ExitCode::FAILURE;
        }
    };

    match config.format {
        OutputFormat::Text => print_text(&slide),
        OutputFormat::Json => {
            let json = serde_json::json!({
                "source": slide.source,
                "quickhash": slide.quickhash,
                "properties": sorted(&slide.properties),
                "associated_images": sorted(&slide.associated_images),
                "levels": slide.layout.levels(),
            });
            match serde_json::to_string_pretty(&json) {
                Ok(text) => println!("{}", text),
                Err(e) => {
                    error!("Cannot serialize output: {}", e);
                    return ExitCode::FAILURE;
                }
            }
        }
    }

    ExitCode::SUCCESS
}

fn sorted<V>(map: &std::collections::HashMap<String, V>) -> BTreeMap<&str, &V> {
    map.iter().map(|(k, v)| (k.as_str(), v)).collect()
}

fn print_text(slide: &VentanaSlide) {
    println!("Source:    {}", slide.source);
    println!("Quickhash: {}", slide.quickhash);
    println!();

    println!("Properties:");
    for (key, value) in sorted(&slide.properties) {
        println!("  {} = {}", key, value);
    }
    println!();

    println!("Associated images:");
    for (name, image) in sorted(&slide.associated_images) {
        println!(
            "  {:<10} directory {:>3}  {}x{}",
            name, image.directory, image.width, image.height
        );
    }
    println!();

    println!("Levels:");
    for (index, level) in slide.layout.levels().iter().enumerate() {
        println!(
            "  {:>2}: directory {:>3}  {}x{}  tiles {}x{} ({}x{})  downsample {:.3}",
            index,
            level.directory,
            level.width,
            level.height,
            level.tiles_x,
            level.tiles_y,
            level.tile_width,
            level.tile_height,
            level.downsample
        );
    }
}

// =============================================================================
// Detect Command
// =============================================================================

async fn run_detect(config: DetectConfig) -> ExitCode {
    init_logging(config.source.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let reader = match open_source(&config.source).await {
        Ok(reader) => reader,
        Err(e) => {
            error!("Cannot open {}: {}", config.source.source, e);
            return ExitCode::FAILURE;
        }
    };

    let result: Result<Vec<usize>, SlideError> = VentanaSlide::detect(&reader).await;
    match result {
        Ok(levels) => {
            println!("{}: Ventana slide ({} levels)", reader.identifier(), levels.len());
            ExitCode::SUCCESS
        }
        Err(e) if e.kind() == ErrorKind::FormatNotSupported => {
            println!("{}: not a Ventana slide ({})", reader.identifier(), e);
            ExitCode::from(EXIT_NOT_VENTANA)
        }
        Err(e) => {
            println!("{}: invalid Ventana slide ({})", reader.identifier(), e);
            ExitCode::FAILURE
        }
    }
}
