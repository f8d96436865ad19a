// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Quadscan — find and outline the largest quadrilateral in a photo
//
// Entry point. Initialises logging, parses the command line, and hands the
// photo to a viewer session.

mod services;
mod state;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use quadscan_core::error::Result;
use quadscan_core::human_errors::humanize_error;
use quadscan_core::{DetectionConfig, Point};
use quadscan_vision::raster::save_source;
use serde::Serialize;

use state::ViewerSession;

#[derive(Parser)]
#[command(name = "quadscan")]
#[command(about = "Find the largest quadrilateral (document, card, screen) in a photo and outline it")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the quadrilateral in an image and write an annotated copy.
    Detect(DetectArgs),
}

#[derive(Debug, Clone, Args)]
struct DetectArgs {
    /// Path to the input image.
    image: PathBuf,

    /// Where to write the annotated image (default: `<stem>-quad.png` next to the input).
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// JSON file with detection settings; missing fields use defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Lower hysteresis threshold for edge detection.
    #[arg(long)]
    low: Option<f32>,

    /// Upper hysteresis threshold for edge detection.
    #[arg(long)]
    high: Option<f32>,

    /// Sobel aperture size (3, 5 or 7).
    #[arg(long)]
    aperture: Option<u32>,

    /// Approximation tolerance as a fraction of the contour perimeter.
    #[arg(long)]
    epsilon_ratio: Option<f64>,

    /// Outline thickness in pixels.
    #[arg(long)]
    thickness: Option<u32>,

    /// Print the result as JSON instead of text.
    #[arg(long)]
    json: bool,
}

/// Machine-readable summary printed with `--json`.
#[derive(Debug, Serialize)]
struct Report<'a> {
    image: &'a Path,
    output: &'a Path,
    found: bool,
    corners: Option<&'a [Point]>,
    area: Option<f64>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Commands::Detect(args) => run_detect(&args),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = %err, "command failed");
            eprintln!("{}", humanize_error(&err));
            ExitCode::FAILURE
        }
    }
}

fn run_detect(args: &DetectArgs) -> Result<()> {
    let config = resolve_config(args)?;
    let mut session = ViewerSession::new(config, 1)?;
    let result = session.open(&args.image)?;

    let output = args
        .out
        .clone()
        .unwrap_or_else(|| default_output(&args.image));
    save_source(&result.image, &output)?;

    let corners = result.quad.as_ref().map(|quad| quad.vertices());
    if args.json {
        let report = Report {
            image: &args.image,
            output: &output,
            found: result.found(),
            corners,
            area: result.quad.as_ref().map(|quad| quad.area()),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        match corners {
            Some(corners) => {
                let listed: Vec<String> = corners.iter().map(Point::to_string).collect();
                println!("Quadrilateral: {}", listed.join(" "));
            }
            None => println!("No quadrilateral found."),
        }
        println!("Annotated image written to {}", output.display());
    }
    Ok(())
}

/// Defaults, then the config file, then command-line overrides.
fn resolve_config(args: &DetectArgs) -> Result<DetectionConfig> {
    let mut config = match &args.config {
        Some(path) => DetectionConfig::from_json_file(path)?,
        None => DetectionConfig::default(),
    };
    if let Some(low) = args.low {
        config.edge_low_threshold = low;
    }
    if let Some(high) = args.high {
        config.edge_high_threshold = high;
    }
    if let Some(aperture) = args.aperture {
        config.gradient_aperture = aperture;
    }
    if let Some(ratio) = args.epsilon_ratio {
        config.approximation_epsilon_ratio = ratio;
    }
    if let Some(thickness) = args.thickness {
        config.overlay_thickness = thickness;
    }
    config.validate()?;
    Ok(config)
}

fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".into());
    input.with_file_name(format!("{stem}-quad.png"))
}
