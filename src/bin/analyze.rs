//! Analyzer Binary Entry Point
//!
//! Runs the soil pipeline on a JSON record and/or the LiDAR pipeline on a
//! LAS/LAZ file, printing markdown (default) or JSON.
//!
//! Usage: analyze [--soil sample.json] [--las plot.las] [--plant-type maize] [--json]
//! Config: AGRONOMY_CONFIG=/path/to/config.json (optional)

use agronomy_core::{
    analyze_point_cloud_file, analyze_soil, AnalyzerConfig, JsonFormatter, MarkdownFormatter,
    SoilInput,
};
use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "analyze", version, about = "Soil fertility and LiDAR vegetation analysis")]
#[command(group(ArgGroup::new("input").required(true).multiple(true).args(["soil", "las"])))]
struct Args {
    /// Soil record (JSON)
    #[arg(long)]
    soil: Option<PathBuf>,

    /// Point cloud (LAS or LAZ)
    #[arg(long)]
    las: Option<PathBuf>,

    #[arg(long, default_value = "maize")]
    plant_type: String,

    /// Print JSON instead of markdown
    #[arg(long)]
    json: bool,
}

fn load_config() -> Result<AnalyzerConfig> {
    match std::env::var("AGRONOMY_CONFIG") {
        Ok(path) => AnalyzerConfig::load(Path::new(&path)),
        Err(_) => {
            tracing::info!("AGRONOMY_CONFIG not set - using default configuration");
            Ok(AnalyzerConfig::default())
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agronomy_core=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = load_config()?;

    if let Some(path) = &args.soil {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read soil record: {:?}", path))?;
        let input: SoilInput = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse soil record: {:?}", path))?;

        let analysis = analyze_soil(&input, &config.soil_defaults());
        if args.json {
            println!("{}", JsonFormatter::format_soil(&analysis)?);
        } else {
            println!("{}", MarkdownFormatter::format_soil(&analysis));
        }
    }

    if let Some(path) = &args.las {
        let size = fs::metadata(path)
            .with_context(|| format!("Failed to stat point cloud: {:?}", path))?
            .len();
        if config.exceeds_upload_cap(size) {
            tracing::warn!(
                "{:?} is {} bytes, above the {} MB upload cap",
                path,
                size,
                config.max_file_size_mb
            );
        }

        let analysis = analyze_point_cloud_file(
            path,
            &config.preprocess(),
            &config.segmentation(),
            &args.plant_type,
        )
        .with_context(|| format!("LiDAR analysis failed for {:?}", path))?;

        if args.json {
            println!("{}", JsonFormatter::format_lidar(&analysis)?);
        } else {
            println!("{}", MarkdownFormatter::format_lidar(&analysis));
        }
    }

    Ok(())
}
