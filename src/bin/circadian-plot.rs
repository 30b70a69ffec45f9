//! Command-line front end: load the telemetry exports, apply a view, and
//! print the resulting chart frame.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use circadian_plot::{Dashboard, Metric, Resolution, ViewerConfig, load_store};

#[derive(Parser, Debug)]
#[command(name = "circadian-plot")]
#[command(about = "Aggregate circadian telemetry and print render-ready chart frames")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the per-resolution JSON exports
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Bin size in minutes (5, 15, 30 or 60)
    #[arg(short, long)]
    resolution: Option<Resolution>,

    /// Metric key (activity_mean, temperature_mean or ratio_mean)
    #[arg(short, long)]
    metric: Option<Metric>,

    /// Inclusive day range, e.g. 2..5
    #[arg(long)]
    days: Option<DaySpan>,

    /// Viewport width in pixels
    #[arg(long, default_value = "960")]
    width: f32,

    /// Chart-area pointer position to look up
    #[arg(long)]
    pointer_x: Option<f32>,

    /// Also print the per-day panels
    #[arg(long)]
    panels: bool,

    /// Print frames as JSON instead of a bin/value table
    #[arg(long)]
    json: bool,
}

/// Inclusive day bounds as typed on the command line.
#[derive(Debug, Clone, Copy)]
struct DaySpan {
    low: i64,
    high: i64,
}

impl FromStr for DaySpan {
    type Err = String;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let (low, high) = text
            .split_once("..")
            .ok_or_else(|| format!("expected LOW..HIGH, got `{text}`"))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<i64>()
                .map_err(|_| format!("`{part}` is not a day number"))
        };
        Ok(Self {
            low: parse(low)?,
            high: parse(high)?,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    if let Some(resolution) = args.resolution {
        config.default_resolution = resolution;
        if !config.resolutions.contains(&resolution) {
            config.resolutions.push(resolution);
        }
    }
    if let Some(metric) = args.metric {
        config.default_metric = metric;
    }

    info!(
        data_dir = %config.data_dir.display(),
        resolutions = config.resolutions.len(),
        "Loading telemetry"
    );
    let store = load_store(&config)
        .await
        .context("loading telemetry exports")?;

    let mut dashboard = Dashboard::new(store, &config, args.width)?;
    if let Some(days) = args.days {
        dashboard.set_day_range(days.low, days.high)?;
    }

    let frame = dashboard.frame();
    println!("{}", frame.subtitle);
    if args.json {
        println!("{}", serde_json::to_string_pretty(frame)?);
    } else {
        println!("bin\t{}", dashboard.state().metric().label());
        for point in dashboard.series() {
            println!("{}\t{:.4}", point.bin, point.value);
        }
    }

    if let Some(x) = args.pointer_x {
        match dashboard.pointer_move(x) {
            Some(tooltip) => println!("{}", tooltip.text),
            None => println!("no data under x = {x}"),
        }
    }

    if args.panels {
        let panels = dashboard.panels().frames();
        if args.json {
            println!("{}", serde_json::to_string_pretty(&panels)?);
        } else {
            for panel in &panels {
                let status = if panel.estrus { "estrus" } else { "non-estrus" };
                println!("{}\t{status}\t{} points", panel.title, panel.points.len());
            }
        }
    }

    Ok(())
}
