mod host;
mod layout;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use collage::config::{CollageConfig, ConfigError};
use collage::engine::Engine;
use collage::export::ExportError;
use collage::geometry::Size;
use collage::viewport::fit_zoom;
use tracing_subscriber::EnvFilter;

use crate::host::{FileSink, FsImageSource};
use crate::layout::Layout;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("invalid layout JSON: {0}")]
    InvalidLayout(#[from] serde_json::Error),
    #[error("no item in the layout could be placed")]
    NothingPlaced,
    #[error("{}", .0.user_message())]
    Export(#[from] ExportError),
}

#[derive(Parser, Debug)]
#[command(name = "collage-cli", about = "Compose outfit collages from a JSON layout")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Place every item in a layout and save the flattened PNG.
    Compose(ComposeArgs),
    /// Print the fit-to-view zoom for a container of the given size.
    Fit(FitArgs),
}

#[derive(Args, Debug)]
struct ComposeArgs {
    /// Layout JSON file. Relative image paths resolve against its directory.
    #[arg(long)]
    layout: PathBuf,

    /// Output PNG path.
    #[arg(long, env = "COLLAGE_OUT", default_value = "collage.png")]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct FitArgs {
    #[arg(long)]
    container_width: f64,

    #[arg(long)]
    container_height: f64,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = CollageConfig::from_env()?;

    match cli.command {
        Command::Compose(args) => run_compose(config, args).await,
        Command::Fit(args) => {
            run_fit(config, &args);
            Ok(())
        }
    }
}

async fn run_compose(config: CollageConfig, args: ComposeArgs) -> Result<(), CliError> {
    let raw = tokio::fs::read_to_string(&args.layout)
        .await
        .map_err(|source| CliError::Read { path: args.layout.clone(), source })?;
    let layout: Layout = serde_json::from_str(&raw)?;

    let base_dir = args.layout.parent().map(PathBuf::from).unwrap_or_default();
    let images = FsImageSource::new(base_dir);
    let mut engine = Engine::with_config(config);

    let report = layout::compose(&mut engine, &layout, &images).await;
    for source_id in &report.skipped {
        tracing::warn!(%source_id, "item skipped");
    }
    if report.placed.is_empty() && !layout.items.is_empty() {
        return Err(CliError::NothingPlaced);
    }
    tracing::info!(placed = report.placed.len(), skipped = report.skipped.len(), "layout composed");

    engine.save(&FileSink::new(&args.out)).await?;
    println!("{}", args.out.display());
    Ok(())
}

fn run_fit(config: CollageConfig, args: &FitArgs) {
    let zoom = fit_zoom(Size::new(args.container_width, args.container_height), config.canvas, config.fit_margin);
    println!("{zoom:.2}");
}
