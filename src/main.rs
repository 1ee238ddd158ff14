//! Headless driver for the lightbox core.
//!
//! Loads a product gallery and replays a script of viewer inputs, logging
//! every surface call and viewer event.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use gallery_lightbox::config::Configuration;
use gallery_lightbox::gallery::GalleryService;
use gallery_lightbox::replay::{self, ScriptedSurface, Script};
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug, Parser)]
#[command(name = "gallery-lightbox", about = "Replay lightbox sessions headlessly")]
struct Cli {
    /// Path to YAML config file
    #[arg(short, long, value_name = "FILE", default_value = "config.yaml")]
    config: PathBuf,

    /// Product gallery path below the configured base path
    #[arg(short, long, value_name = "PATH")]
    product: String,

    /// YAML script of viewer inputs to replay
    #[arg(short, long, value_name = "FILE")]
    script: Option<PathBuf>,

    /// Only print the resolved image URLs
    #[arg(long)]
    dry_run: bool,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env().add_directive(
        format!("gallery_lightbox={level}")
            .parse()
            .context("building log filter")?,
    );
    fmt().with_env_filter(filter).with_target(true).init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let cfg = Configuration::from_yaml_file(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?
        .validated()
        .context("validating configuration")?;

    let gallery = GalleryService::new(cfg.gallery.clone());
    let images = gallery.load_images(&cli.product).await;
    info!(
        product = %cli.product,
        manifest = %gallery.gallery_url(&cli.product),
        count = images.len(),
        "loaded gallery"
    );

    if cli.dry_run {
        for file in images.iter() {
            println!("{}", gallery.image_url(&cli.product, file));
        }
        return Ok(());
    }

    let Some(path) = cli.script else {
        info!("no script given; nothing to replay");
        return Ok(());
    };
    let script = Script::from_yaml_file(&path)
        .with_context(|| format!("loading script from {}", path.display()))?;
    let surface = Arc::new(ScriptedSurface::new(
        script.viewport_width,
        script.viewport_height,
    ));

    let events = replay::replay(cfg, images, &script, surface).await?;
    for event in &events {
        println!("{event:?}");
    }
    Ok(())
}
