mod manifest;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use config_model::GalleryConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "gallery-manifest",
    about = "Write a gallery.json manifest into every product preview folder"
)]
struct Args {
    /// Directory tree holding the product preview folders.
    #[arg(long, value_name = "DIR", default_value = "public/img/applications/previews")]
    root: PathBuf,

    /// File name of the manifest written into each folder.
    #[arg(long, value_name = "NAME", default_value = GalleryConfig::DEFAULT_MANIFEST_FILE)]
    manifest_file: String,

    /// Log filter directive (e.g. info, debug, gallery_manifest=trace).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Report what would be written without touching any file.
    #[arg(long)]
    dry_run: bool,
}

fn init_tracing(level: &str) -> Result<()> {
    let filter = EnvFilter::builder()
        .parse(level)
        .with_context(|| format!("invalid log level '{level}'"))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let cfg = GalleryConfig {
        manifest_file: args.manifest_file.clone(),
        ..GalleryConfig::default()
    };
    cfg.validate("manifest")?;

    let summary = manifest::build_all(&args.root, &cfg, args.dry_run)?;
    info!(
        root = %args.root.display(),
        directories = summary.directories,
        manifests = summary.manifests,
        images = summary.images,
        dry_run = args.dry_run,
        "gallery manifests built"
    );
    Ok(())
}
