use std::cmp::Ordering;
use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use config_model::GalleryConfig;
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub directories: usize,
    pub manifests: usize,
    pub images: usize,
}

/// Writes one manifest per directory under `root` that directly contains
/// images. Directories without images are left untouched.
#[instrument(skip(cfg), fields(root = %root.display()))]
pub fn build_all(root: &Path, cfg: &GalleryConfig, dry_run: bool) -> Result<Summary> {
    fs::create_dir_all(root)
        .with_context(|| format!("failed to create gallery root {}", root.display()))?;

    let mut summary = Summary::default();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(error = %err, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        summary.directories += 1;
        let dir = entry.path();
        let images = match images_in(dir, cfg) {
            Ok(images) => images,
            Err(err) => {
                warn!(dir = %dir.display(), error = %err, "could not read directory");
                continue;
            }
        };
        if images.is_empty() {
            debug!(dir = %dir.display(), "no images; no manifest");
            continue;
        }

        let manifest = dir.join(&cfg.manifest_file);
        if dry_run {
            info!(manifest = %manifest.display(), count = images.len(), "would write manifest");
        } else {
            let body = render(&images)?;
            if let Err(err) = fs::write(&manifest, body) {
                warn!(manifest = %manifest.display(), error = %err, "failed to write manifest");
                continue;
            }
            info!(manifest = %manifest.display(), count = images.len(), "manifest written");
        }
        summary.manifests += 1;
        summary.images += images.len();
    }
    Ok(summary)
}

/// Image file names directly inside `dir`, in manifest order.
pub fn images_in(dir: &Path, cfg: &GalleryConfig) -> io::Result<Vec<String>> {
    let mut images = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        if !cfg.is_image(&path) {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => images.push(name),
            Err(name) => warn!(?name, "skipping file name that is not UTF-8"),
        }
    }
    images.sort_by(|a, b| locale_cmp(a, b));
    Ok(images)
}

/// Pretty JSON array with two-space indentation.
pub fn render(images: &[String]) -> Result<String> {
    serde_json::to_string_pretty(images).context("failed to serialise manifest")
}

/// Base letter used for the primary comparison.
fn fold(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'a',
        'ç' | 'Ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' | 'È' | 'É' | 'Ê' | 'Ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' | 'Ì' | 'Í' | 'Î' | 'Ï' => 'i',
        'ñ' | 'Ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' => 'o',
        'ù' | 'ú' | 'û' | 'ü' | 'Ù' | 'Ú' | 'Û' | 'Ü' => 'u',
        'ý' | 'ÿ' | 'Ý' => 'y',
        _ => c.to_lowercase().next().unwrap_or(c),
    }
}

/// ASCII punctuation and symbols in ICU root collation order.
const PUNCTUATION: &str = "_-,;:!?.'\"()[]{}@*/\\&#%`^+<=>|~$";

/// Primary weight: whitespace, then punctuation, then digits, then letters.
fn weight(c: char) -> (u8, u32) {
    if c.is_whitespace() {
        (0, c as u32)
    } else if let Some(rank) = PUNCTUATION.find(c) {
        (1, rank as u32)
    } else if c.is_ascii_digit() {
        (2, c as u32)
    } else if c.is_alphanumeric() {
        (3, fold(c) as u32)
    } else {
        (1, PUNCTUATION.len() as u32 + c as u32)
    }
}

fn primary_key(s: &str) -> impl Iterator<Item = (u8, u32)> + '_ {
    let ss = weight('s');
    s.chars().flat_map(move |c| match c {
        'ß' => [ss, ss].into_iter().take(2),
        c => [weight(c), ss].into_iter().take(1),
    })
}

/// German-locale style ordering. Letters compare case- and
/// accent-insensitively first, with punctuation ahead of digits and digits
/// ahead of letters. Unaccented sorts before accented and lowercase before
/// uppercase; raw code points break any remaining tie.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    primary_key(a)
        .cmp(primary_key(b))
        .then_with(|| {
            let accents = |s: &str| {
                s.chars()
                    .map(|c| fold(c) != c.to_lowercase().next().unwrap_or(c))
                    .collect::<Vec<_>>()
            };
            accents(a).cmp(&accents(b))
        })
        .then_with(|| {
            let uppers = |s: &str| s.chars().map(char::is_uppercase).collect::<Vec<_>>();
            uppers(a).cmp(&uppers(b))
        })
        .then_with(|| a.cmp(b))
}
