use log::{debug, info};
use plotters::style::{register_font, FontStyle};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use country_cache_core::errors::{Error, Result};

/// Regular sans-serif fonts tried, in order, when no font is configured.
pub const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

const BOLD_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

const MONO_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Courier New.ttf",
    "C:\\Windows\\Fonts\\cour.ttf",
];

pub(crate) const SANS: &str = "sans-serif";
pub(crate) const MONO: &str = "monospace";

static REGISTERED: OnceLock<std::result::Result<(), String>> = OnceLock::new();

fn read_first(candidates: &[&str]) -> Option<(PathBuf, &'static [u8])> {
    candidates.iter().map(Path::new).find_map(read_font)
}

fn read_font(path: &Path) -> Option<(PathBuf, &'static [u8])> {
    match std::fs::read(path) {
        // Registered fonts live for the rest of the process.
        Ok(bytes) => Some((path.to_path_buf(), Box::leak(bytes.into_boxed_slice()))),
        Err(e) => {
            debug!("Font {} not usable: {}", path.display(), e);
            None
        }
    }
}

fn register(family: &str, style: FontStyle, font: &(PathBuf, &'static [u8])) -> std::result::Result<(), String> {
    register_font(family, style, font.1)
        // plotters' InvalidFont is opaque and implements no formatting traits.
        .map_err(|_| format!("Invalid font {}", font.0.display()))
}

fn load_and_register(configured: Option<&Path>) -> std::result::Result<(), String> {
    let regular = match configured {
        Some(path) => read_font(path)
            .ok_or_else(|| format!("Configured font {} could not be read", path.display()))?,
        None => read_first(FONT_CANDIDATES).ok_or_else(|| {
            "No usable TrueType font found; configure a font path".to_string()
        })?,
    };
    let bold = match configured {
        Some(_) => None,
        None => read_first(BOLD_CANDIDATES),
    };
    let mono = match configured {
        Some(_) => None,
        None => read_first(MONO_CANDIDATES),
    };

    register(SANS, FontStyle::Normal, &regular)?;
    register(SANS, FontStyle::Bold, bold.as_ref().unwrap_or(&regular))?;
    register(MONO, FontStyle::Normal, mono.as_ref().unwrap_or(&regular))?;

    info!("Summary fonts registered from {}", regular.0.display());
    Ok(())
}

/// Loads and registers the fonts on first use. Later calls return the
/// outcome of the first attempt.
pub(crate) fn ensure_registered(configured: Option<&Path>) -> Result<()> {
    REGISTERED
        .get_or_init(|| load_and_register(configured))
        .clone()
        .map_err(Error::Render)
}
