use log::info;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontDesc, FontFamily, FontStyle};
use plotters_bitmap::BitMapBackend;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use country_cache_core::errors::{Error, Result};
use country_cache_core::summary::{SummaryRendererTrait, SummarySnapshot};

use crate::fonts::{ensure_registered, MONO, SANS};
use crate::layout::{format_gdp, format_refresh_line, format_row, format_total_line};

const WIDTH: u32 = 800;
const HEIGHT: u32 = 500;
const MARGIN: i32 = 40;

const TITLE: &str = "Country Data Cache Summary";
const TABLE_HEADING: &str = "Top 5 Countries by Estimated GDP (USD)";

const TITLE_COLOR: RGBColor = RGBColor(30, 144, 255);
const TEXT_COLOR: RGBColor = RGBColor(64, 64, 64);
const HEADER_COLOR: RGBColor = RGBColor(100, 100, 100);

/// Distinguishes staging files of renders running at the same time.
static STAGING_SEQ: AtomicU64 = AtomicU64::new(0);

fn render_err<E: std::fmt::Debug>(e: E) -> Error {
    Error::Render(format!("{:?}", e))
}

fn text_style(
    family: &'static str,
    size: u32,
    style: FontStyle,
    color: &'static RGBColor,
) -> TextStyle<'static> {
    // Coordinates below are text baselines.
    TextStyle::from(FontDesc::new(FontFamily::Name(family), f64::from(size), style))
        .color(color)
        .pos(Pos::new(HPos::Left, VPos::Bottom))
}

/// Writes the summary as an 800x500 PNG.
///
/// The image is drawn to a sibling file and renamed into place, so readers
/// never observe a partially written file.
pub struct PngSummaryRenderer {
    path: PathBuf,
    font_path: Option<PathBuf>,
}

impl PngSummaryRenderer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            font_path: None,
        }
    }

    /// Uses the given TrueType font for every text style instead of
    /// searching well-known system locations.
    pub fn with_font_path(mut self, font_path: Option<PathBuf>) -> Self {
        self.font_path = font_path;
        self
    }

    /// A fresh sibling path for one render.
    fn staging_path(&self) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("summary");
        let seq = STAGING_SEQ.fetch_add(1, Ordering::Relaxed);
        // The encoder picks the format from the extension, so keep `.png`.
        self.path.with_file_name(format!(
            ".{}.{}-{}.partial.png",
            stem,
            std::process::id(),
            seq
        ))
    }

    fn draw(&self, target: &Path, snapshot: &SummarySnapshot) -> Result<()> {
        let root = BitMapBackend::new(target, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        root.draw(&Text::new(
            TITLE,
            (MARGIN, 50),
            text_style(SANS, 28, FontStyle::Bold, &TITLE_COLOR),
        ))
        .map_err(render_err)?;

        let info_style = text_style(SANS, 16, FontStyle::Normal, &TEXT_COLOR);
        root.draw(&Text::new(
            format_total_line(snapshot.total_countries),
            (MARGIN, 100),
            info_style.clone(),
        ))
        .map_err(render_err)?;
        root.draw(&Text::new(
            format_refresh_line(snapshot.refreshed_at),
            (MARGIN, 130),
            info_style,
        ))
        .map_err(render_err)?;

        root.draw(&Text::new(
            TABLE_HEADING,
            (MARGIN, 200),
            text_style(SANS, 20, FontStyle::Bold, &BLACK),
        ))
        .map_err(render_err)?;

        let mut y = 230;
        root.draw(&Text::new(
            format_row("#", "Country Name", "Currency", "Estimated GDP"),
            (MARGIN, y),
            text_style(MONO, 14, FontStyle::Normal, &HEADER_COLOR),
        ))
        .map_err(render_err)?;
        y += 15;
        root.draw(&PathElement::new(
            vec![(MARGIN, y), (WIDTH as i32 - MARGIN, y)],
            &HEADER_COLOR,
        ))
        .map_err(render_err)?;
        y += 10;

        let row_style = text_style(MONO, 14, FontStyle::Normal, &BLACK);
        for (index, country) in snapshot.top_countries.iter().enumerate() {
            let line = format_row(
                &(index + 1).to_string(),
                &country.name,
                country.currency_code.as_deref().unwrap_or("N/A"),
                &format_gdp(country.estimated_gdp),
            );
            root.draw(&Text::new(line, (MARGIN, y), row_style.clone()))
                .map_err(render_err)?;
            y += 25;
        }

        root.present().map_err(render_err)?;
        Ok(())
    }
}

impl SummaryRendererTrait for PngSummaryRenderer {
    fn render(&self, snapshot: &SummarySnapshot) -> Result<()> {
        ensure_registered(self.font_path.as_deref())?;

        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }

        let staging = self.staging_path();
        let drawn = self.draw(&staging, snapshot);
        if drawn.is_err() {
            let _ = fs::remove_file(&staging);
        }
        drawn?;
        fs::rename(&staging, &self.path)?;

        info!("Successfully generated summary image at: {}", self.path.display());
        Ok(())
    }

    fn output_path(&self) -> &Path {
        &self.path
    }
}
