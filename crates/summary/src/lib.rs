//! PNG rendering of the cache summary.
//!
//! Text drawing goes through `ab_glyph`, which does not discover OS fonts,
//! so a TrueType font is loaded from disk and registered once per process.

mod fonts;
mod layout;
mod renderer;

pub use fonts::FONT_CANDIDATES;
pub use layout::{format_gdp, format_refresh_line, format_row, format_total_line};
pub use renderer::PngSummaryRenderer;
