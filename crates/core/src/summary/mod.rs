//! Summary image contract.
//!
//! The renderer itself lives in the `country-cache-summary` crate; the core
//! only decides when to render and what goes on the image.

use chrono::{DateTime, Utc};
use std::path::Path;

use crate::countries::Country;
use crate::errors::Result;

/// Data drawn on the summary image.
#[derive(Debug, Clone, PartialEq)]
pub struct SummarySnapshot {
    pub total_countries: i64,
    pub refreshed_at: DateTime<Utc>,
    pub top_countries: Vec<Country>,
}

/// Draws the summary image and writes it to a fixed location.
pub trait SummaryRendererTrait: Send + Sync {
    fn render(&self, snapshot: &SummarySnapshot) -> Result<()>;

    /// Location the image is written to and served from.
    fn output_path(&self) -> &Path;
}
