/// Default number of updates applied before an intermediate flush during a
/// refresh cycle.
pub const DEFAULT_REFRESH_BATCH_SIZE: usize = 50;

/// Number of countries shown on the summary image.
pub const SUMMARY_TOP_N: i64 = 5;

/// Fractional digits kept for exchange rates.
pub const EXCHANGE_RATE_SCALE: u32 = 4;

/// Fractional digits of the raw GDP estimate.
pub const GDP_ESTIMATE_SCALE: u32 = 4;

/// Fractional digits of the stored GDP estimate.
pub const GDP_STORED_SCALE: u32 = 2;

/// Lower bound (inclusive) of the GDP multiplier.
pub const GDP_MULTIPLIER_MIN: f64 = 1000.0;

/// Upper bound (exclusive) of the GDP multiplier.
pub const GDP_MULTIPLIER_MAX: f64 = 2000.0;
