pub mod time_utils;

pub use time_utils::{from_naive_utc, now_utc, to_naive_utc};
