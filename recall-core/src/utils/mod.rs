//! Shared Utilities
//!
//! Clock and hashing helpers used by the stores.

mod hashing;
mod time;

pub use hashing::{md5_hex, memory_id, path_key};
pub use time::{format_timestamp, now_timestamp, SECONDS_PER_DAY};
