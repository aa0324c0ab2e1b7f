//! Bounded per-meter rolling history.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Most readings a meter's recent window retains.
pub const WINDOW_CAPACITY: usize = 25;

/// One reading as held in the recent window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WindowEntry {
    pub power_value: f64,
    pub date_logged: NaiveDate,
}

/// Appends `reading` to `existing` (oldest first) and drops the oldest
/// entries beyond [`WINDOW_CAPACITY`].
pub fn advance<T>(mut existing: Vec<T>, reading: T) -> Vec<T> {
    existing.push(reading);
    let overflow = existing.len().saturating_sub(WINDOW_CAPACITY);
    if overflow > 0 {
        existing.drain(..overflow);
    }
    existing
}

/// Power values of a window in order, as fed to the classifier.
pub fn values(window: &[WindowEntry]) -> Vec<f64> {
    window.iter().map(|entry| entry.power_value).collect()
}
