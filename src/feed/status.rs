// Status evaluation against a channel's thresholds

use crate::models::{Status, Thresholds};

/// Pure: identical inputs always give the same status. NaN never matches a limit and
/// is reported as `Unknown`.
pub fn evaluate(thresholds: &Thresholds, value: f64) -> Status {
    if value.is_nan() {
        return Status::Unknown;
    }
    thresholds.evaluate(value)
}
