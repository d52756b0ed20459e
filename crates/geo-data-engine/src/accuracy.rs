//! ---
//! gd_section: "02-interpolation-engine"
//! gd_subsection: "module"
//! gd_type: "source"
//! gd_scope: "code"
//! gd_description: "Interpolation of missing substation and line coordinates."
//! gd_version: "v0.0.0-prealpha"
//! gd_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_ACCURACY_WARNING_THRESHOLD: u8 = 75;

/// Share of substations positioned straight from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccuracyReport {
    pub known: usize,
    pub to_compute: usize,
    /// `round(100 * known / (known + to_compute))`, 100 when there is nothing to place.
    pub accuracy: u8,
    pub low_confidence: bool,
}

/// Computes the accuracy factor and warns when it drops under `threshold`.
///
/// Purely observational: the estimation runs the same whatever the outcome.
pub fn assess_accuracy(known: usize, to_compute: usize, threshold: u8) -> AccuracyReport {
    let total = known + to_compute;
    let accuracy = if total == 0 {
        100
    } else {
        (100.0 * known as f64 / total as f64).round() as u8
    };
    let low_confidence = accuracy < threshold;
    if low_confidence {
        warn!(accuracy, threshold, known, to_compute, "accuracy factor is below threshold");
    }
    AccuracyReport {
        known,
        to_compute,
        accuracy,
        low_confidence,
    }
}
