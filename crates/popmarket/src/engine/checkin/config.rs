use serde::{Deserialize, Serialize};

/// Tunables for the multi-factor verification scorer.
///
/// Defaults carry the launch calibration: full GPS credit within 50 m, nothing past
/// 500 m, a 60/40 GPS/code weighting with a small receipt bonus, and a pass mark
/// at 60.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckinConfig {
    /// Distance (meters) inside which the GPS channel scores full marks.
    pub full_score_radius_m: f64,
    /// Distance (meters) at which the GPS channel reaches zero.
    pub max_radius_m: f64,
    /// Accuracy (meters) up to which a reading is considered fine-grained.
    pub fine_accuracy_m: f64,
    /// Accuracy band treated as coarse; caps the GPS channel at `coarse_cap`.
    pub coarse_accuracy_m: f64,
    /// Accuracy band treated as poor; caps the GPS channel at `poor_cap`.
    pub poor_accuracy_m: f64,
    pub coarse_cap: u8,
    pub poor_cap: u8,
    /// Cap applied beyond the poor band.
    pub floor_cap: u8,
    pub gps_weight: u8,
    pub qr_weight: u8,
    pub receipt_bonus: u8,
    pub pass_threshold: u8,
}

impl Default for CheckinConfig {
    fn default() -> Self {
        Self {
            full_score_radius_m: 50.0,
            max_radius_m: 500.0,
            fine_accuracy_m: 25.0,
            coarse_accuracy_m: 75.0,
            poor_accuracy_m: 150.0,
            coarse_cap: 80,
            poor_cap: 50,
            floor_cap: 25,
            gps_weight: 60,
            qr_weight: 40,
            receipt_bonus: 10,
            pass_threshold: 60,
        }
    }
}
