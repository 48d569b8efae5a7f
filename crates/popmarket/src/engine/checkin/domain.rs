use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::repository::{CheckinStoreError, CodeSourceError, DirectoryError};

/// Identifier wrapper for popup sites.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PopupId(pub String);

/// Identifier wrapper for emitted check-in records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CheckinId(pub String);

/// WGS84 coordinate pair as sampled by the client application.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Minimal description of a confirmed popup used during verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopupSite {
    pub id: PopupId,
    pub name: String,
    pub location: GeoPoint,
}

/// One verification attempt as submitted by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckinRequest {
    pub popup_id: PopupId,
    pub visitor_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy_m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_text: Option<String>,
}

/// Outcome of matching the submitted code against the active rotating code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeStatus {
    Matched,
    Mismatched,
    Expired,
    NotSubmitted,
    Unavailable,
}

impl CodeStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Matched => "matched",
            Self::Mismatched => "mismatched",
            Self::Expired => "expired",
            Self::NotSubmitted => "not_submitted",
            Self::Unavailable => "unavailable",
        }
    }
}

/// Weighted contribution of each channel to the combined score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub gps: u8,
    pub qr: u8,
    pub receipt: u8,
}

/// Immutable record of one verification attempt. A failed attempt never blocks a
/// retry; each retry emits a fresh record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckinRecord {
    pub id: CheckinId,
    pub popup_id: PopupId,
    pub visitor_id: String,
    /// Raw 0-100 channel scores before weighting.
    pub gps_score: u8,
    pub qr_score: u8,
    pub receipt_score: u8,
    pub total_score: u8,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy_m: Option<f64>,
    pub code_status: CodeStatus,
    pub recorded_at: DateTime<Utc>,
}

/// Verification verdict handed back to the caller for display and reward unlocking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckinResult {
    pub record_id: CheckinId,
    pub passed: bool,
    pub total_score: u8,
    pub breakdown: ScoreBreakdown,
    pub code_status: CodeStatus,
}

/// Errors raised by the check-in service. An expired or mismatched code is not an
/// error; it is a legitimate zero-score outcome reported through the result.
#[derive(Debug, thiserror::Error)]
pub enum CheckinError {
    #[error("popup '{0}' not found")]
    PopupNotFound(String),
    #[error("coordinates out of range: ({latitude}, {longitude})")]
    InvalidCoordinates { latitude: f64, longitude: f64 },
    #[error("gps accuracy must be finite and non-negative, got {0}")]
    InvalidAccuracy(f64),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error(transparent)]
    Codes(#[from] CodeSourceError),
    #[error(transparent)]
    Store(#[from] CheckinStoreError),
}
