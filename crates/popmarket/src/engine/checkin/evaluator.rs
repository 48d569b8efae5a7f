use chrono::{DateTime, Utc};

use super::code::{score_code, RotatingCode};
use super::config::CheckinConfig;
use super::domain::{CodeStatus, GeoPoint, ScoreBreakdown};
use super::geo::score_location;

/// Combined outcome of one verification attempt, before it is persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub gps_score: u8,
    pub qr_score: u8,
    pub receipt_score: u8,
    pub total_score: u8,
    pub passed: bool,
    pub breakdown: ScoreBreakdown,
    pub distance_m: Option<f64>,
    pub code_status: CodeStatus,
}

/// Combines the GPS, code, and receipt channels into a single verdict.
pub struct CheckinEvaluator {
    config: CheckinConfig,
}

impl Default for CheckinEvaluator {
    fn default() -> Self {
        Self::new(CheckinConfig::default())
    }
}

impl CheckinEvaluator {
    pub fn new(config: CheckinConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CheckinConfig {
        &self.config
    }

    pub fn evaluate(
        &self,
        site: &GeoPoint,
        visitor: Option<&GeoPoint>,
        accuracy_m: Option<f64>,
        submitted_code: Option<&str>,
        current_code: Option<&RotatingCode>,
        receipt_text: Option<&str>,
        now: DateTime<Utc>,
    ) -> Evaluation {
        let geo = score_location(site, visitor, accuracy_m, &self.config);
        let code = score_code(submitted_code, current_code, now);
        let receipt_score = score_receipt(receipt_text);

        let breakdown = ScoreBreakdown {
            gps: weighted(geo.score, self.config.gps_weight),
            qr: weighted(code.score, self.config.qr_weight),
            receipt: weighted(receipt_score, self.config.receipt_bonus),
        };

        let total =
            (breakdown.gps as u16 + breakdown.qr as u16 + breakdown.receipt as u16).min(100) as u8;

        Evaluation {
            gps_score: geo.score,
            qr_score: code.score,
            receipt_score,
            total_score: total,
            passed: total >= self.config.pass_threshold,
            breakdown,
            distance_m: geo.distance_m,
            code_status: code.status,
        }
    }
}

fn weighted(channel_score: u8, weight: u8) -> u8 {
    (channel_score as u16 * weight as u16 / 100) as u8
}

/// Receipt text supplied by the client's OCR collaborator earns a bonus when it
/// contains a plausible purchase amount.
fn score_receipt(text: Option<&str>) -> u8 {
    let Some(text) = text else {
        return 0;
    };

    let mut best: i64 = 0;
    let mut current: i64 = 0;
    let mut in_run = false;

    for ch in text.chars() {
        if let Some(digit) = ch.to_digit(10) {
            current = current.saturating_mul(10) + digit as i64;
            in_run = true;
        } else if ch == ',' && in_run {
            // thousands separator inside an amount
        } else {
            best = best.max(current);
            current = 0;
            in_run = false;
        }
    }
    best = best.max(current);

    if best >= 1_000 {
        100
    } else {
        0
    }
}
