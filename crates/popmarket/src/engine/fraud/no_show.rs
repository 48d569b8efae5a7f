use serde::{Deserialize, Serialize};

/// Prior pledge behavior for one participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceHistory {
    pub committed: u32,
    pub attended: u32,
}

/// Behavioral snapshot of a committed participant ahead of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoShowProfile {
    pub history: AttendanceHistory,
    /// Whole days between the pledge and the event date.
    pub lead_time_days: i64,
    pub deposit_paid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskBand {
    Low,
    Moderate,
    High,
}

impl RiskBand {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
        }
    }
}

/// Discrete contribution to a risk estimate, allowing transparent audits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskFactor {
    pub label: &'static str,
    pub delta: f64,
    pub note: String,
}

/// Estimated probability that a committed participant will not attend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoShowRisk {
    pub probability: f64,
    pub band: RiskBand,
    pub factors: Vec<RiskFactor>,
}

#[derive(Debug, thiserror::Error)]
pub enum NoShowInputError {
    #[error("attended count {attended} exceeds committed count {committed}")]
    AttendedExceedsCommitted { committed: u32, attended: u32 },
    #[error("distance must be finite and non-negative, got {0}")]
    InvalidDistance(f64),
}

const MIN_PROBABILITY: f64 = 0.02;
const MAX_PROBABILITY: f64 = 0.95;
const LONG_LEAD_DAYS: i64 = 14;
const VERY_LONG_LEAD_DAYS: i64 = 30;
const FAR_DISTANCE_KM: f64 = 10.0;
const VERY_FAR_DISTANCE_KM: f64 = 30.0;

/// Estimates no-show probability from behavioral factors.
#[derive(Debug, Default)]
pub struct NoShowRiskPredictor;

impl NoShowRiskPredictor {
    pub fn assess(&self, profile: &NoShowProfile) -> Result<NoShowRisk, NoShowInputError> {
        let history = profile.history;
        if history.attended > history.committed {
            return Err(NoShowInputError::AttendedExceedsCommitted {
                committed: history.committed,
                attended: history.attended,
            });
        }
        if let Some(distance) = profile.distance_km {
            if !distance.is_finite() || distance < 0.0 {
                return Err(NoShowInputError::InvalidDistance(distance));
            }
        }

        let mut factors = Vec::new();

        // Laplace smoothing keeps first-time participants near the population prior
        // instead of at an extreme.
        let misses = history.committed - history.attended;
        let base = (misses as f64 + 1.0) / (history.committed as f64 + 2.0);
        factors.push(RiskFactor {
            label: "attendance_history",
            delta: base,
            note: format!(
                "{} no-show(s) across {} commitment(s)",
                misses, history.committed
            ),
        });

        let mut probability = base;

        if profile.lead_time_days >= VERY_LONG_LEAD_DAYS {
            probability += 0.20;
            factors.push(RiskFactor {
                label: "lead_time",
                delta: 0.20,
                note: format!("pledged {} days ahead", profile.lead_time_days),
            });
        } else if profile.lead_time_days >= LONG_LEAD_DAYS {
            probability += 0.10;
            factors.push(RiskFactor {
                label: "lead_time",
                delta: 0.10,
                note: format!("pledged {} days ahead", profile.lead_time_days),
            });
        }

        if profile.deposit_paid {
            probability -= 0.15;
            factors.push(RiskFactor {
                label: "deposit",
                delta: -0.15,
                note: "deposit paid".to_string(),
            });
        }

        if let Some(distance) = profile.distance_km {
            let delta = if distance >= VERY_FAR_DISTANCE_KM {
                0.10
            } else if distance >= FAR_DISTANCE_KM {
                0.05
            } else {
                0.0
            };
            if delta > 0.0 {
                probability += delta;
                factors.push(RiskFactor {
                    label: "distance",
                    delta,
                    note: format!("{distance:.1} km from venue"),
                });
            }
        }

        let probability = probability.clamp(MIN_PROBABILITY, MAX_PROBABILITY);

        Ok(NoShowRisk {
            probability,
            band: band_for(probability),
            factors,
        })
    }
}

fn band_for(probability: f64) -> RiskBand {
    if probability < 0.20 {
        RiskBand::Low
    } else if probability < 0.45 {
        RiskBand::Moderate
    } else {
        RiskBand::High
    }
}
