use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time metrics aggregated by the persistence collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrustMetrics {
    /// Completed deals over committed deals, in [0, 1].
    pub completion_rate: f64,
    /// Average satisfaction rating, in [0, 5].
    pub avg_satisfaction: f64,
    /// Disputed settlements over total settlements, in [0, 1].
    pub dispute_rate: f64,
    /// Identity verification depth, 0 (none) through 3 (full business verification).
    pub verification_level: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustEventCategory {
    DealCompleted,
    DealCancelled,
    DisputeRaised,
    DisputeResolved,
    PayoutDelayed,
    VerificationUpgraded,
}

/// One signed entry in an account's trust history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustEvent {
    pub occurred_at: DateTime<Utc>,
    /// Signed impact in [-10, 10].
    pub impact: i8,
    pub category: TrustEventCategory,
    pub note: String,
}

/// Component weights for the base score.
///
/// Defaults carry the launch calibration; per-market overrides are a configuration
/// concern, not a code change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrustWeights {
    pub reliability: f64,
    pub satisfaction: f64,
    pub fairness: f64,
    pub transparency: f64,
}

impl Default for TrustWeights {
    fn default() -> Self {
        Self {
            reliability: 0.35,
            satisfaction: 0.30,
            fairness: 0.20,
            transparency: 0.15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustTier {
    Elite,
    Trusted,
    Verified,
    Unverified,
}

impl TrustTier {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Elite => "elite",
            Self::Trusted => "trusted",
            Self::Verified => "verified",
            Self::Unverified => "unverified",
        }
    }
}

/// Per-component base scores on the 0-100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrustComponents {
    pub reliability: f64,
    pub satisfaction: f64,
    pub fairness: f64,
    pub transparency: f64,
}

/// Derived trust score. Recomputed on demand, never stored as a source of truth, so
/// the tier can never drift from its inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustScore {
    pub overall: f64,
    pub components: TrustComponents,
    pub history_modifier: f64,
    pub tier: TrustTier,
}

#[derive(Debug, thiserror::Error)]
pub enum TrustInputError {
    #[error("completion rate must be in [0, 1], got {0}")]
    CompletionRateOutOfRange(f64),
    #[error("average satisfaction must be in [0, 5], got {0}")]
    SatisfactionOutOfRange(f64),
    #[error("dispute rate must be in [0, 1], got {0}")]
    DisputeRateOutOfRange(f64),
    #[error("verification level must be in 0..=3, got {0}")]
    VerificationLevelOutOfRange(u8),
    #[error("event impact must be in [-10, 10], got {0}")]
    ImpactOutOfRange(i8),
}

const MAX_VERIFICATION_LEVEL: u8 = 3;
const MAX_EVENT_IMPACT: i8 = 10;

/// Aggregates reliability, satisfaction, fairness, and transparency metrics plus a
/// rolling event history into a tiered score.
pub struct TrustScoreEngine {
    weights: TrustWeights,
}

impl Default for TrustScoreEngine {
    fn default() -> Self {
        Self::new(TrustWeights::default())
    }
}

impl TrustScoreEngine {
    pub fn new(weights: TrustWeights) -> Self {
        Self { weights }
    }

    pub fn evaluate(
        &self,
        metrics: &TrustMetrics,
        events: &[TrustEvent],
        now: DateTime<Utc>,
    ) -> Result<TrustScore, TrustInputError> {
        validate_metrics(metrics)?;
        for event in events {
            if event.impact.abs() > MAX_EVENT_IMPACT {
                return Err(TrustInputError::ImpactOutOfRange(event.impact));
            }
        }

        let components = TrustComponents {
            reliability: metrics.completion_rate * 100.0,
            satisfaction: metrics.avg_satisfaction / 5.0 * 100.0,
            fairness: (1.0 - metrics.dispute_rate) * 100.0,
            transparency: metrics.verification_level as f64 / MAX_VERIFICATION_LEVEL as f64 * 100.0,
        };

        let base = self.weights.reliability * components.reliability
            + self.weights.satisfaction * components.satisfaction
            + self.weights.fairness * components.fairness
            + self.weights.transparency * components.transparency;

        // Hard three-month cliff: older events carry no influence at all.
        let cutoff = now
            .checked_sub_months(Months::new(3))
            .unwrap_or_else(|| now - Duration::days(92));
        let history_modifier: f64 = events
            .iter()
            .filter(|event| event.occurred_at >= cutoff && event.occurred_at <= now)
            .map(|event| event.impact as f64)
            .sum();

        let overall = (base + history_modifier).clamp(0.0, 100.0);

        Ok(TrustScore {
            overall,
            components,
            history_modifier,
            tier: tier_for(overall, metrics.verification_level),
        })
    }
}

fn validate_metrics(metrics: &TrustMetrics) -> Result<(), TrustInputError> {
    if !(0.0..=1.0).contains(&metrics.completion_rate) {
        return Err(TrustInputError::CompletionRateOutOfRange(
            metrics.completion_rate,
        ));
    }
    if !(0.0..=5.0).contains(&metrics.avg_satisfaction) {
        return Err(TrustInputError::SatisfactionOutOfRange(
            metrics.avg_satisfaction,
        ));
    }
    if !(0.0..=1.0).contains(&metrics.dispute_rate) {
        return Err(TrustInputError::DisputeRateOutOfRange(metrics.dispute_rate));
    }
    if metrics.verification_level > MAX_VERIFICATION_LEVEL {
        return Err(TrustInputError::VerificationLevelOutOfRange(
            metrics.verification_level,
        ));
    }
    Ok(())
}

fn tier_for(overall: f64, verification_level: u8) -> TrustTier {
    if overall >= 90.0 && verification_level >= 3 {
        TrustTier::Elite
    } else if overall >= 70.0 && verification_level >= 2 {
        TrustTier::Trusted
    } else if verification_level >= 1 {
        TrustTier::Verified
    } else {
        TrustTier::Unverified
    }
}
