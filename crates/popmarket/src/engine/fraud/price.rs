use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A market price observation used as a comparison point for an offered price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketComparable {
    pub price: i64,
    pub source: String,
    pub quoted_on: NaiveDate,
}

/// Verdict bands for the ratio of offered price to the market average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceVerdict {
    Fair,
    SlightlyHigh,
    Overpriced,
    Suspicious,
}

impl PriceVerdict {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Fair => "fair",
            Self::SlightlyHigh => "slightly_high",
            Self::Overpriced => "overpriced",
            Self::Suspicious => "suspicious",
        }
    }
}

/// Ratio breakpoints separating the verdict bands.
///
/// Defaults carry the Korean launch profile; other markets supply their own values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingThresholds {
    /// At or below this ratio the offer is unusually cheap but not penalized.
    pub cheap_ratio: f64,
    /// Upper edge of the fair band.
    pub fair_upper_ratio: f64,
    /// At or above this ratio the offer is overpriced.
    pub overpriced_ratio: f64,
    /// Above this ratio the offer is treated as suspicious.
    pub suspicious_ratio: f64,
}

impl Default for PricingThresholds {
    fn default() -> Self {
        Self {
            cheap_ratio: 0.85,
            fair_upper_ratio: 1.15,
            overpriced_ratio: 1.30,
            suspicious_ratio: 1.50,
        }
    }
}

/// Outcome of a fairness evaluation, carrying the evidence behind the verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FairnessReview {
    pub score: u8,
    pub verdict: PriceVerdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_average: Option<i64>,
    pub sample_size: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum PriceEvaluationError {
    #[error("offered price must be positive, got {0}")]
    NonPositiveOffer(i64),
    #[error("comparable from '{comparable_source}' has non-positive price {price}")]
    NonPositiveComparable { comparable_source: String, price: i64 },
}

const NEUTRAL_SCORE: u8 = 50;
const CHEAP_SCORE: f64 = 70.0;

/// Stateless evaluator comparing an offered price against market comparables.
pub struct PriceFairnessEvaluator {
    thresholds: PricingThresholds,
}

impl Default for PriceFairnessEvaluator {
    fn default() -> Self {
        Self::new(PricingThresholds::default())
    }
}

impl PriceFairnessEvaluator {
    pub fn new(thresholds: PricingThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &PricingThresholds {
        &self.thresholds
    }

    /// Scores an offered price against the comparables.
    ///
    /// An empty comparable set yields a neutral review rather than a penalty:
    /// insufficient data is not evidence of an unfair price.
    pub fn evaluate(
        &self,
        offered_price: i64,
        comparables: &[MarketComparable],
    ) -> Result<FairnessReview, PriceEvaluationError> {
        if offered_price <= 0 {
            return Err(PriceEvaluationError::NonPositiveOffer(offered_price));
        }
        if let Some(bad) = comparables.iter().find(|comparable| comparable.price <= 0) {
            return Err(PriceEvaluationError::NonPositiveComparable {
                comparable_source: bad.source.clone(),
                price: bad.price,
            });
        }

        if comparables.is_empty() {
            return Ok(FairnessReview {
                score: NEUTRAL_SCORE,
                verdict: PriceVerdict::Fair,
                ratio: None,
                market_average: None,
                sample_size: 0,
            });
        }

        let total: i64 = comparables.iter().map(|comparable| comparable.price).sum();
        let average = total as f64 / comparables.len() as f64;
        let ratio = offered_price as f64 / average;

        let (verdict, raw_score) = self.band(ratio);

        Ok(FairnessReview {
            score: clamp_score(raw_score),
            verdict,
            ratio: Some(ratio),
            market_average: Some(average.round() as i64),
            sample_size: comparables.len(),
        })
    }

    fn band(&self, ratio: f64) -> (PriceVerdict, f64) {
        let t = &self.thresholds;

        if ratio <= t.cheap_ratio {
            return (PriceVerdict::Fair, CHEAP_SCORE);
        }
        if ratio <= t.fair_upper_ratio {
            // 100 at the market average, decaying to the cheap-band score at both edges.
            let span = t.fair_upper_ratio - 1.0;
            let decay = (100.0 - CHEAP_SCORE) / span;
            return (PriceVerdict::Fair, 100.0 - (ratio - 1.0).abs() * decay);
        }
        if ratio < t.overpriced_ratio {
            let span = t.overpriced_ratio - t.fair_upper_ratio;
            let decay = (CHEAP_SCORE - 40.0) / span;
            return (
                PriceVerdict::SlightlyHigh,
                CHEAP_SCORE - (ratio - t.fair_upper_ratio) * decay,
            );
        }
        if ratio <= t.suspicious_ratio {
            let span = t.suspicious_ratio - t.overpriced_ratio;
            let decay = (40.0 - 20.0) / span;
            return (
                PriceVerdict::Overpriced,
                40.0 - (ratio - t.overpriced_ratio) * decay,
            );
        }

        (
            PriceVerdict::Suspicious,
            20.0 - (ratio - t.suspicious_ratio) * 40.0,
        )
    }
}

fn clamp_score(raw: f64) -> u8 {
    raw.round().clamp(0.0, 100.0) as u8
}
