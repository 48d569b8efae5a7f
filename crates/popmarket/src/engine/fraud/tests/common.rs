use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use crate::engine::fraud::price::{MarketComparable, PriceFairnessEvaluator};
use crate::engine::fraud::trust::{TrustEvent, TrustEventCategory, TrustMetrics};

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn quote_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, 20).expect("valid date")
}

pub(super) fn comparables(prices: &[i64]) -> Vec<MarketComparable> {
    prices
        .iter()
        .map(|price| MarketComparable {
            price: *price,
            source: "naver-place".to_string(),
            quoted_on: quote_date(),
        })
        .collect()
}

pub(super) fn evaluator() -> PriceFairnessEvaluator {
    PriceFairnessEvaluator::default()
}

pub(super) fn metrics(
    completion_rate: f64,
    avg_satisfaction: f64,
    dispute_rate: f64,
    verification_level: u8,
) -> TrustMetrics {
    TrustMetrics {
        completion_rate,
        avg_satisfaction,
        dispute_rate,
        verification_level,
    }
}

pub(super) fn event(days_ago: i64, impact: i8) -> TrustEvent {
    TrustEvent {
        occurred_at: now() - Duration::days(days_ago),
        impact,
        category: if impact >= 0 {
            TrustEventCategory::DealCompleted
        } else {
            TrustEventCategory::DealCancelled
        },
        note: format!("deal event {days_ago} day(s) ago"),
    }
}
