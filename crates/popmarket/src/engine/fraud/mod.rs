//! Anti-fraud and trust evaluators consulted as decision inputs across the deal
//! pipeline. Every evaluator here is a deterministic function over its explicit
//! inputs plus a caller-supplied clock; none holds state between invocations.

pub mod cancellation;
pub mod comparables;
pub mod no_show;
pub mod price;
pub mod trust;

#[cfg(test)]
mod tests;

pub use cancellation::{
    CancellationPolicy, CancellationRule, ExceptionKind, PolicyException, RefundBreakdown,
    RefundError,
};
pub use comparables::{parse_comparables, ComparablesImportError};
pub use no_show::{
    AttendanceHistory, NoShowInputError, NoShowProfile, NoShowRisk, NoShowRiskPredictor, RiskBand,
};
pub use price::{
    FairnessReview, MarketComparable, PriceEvaluationError, PriceFairnessEvaluator, PriceVerdict,
    PricingThresholds,
};
pub use trust::{
    TrustEvent, TrustEventCategory, TrustInputError, TrustMetrics, TrustScore, TrustScoreEngine,
    TrustTier, TrustWeights,
};
