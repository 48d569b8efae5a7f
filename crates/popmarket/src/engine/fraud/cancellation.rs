use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One refund band: applies when the cancellation lands at least
/// `days_before_event` whole days before the event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CancellationRule {
    pub days_before_event: i64,
    pub penalty_rate: f64,
    pub refund_rate: f64,
}

/// Named cases that bypass the banded rules entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExceptionKind {
    BrandCancelled,
    ForceMajeure,
}

impl ExceptionKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::BrandCancelled => "brand_cancelled",
            Self::ForceMajeure => "force_majeure",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolicyException {
    pub kind: ExceptionKind,
    pub refund_rate: f64,
    pub penalty_rate: f64,
}

/// Time-banded refund policy generated per popup and consulted, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancellationPolicy {
    /// Rules ordered by `days_before_event` descending, strictest last.
    pub rules: Vec<CancellationRule>,
    pub exceptions: Vec<PolicyException>,
}

impl CancellationPolicy {
    /// The standard ladder applied to consumer pledges: full refund a week out,
    /// nothing on the day of the event.
    pub fn standard() -> Self {
        Self {
            rules: vec![
                CancellationRule {
                    days_before_event: 7,
                    penalty_rate: 0.0,
                    refund_rate: 1.0,
                },
                CancellationRule {
                    days_before_event: 3,
                    penalty_rate: 0.5,
                    refund_rate: 0.5,
                },
                CancellationRule {
                    days_before_event: 1,
                    penalty_rate: 0.8,
                    refund_rate: 0.2,
                },
                CancellationRule {
                    days_before_event: 0,
                    penalty_rate: 1.0,
                    refund_rate: 0.0,
                },
            ],
            exceptions: vec![
                PolicyException {
                    kind: ExceptionKind::BrandCancelled,
                    refund_rate: 1.0,
                    penalty_rate: 0.0,
                },
                PolicyException {
                    kind: ExceptionKind::ForceMajeure,
                    refund_rate: 1.0,
                    penalty_rate: 0.0,
                },
            ],
        }
    }

    /// Computes the refund/penalty split for a cancellation.
    ///
    /// The rule with the largest `days_before_event` not exceeding the actual day
    /// count wins; a cancellation closer to (or after) the event than any band falls
    /// through to the strictest rule. A recognized exception overrides the bands.
    pub fn refund_breakdown(
        &self,
        event_date: NaiveDate,
        cancelled_on: NaiveDate,
        amount: i64,
        exception: Option<ExceptionKind>,
    ) -> Result<RefundBreakdown, RefundError> {
        if amount < 0 {
            return Err(RefundError::NegativeAmount(amount));
        }

        let days_before_event = (event_date - cancelled_on).num_days();

        if let Some(kind) = exception {
            if let Some(matched) = self
                .exceptions
                .iter()
                .find(|exception| exception.kind == kind)
            {
                return Ok(RefundBreakdown {
                    refund_amount: apply_rate(amount, matched.refund_rate),
                    penalty_amount: apply_rate(amount, matched.penalty_rate),
                    days_before_event,
                    matched_rule: None,
                    exception: Some(kind),
                });
            }
            return Err(RefundError::UnknownException(kind));
        }

        let matched = self
            .rules
            .iter()
            .filter(|rule| rule.days_before_event <= days_before_event)
            .max_by_key(|rule| rule.days_before_event)
            .or_else(|| self.rules.iter().min_by_key(|rule| rule.days_before_event))
            .ok_or(RefundError::EmptyPolicy)?;

        Ok(RefundBreakdown {
            refund_amount: apply_rate(amount, matched.refund_rate),
            penalty_amount: apply_rate(amount, matched.penalty_rate),
            days_before_event,
            matched_rule: Some(*matched),
            exception: None,
        })
    }
}

fn apply_rate(amount: i64, rate: f64) -> i64 {
    (amount as f64 * rate).round() as i64
}

/// Refund computation output, keeping the matched rule for audit trails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundBreakdown {
    pub refund_amount: i64,
    pub penalty_amount: i64,
    pub days_before_event: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_rule: Option<CancellationRule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception: Option<ExceptionKind>,
}

#[derive(Debug, thiserror::Error)]
pub enum RefundError {
    #[error("cancellation policy has no rules")]
    EmptyPolicy,
    #[error("cancellation amount must be non-negative, got {0}")]
    NegativeAmount(i64),
    #[error("policy does not define the '{}' exception", .0.label())]
    UnknownException(ExceptionKind),
}
