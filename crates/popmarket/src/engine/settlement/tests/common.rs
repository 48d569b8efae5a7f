use chrono::NaiveDate;

use crate::engine::fraud::cancellation::CancellationPolicy;
use crate::engine::settlement::{
    AgreedTerms, ContentRights, PaymentSchedule, PerformanceBonus, SalesReport,
};

pub(super) fn execution_completed_on() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 8, 18).expect("valid date")
}

pub(super) fn terms(base_fee: i64, commission_rate: f64) -> AgreedTerms {
    AgreedTerms {
        base_fee,
        commission_rate,
        performance_bonus: None,
        payment_schedule: PaymentSchedule::LumpSum,
        exclusive: false,
        content_rights: ContentRights::Shared,
        cancellation: CancellationPolicy::standard(),
    }
}

pub(super) fn terms_with_bonus(
    base_fee: i64,
    commission_rate: f64,
    threshold: i64,
    bonus_amount: i64,
) -> AgreedTerms {
    let mut terms = terms(base_fee, commission_rate);
    terms.performance_bonus = Some(PerformanceBonus {
        threshold,
        bonus_amount,
    });
    terms
}

pub(super) fn report(gross: i64, refunds: i64, attributed: i64) -> SalesReport {
    SalesReport {
        gross_sales: gross,
        refunds,
        leader_attributed_sales: attributed,
    }
}
