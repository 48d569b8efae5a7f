use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::domain::{
    AgreedTerms, FeeBreakdown, PayoutParty, PayoutRecord, SalesReport, SettlementData,
    SettlementStatus,
};

/// Platform-wide fee rates and payout offsets.
///
/// Leaders are paid a week ahead of brands: a fast leader payout keeps influencers
/// committed to future campaigns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub platform_rate: f64,
    /// Charged on gross, not net: refunded transactions still incurred processing.
    pub processing_rate: f64,
    pub leader_payout_offset_days: i64,
    pub brand_payout_offset_days: i64,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            platform_rate: 0.15,
            processing_rate: 0.03,
            leader_payout_offset_days: 7,
            brand_payout_offset_days: 14,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettlementInputError {
    #[error("{field} must be non-negative, got {value}")]
    NegativeFigure { field: &'static str, value: i64 },
    #[error("refunds {refunds} exceed gross sales {gross}")]
    RefundsExceedGross { gross: i64, refunds: i64 },
    #[error("leader-attributed sales {attributed} exceed gross sales {gross}")]
    AttributedExceedsGross { gross: i64, attributed: i64 },
    #[error("commission rate must be in [0, 1], got {0}")]
    CommissionRateOutOfRange(f64),
}

/// Computes the final fee split and payout schedule for a settled campaign.
pub struct SettlementCalculator {
    fees: FeeSchedule,
}

impl Default for SettlementCalculator {
    fn default() -> Self {
        Self::new(FeeSchedule::default())
    }
}

impl SettlementCalculator {
    pub fn new(fees: FeeSchedule) -> Self {
        Self { fees }
    }

    pub fn fees(&self) -> &FeeSchedule {
        &self.fees
    }

    pub fn settle(
        &self,
        terms: &AgreedTerms,
        report: &SalesReport,
        execution_completed_on: NaiveDate,
    ) -> Result<SettlementData, SettlementInputError> {
        validate(terms, report)?;

        let net_sales = report.gross_sales - report.refunds;
        let direct_sales = net_sales - report.leader_attributed_sales;

        let platform_fee = apply_rate(net_sales, self.fees.platform_rate);
        let payment_processing_fee = apply_rate(report.gross_sales, self.fees.processing_rate);

        let leader_commission =
            apply_rate(report.leader_attributed_sales, terms.commission_rate);
        let leader_bonus = terms
            .performance_bonus
            .filter(|bonus| net_sales > bonus.threshold)
            .map(|bonus| bonus.bonus_amount)
            .unwrap_or(0);
        let leader_total = terms.base_fee + leader_commission + leader_bonus;

        let brand_net_revenue = net_sales - platform_fee - payment_processing_fee - leader_total;

        let breakdown = FeeBreakdown {
            gross_sales: report.gross_sales,
            refunds: report.refunds,
            net_sales,
            direct_sales,
            platform_fee,
            payment_processing_fee,
            leader_base_fee: terms.base_fee,
            leader_commission,
            leader_bonus,
            leader_total,
            brand_net_revenue,
        };

        let mut payouts = vec![PayoutRecord {
            payee: PayoutParty::Leader,
            amount: leader_total,
            scheduled_on: execution_completed_on
                + Duration::days(self.fees.leader_payout_offset_days),
        }];
        // An underwater brand has nothing to receive; the negative figure stays on
        // the breakdown for dispute handling.
        if brand_net_revenue > 0 {
            payouts.push(PayoutRecord {
                payee: PayoutParty::Brand,
                amount: brand_net_revenue,
                scheduled_on: execution_completed_on
                    + Duration::days(self.fees.brand_payout_offset_days),
            });
        }

        Ok(SettlementData {
            breakdown,
            payouts,
            status: SettlementStatus::Pending,
            execution_completed_on,
        })
    }
}

fn validate(terms: &AgreedTerms, report: &SalesReport) -> Result<(), SettlementInputError> {
    for (field, value) in [
        ("gross sales", report.gross_sales),
        ("refunds", report.refunds),
        ("leader-attributed sales", report.leader_attributed_sales),
        ("base fee", terms.base_fee),
    ] {
        if value < 0 {
            return Err(SettlementInputError::NegativeFigure { field, value });
        }
    }
    if report.refunds > report.gross_sales {
        return Err(SettlementInputError::RefundsExceedGross {
            gross: report.gross_sales,
            refunds: report.refunds,
        });
    }
    if report.leader_attributed_sales > report.gross_sales {
        return Err(SettlementInputError::AttributedExceedsGross {
            gross: report.gross_sales,
            attributed: report.leader_attributed_sales,
        });
    }
    if !(0.0..=1.0).contains(&terms.commission_rate) {
        return Err(SettlementInputError::CommissionRateOutOfRange(
            terms.commission_rate,
        ));
    }
    Ok(())
}

fn apply_rate(amount: i64, rate: f64) -> i64 {
    (amount as f64 * rate).round() as i64
}
