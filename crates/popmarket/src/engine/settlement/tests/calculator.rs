use chrono::Duration;

use super::common::*;
use crate::engine::settlement::{
    PayoutParty, SettlementCalculator, SettlementInputError, SettlementStatus,
};

#[test]
fn splits_a_typical_campaign_exactly() {
    let settlement = SettlementCalculator::default()
        .settle(
            &terms(200_000, 0.10),
            &report(10_000_000, 500_000, 3_000_000),
            execution_completed_on(),
        )
        .expect("settlement");

    let breakdown = settlement.breakdown;
    assert_eq!(breakdown.net_sales, 9_500_000);
    assert_eq!(breakdown.direct_sales, 6_500_000);
    assert_eq!(breakdown.platform_fee, 1_425_000);
    assert_eq!(breakdown.payment_processing_fee, 300_000);
    assert_eq!(breakdown.leader_commission, 300_000);
    assert_eq!(breakdown.leader_bonus, 0);
    assert_eq!(breakdown.leader_total, 500_000);
    assert_eq!(breakdown.brand_net_revenue, 7_275_000);
    assert_eq!(settlement.status, SettlementStatus::Pending);
}

#[test]
fn money_is_conserved_across_inputs() {
    let calculator = SettlementCalculator::default();
    let cases = [
        (10_000_000, 500_000, 3_000_000, 200_000, 0.10),
        (1_234_567, 111_111, 600_000, 50_000, 0.07),
        (999_999, 0, 999_999, 0, 0.25),
        (5_000, 5_000, 0, 0, 0.10),
    ];

    for (gross, refunds, attributed, base_fee, rate) in cases {
        let settlement = calculator
            .settle(
                &terms(base_fee, rate),
                &report(gross, refunds, attributed),
                execution_completed_on(),
            )
            .expect("settlement");

        let breakdown = settlement.breakdown;
        assert_eq!(
            breakdown.platform_fee
                + breakdown.payment_processing_fee
                + breakdown.leader_total
                + breakdown.brand_net_revenue,
            breakdown.net_sales,
            "conservation failed for gross {gross}"
        );
    }
}

#[test]
fn bonus_requires_net_sales_strictly_above_threshold() {
    let calculator = SettlementCalculator::default();
    let contract = terms_with_bonus(100_000, 0.10, 9_500_000, 250_000);

    let at_threshold = calculator
        .settle(
            &contract,
            &report(10_000_000, 500_000, 1_000_000),
            execution_completed_on(),
        )
        .expect("settlement");
    assert_eq!(at_threshold.breakdown.leader_bonus, 0);

    let above_threshold = calculator
        .settle(
            &contract,
            &report(10_000_001, 500_000, 1_000_000),
            execution_completed_on(),
        )
        .expect("settlement");
    assert_eq!(above_threshold.breakdown.leader_bonus, 250_000);
    assert_eq!(
        above_threshold.breakdown.leader_total,
        100_000 + 100_000 + 250_000
    );
}

#[test]
fn processing_fee_is_charged_on_gross_not_net() {
    let settlement = SettlementCalculator::default()
        .settle(
            &terms(0, 0.0),
            &report(1_000_000, 1_000_000, 0),
            execution_completed_on(),
        )
        .expect("settlement");

    let breakdown = settlement.breakdown;
    assert_eq!(breakdown.net_sales, 0);
    assert_eq!(breakdown.payment_processing_fee, 30_000);
    assert_eq!(breakdown.brand_net_revenue, -30_000);
}

#[test]
fn negative_brand_revenue_is_surfaced_not_clamped() {
    let settlement = SettlementCalculator::default()
        .settle(
            &terms(500_000, 0.10),
            &report(400_000, 100_000, 200_000),
            execution_completed_on(),
        )
        .expect("settlement");

    assert!(settlement.brand_underwater());
    assert!(settlement.breakdown.brand_net_revenue < 0);
    assert!(settlement
        .payouts
        .iter()
        .all(|payout| payout.payee != PayoutParty::Brand));
}

#[test]
fn leader_is_paid_a_week_before_the_brand() {
    let settlement = SettlementCalculator::default()
        .settle(
            &terms(200_000, 0.10),
            &report(10_000_000, 500_000, 3_000_000),
            execution_completed_on(),
        )
        .expect("settlement");

    let leader = settlement
        .payouts
        .iter()
        .find(|payout| payout.payee == PayoutParty::Leader)
        .expect("leader payout");
    let brand = settlement
        .payouts
        .iter()
        .find(|payout| payout.payee == PayoutParty::Brand)
        .expect("brand payout");

    assert_eq!(
        leader.scheduled_on,
        execution_completed_on() + Duration::days(7)
    );
    assert_eq!(
        brand.scheduled_on,
        execution_completed_on() + Duration::days(14)
    );
    assert_eq!(leader.amount, settlement.breakdown.leader_total);
    assert_eq!(brand.amount, settlement.breakdown.brand_net_revenue);
}

#[test]
fn rejects_refunds_exceeding_gross() {
    let result = SettlementCalculator::default().settle(
        &terms(0, 0.10),
        &report(100_000, 200_000, 0),
        execution_completed_on(),
    );
    assert!(matches!(
        result,
        Err(SettlementInputError::RefundsExceedGross { .. })
    ));
}

#[test]
fn rejects_attributed_sales_exceeding_gross() {
    let result = SettlementCalculator::default().settle(
        &terms(0, 0.10),
        &report(100_000, 0, 150_000),
        execution_completed_on(),
    );
    assert!(matches!(
        result,
        Err(SettlementInputError::AttributedExceedsGross { .. })
    ));
}

#[test]
fn rejects_negative_figures_and_bad_commission_rate() {
    let calculator = SettlementCalculator::default();

    let negative = calculator.settle(
        &terms(0, 0.10),
        &report(-1, 0, 0),
        execution_completed_on(),
    );
    assert!(matches!(
        negative,
        Err(SettlementInputError::NegativeFigure { .. })
    ));

    let bad_rate = calculator.settle(
        &terms(0, 1.5),
        &report(100_000, 0, 0),
        execution_completed_on(),
    );
    assert!(matches!(
        bad_rate,
        Err(SettlementInputError::CommissionRateOutOfRange(_))
    ));
}
