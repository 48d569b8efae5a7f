use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::engine::fraud::cancellation::CancellationPolicy;

/// Bonus clause: paid in full once net sales clear the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceBonus {
    pub threshold: i64,
    pub bonus_amount: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentSchedule {
    LumpSum,
    SplitUpfront { upfront_rate: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentRights {
    BrandOwned,
    Shared,
    LeaderOwned,
}

/// Contractual terms frozen at signing. Referenced, never copied, by settlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgreedTerms {
    pub base_fee: i64,
    pub commission_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_bonus: Option<PerformanceBonus>,
    pub payment_schedule: PaymentSchedule,
    pub exclusive: bool,
    pub content_rights: ContentRights,
    pub cancellation: CancellationPolicy,
}

/// Realized campaign figures reported after execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesReport {
    pub gross_sales: i64,
    pub refunds: i64,
    pub leader_attributed_sales: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutParty {
    Leader,
    Brand,
}

impl PayoutParty {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Leader => "leader",
            Self::Brand => "brand",
        }
    }
}

/// One scheduled transfer for the payment collaborator to execute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutRecord {
    pub payee: PayoutParty,
    pub amount: i64,
    pub scheduled_on: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementStatus {
    Pending,
    Completed,
}

impl SettlementStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

/// Full fee split for one settled campaign.
///
/// `brand_net_revenue` may legitimately be negative when fees and the leader payout
/// exceed net sales; it is surfaced as-is so the settlement can be disputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeBreakdown {
    pub gross_sales: i64,
    pub refunds: i64,
    pub net_sales: i64,
    pub direct_sales: i64,
    pub platform_fee: i64,
    pub payment_processing_fee: i64,
    pub leader_base_fee: i64,
    pub leader_commission: i64,
    pub leader_bonus: i64,
    pub leader_total: i64,
    pub brand_net_revenue: i64,
}

/// Settlement output produced once per campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementData {
    pub breakdown: FeeBreakdown,
    pub payouts: Vec<PayoutRecord>,
    pub status: SettlementStatus,
    pub execution_completed_on: NaiveDate,
}

impl SettlementData {
    /// True when the split leaves the brand underwater; such settlements should be
    /// routed to dispute handling rather than auto-released.
    pub fn brand_underwater(&self) -> bool {
        self.breakdown.brand_net_revenue < 0
    }
}
