//! Financial settlement: fee splitting across platform, brand, and leader, payout
//! scheduling, and the reported-vs-verified audit that gates funds release.

mod auditor;
mod calculator;
pub mod domain;

#[cfg(test)]
mod tests;

pub use auditor::{
    ActivityFigures, ApprovalParty, AuditError, AuditRecord, AuditStatus, SettlementApprovals,
    SettlementAuditor,
};
pub use calculator::{FeeSchedule, SettlementCalculator, SettlementInputError};
pub use domain::{
    AgreedTerms, ContentRights, FeeBreakdown, PaymentSchedule, PayoutParty, PayoutRecord,
    PerformanceBonus, SalesReport, SettlementData, SettlementStatus,
};
