use serde::{Deserialize, Serialize};

use super::domain::{SettlementData, SettlementStatus};

/// Sales, attendance, and referral counts from one side of the reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityFigures {
    pub sales: i64,
    pub attendance: u32,
    pub referrals: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    Pending,
    Disputed,
}

impl AuditStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Disputed => "disputed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalParty {
    Leader,
    Brand,
    Platform,
}

impl ApprovalParty {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Leader => "leader",
            Self::Brand => "brand",
            Self::Platform => "platform",
        }
    }
}

/// Three-party sign-off quorum. Funds release requires every named flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementApprovals {
    pub leader: bool,
    pub brand: bool,
    pub platform: bool,
}

impl SettlementApprovals {
    pub fn all_approved(&self) -> bool {
        self.leader && self.brand && self.platform
    }

    fn slot(&mut self, party: ApprovalParty) -> &mut bool {
        match party {
            ApprovalParty::Leader => &mut self.leader,
            ApprovalParty::Brand => &mut self.brand,
            ApprovalParty::Platform => &mut self.platform,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("{} already approved this settlement", .0.label())]
    DuplicateApproval(ApprovalParty),
    #[error("settlement audit is disputed; payout is halted pending resolution")]
    Disputed,
    #[error("missing approvals: {missing:?}")]
    MissingApprovals { missing: Vec<&'static str> },
    #[error("settlement is already completed")]
    AlreadyCompleted,
}

/// Reconciliation outcome. The figures are frozen at creation; only the approval
/// quorum advances afterward, so the underlying trail survives any dispute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    reported: ActivityFigures,
    verified: ActivityFigures,
    sales_discrepancy: i64,
    status: AuditStatus,
    approvals: SettlementApprovals,
}

impl AuditRecord {
    pub fn reported(&self) -> ActivityFigures {
        self.reported
    }

    pub fn verified(&self) -> ActivityFigures {
        self.verified
    }

    pub fn sales_discrepancy(&self) -> i64 {
        self.sales_discrepancy
    }

    pub fn status(&self) -> AuditStatus {
        self.status
    }

    pub fn approvals(&self) -> SettlementApprovals {
        self.approvals
    }

    /// Records one party's sign-off. Re-approval is rejected rather than ignored so
    /// duplicate submissions are visible to the caller.
    pub fn approve(&mut self, party: ApprovalParty) -> Result<(), AuditError> {
        let slot = self.approvals.slot(party);
        if *slot {
            return Err(AuditError::DuplicateApproval(party));
        }
        *slot = true;
        Ok(())
    }

    pub fn release_ready(&self) -> bool {
        self.status == AuditStatus::Pending && self.approvals.all_approved()
    }

    /// Marks the settlement completed once the quorum is satisfied.
    ///
    /// A disputed audit halts the payout; it never crashes and never loses the
    /// reconciled figures.
    pub fn release(&self, settlement: &mut SettlementData) -> Result<(), AuditError> {
        if settlement.status == SettlementStatus::Completed {
            return Err(AuditError::AlreadyCompleted);
        }
        if self.status == AuditStatus::Disputed {
            return Err(AuditError::Disputed);
        }
        if !self.approvals.all_approved() {
            let mut missing = Vec::new();
            if !self.approvals.leader {
                missing.push(ApprovalParty::Leader.label());
            }
            if !self.approvals.brand {
                missing.push(ApprovalParty::Brand.label());
            }
            if !self.approvals.platform {
                missing.push(ApprovalParty::Platform.label());
            }
            return Err(AuditError::MissingApprovals { missing });
        }

        settlement.status = SettlementStatus::Completed;
        Ok(())
    }
}

/// Reconciles reported against verified campaign figures.
pub struct SettlementAuditor {
    dispute_threshold: f64,
}

impl Default for SettlementAuditor {
    fn default() -> Self {
        Self {
            dispute_threshold: 0.05,
        }
    }
}

impl SettlementAuditor {
    pub fn new(dispute_threshold: f64) -> Self {
        Self { dispute_threshold }
    }

    pub fn reconcile(&self, reported: ActivityFigures, verified: ActivityFigures) -> AuditRecord {
        let sales_discrepancy = (reported.sales - verified.sales).abs();
        let tolerated = self.dispute_threshold * reported.sales.max(0) as f64;
        let status = if sales_discrepancy as f64 > tolerated {
            AuditStatus::Disputed
        } else {
            AuditStatus::Pending
        };

        AuditRecord {
            reported,
            verified,
            sales_discrepancy,
            status,
            approvals: SettlementApprovals::default(),
        }
    }
}
