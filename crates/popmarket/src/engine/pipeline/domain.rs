use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::fraud::cancellation::RefundBreakdown;
use crate::engine::fraud::price::FairnessReview;
use crate::engine::settlement::{AgreedTerms, AuditRecord, SalesReport, SettlementData};

/// Identifier wrapper for deal pipelines.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PipelineId(pub String);

/// Acting party on a pipeline, supplied by the identity collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Leader,
    Brand,
    Platform,
}

impl ActorRole {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Leader => "leader",
            Self::Brand => "brand",
            Self::Platform => "platform",
        }
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Deal lifecycle stages. The forward order is fixed; `Cancelled` is reachable from
/// any non-terminal stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealStage {
    Proposal,
    Matching,
    Negotiation,
    Contract,
    Funding,
    Execution,
    Settlement,
    Completed,
    Cancelled,
}

impl DealStage {
    /// Forward stages in lifecycle order, used for conversion metrics.
    pub const fn forward() -> [Self; 8] {
        [
            Self::Proposal,
            Self::Matching,
            Self::Negotiation,
            Self::Contract,
            Self::Funding,
            Self::Execution,
            Self::Settlement,
            Self::Completed,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Proposal => "proposal",
            Self::Matching => "matching",
            Self::Negotiation => "negotiation",
            Self::Contract => "contract",
            Self::Funding => "funding",
            Self::Execution => "execution",
            Self::Settlement => "settlement",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for DealStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The leader's campaign pitch, frozen at submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalBlock {
    pub leader_id: String,
    pub brand_category: String,
    pub concept: String,
    pub target_region: String,
    pub expected_participants: u32,
    pub min_participants: u32,
    pub proposed_price: i64,
    pub event_date: NaiveDate,
    pub submitted_at: DateTime<Utc>,
}

/// A brand accepted the match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingBlock {
    pub proposal: ProposalBlock,
    pub brand_id: String,
    pub matched_at: DateTime<Utc>,
}

/// One offer exchanged during negotiation, with its price-fairness review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealOffer {
    pub offered_by: ActorRole,
    pub price: i64,
    pub terms: AgreedTerms,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fairness: Option<FairnessReview>,
    pub offered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegotiationBlock {
    pub matching: MatchingBlock,
    pub offers: Vec<DealOffer>,
    /// Index into `offers` once the counterparty accepts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_offer: Option<usize>,
    pub started_at: DateTime<Utc>,
}

impl NegotiationBlock {
    pub fn accepted(&self) -> Option<&DealOffer> {
        self.accepted_offer.and_then(|index| self.offers.get(index))
    }
}

/// Terms frozen from the accepted offer, awaiting signatures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractBlock {
    pub negotiation: NegotiationBlock,
    pub terms: AgreedTerms,
    pub agreed_price: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leader_signed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_signed_at: Option<DateTime<Utc>>,
    pub drafted_at: DateTime<Utc>,
}

impl ContractBlock {
    pub fn fully_signed(&self) -> bool {
        self.leader_signed_at.is_some() && self.brand_signed_at.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundingBlock {
    pub contract: ContractBlock,
    pub min_participants: u32,
    pub pledged_participants: u32,
    pub pledged_amount: i64,
    pub threshold_overridden: bool,
    pub opened_at: DateTime<Utc>,
}

impl FundingBlock {
    pub fn threshold_met(&self) -> bool {
        self.pledged_participants >= self.min_participants
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionBlock {
    pub funding: FundingBlock,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementBlock {
    pub execution: ExecutionBlock,
    pub execution_completed_at: DateTime<Utc>,
    pub report: SalesReport,
    pub data: SettlementData,
    pub audit: AuditRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedBlock {
    pub settlement: SettlementBlock,
    pub completed_at: DateTime<Utc>,
}

/// Terminal record of an abandoned deal. The prior state is kept whole for audit;
/// `refund` is present when funds had already moved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelledBlock {
    pub prior: Box<StageState>,
    pub stage_at_cancellation: DealStage,
    pub reason: String,
    pub cancelled_by: ActorRole,
    pub cancelled_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund: Option<RefundBreakdown>,
}

/// Tagged union over the lifecycle. Every variant owns its stage's data block plus
/// the frozen blocks of all earlier stages, so an illegal stage/data combination
/// cannot be constructed and history cannot be rewritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum StageState {
    Proposal(ProposalBlock),
    Matching(MatchingBlock),
    Negotiation(NegotiationBlock),
    Contract(ContractBlock),
    Funding(FundingBlock),
    Execution(ExecutionBlock),
    Settlement(SettlementBlock),
    Completed(CompletedBlock),
    Cancelled(CancelledBlock),
}

impl StageState {
    pub fn stage(&self) -> DealStage {
        match self {
            Self::Proposal(_) => DealStage::Proposal,
            Self::Matching(_) => DealStage::Matching,
            Self::Negotiation(_) => DealStage::Negotiation,
            Self::Contract(_) => DealStage::Contract,
            Self::Funding(_) => DealStage::Funding,
            Self::Execution(_) => DealStage::Execution,
            Self::Settlement(_) => DealStage::Settlement,
            Self::Completed(_) => DealStage::Completed,
            Self::Cancelled(_) => DealStage::Cancelled,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed(_) | Self::Cancelled(_))
    }

    /// The original proposal, reachable from every stage.
    pub fn proposal(&self) -> &ProposalBlock {
        match self {
            Self::Proposal(block) => block,
            Self::Matching(block) => &block.proposal,
            Self::Negotiation(block) => &block.matching.proposal,
            Self::Contract(block) => &block.negotiation.matching.proposal,
            Self::Funding(block) => &block.contract.negotiation.matching.proposal,
            Self::Execution(block) => &block.funding.contract.negotiation.matching.proposal,
            Self::Settlement(block) => {
                &block.execution.funding.contract.negotiation.matching.proposal
            }
            Self::Completed(block) => {
                &block
                    .settlement
                    .execution
                    .funding
                    .contract
                    .negotiation
                    .matching
                    .proposal
            }
            Self::Cancelled(block) => block.prior.proposal(),
        }
    }

    /// The funding block, once that stage has been entered.
    pub fn funding(&self) -> Option<&FundingBlock> {
        match self {
            Self::Funding(block) => Some(block),
            Self::Execution(block) => Some(&block.funding),
            Self::Settlement(block) => Some(&block.execution.funding),
            Self::Completed(block) => Some(&block.settlement.execution.funding),
            Self::Cancelled(block) => block.prior.funding(),
            _ => None,
        }
    }

    /// The frozen contract terms, once signing has begun.
    pub fn contract(&self) -> Option<&ContractBlock> {
        match self {
            Self::Contract(block) => Some(block),
            Self::Funding(block) => Some(&block.contract),
            Self::Execution(block) => Some(&block.funding.contract),
            Self::Settlement(block) => Some(&block.execution.funding.contract),
            Self::Completed(block) => Some(&block.settlement.execution.funding.contract),
            Self::Cancelled(block) => block.prior.contract(),
            _ => None,
        }
    }

    pub fn settlement(&self) -> Option<&SettlementBlock> {
        match self {
            Self::Settlement(block) => Some(block),
            Self::Completed(block) => Some(&block.settlement),
            Self::Cancelled(block) => block.prior.settlement(),
            _ => None,
        }
    }
}

/// One entry in the append-only transition log. The timeline is the sole source of
/// stage-duration metrics and is never edited retroactively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub stage: DealStage,
    pub actor: ActorRole,
    pub occurred_at: DateTime<Utc>,
    pub description: String,
}

/// One leader-initiated campaign. `version` backs optimistic-concurrency writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub id: PipelineId,
    pub version: u64,
    pub state: StageState,
    pub timeline: Vec<TimelineEvent>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Pipeline {
    pub fn stage(&self) -> DealStage {
        self.state.stage()
    }

    pub(crate) fn record(
        &mut self,
        stage: DealStage,
        actor: ActorRole,
        now: DateTime<Utc>,
        description: String,
    ) {
        self.timeline.push(TimelineEvent {
            stage,
            actor,
            occurred_at: now,
            description,
        });
        self.updated_at = now;
    }
}
