use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    ActorRole, CancelledBlock, CompletedBlock, ContractBlock, DealOffer, DealStage, ExecutionBlock,
    FundingBlock, MatchingBlock, NegotiationBlock, Pipeline, SettlementBlock, StageState,
};
use crate::engine::fraud::cancellation::RefundError;
use crate::engine::fraud::price::{MarketComparable, PriceEvaluationError, PriceFairnessEvaluator};
use crate::engine::settlement::{
    ActivityFigures, AgreedTerms, ApprovalParty, AuditError, AuditStatus, SalesReport,
    SettlementAuditor, SettlementCalculator, SettlementInputError,
};

/// Every action a caller can attempt against a pipeline. Deserialized straight from
/// the transport layer; the machine decides legality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineAction {
    OpenMatching {
        brand_id: String,
    },
    StartNegotiation,
    SubmitOffer {
        price: i64,
        terms: AgreedTerms,
        #[serde(default)]
        comparables: Vec<MarketComparable>,
    },
    AcceptOffer,
    DraftContract,
    SignContract,
    OpenFunding,
    RecordPledge {
        participants: u32,
        amount: i64,
    },
    CloseFunding {
        #[serde(default)]
        override_threshold: bool,
    },
    BeginSettlement {
        report: SalesReport,
        reported: ActivityFigures,
        verified: ActivityFigures,
    },
    ApproveSettlement,
    CompleteSettlement,
    Cancel {
        reason: String,
    },
}

impl PipelineAction {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::OpenMatching { .. } => "open_matching",
            Self::StartNegotiation => "start_negotiation",
            Self::SubmitOffer { .. } => "submit_offer",
            Self::AcceptOffer => "accept_offer",
            Self::DraftContract => "draft_contract",
            Self::SignContract => "sign_contract",
            Self::OpenFunding => "open_funding",
            Self::RecordPledge { .. } => "record_pledge",
            Self::CloseFunding { .. } => "close_funding",
            Self::BeginSettlement { .. } => "begin_settlement",
            Self::ApproveSettlement => "approve_settlement",
            Self::CompleteSettlement => "complete_settlement",
            Self::Cancel { .. } => "cancel",
        }
    }
}

/// A rejected action always names the specific rule it violated.
#[derive(Debug, thiserror::Error)]
pub enum TransitionError {
    #[error("action '{action}' is not legal from the {stage} stage")]
    IllegalStage {
        action: &'static str,
        stage: DealStage,
    },
    #[error("action '{action}' requires the {required} role, attempted by {actor}")]
    RoleNotPermitted {
        action: &'static str,
        actor: ActorRole,
        required: ActorRole,
    },
    #[error("action '{action}' rejected: {reason}")]
    GateFailed {
        action: &'static str,
        reason: String,
    },
    #[error("action '{action}' was already applied")]
    Duplicate { action: &'static str },
    #[error(transparent)]
    Pricing(#[from] PriceEvaluationError),
    #[error(transparent)]
    SettlementInput(#[from] SettlementInputError),
    #[error(transparent)]
    Refund(#[from] RefundError),
    #[error(transparent)]
    Audit(#[from] AuditError),
}

fn illegal(action: &'static str, stage: DealStage) -> TransitionError {
    TransitionError::IllegalStage { action, stage }
}

fn gate(action: &'static str, reason: impl Into<String>) -> TransitionError {
    TransitionError::GateFailed {
        action,
        reason: reason.into(),
    }
}

fn required_role(action: &PipelineAction) -> Option<ActorRole> {
    match action {
        PipelineAction::OpenMatching { .. }
        | PipelineAction::DraftContract
        | PipelineAction::OpenFunding
        | PipelineAction::RecordPledge { .. }
        | PipelineAction::CloseFunding { .. }
        | PipelineAction::BeginSettlement { .. }
        | PipelineAction::CompleteSettlement => Some(ActorRole::Platform),
        PipelineAction::StartNegotiation => Some(ActorRole::Leader),
        PipelineAction::SubmitOffer { .. }
        | PipelineAction::AcceptOffer
        | PipelineAction::SignContract
        | PipelineAction::ApproveSettlement
        | PipelineAction::Cancel { .. } => None,
    }
}

/// Drives a pipeline through its lifecycle. Forward transitions consume the current
/// stage variant and produce the next; intra-stage actions mutate the current block
/// in place. Every applied action appends one timeline event.
pub struct PipelineStateMachine {
    pricing: PriceFairnessEvaluator,
    calculator: SettlementCalculator,
    auditor: SettlementAuditor,
}

impl Default for PipelineStateMachine {
    fn default() -> Self {
        Self::new(
            PriceFairnessEvaluator::default(),
            SettlementCalculator::default(),
            SettlementAuditor::default(),
        )
    }
}

impl PipelineStateMachine {
    pub fn new(
        pricing: PriceFairnessEvaluator,
        calculator: SettlementCalculator,
        auditor: SettlementAuditor,
    ) -> Self {
        Self {
            pricing,
            calculator,
            auditor,
        }
    }

    pub fn apply(
        &self,
        pipeline: &mut Pipeline,
        actor: ActorRole,
        action: PipelineAction,
        now: DateTime<Utc>,
    ) -> Result<(), TransitionError> {
        let name = action.name();

        if let Some(required) = required_role(&action) {
            if actor != required {
                return Err(TransitionError::RoleNotPermitted {
                    action: name,
                    actor,
                    required,
                });
            }
        }

        match action {
            PipelineAction::OpenMatching { brand_id } => {
                let StageState::Proposal(proposal) = &pipeline.state else {
                    return Err(illegal(name, pipeline.stage()));
                };
                if brand_id.trim().is_empty() {
                    return Err(gate(name, "brand id must not be empty"));
                }
                let block = MatchingBlock {
                    proposal: proposal.clone(),
                    brand_id: brand_id.clone(),
                    matched_at: now,
                };
                pipeline.state = StageState::Matching(block);
                pipeline.record(
                    DealStage::Matching,
                    actor,
                    now,
                    format!("matched with brand '{brand_id}'"),
                );
            }

            PipelineAction::StartNegotiation => {
                let StageState::Matching(matching) = &pipeline.state else {
                    return Err(illegal(name, pipeline.stage()));
                };
                let block = NegotiationBlock {
                    matching: matching.clone(),
                    offers: Vec::new(),
                    accepted_offer: None,
                    started_at: now,
                };
                pipeline.state = StageState::Negotiation(block);
                pipeline.record(
                    DealStage::Negotiation,
                    actor,
                    now,
                    "negotiation opened".to_string(),
                );
            }

            PipelineAction::SubmitOffer {
                price,
                terms,
                comparables,
            } => {
                if actor == ActorRole::Platform {
                    return Err(gate(name, "only the leader or the brand may submit an offer"));
                }
                let StageState::Negotiation(negotiation) = &mut pipeline.state else {
                    return Err(illegal(name, pipeline.stage()));
                };
                if negotiation.accepted_offer.is_some() {
                    return Err(gate(name, "an offer has already been accepted"));
                }
                let fairness = self.pricing.evaluate(price, &comparables)?;
                let description =
                    format!("{actor} offered {price} ({})", fairness.verdict.label());
                negotiation.offers.push(DealOffer {
                    offered_by: actor,
                    price,
                    terms,
                    fairness: Some(fairness),
                    offered_at: now,
                });
                pipeline.record(DealStage::Negotiation, actor, now, description);
            }

            PipelineAction::AcceptOffer => {
                if actor == ActorRole::Platform {
                    return Err(gate(name, "only the leader or the brand may accept an offer"));
                }
                let StageState::Negotiation(negotiation) = &mut pipeline.state else {
                    return Err(illegal(name, pipeline.stage()));
                };
                if negotiation.accepted_offer.is_some() {
                    return Err(TransitionError::Duplicate { action: name });
                }
                let Some(last) = negotiation.offers.last() else {
                    return Err(gate(name, "no offer on the table to accept"));
                };
                if last.offered_by == actor {
                    return Err(gate(name, "an offer cannot be accepted by its author"));
                }
                let price = last.price;
                negotiation.accepted_offer = Some(negotiation.offers.len() - 1);
                pipeline.record(
                    DealStage::Negotiation,
                    actor,
                    now,
                    format!("offer at {price} accepted"),
                );
            }

            PipelineAction::DraftContract => {
                let StageState::Negotiation(negotiation) = &pipeline.state else {
                    return Err(illegal(name, pipeline.stage()));
                };
                let Some(accepted) = negotiation.accepted() else {
                    return Err(gate(name, "no accepted offer to draft a contract from"));
                };
                let block = ContractBlock {
                    terms: accepted.terms.clone(),
                    agreed_price: accepted.price,
                    negotiation: negotiation.clone(),
                    leader_signed_at: None,
                    brand_signed_at: None,
                    drafted_at: now,
                };
                pipeline.state = StageState::Contract(block);
                pipeline.record(
                    DealStage::Contract,
                    actor,
                    now,
                    "contract drafted from accepted offer".to_string(),
                );
            }

            PipelineAction::SignContract => {
                let StageState::Contract(contract) = &mut pipeline.state else {
                    return Err(illegal(name, pipeline.stage()));
                };
                let slot = match actor {
                    ActorRole::Leader => &mut contract.leader_signed_at,
                    ActorRole::Brand => &mut contract.brand_signed_at,
                    ActorRole::Platform => {
                        return Err(gate(name, "the platform is not a contract signatory"));
                    }
                };
                if slot.is_some() {
                    return Err(TransitionError::Duplicate { action: name });
                }
                *slot = Some(now);
                pipeline.record(
                    DealStage::Contract,
                    actor,
                    now,
                    format!("{actor} signed the contract"),
                );
            }

            PipelineAction::OpenFunding => {
                let StageState::Contract(contract) = &pipeline.state else {
                    return Err(illegal(name, pipeline.stage()));
                };
                if !contract.fully_signed() {
                    let mut missing = Vec::new();
                    if contract.leader_signed_at.is_none() {
                        missing.push("leader");
                    }
                    if contract.brand_signed_at.is_none() {
                        missing.push("brand");
                    }
                    return Err(gate(
                        name,
                        format!("signatures outstanding: {}", missing.join(", ")),
                    ));
                }
                let contract = contract.clone();
                let min_participants = contract.negotiation.matching.proposal.min_participants;
                let block = FundingBlock {
                    contract,
                    min_participants,
                    pledged_participants: 0,
                    pledged_amount: 0,
                    threshold_overridden: false,
                    opened_at: now,
                };
                pipeline.state = StageState::Funding(block);
                pipeline.record(
                    DealStage::Funding,
                    actor,
                    now,
                    format!("funding opened; threshold {min_participants} participants"),
                );
            }

            PipelineAction::RecordPledge {
                participants,
                amount,
            } => {
                let StageState::Funding(funding) = &mut pipeline.state else {
                    return Err(illegal(name, pipeline.stage()));
                };
                if participants == 0 {
                    return Err(gate(name, "a pledge must add at least one participant"));
                }
                if amount < 0 {
                    return Err(gate(name, "pledge amount must be non-negative"));
                }
                funding.pledged_participants += participants;
                funding.pledged_amount += amount;
                let total = funding.pledged_participants;
                pipeline.record(
                    DealStage::Funding,
                    actor,
                    now,
                    format!("{participants} participant(s) pledged; {total} total"),
                );
            }

            PipelineAction::CloseFunding { override_threshold } => {
                let StageState::Funding(funding) = &pipeline.state else {
                    return Err(illegal(name, pipeline.stage()));
                };
                if !funding.threshold_met() && !override_threshold {
                    return Err(gate(
                        name,
                        format!(
                            "{}/{} participants pledged",
                            funding.pledged_participants, funding.min_participants
                        ),
                    ));
                }
                let mut funding = funding.clone();
                funding.threshold_overridden = override_threshold && !funding.threshold_met();
                pipeline.state = StageState::Execution(ExecutionBlock {
                    funding,
                    started_at: now,
                });
                pipeline.record(
                    DealStage::Execution,
                    actor,
                    now,
                    "funding closed; execution started".to_string(),
                );
            }

            PipelineAction::BeginSettlement {
                report,
                reported,
                verified,
            } => {
                let StageState::Execution(execution) = &pipeline.state else {
                    return Err(illegal(name, pipeline.stage()));
                };
                let data = self.calculator.settle(
                    &execution.funding.contract.terms,
                    &report,
                    now.date_naive(),
                )?;
                let audit = self.auditor.reconcile(reported, verified);
                let disputed = audit.status() == AuditStatus::Disputed;
                let block = SettlementBlock {
                    execution: execution.clone(),
                    execution_completed_at: now,
                    report,
                    data,
                    audit,
                };
                pipeline.state = StageState::Settlement(block);
                let description = if disputed {
                    "settlement computed; audit flagged disputed".to_string()
                } else {
                    "settlement computed; awaiting three-party approval".to_string()
                };
                pipeline.record(DealStage::Settlement, actor, now, description);
            }

            PipelineAction::ApproveSettlement => {
                let StageState::Settlement(settlement) = &mut pipeline.state else {
                    return Err(illegal(name, pipeline.stage()));
                };
                let party = match actor {
                    ActorRole::Leader => ApprovalParty::Leader,
                    ActorRole::Brand => ApprovalParty::Brand,
                    ActorRole::Platform => ApprovalParty::Platform,
                };
                settlement.audit.approve(party)?;
                pipeline.record(
                    DealStage::Settlement,
                    actor,
                    now,
                    format!("{actor} approved the settlement"),
                );
            }

            PipelineAction::CompleteSettlement => {
                let StageState::Settlement(settlement) = &mut pipeline.state else {
                    return Err(illegal(name, pipeline.stage()));
                };
                let mut released = settlement.clone();
                released.audit.release(&mut released.data)?;
                pipeline.state = StageState::Completed(CompletedBlock {
                    settlement: released,
                    completed_at: now,
                });
                pipeline.record(
                    DealStage::Completed,
                    actor,
                    now,
                    "settlement released; deal completed".to_string(),
                );
            }

            PipelineAction::Cancel { reason } => {
                if pipeline.state.is_terminal() {
                    return Err(illegal(name, pipeline.stage()));
                }
                if reason.trim().is_empty() {
                    return Err(gate(name, "a cancellation reason is required"));
                }

                // Funds have moved once funding has collected pledges; those deals
                // settle a refund split on the way out.
                let refund = match (pipeline.state.funding(), pipeline.state.contract()) {
                    (Some(funding), Some(contract)) if funding.pledged_amount > 0 => {
                        Some(contract.terms.cancellation.refund_breakdown(
                            pipeline.state.proposal().event_date,
                            now.date_naive(),
                            funding.pledged_amount,
                            None,
                        )?)
                    }
                    _ => None,
                };

                let stage_at_cancellation = pipeline.stage();
                let prior = Box::new(pipeline.state.clone());
                pipeline.state = StageState::Cancelled(CancelledBlock {
                    prior,
                    stage_at_cancellation,
                    reason: reason.clone(),
                    cancelled_by: actor,
                    cancelled_at: now,
                    refund,
                });
                pipeline.record(
                    DealStage::Cancelled,
                    actor,
                    now,
                    format!("deal cancelled: {reason}"),
                );
            }
        }

        Ok(())
    }
}
