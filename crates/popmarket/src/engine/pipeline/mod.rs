//! Leader-initiated deal pipeline: a seven-stage lifecycle from proposal to
//! financial settlement, driven by an explicit state machine with role-gated
//! actions and an append-only timeline.

pub mod domain;
mod machine;
pub mod metrics;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ActorRole, CancelledBlock, ContractBlock, DealOffer, DealStage, ExecutionBlock, FundingBlock,
    MatchingBlock, NegotiationBlock, Pipeline, PipelineId, ProposalBlock, SettlementBlock,
    StageState, TimelineEvent,
};
pub use machine::{PipelineAction, PipelineStateMachine, TransitionError};
pub use metrics::{compute_metrics, PipelineMetrics, StageConversion};
pub use repository::{PipelineRepository, PipelineStoreError};
pub use router::{pipeline_router, ActionRequest};
pub use service::{DealPipelineService, PipelineServiceError, ProposalError, ProposalSubmission};
