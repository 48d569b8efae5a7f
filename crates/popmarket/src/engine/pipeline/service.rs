use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    ActorRole, DealStage, Pipeline, PipelineId, ProposalBlock, StageState,
};
use super::machine::{PipelineAction, PipelineStateMachine, TransitionError};
use super::metrics::{compute_metrics, PipelineMetrics};
use super::repository::{PipelineRepository, PipelineStoreError};

static PIPELINE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_pipeline_id() -> PipelineId {
    let id = PIPELINE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    PipelineId(format!("deal-{id:06}"))
}

/// Campaign pitch accepted at the start of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalSubmission {
    pub leader_id: String,
    pub brand_category: String,
    pub concept: String,
    pub target_region: String,
    pub expected_participants: u32,
    pub min_participants: u32,
    pub proposed_price: i64,
    pub event_date: NaiveDate,
}

#[derive(Debug, thiserror::Error)]
pub enum ProposalError {
    #[error("proposal concept must not be empty")]
    EmptyConcept,
    #[error("leader id must not be empty")]
    EmptyLeader,
    #[error("minimum participants must be at least 1")]
    ZeroMinimum,
    #[error("minimum participants {minimum} exceeds expected participants {expected}")]
    MinimumExceedsExpected { minimum: u32, expected: u32 },
    #[error("proposed price must be positive, got {0}")]
    NonPositivePrice(i64),
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineServiceError {
    #[error(transparent)]
    Proposal(#[from] ProposalError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Store(#[from] PipelineStoreError),
}

/// Service facade: validates proposals, routes actions through the state machine,
/// and persists every accepted change with a compare-and-set write.
pub struct DealPipelineService<R> {
    repository: Arc<R>,
    machine: PipelineStateMachine,
}

impl<R> DealPipelineService<R>
where
    R: PipelineRepository + 'static,
{
    pub fn new(repository: Arc<R>, machine: PipelineStateMachine) -> Self {
        Self {
            repository,
            machine,
        }
    }

    /// Open a new pipeline from a leader's campaign pitch.
    pub fn propose(
        &self,
        submission: ProposalSubmission,
        now: DateTime<Utc>,
    ) -> Result<Pipeline, PipelineServiceError> {
        validate_submission(&submission)?;

        let id = next_pipeline_id();
        let block = ProposalBlock {
            leader_id: submission.leader_id,
            brand_category: submission.brand_category,
            concept: submission.concept,
            target_region: submission.target_region,
            expected_participants: submission.expected_participants,
            min_participants: submission.min_participants,
            proposed_price: submission.proposed_price,
            event_date: submission.event_date,
            submitted_at: now,
        };

        let mut pipeline = Pipeline {
            id,
            version: 1,
            state: StageState::Proposal(block),
            timeline: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        pipeline.record(
            DealStage::Proposal,
            ActorRole::Leader,
            now,
            "proposal submitted".to_string(),
        );

        let stored = self.repository.insert(pipeline)?;
        tracing::info!(pipeline = %stored.id.0, "pipeline opened");
        Ok(stored)
    }

    /// Apply one action on behalf of `actor`.
    ///
    /// A lost compare-and-set race surfaces as a store conflict; the caller should
    /// re-read the pipeline and retry against the fresh snapshot.
    pub fn apply(
        &self,
        id: &PipelineId,
        actor: ActorRole,
        action: PipelineAction,
        now: DateTime<Utc>,
    ) -> Result<Pipeline, PipelineServiceError> {
        let mut pipeline = self
            .repository
            .fetch(id)?
            .ok_or(PipelineStoreError::NotFound)?;
        let expected_version = pipeline.version;

        let action_name = action.name();
        self.machine.apply(&mut pipeline, actor, action, now)?;

        let stored = self.repository.update(pipeline, expected_version)?;
        tracing::info!(
            pipeline = %stored.id.0,
            action = action_name,
            stage = stored.stage().label(),
            "pipeline action applied"
        );
        Ok(stored)
    }

    pub fn get(&self, id: &PipelineId) -> Result<Pipeline, PipelineServiceError> {
        Ok(self
            .repository
            .fetch(id)?
            .ok_or(PipelineStoreError::NotFound)?)
    }

    pub fn metrics(&self) -> Result<PipelineMetrics, PipelineServiceError> {
        let pipelines = self.repository.list()?;
        Ok(compute_metrics(&pipelines))
    }
}

fn validate_submission(submission: &ProposalSubmission) -> Result<(), ProposalError> {
    if submission.leader_id.trim().is_empty() {
        return Err(ProposalError::EmptyLeader);
    }
    if submission.concept.trim().is_empty() {
        return Err(ProposalError::EmptyConcept);
    }
    if submission.min_participants == 0 {
        return Err(ProposalError::ZeroMinimum);
    }
    if submission.min_participants > submission.expected_participants {
        return Err(ProposalError::MinimumExceedsExpected {
            minimum: submission.min_participants,
            expected: submission.expected_participants,
        });
    }
    if submission.proposed_price <= 0 {
        return Err(ProposalError::NonPositivePrice(submission.proposed_price));
    }
    Ok(())
}
