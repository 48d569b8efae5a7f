use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::engine::fraud::cancellation::CancellationPolicy;
use crate::engine::pipeline::repository::{PipelineRepository, PipelineStoreError};
use crate::engine::pipeline::{
    ActorRole, DealPipelineService, DealStage, Pipeline, PipelineAction, PipelineId,
    PipelineStateMachine, ProposalBlock, ProposalSubmission, StageState,
};
use crate::engine::settlement::{
    ActivityFigures, AgreedTerms, ContentRights, PaymentSchedule, SalesReport,
};

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn event_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 10).expect("valid date")
}

pub(super) fn submission() -> ProposalSubmission {
    ProposalSubmission {
        leader_id: "leader-77".to_string(),
        brand_category: "beverage".to_string(),
        concept: "Zero-proof highball garage pop-up".to_string(),
        target_region: "Seongsu".to_string(),
        expected_participants: 300,
        min_participants: 120,
        proposed_price: 5_000_000,
        event_date: event_date(),
    }
}

pub(super) fn agreed_terms() -> AgreedTerms {
    AgreedTerms {
        base_fee: 200_000,
        commission_rate: 0.10,
        performance_bonus: None,
        payment_schedule: PaymentSchedule::LumpSum,
        exclusive: false,
        content_rights: ContentRights::Shared,
        cancellation: CancellationPolicy::standard(),
    }
}

pub(super) fn offer(price: i64) -> PipelineAction {
    PipelineAction::SubmitOffer {
        price,
        terms: agreed_terms(),
        comparables: Vec::new(),
    }
}

pub(super) fn sales_report() -> SalesReport {
    SalesReport {
        gross_sales: 10_000_000,
        refunds: 500_000,
        leader_attributed_sales: 3_000_000,
    }
}

pub(super) fn figures(sales: i64) -> ActivityFigures {
    ActivityFigures {
        sales,
        attendance: 420,
        referrals: 30,
    }
}

pub(super) fn settlement_action() -> PipelineAction {
    PipelineAction::BeginSettlement {
        report: sales_report(),
        reported: figures(10_000_000),
        verified: figures(9_800_000),
    }
}

/// A freshly proposed pipeline for driving the machine directly.
pub(super) fn proposal_pipeline() -> Pipeline {
    let submission = submission();
    let mut pipeline = Pipeline {
        id: PipelineId("deal-test".to_string()),
        version: 1,
        state: StageState::Proposal(ProposalBlock {
            leader_id: submission.leader_id,
            brand_category: submission.brand_category,
            concept: submission.concept,
            target_region: submission.target_region,
            expected_participants: submission.expected_participants,
            min_participants: submission.min_participants,
            proposed_price: submission.proposed_price,
            event_date: submission.event_date,
            submitted_at: now(),
        }),
        timeline: Vec::new(),
        created_at: now(),
        updated_at: now(),
    };
    pipeline.record(
        DealStage::Proposal,
        ActorRole::Leader,
        now(),
        "proposal submitted".to_string(),
    );
    pipeline
}

/// Applies the canonical happy-path actions up to an open funding round.
pub(super) fn drive_to_funding(machine: &PipelineStateMachine, pipeline: &mut Pipeline) {
    let steps: Vec<(ActorRole, PipelineAction)> = vec![
        (
            ActorRole::Platform,
            PipelineAction::OpenMatching {
                brand_id: "brand-9".to_string(),
            },
        ),
        (ActorRole::Leader, PipelineAction::StartNegotiation),
        (ActorRole::Leader, offer(5_000_000)),
        (ActorRole::Brand, PipelineAction::AcceptOffer),
        (ActorRole::Platform, PipelineAction::DraftContract),
        (ActorRole::Leader, PipelineAction::SignContract),
        (ActorRole::Brand, PipelineAction::SignContract),
        (ActorRole::Platform, PipelineAction::OpenFunding),
    ];
    for (actor, action) in steps {
        machine
            .apply(pipeline, actor, action, now())
            .expect("happy-path step");
    }
}

/// Continues the happy path through funding and execution into settlement.
pub(super) fn drive_to_settlement(machine: &PipelineStateMachine, pipeline: &mut Pipeline) {
    drive_to_funding(machine, pipeline);
    let steps: Vec<(ActorRole, PipelineAction)> = vec![
        (
            ActorRole::Platform,
            PipelineAction::RecordPledge {
                participants: 150,
                amount: 4_500_000,
            },
        ),
        (
            ActorRole::Platform,
            PipelineAction::CloseFunding {
                override_threshold: false,
            },
        ),
        (ActorRole::Platform, settlement_action()),
    ];
    for (actor, action) in steps {
        machine
            .apply(pipeline, actor, action, now())
            .expect("happy-path step");
    }
}

pub(super) fn build_service() -> (
    DealPipelineService<MemoryPipelineRepository>,
    Arc<MemoryPipelineRepository>,
) {
    let repository = Arc::new(MemoryPipelineRepository::default());
    let service = DealPipelineService::new(repository.clone(), PipelineStateMachine::default());
    (service, repository)
}

#[derive(Default, Clone)]
pub(super) struct MemoryPipelineRepository {
    pipelines: Arc<Mutex<HashMap<PipelineId, Pipeline>>>,
}

impl PipelineRepository for MemoryPipelineRepository {
    fn insert(&self, pipeline: Pipeline) -> Result<Pipeline, PipelineStoreError> {
        let mut guard = self.pipelines.lock().expect("pipeline mutex poisoned");
        if guard.contains_key(&pipeline.id) {
            return Err(PipelineStoreError::AlreadyExists);
        }
        guard.insert(pipeline.id.clone(), pipeline.clone());
        Ok(pipeline)
    }

    fn fetch(&self, id: &PipelineId) -> Result<Option<Pipeline>, PipelineStoreError> {
        let guard = self.pipelines.lock().expect("pipeline mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn update(
        &self,
        mut pipeline: Pipeline,
        expected_version: u64,
    ) -> Result<Pipeline, PipelineStoreError> {
        let mut guard = self.pipelines.lock().expect("pipeline mutex poisoned");
        let stored = guard
            .get(&pipeline.id)
            .ok_or(PipelineStoreError::NotFound)?;
        if stored.version != expected_version {
            return Err(PipelineStoreError::VersionConflict {
                expected: expected_version,
                found: stored.version,
            });
        }
        pipeline.version = expected_version + 1;
        guard.insert(pipeline.id.clone(), pipeline.clone());
        Ok(pipeline)
    }

    fn list(&self) -> Result<Vec<Pipeline>, PipelineStoreError> {
        let guard = self.pipelines.lock().expect("pipeline mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}
