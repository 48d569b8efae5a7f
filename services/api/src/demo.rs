use std::sync::Arc;

use chrono::{Duration, Local, NaiveDate, Utc};
use clap::Args;

use crate::infra::{
    InMemoryCheckinRepository, InMemoryPipelineRepository, RotatingCodeStore, SeededPopupDirectory,
};
use popmarket::engine::checkin::{CheckinEvaluator, CheckinRequest, CheckinService, GeoPoint, PopupId};
use popmarket::engine::fraud::CancellationPolicy;
use popmarket::engine::pipeline::{
    ActorRole, DealPipelineService, PipelineAction, PipelineStateMachine, ProposalSubmission,
};
use popmarket::engine::settlement::{
    ActivityFigures, AgreedTerms, ContentRights, PaymentSchedule, PerformanceBonus, SalesReport,
    SettlementCalculator,
};
use popmarket::error::AppError;

#[derive(Args, Debug)]
pub(crate) struct SettlementPreviewArgs {
    /// Gross sales for the campaign
    #[arg(long)]
    pub(crate) gross: i64,
    /// Refunds already processed
    #[arg(long, default_value_t = 0)]
    pub(crate) refunds: i64,
    /// Sales attributed to the leader's channels
    #[arg(long, default_value_t = 0)]
    pub(crate) attributed: i64,
    /// Leader base fee from the contract
    #[arg(long, default_value_t = 0)]
    pub(crate) base_fee: i64,
    /// Leader commission rate on attributed sales
    #[arg(long, default_value_t = 0.10)]
    pub(crate) commission_rate: f64,
    /// Performance bonus threshold on net sales
    #[arg(long)]
    pub(crate) bonus_threshold: Option<i64>,
    /// Performance bonus amount
    #[arg(long)]
    pub(crate) bonus_amount: Option<i64>,
    /// Execution completion date (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) completed_on: Option<NaiveDate>,
}

pub(crate) fn run_settlement_preview(args: SettlementPreviewArgs) -> Result<(), AppError> {
    let terms = AgreedTerms {
        base_fee: args.base_fee,
        commission_rate: args.commission_rate,
        performance_bonus: args.bonus_threshold.zip(args.bonus_amount).map(
            |(threshold, bonus_amount)| PerformanceBonus {
                threshold,
                bonus_amount,
            },
        ),
        payment_schedule: PaymentSchedule::LumpSum,
        exclusive: false,
        content_rights: ContentRights::Shared,
        cancellation: CancellationPolicy::standard(),
    };
    let report = SalesReport {
        gross_sales: args.gross,
        refunds: args.refunds,
        leader_attributed_sales: args.attributed,
    };
    let completed_on = args
        .completed_on
        .unwrap_or_else(|| Local::now().date_naive());

    match SettlementCalculator::default().settle(&terms, &report, completed_on) {
        Ok(settlement) => {
            let rendered =
                serde_json::to_string_pretty(&settlement).expect("settlement serializes");
            println!("{rendered}");
            if settlement.brand_underwater() {
                println!("note: brand net revenue is negative; this settlement would be flagged for dispute");
            }
            Ok(())
        }
        Err(error) => {
            eprintln!("settlement rejected: {error}");
            std::process::exit(2);
        }
    }
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Skip the check-in portion of the demo
    #[arg(long)]
    pub(crate) skip_checkin: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let now = Utc::now();
    let event_date = Local::now().date_naive() + Duration::days(30);

    println!("== deal lifecycle ==");

    let service = DealPipelineService::new(
        Arc::new(InMemoryPipelineRepository::default()),
        PipelineStateMachine::default(),
    );

    let pipeline = service
        .propose(
            ProposalSubmission {
                leader_id: "leader-77".to_string(),
                brand_category: "beverage".to_string(),
                concept: "Zero-proof highball garage pop-up".to_string(),
                target_region: "Seongsu".to_string(),
                expected_participants: 300,
                min_participants: 120,
                proposed_price: 5_000_000,
                event_date,
            },
            now,
        )
        .map_err(|error| std::io::Error::new(std::io::ErrorKind::Other, error.to_string()))?;
    let id = pipeline.id.clone();
    println!("{:>12}  proposal submitted", pipeline.stage().label());

    let terms = AgreedTerms {
        base_fee: 200_000,
        commission_rate: 0.10,
        performance_bonus: None,
        payment_schedule: PaymentSchedule::LumpSum,
        exclusive: false,
        content_rights: ContentRights::Shared,
        cancellation: CancellationPolicy::standard(),
    };
    let steps: Vec<(ActorRole, PipelineAction)> = vec![
        (
            ActorRole::Platform,
            PipelineAction::OpenMatching {
                brand_id: "brand-9".to_string(),
            },
        ),
        (ActorRole::Leader, PipelineAction::StartNegotiation),
        (
            ActorRole::Leader,
            PipelineAction::SubmitOffer {
                price: 5_000_000,
                terms,
                comparables: Vec::new(),
            },
        ),
        (ActorRole::Brand, PipelineAction::AcceptOffer),
        (ActorRole::Platform, PipelineAction::DraftContract),
        (ActorRole::Leader, PipelineAction::SignContract),
        (ActorRole::Brand, PipelineAction::SignContract),
        (ActorRole::Platform, PipelineAction::OpenFunding),
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
        (
            ActorRole::Platform,
            PipelineAction::BeginSettlement {
                report: SalesReport {
                    gross_sales: 10_000_000,
                    refunds: 500_000,
                    leader_attributed_sales: 3_000_000,
                },
                reported: ActivityFigures {
                    sales: 10_000_000,
                    attendance: 420,
                    referrals: 30,
                },
                verified: ActivityFigures {
                    sales: 9_800_000,
                    attendance: 410,
                    referrals: 30,
                },
            },
        ),
        (ActorRole::Leader, PipelineAction::ApproveSettlement),
        (ActorRole::Brand, PipelineAction::ApproveSettlement),
        (ActorRole::Platform, PipelineAction::ApproveSettlement),
        (ActorRole::Platform, PipelineAction::CompleteSettlement),
    ];

    for (actor, action) in steps {
        let description = action.name();
        let updated = service
            .apply(&id, actor, action, now)
            .map_err(|error| std::io::Error::new(std::io::ErrorKind::Other, error.to_string()))?;
        println!("{:>12}  {description} ({actor})", updated.stage().label());
    }

    let final_state = service
        .get(&id)
        .map_err(|error| std::io::Error::new(std::io::ErrorKind::Other, error.to_string()))?;
    if let Some(settlement) = final_state.state.settlement() {
        println!("\n== settlement ==");
        let rendered =
            serde_json::to_string_pretty(&settlement.data).expect("settlement serializes");
        println!("{rendered}");
    }

    let metrics = service
        .metrics()
        .map_err(|error| std::io::Error::new(std::io::ErrorKind::Other, error.to_string()))?;
    println!("\n== metrics ==");
    println!(
        "{}",
        serde_json::to_string_pretty(&metrics).expect("metrics serialize")
    );

    if !args.skip_checkin {
        println!("\n== check-in ==");
        let codes = Arc::new(RotatingCodeStore::default());
        codes.seed_demo_code();
        let checkin_service = CheckinService::new(
            Arc::new(SeededPopupDirectory::with_demo_sites()),
            codes,
            Arc::new(InMemoryCheckinRepository::default()),
            CheckinEvaluator::default(),
        );

        let result = checkin_service
            .submit(
                CheckinRequest {
                    popup_id: PopupId("pop-seongsu".to_string()),
                    visitor_id: "user-301".to_string(),
                    location: Some(GeoPoint {
                        latitude: 37.5448,
                        longitude: 127.0559,
                    }),
                    accuracy_m: Some(12.0),
                    submitted_code: Some("QR-7F3K".to_string()),
                    receipt_text: None,
                },
                Utc::now(),
            )
            .map_err(|error| std::io::Error::new(std::io::ErrorKind::Other, error.to_string()))?;

        println!(
            "{}",
            serde_json::to_string_pretty(&result).expect("result serializes")
        );
    }

    Ok(())
}
