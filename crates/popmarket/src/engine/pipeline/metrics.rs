use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::domain::{DealStage, Pipeline, StageState};

/// Conversion between one stage and the next across a pipeline population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageConversion {
    pub from: DealStage,
    pub to: DealStage,
    pub entered: usize,
    pub converted: usize,
    pub rate: f64,
}

/// Dashboard rollup over all known pipelines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineMetrics {
    pub total_pipelines: usize,
    pub stage_conversion_rates: Vec<StageConversion>,
    pub total_revenue: i64,
    pub avg_revenue_per_pipeline: f64,
}

/// Computes conversion and revenue metrics. Stage reachability is read from the
/// append-only timelines, so the numbers survive cancellations and stage data
/// nesting alike.
pub fn compute_metrics(pipelines: &[Pipeline]) -> PipelineMetrics {
    let forward = DealStage::forward();

    let reached: Vec<HashSet<DealStage>> = pipelines
        .iter()
        .map(|pipeline| {
            let mut stages: HashSet<DealStage> =
                pipeline.timeline.iter().map(|event| event.stage).collect();
            stages.insert(DealStage::Proposal);
            stages
        })
        .collect();

    let stage_conversion_rates = forward
        .windows(2)
        .map(|pair| {
            let entered = reached.iter().filter(|set| set.contains(&pair[0])).count();
            let converted = reached.iter().filter(|set| set.contains(&pair[1])).count();
            let rate = if entered == 0 {
                0.0
            } else {
                converted as f64 / entered as f64
            };
            StageConversion {
                from: pair[0],
                to: pair[1],
                entered,
                converted,
                rate,
            }
        })
        .collect();

    let mut total_revenue = 0i64;
    let mut settled = 0usize;
    for pipeline in pipelines {
        let block = match &pipeline.state {
            StageState::Settlement(block) => Some(block),
            StageState::Completed(block) => Some(&block.settlement),
            _ => None,
        };
        if let Some(block) = block {
            total_revenue += block.data.breakdown.net_sales;
            settled += 1;
        }
    }
    let avg_revenue_per_pipeline = if settled == 0 {
        0.0
    } else {
        total_revenue as f64 / settled as f64
    };

    PipelineMetrics {
        total_pipelines: pipelines.len(),
        stage_conversion_rates,
        total_revenue,
        avg_revenue_per_pipeline,
    }
}
