// ============================================================
// Layer 2 — SummaryUseCase
// ============================================================
// Describes a network layout without training it: the plan per
// stage, the weighted-layer count and the number of parameters.

use anyhow::Result;
use burn::module::Module;

use crate::domain::architecture::NetworkPlan;
use crate::ml::backend::{cpu_device, CpuBackend};
use crate::ml::model::ResNetConfig;

#[derive(Debug, Clone)]
pub struct NetworkSummary {
    pub plan:            NetworkPlan,
    pub weighted_layers: usize,
    pub projections:     usize,
    /// Input pixels per feature-map pixel after the last stage
    pub output_stride:   usize,
    pub parameters:      usize,
}

impl NetworkSummary {
    /// One line per stage, e.g. `stage 1: 3 x bottleneck  64 -> 256  stride 1  (1 projection)`.
    pub fn stage_lines(&self) -> Vec<String> {
        self.plan
            .stages
            .iter()
            .enumerate()
            .map(|(i, stage)| {
                let projections = stage.blocks.iter().filter(|b| b.projection).count();
                format!(
                    "stage {}: {} x {}  {} -> {}  stride {}  ({} projection{})",
                    i + 1,
                    stage.blocks.len(),
                    self.plan.block,
                    stage.width,
                    stage.out_channels(),
                    stage.stride,
                    projections,
                    if projections == 1 { "" } else { "s" },
                )
            })
            .collect()
    }
}

pub struct SummaryUseCase {
    config: ResNetConfig,
}

impl SummaryUseCase {
    pub fn new(config: ResNetConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<NetworkSummary> {
        let plan = self.config.plan()?;

        // Parameters are counted on a real CPU instance of the network.
        let parameters = self.config.init::<CpuBackend>(&cpu_device())?.num_params();

        Ok(NetworkSummary {
            weighted_layers: plan.weighted_layer_count(),
            projections:     plan.projection_count(),
            output_stride:   plan.output_stride(),
            plan,
            parameters,
        })
    }
}
