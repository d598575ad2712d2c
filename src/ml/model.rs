// ============================================================
// Layer 5 — ResNet
// ============================================================
//   [N, 3, H, W]
//     → 7x7/2 conv → BN → ReLU → 3x3/2 max pool
//     → stage 1..4 (residual blocks)
//     → global average pool → fully connected
//   [N, num_classes]
//
// Reference: He et al. (2016) Deep Residual Learning

use burn::{
    nn::{
        conv::Conv2d,
        loss::CrossEntropyLossConfig,
        pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig, MaxPool2d, MaxPool2dConfig},
        BatchNorm, Linear, LinearConfig, PaddingConfig2d, Relu,
    },
    prelude::*,
};

use crate::domain::architecture::{
    ArchitectureError, BlockKind, NetworkPlan, ResNetPreset, DEFAULT_STEM_WIDTH, DEFAULT_WIDTHS,
};
use crate::ml::block::{batch_norm, conv2d, ResidualBlock};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct ResNetConfig {
    pub block:       BlockKind,
    /// Blocks per stage
    pub layers:      [usize; 4],
    #[config(default = 1000)]
    pub num_classes: usize,
    #[config(default = "DEFAULT_WIDTHS")]
    pub widths:      [usize; 4],
    #[config(default = "DEFAULT_STEM_WIDTH")]
    pub stem_width:  usize,
    #[config(default = 3)]
    pub in_channels: usize,
}

impl ResNetConfig {
    pub fn from_preset(preset: ResNetPreset, num_classes: usize) -> Self {
        Self::new(preset.block(), preset.layers()).with_num_classes(num_classes)
    }

    /// Validate and lay out the network without allocating anything.
    pub fn plan(&self) -> Result<NetworkPlan, ArchitectureError> {
        NetworkPlan::new(
            self.block,
            self.in_channels,
            self.stem_width,
            self.widths,
            self.layers,
            self.num_classes,
        )
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<ResNet<B>, ArchitectureError> {
        let plan = self.plan()?;

        let stages = plan
            .stages
            .iter()
            .map(|stage| Stage {
                blocks: stage
                    .blocks
                    .iter()
                    .map(|block| ResidualBlock::new(plan.block, block, device))
                    .collect(),
            })
            .collect();

        Ok(ResNet {
            conv1:   conv2d(plan.in_channels, plan.stem_width, 7, 2, 3, device),
            bn1:     batch_norm(plan.stem_width, device),
            relu:    Relu::new(),
            maxpool: MaxPool2dConfig::new([3, 3])
                .with_strides([2, 2])
                .with_padding(PaddingConfig2d::Explicit(1, 1))
                .init(),
            stages,
            avgpool: AdaptiveAvgPool2dConfig::new([1, 1]).init(),
            fc:      LinearConfig::new(plan.feature_channels(), plan.num_classes).init(device),
        })
    }
}

/// Blocks sharing one resolution and width.
#[derive(Module, Debug)]
pub struct Stage<B: Backend> {
    pub blocks: Vec<ResidualBlock<B>>,
}

impl<B: Backend> Stage<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        self.blocks.iter().fold(x, |x, block| block.forward(x))
    }
}

#[derive(Module, Debug)]
pub struct ResNet<B: Backend> {
    pub conv1:   Conv2d<B>,
    pub bn1:     BatchNorm<B, 2>,
    pub relu:    Relu,
    pub maxpool: MaxPool2d,
    pub stages:  Vec<Stage<B>>,
    pub avgpool: AdaptiveAvgPool2d,
    pub fc:      Linear<B>,
}

impl<B: Backend> ResNet<B> {
    /// images: [batch, 3, H, W] → logits: [batch, num_classes]
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = self.conv1.forward(images);
        let x = self.relu.forward(self.bn1.forward(x));
        let x = self.maxpool.forward(x);

        let x = self.stages.iter().fold(x, |x, stage| stage.forward(x));

        let x = self.avgpool.forward(x); // [batch, C, 1, 1]
        let x = x.flatten::<2>(1, 3);
        self.fc.forward(x)
    }

    /// Mean cross-entropy of the logits against `targets`.
    pub fn forward_loss(&self, images: Tensor<B, 4>, targets: Tensor<B, 1, Int>) -> Tensor<B, 1> {
        let logits = self.forward(images);
        CrossEntropyLossConfig::new()
            .init(&logits.device())
            .forward(logits, targets)
    }

    /// Stem + every main-path convolution + the classifier.
    pub fn weighted_layer_count(&self) -> usize {
        let convs: usize = self
            .stages
            .iter()
            .flat_map(|s| s.blocks.iter())
            .map(|b| b.kind().convs_per_block())
            .sum();
        1 + convs + 1
    }

    /// Blocks whose shortcut is a 1x1 conv + BN rather than the identity.
    pub fn projection_count(&self) -> usize {
        self.stages
            .iter()
            .flat_map(|s| s.blocks.iter())
            .filter(|b| b.has_projection())
            .count()
    }
}
