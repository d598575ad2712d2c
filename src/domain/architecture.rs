// ============================================================
// Layer 3 — ResNet Architecture Plan
// ============================================================
// The shape of a residual network, worked out before any
// tensor is allocated:
//
//   stem (7x7 conv, stride 2 → max-pool, stride 2)
//     → stage 1 (stride 1)
//     → stage 2 (stride 2)
//     → stage 3 (stride 2)
//     → stage 4 (stride 2)
//     → global average pool → linear
//
// A plan is a list of stages, each a list of blocks with their
// input channels, width, output channels, stride and whether a
// projection ("downsample") path is needed on the residual.
//
// Every configuration error is reported here, at build time,
// so a network that builds can always run its forward pass.
//
// Reference: He et al. (2016) Deep Residual Learning

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Strides of the four stages. Only stage 1 keeps resolution.
pub const STAGE_STRIDES: [usize; 4] = [1, 2, 2, 2];

/// Default channel widths of the four stages.
pub const DEFAULT_WIDTHS: [usize; 4] = [64, 128, 256, 512];

/// Output channels of the 7x7 stem convolution.
pub const DEFAULT_STEM_WIDTH: usize = 64;

/// Stage widths doubling from `base`: `[b, 2b, 4b, 8b]`.
pub fn widths_from_base(base: usize) -> [usize; 4] {
    [base, base * 2, base * 4, base * 8]
}

// ─── BlockKind ────────────────────────────────────────────────────────────────
/// The two residual block shapes. Selected once per network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    /// Two 3x3 convolutions, expansion 1.
    Basic,
    /// 1x1 reduce → 3x3 → 1x1 expand, expansion 4.
    Bottleneck,
}

impl BlockKind {
    /// Output channels of a block = width × expansion.
    pub fn expansion(self) -> usize {
        match self {
            Self::Basic      => 1,
            Self::Bottleneck => 4,
        }
    }

    /// Convolutions on the main path of one block (projection excluded).
    pub fn convs_per_block(self) -> usize {
        match self {
            Self::Basic      => 2,
            Self::Bottleneck => 3,
        }
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Basic      => write!(f, "basic"),
            Self::Bottleneck => write!(f, "bottleneck"),
        }
    }
}

// ─── Presets ──────────────────────────────────────────────────────────────────
/// The published depths. ResNet-50 is the training default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResNetPreset {
    ResNet18,
    ResNet34,
    ResNet50,
    ResNet101,
    ResNet152,
}

impl ResNetPreset {
    pub fn block(self) -> BlockKind {
        match self {
            Self::ResNet18 | Self::ResNet34 => BlockKind::Basic,
            _                               => BlockKind::Bottleneck,
        }
    }

    pub fn layers(self) -> [usize; 4] {
        match self {
            Self::ResNet18  => [2, 2, 2, 2],
            Self::ResNet34  => [3, 4, 6, 3],
            Self::ResNet50  => [3, 4, 6, 3],
            Self::ResNet101 => [3, 4, 23, 3],
            Self::ResNet152 => [3, 8, 36, 3],
        }
    }
}

// ─── Errors ───────────────────────────────────────────────────────────────────
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArchitectureError {
    #[error("stage {stage} has no blocks")]
    EmptyStage { stage: usize },

    #[error("stage {stage} has zero width")]
    ZeroWidth { stage: usize },

    #[error("{what} must be greater than zero")]
    ZeroDimension { what: &'static str },
}

// ─── Plan types ───────────────────────────────────────────────────────────────
/// One residual block as it will be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockPlan {
    pub in_channels:  usize,
    pub width:        usize,
    pub out_channels: usize,
    pub stride:       usize,
    /// Residual goes through a 1x1 conv + norm before the addition.
    pub projection:   bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagePlan {
    pub width:  usize,
    pub stride: usize,
    pub blocks: Vec<BlockPlan>,
}

impl StagePlan {
    pub fn out_channels(&self) -> usize {
        self.blocks.last().map(|b| b.out_channels).unwrap_or(0)
    }
}

/// A validated network layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkPlan {
    pub block:       BlockKind,
    pub in_channels: usize,
    pub stem_width:  usize,
    pub stages:      Vec<StagePlan>,
    pub num_classes: usize,
}

impl NetworkPlan {
    /// Build and validate the plan.
    ///
    /// The running input-channel count starts at `stem_width` and is set to
    /// `width × expansion` after each stage. Only the first block of a stage
    /// may carry a projection, and it does so whenever its stride is not 1 or
    /// its input channels differ from its output channels.
    pub fn new(
        block:       BlockKind,
        in_channels: usize,
        stem_width:  usize,
        widths:      [usize; 4],
        layers:      [usize; 4],
        num_classes: usize,
    ) -> Result<Self, ArchitectureError> {
        if in_channels == 0 {
            return Err(ArchitectureError::ZeroDimension { what: "input channels" });
        }
        if stem_width == 0 {
            return Err(ArchitectureError::ZeroDimension { what: "stem width" });
        }
        if num_classes == 0 {
            return Err(ArchitectureError::ZeroDimension { what: "number of classes" });
        }

        let expansion    = block.expansion();
        let mut inplanes = stem_width;
        let mut stages   = Vec::with_capacity(4);

        for (stage, ((&width, &count), &stride)) in widths
            .iter()
            .zip(layers.iter())
            .zip(STAGE_STRIDES.iter())
            .enumerate()
        {
            if count == 0 {
                return Err(ArchitectureError::EmptyStage { stage: stage + 1 });
            }
            if width == 0 {
                return Err(ArchitectureError::ZeroWidth { stage: stage + 1 });
            }

            let out_channels = width * expansion;
            let mut blocks   = Vec::with_capacity(count);

            blocks.push(BlockPlan {
                in_channels: inplanes,
                width,
                out_channels,
                stride,
                projection: stride != 1 || inplanes != out_channels,
            });
            inplanes = out_channels;

            for _ in 1..count {
                blocks.push(BlockPlan {
                    in_channels: inplanes,
                    width,
                    out_channels,
                    stride: 1,
                    projection: false,
                });
            }

            stages.push(StagePlan { width, stride, blocks });
        }

        Ok(Self { block, in_channels, stem_width, stages, num_classes })
    }

    /// Features entering the classifier.
    pub fn feature_channels(&self) -> usize {
        self.stages.last().map(StagePlan::out_channels).unwrap_or(self.stem_width)
    }

    pub fn block_count(&self) -> usize {
        self.stages.iter().map(|s| s.blocks.len()).sum()
    }

    pub fn projection_count(&self) -> usize {
        self.stages
            .iter()
            .flat_map(|s| s.blocks.iter())
            .filter(|b| b.projection)
            .count()
    }

    /// Convolutions + linear layers that give the network its name:
    /// the stem, every main-path convolution, and the classifier.
    /// Projection convolutions are not counted.
    pub fn weighted_layer_count(&self) -> usize {
        1 + self.block_count() * self.block.convs_per_block() + 1
    }

    /// Total spatial reduction between input and the last stage.
    pub fn output_stride(&self) -> usize {
        // stem conv (2) × max-pool (2) × stage strides
        4 * self.stages.iter().map(|s| s.stride).product::<usize>()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn preset_plan(preset: ResNetPreset, classes: usize) -> NetworkPlan {
        NetworkPlan::new(
            preset.block(),
            3,
            DEFAULT_STEM_WIDTH,
            DEFAULT_WIDTHS,
            preset.layers(),
            classes,
        )
        .unwrap()
    }

    #[test]
    fn test_resnet50_has_fifty_weighted_layers() {
        let plan = preset_plan(ResNetPreset::ResNet50, 1000);
        assert_eq!(plan.weighted_layer_count(), 50);
        assert_eq!(plan.feature_channels(), 2048);
    }

    #[test]
    fn test_preset_depths_match_their_names() {
        assert_eq!(preset_plan(ResNetPreset::ResNet18, 10).weighted_layer_count(), 18);
        assert_eq!(preset_plan(ResNetPreset::ResNet34, 10).weighted_layer_count(), 34);
        assert_eq!(preset_plan(ResNetPreset::ResNet101, 10).weighted_layer_count(), 101);
        assert_eq!(preset_plan(ResNetPreset::ResNet152, 10).weighted_layer_count(), 152);
    }

    #[test]
    fn test_bottleneck_projects_first_block_of_every_stage() {
        let plan = preset_plan(ResNetPreset::ResNet50, 1000);
        // Stage 1 keeps stride 1 but 64 != 64 * 4
        for stage in &plan.stages {
            assert!(stage.blocks[0].projection);
            assert!(stage.blocks[1..].iter().all(|b| !b.projection && b.stride == 1));
        }
        assert_eq!(plan.projection_count(), 4);
        assert_eq!(plan.stages[1].blocks[0].in_channels, 256);
        assert_eq!(plan.stages[1].blocks[1].in_channels, 512);
    }

    #[test]
    fn test_basic_first_stage_has_no_projection() {
        let plan = preset_plan(ResNetPreset::ResNet18, 10);
        assert!(!plan.stages[0].blocks[0].projection);
        assert_eq!(plan.projection_count(), 3);
        assert_eq!(plan.feature_channels(), 512);
    }

    #[test]
    fn test_output_stride_is_thirty_two() {
        let plan = preset_plan(ResNetPreset::ResNet50, 1000);
        assert_eq!(plan.output_stride(), 32);
    }

    #[test]
    fn test_empty_stage_is_rejected() {
        let err = NetworkPlan::new(BlockKind::Basic, 3, 64, DEFAULT_WIDTHS, [2, 0, 2, 2], 10)
            .unwrap_err();
        assert_eq!(err, ArchitectureError::EmptyStage { stage: 2 });
    }

    #[test]
    fn test_zero_width_is_rejected() {
        let err = NetworkPlan::new(BlockKind::Bottleneck, 3, 64, [64, 128, 0, 512], [1, 1, 1, 1], 10)
            .unwrap_err();
        assert_eq!(err, ArchitectureError::ZeroWidth { stage: 3 });
    }

    #[test]
    fn test_zero_classes_is_rejected() {
        let err = NetworkPlan::new(BlockKind::Basic, 3, 64, DEFAULT_WIDTHS, [1, 1, 1, 1], 0)
            .unwrap_err();
        assert!(matches!(err, ArchitectureError::ZeroDimension { .. }));
    }

    #[test]
    fn test_kind_constants() {
        assert_eq!(BlockKind::Basic.expansion(), 1);
        assert_eq!(BlockKind::Bottleneck.expansion(), 4);
        assert_eq!(BlockKind::Bottleneck.to_string(), "bottleneck");
    }

    #[test]
    fn test_identity_shortcuts_always_match_block_output() {
        for preset in [
            ResNetPreset::ResNet18,
            ResNetPreset::ResNet34,
            ResNetPreset::ResNet50,
            ResNetPreset::ResNet101,
            ResNetPreset::ResNet152,
        ] {
            let plan = preset_plan(preset, 10);
            let mut channels = plan.stem_width;
            for block in plan.stages.iter().flat_map(|s| s.blocks.iter()) {
                assert_eq!(block.in_channels, channels, "{preset:?}");
                if !block.projection {
                    assert_eq!((block.in_channels, block.stride), (block.out_channels, 1), "{preset:?}");
                }
                channels = block.out_channels;
            }
            assert_eq!(channels, plan.feature_channels());
        }
    }

    #[test]
    fn test_default_widths_double_from_sixty_four() {
        assert_eq!(widths_from_base(DEFAULT_STEM_WIDTH), DEFAULT_WIDTHS);
        assert_eq!(widths_from_base(4), [4, 8, 16, 32]);
    }
}
