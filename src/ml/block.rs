// ============================================================
// Layer 5 — Residual Blocks
// ============================================================
//   Basic:      3x3 → BN → ReLU → 3x3 → BN        (+ shortcut) → ReLU
//   Bottleneck: 1x1 → BN → ReLU → 3x3 → BN → ReLU
//               → 1x1 (x4) → BN                   (+ shortcut) → ReLU
//
// The shortcut is the identity unless the block changes stride or
// channel count, in which case it is a 1x1 conv + BN projection.

use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        BatchNorm, BatchNormConfig, Initializer, PaddingConfig2d, Relu,
    },
    prelude::*,
};

use crate::domain::architecture::{BlockKind, BlockPlan};

/// Convolution without bias, weights drawn from N(0, sqrt(2 / (k·k·out))).
pub fn conv2d<B: Backend>(
    in_channels:  usize,
    out_channels: usize,
    kernel:       usize,
    stride:       usize,
    padding:      usize,
    device:       &B::Device,
) -> Conv2d<B> {
    let fan_out = (kernel * kernel * out_channels) as f64;
    Conv2dConfig::new([in_channels, out_channels], [kernel, kernel])
        .with_stride([stride, stride])
        .with_padding(PaddingConfig2d::Explicit(padding, padding))
        .with_bias(false)
        .with_initializer(Initializer::Normal { mean: 0.0, std: (2.0 / fan_out).sqrt() })
        .init(device)
}

/// Batch norm with unit scale and zero shift.
pub fn batch_norm<B: Backend>(channels: usize, device: &B::Device) -> BatchNorm<B, 2> {
    BatchNormConfig::new(channels).init(device)
}

// ─── Projection ───────────────────────────────────────────────────────────────
/// 1x1 conv + norm that brings the residual to the block's output shape.
#[derive(Module, Debug)]
pub struct Downsample<B: Backend> {
    pub conv: Conv2d<B>,
    pub bn:   BatchNorm<B, 2>,
}

impl<B: Backend> Downsample<B> {
    pub fn new(plan: &BlockPlan, device: &B::Device) -> Self {
        Self {
            conv: conv2d(plan.in_channels, plan.out_channels, 1, plan.stride, 0, device),
            bn:   batch_norm(plan.out_channels, device),
        }
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        self.bn.forward(self.conv.forward(x))
    }
}

fn residual<B: Backend>(downsample: &Option<Downsample<B>>, x: Tensor<B, 4>) -> Tensor<B, 4> {
    match downsample {
        Some(projection) => projection.forward(x),
        None             => x,
    }
}

// ─── Basic ────────────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct BasicBlock<B: Backend> {
    pub conv1:      Conv2d<B>,
    pub bn1:        BatchNorm<B, 2>,
    pub conv2:      Conv2d<B>,
    pub bn2:        BatchNorm<B, 2>,
    pub relu:       Relu,
    pub downsample: Option<Downsample<B>>,
}

impl<B: Backend> BasicBlock<B> {
    pub fn new(plan: &BlockPlan, device: &B::Device) -> Self {
        Self {
            conv1:      conv2d(plan.in_channels, plan.width, 3, plan.stride, 1, device),
            bn1:        batch_norm(plan.width, device),
            conv2:      conv2d(plan.width, plan.out_channels, 3, 1, 1, device),
            bn2:        batch_norm(plan.out_channels, device),
            relu:       Relu::new(),
            downsample: plan.projection.then(|| Downsample::new(plan, device)),
        }
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let identity = residual(&self.downsample, x.clone());

        let out = self.relu.forward(self.bn1.forward(self.conv1.forward(x)));
        let out = self.bn2.forward(self.conv2.forward(out));

        self.relu.forward(out + identity)
    }
}

// ─── Bottleneck ───────────────────────────────────────────────────────────────
/// Stride sits on the 3x3 convolution.
#[derive(Module, Debug)]
pub struct Bottleneck<B: Backend> {
    pub conv1:      Conv2d<B>,
    pub bn1:        BatchNorm<B, 2>,
    pub conv2:      Conv2d<B>,
    pub bn2:        BatchNorm<B, 2>,
    pub conv3:      Conv2d<B>,
    pub bn3:        BatchNorm<B, 2>,
    pub relu:       Relu,
    pub downsample: Option<Downsample<B>>,
}

impl<B: Backend> Bottleneck<B> {
    pub fn new(plan: &BlockPlan, device: &B::Device) -> Self {
        Self {
            conv1:      conv2d(plan.in_channels, plan.width, 1, 1, 0, device),
            bn1:        batch_norm(plan.width, device),
            conv2:      conv2d(plan.width, plan.width, 3, plan.stride, 1, device),
            bn2:        batch_norm(plan.width, device),
            conv3:      conv2d(plan.width, plan.out_channels, 1, 1, 0, device),
            bn3:        batch_norm(plan.out_channels, device),
            relu:       Relu::new(),
            downsample: plan.projection.then(|| Downsample::new(plan, device)),
        }
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let identity = residual(&self.downsample, x.clone());

        let out = self.relu.forward(self.bn1.forward(self.conv1.forward(x)));
        let out = self.relu.forward(self.bn2.forward(self.conv2.forward(out)));
        let out = self.bn3.forward(self.conv3.forward(out));

        self.relu.forward(out + identity)
    }
}

// ─── ResidualBlock ────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub enum ResidualBlock<B: Backend> {
    Basic(BasicBlock<B>),
    Bottleneck(Bottleneck<B>),
}

impl<B: Backend> ResidualBlock<B> {
    pub fn new(kind: BlockKind, plan: &BlockPlan, device: &B::Device) -> Self {
        match kind {
            BlockKind::Basic      => Self::Basic(BasicBlock::new(plan, device)),
            BlockKind::Bottleneck => Self::Bottleneck(Bottleneck::new(plan, device)),
        }
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        match self {
            Self::Basic(block)      => block.forward(x),
            Self::Bottleneck(block) => block.forward(x),
        }
    }

    pub fn kind(&self) -> BlockKind {
        match self {
            Self::Basic(_)      => BlockKind::Basic,
            Self::Bottleneck(_) => BlockKind::Bottleneck,
        }
    }

    pub fn has_projection(&self) -> bool {
        match self {
            Self::Basic(block)      => block.downsample.is_some(),
            Self::Bottleneck(block) => block.downsample.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn plan(in_channels: usize, width: usize, expansion: usize, stride: usize) -> BlockPlan {
        let out_channels = width * expansion;
        BlockPlan {
            in_channels,
            width,
            out_channels,
            stride,
            projection: stride != 1 || in_channels != out_channels,
        }
    }

    #[test]
    fn test_basic_block_keeps_shape_without_projection() {
        let device = Default::default();
        let block  = BasicBlock::<TestBackend>::new(&plan(8, 8, 1, 1), &device);
        assert!(block.downsample.is_none());

        let out = block.forward(Tensor::ones([2, 8, 6, 6], &device));
        assert_eq!(out.dims(), [2, 8, 6, 6]);
    }

    #[test]
    fn test_basic_block_downsamples() {
        let device = Default::default();
        let block  = BasicBlock::<TestBackend>::new(&plan(8, 16, 1, 2), &device);
        assert!(block.downsample.is_some());

        let out = block.forward(Tensor::ones([1, 8, 8, 8], &device));
        assert_eq!(out.dims(), [1, 16, 4, 4]);
    }

    #[test]
    fn test_bottleneck_expands_by_four() {
        let device = Default::default();
        let block  = ResidualBlock::<TestBackend>::new(
            BlockKind::Bottleneck,
            &plan(16, 4, 4, 2),
            &device,
        );
        assert_eq!(block.kind(), BlockKind::Bottleneck);
        assert!(block.has_projection());

        let out = block.forward(Tensor::ones([1, 16, 8, 8], &device));
        assert_eq!(out.dims(), [1, 16, 4, 4]);
    }

    #[test]
    fn test_output_is_non_negative() {
        let device = Default::default();
        let block  = BasicBlock::<TestBackend>::new(&plan(4, 4, 1, 1), &device);
        let x      = Tensor::<TestBackend, 4>::random(
            [2, 4, 4, 4],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );
        let min = block.forward(x).min().into_scalar();
        assert!(min >= 0.0);
    }

    #[test]
    fn test_conv_weights_follow_fan_out_scale() {
        let device = Default::default();
        // fan-out = 3 * 3 * 64 → std = sqrt(2 / 576) ≈ 0.0589
        let conv = conv2d::<TestBackend>(64, 64, 3, 1, 1, &device);
        let w    = conv.weight.val();
        let n    = w.shape().num_elements() as f64;
        let mean = w.clone().mean().into_scalar() as f64;
        let var  = (w - mean).powf_scalar(2.0).sum().into_scalar() as f64 / n;
        let std  = var.sqrt();
        assert!(mean.abs() < 0.01, "mean {mean}");
        assert!((std - (2.0f64 / 576.0).sqrt()).abs() < 0.005, "std {std}");
    }

    #[test]
    fn test_batch_norm_starts_at_identity_affine() {
        let device = Default::default();
        let bn     = batch_norm::<TestBackend>(5, &device);
        let gamma  = bn.gamma.val().into_data().to_vec::<f32>().unwrap();
        let beta   = bn.beta.val().into_data().to_vec::<f32>().unwrap();
        assert!(gamma.iter().all(|&g| g == 1.0));
        assert!(beta.iter().all(|&b| b == 0.0));
    }
}
