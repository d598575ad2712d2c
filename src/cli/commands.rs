// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the three subcommands: `train`, `predict` and
// `summary`, and all their configurable flags.
//
// `train` with no flags reproduces the baseline run:
// ResNet-50, Tiny ImageNet, 100 epochs, SGD(0.01, 0.9), batch 32.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand, ValueEnum};

use crate::application::train_use_case::TrainConfig;
use crate::domain::{architecture::ResNetPreset, compute_target::ComputeTarget};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train a ResNet classifier on a class-per-directory image folder
    Train(TrainArgs),

    /// Classify one image with a trained checkpoint
    Predict(PredictArgs),

    /// Print a network's layout and size without training it
    Summary(SummaryArgs),
}

// ─── Value enums ──────────────────────────────────────────────────────────────
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    Resnet18,
    Resnet34,
    Resnet50,
    Resnet101,
    Resnet152,
}

impl From<Arch> for ResNetPreset {
    fn from(a: Arch) -> Self {
        match a {
            Arch::Resnet18  => ResNetPreset::ResNet18,
            Arch::Resnet34  => ResNetPreset::ResNet34,
            Arch::Resnet50  => ResNetPreset::ResNet50,
            Arch::Resnet101 => ResNetPreset::ResNet101,
            Arch::Resnet152 => ResNetPreset::ResNet152,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    /// NdArray backend
    Cpu,
    /// Wgpu backend
    Accelerator,
}

/// An explicit `--device` wins; otherwise the `CUDA` environment
/// variable decides (only `CUDA=False` selects the CPU).
pub fn resolve_device(device: Option<Device>) -> ComputeTarget {
    match device {
        Some(Device::Cpu)         => ComputeTarget::Cpu,
        Some(Device::Accelerator) => ComputeTarget::Accelerator,
        None                      => ComputeTarget::from_env(),
    }
}

// ─── train ────────────────────────────────────────────────────────────────────
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Training images, one sub-directory per class
    #[arg(long, default_value = "data/tiny-imagenet-200/train")]
    pub train_dir: String,

    /// Validation images, one sub-directory per class (indexed only)
    #[arg(long, default_value = "data/tiny-imagenet-200/val")]
    pub val_dir: String,

    /// Where to save the trained parameters, without extension
    #[arg(long, default_value = "/models/baseline-resnet50")]
    pub output: String,

    /// Network depth
    #[arg(long, value_enum, default_value_t = Arch::Resnet50)]
    pub arch: Arch,

    /// Outputs of the final fully connected layer
    #[arg(long, default_value_t = 1000)]
    pub num_classes: usize,

    /// Width of the stem and first stage; each later stage doubles it
    #[arg(long, default_value_t = 64)]
    pub base_width: usize,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 100)]
    pub epochs: usize,

    /// Images per mini-batch
    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    /// SGD learning rate
    #[arg(long, default_value_t = 0.01)]
    pub lr: f64,

    /// SGD momentum (0 disables it)
    #[arg(long, default_value_t = 0.9)]
    pub momentum: f64,

    /// Log the mean running loss every N mini-batches
    #[arg(long, default_value_t = 2000)]
    pub report_every: usize,

    /// Data loader worker threads
    #[arg(long, default_value_t = 1)]
    pub num_workers: usize,

    /// Seed for parameter initialisation
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Compute device; defaults to the `CUDA` environment variable
    #[arg(long, value_enum)]
    pub device: Option<Device>,
}

/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            train_dir:      a.train_dir,
            val_dir:        a.val_dir,
            output:         a.output,
            preset:         a.arch.into(),
            num_classes:    a.num_classes,
            base_width:     a.base_width,
            epochs:         a.epochs,
            batch_size:     a.batch_size,
            lr:             a.lr,
            momentum:       a.momentum,
            report_every:   a.report_every,
            num_workers:    a.num_workers,
            seed:           a.seed,
            compute_target: resolve_device(a.device),
        }
    }
}

// ─── predict ──────────────────────────────────────────────────────────────────
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Image file to classify
    #[arg(long)]
    pub image: String,

    /// The `--output` path used for training
    #[arg(long, default_value = "/models/baseline-resnet50")]
    pub model: String,

    /// Compute device; defaults to the `CUDA` environment variable
    #[arg(long, value_enum)]
    pub device: Option<Device>,
}

// ─── summary ──────────────────────────────────────────────────────────────────
#[derive(Args, Debug)]
pub struct SummaryArgs {
    #[arg(long, value_enum, default_value_t = Arch::Resnet50)]
    pub arch: Arch,

    #[arg(long, default_value_t = 1000)]
    pub num_classes: usize,

    #[arg(long, default_value_t = 64)]
    pub base_width: usize,
}
