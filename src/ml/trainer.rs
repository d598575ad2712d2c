// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Plain supervised training with Burn's DataLoader and SGD:
//
//   for each epoch:
//     for each mini-batch (in dataset order):
//       logits = model(images)
//       loss   = cross_entropy(logits, targets)
//       grads  = loss.backward()          fresh every batch
//       model  = sgd.step(lr, model, grads)
//       every `report_every` batches: log mean running loss
//
// After the last epoch the parameters are written once. There is
// no validation pass, no early stopping and no intermediate save.
//
// Reference: Burn Book §5 (Custom Training Loop)

use anyhow::Result;
use burn::{
    data::dataloader::{DataLoader, DataLoaderBuilder},
    optim::{momentum::MomentumConfig, GradientsParams, Optimizer, SgdConfig},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use std::path::PathBuf;

use crate::application::train_use_case::TrainConfig;
use crate::data::{
    batcher::{ImageBatch, ImageBatcher},
    dataset::ImageDataset,
};
use crate::domain::{compute_target::ComputeTarget, image_folder::ImageFolder};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{EpochMetrics, MetricsLogger},
};
use crate::ml::backend::{
    accelerator_device, cpu_device, AcceleratorTrainBackend, CpuTrainBackend,
};
use crate::ml::model::{ResNet, ResNetConfig};
use crate::ml::session::{Phase, TrainingSession};

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub epochs:      usize,
    pub last_epoch:  Option<EpochMetrics>,
    pub params_path: PathBuf,
}

/// SGD with classical momentum: no dampening, no Nesterov, no weight decay.
/// A momentum of zero gives plain SGD.
pub fn optimizer_config(momentum: f64) -> SgdConfig {
    let momentum = (momentum > 0.0).then(|| {
        MomentumConfig::new()
            .with_momentum(momentum)
            .with_dampening(0.0)
            .with_nesterov(false)
    });
    SgdConfig::new().with_momentum(momentum)
}

pub fn run_training(
    cfg:       &TrainConfig,
    model_cfg: &ResNetConfig,
    train:     &ImageFolder,
    ckpt:      &CheckpointManager,
    metrics:   &MetricsLogger,
) -> Result<TrainingReport> {
    match cfg.compute_target {
        ComputeTarget::Cpu => {
            let device = cpu_device();
            tracing::info!("Using CPU device: {:?}", device);
            train_loop::<CpuTrainBackend>(cfg, model_cfg, train, ckpt, metrics, device)
        }
        ComputeTarget::Accelerator => {
            let device = accelerator_device();
            tracing::info!("Using WGPU device: {:?}", device);
            train_loop::<AcceleratorTrainBackend>(cfg, model_cfg, train, ckpt, metrics, device)
        }
    }
}

fn train_loop<B: AutodiffBackend>(
    cfg:       &TrainConfig,
    model_cfg: &ResNetConfig,
    train:     &ImageFolder,
    ckpt:      &CheckpointManager,
    metrics:   &MetricsLogger,
    device:    B::Device,
) -> Result<TrainingReport> {

    // ── Build model ───────────────────────────────────────────────────────────
    B::seed(cfg.seed);
    let mut model: ResNet<B> = model_cfg.init(&device)?;
    tracing::info!(
        "Model ready: {} {:?} ({} weighted layers, {} projections, {} parameters)",
        model_cfg.block,
        model_cfg.layers,
        model.weighted_layer_count(),
        model.projection_count(),
        model.num_params(),
    );

    // ── Optimizer ─────────────────────────────────────────────────────────────
    let mut optim = optimizer_config(cfg.momentum).init::<B, ResNet<B>>();

    // ── Training data loader (dataset order, no shuffling) ────────────────────
    let loader = DataLoaderBuilder::new(ImageBatcher::<B>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .num_workers(cfg.num_workers)
        .build(ImageDataset::from_folder(train));

    // ── Epoch loop ────────────────────────────────────────────────────────────
    let mut session    = TrainingSession::new(cfg.epochs, cfg.report_every);
    let mut last_epoch = None;

    while !session.is_finished() {
        let epoch = session.begin_epoch();
        tracing::info!("-- EPOCH: {}", epoch);

        model = train_epoch(model, &mut optim, loader.as_ref(), &mut session, cfg.lr);

        let m = session.end_epoch();
        tracing::info!(
            "Epoch {:>3}/{} | batches={} | mean_loss={:.4}",
            m.epoch,
            session.total_epochs(),
            m.batches,
            m.mean_loss(),
        );
        metrics.log(&m)?;
        last_epoch = Some(m);
    }

    // ── Final parameter dump ──────────────────────────────────────────────────
    ckpt.save_model(&model)?;
    tracing::info!("Parameters saved to '{}'", ckpt.params_path().display());

    Ok(TrainingReport {
        epochs: session.epoch(),
        last_epoch,
        params_path: ckpt.params_path(),
    })
}

/// One pass over `loader`: one optimizer step per mini-batch.
pub fn train_epoch<B, O>(
    mut model: ResNet<B>,
    optim:     &mut O,
    loader:    &dyn DataLoader<ImageBatch<B>>,
    session:   &mut TrainingSession,
    lr:        f64,
) -> ResNet<B>
where
    B: AutodiffBackend,
    O: Optimizer<ResNet<B>, B>,
{
    debug_assert_eq!(session.phase(), Phase::EpochRunning, "begin_epoch first");

    for (i, batch) in loader.iter().enumerate() {
        tracing::info!("-- ITERATION: {}", i);

        let loss     = model.forward_loss(batch.images, batch.targets);
        let loss_val = loss.clone().into_scalar().elem::<f64>();

        // Backward pass + SGD update
        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &model);
        model = optim.step(lr, model, grads);

        if let Some(running) = session.record_batch(i, loss_val) {
            tracing::info!("-- RUNNING_LOSS: {}", running);
        }
    }
    model
}
