// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Index the training folder     (Layer 4 - data)
//   Step 2: Index the validation folder   (Layer 4 - data)
//   Step 3: Build the network config      (Layer 5 - ml)
//   Step 4: Prepare output files          (Layer 6 - infra)
//   Step 5: Run the training loop         (Layer 5 - ml)
//   Step 6: Save checkpoint metadata      (Layer 6 - infra)
//
// Reference: Burn Book §5 (Training)

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::data::loader::ImageFolderLoader;
use crate::domain::{
    architecture::{widths_from_base, ResNetPreset, DEFAULT_STEM_WIDTH},
    compute_target::ComputeTarget,
    traits::ImageSource,
};
use crate::infra::{
    checkpoint::{CheckpointManager, CheckpointMeta},
    metrics::MetricsLogger,
};
use crate::ml::model::ResNetConfig;
use crate::ml::trainer::{run_training, TrainingReport};

// ─── Training Configuration ──────────────────────────────────────────────────
// Every knob of a run. The defaults reproduce the stock
// ResNet-50 / Tiny ImageNet baseline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub train_dir:      String,
    pub val_dir:        String,
    /// Parameter file path without extension
    pub output:         String,
    pub preset:         ResNetPreset,
    pub num_classes:    usize,
    /// Width of the stem and first stage; later stages double it
    pub base_width:     usize,
    pub epochs:         usize,
    pub batch_size:     usize,
    pub lr:             f64,
    pub momentum:       f64,
    pub report_every:   usize,
    pub num_workers:    usize,
    pub seed:           u64,
    pub compute_target: ComputeTarget,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            train_dir:      "data/tiny-imagenet-200/train".to_string(),
            val_dir:        "data/tiny-imagenet-200/val".to_string(),
            output:         "/models/baseline-resnet50".to_string(),
            preset:         ResNetPreset::ResNet50,
            num_classes:    1000,
            base_width:     DEFAULT_STEM_WIDTH,
            epochs:         100,
            batch_size:     32,
            lr:             0.01,
            momentum:       0.9,
            report_every:   2000,
            num_workers:    1,
            seed:           42,
            compute_target: ComputeTarget::from_env(),
        }
    }
}

impl TrainConfig {
    pub fn model_config(&self) -> ResNetConfig {
        ResNetConfig::from_preset(self.preset, self.num_classes)
            .with_widths(widths_from_base(self.base_width))
            .with_stem_width(self.base_width)
    }

    /// Reject settings the training loop cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            bail!("--batch-size must be greater than zero");
        }
        if self.report_every == 0 {
            bail!("--report-every must be greater than zero");
        }
        if !(self.lr.is_finite() && self.lr > 0.0) {
            bail!("--lr must be a positive number, got {}", self.lr);
        }
        if !(0.0..1.0).contains(&self.momentum) {
            bail!("--momentum must be in [0, 1), got {}", self.momentum);
        }
        Ok(())
    }

    /// Directory that receives `metrics.csv`, next to the parameter file.
    pub fn metrics_dir(&self) -> PathBuf {
        match Path::new(&self.output).parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<TrainingReport> {
        let cfg = &self.config;
        cfg.validate()?;

        // ── Step 1: Training images ───────────────────────────────────────────
        tracing::info!("Indexing training images in '{}'", cfg.train_dir);
        let train = ImageFolderLoader::new(&cfg.train_dir).load()?;
        tracing::info!(
            "Training set '{}': {} images, {} classes, {}x{} pixels",
            train.root.display(),
            train.len(),
            train.num_classes(),
            train.image_size[0],
            train.image_size[1],
        );
        for (label, count) in train.class_counts().into_iter().enumerate() {
            if count == 0 {
                tracing::warn!(
                    "Class '{}' has no readable images",
                    train.class_name(label).unwrap_or_default()
                );
            }
        }

        // ── Step 2: Validation images (indexed, not evaluated) ────────────────
        let val = ImageFolderLoader::new(&cfg.val_dir).load()?;
        tracing::info!("Validation set: {} images, {} classes", val.len(), val.num_classes());
        if val.classes != train.classes {
            tracing::warn!("Validation classes differ from training classes");
        }

        // ── Step 3: Network ───────────────────────────────────────────────────
        if train.num_classes() > cfg.num_classes {
            bail!(
                "Training set has {} classes but the classifier only has {} outputs",
                train.num_classes(),
                cfg.num_classes
            );
        }
        let model_cfg = cfg.model_config();

        // ── Step 4: Output files ──────────────────────────────────────────────
        let ckpt    = CheckpointManager::new(&cfg.output);
        let metrics = MetricsLogger::new(cfg.metrics_dir())?;
        tracing::info!("Epoch metrics go to '{}'", metrics.csv_path().display());

        // ── Step 5: Train ─────────────────────────────────────────────────────
        tracing::info!(
            "Training {:?} on {} for {} epochs (batch_size={}, lr={}, momentum={})",
            cfg.preset,
            cfg.compute_target,
            cfg.epochs,
            cfg.batch_size,
            cfg.lr,
            cfg.momentum,
        );
        let report = run_training(cfg, &model_cfg, &train, &ckpt, &metrics)?;

        // ── Step 6: Metadata for inference ────────────────────────────────────
        ckpt.save_meta(&CheckpointMeta {
            model:      model_cfg,
            classes:    train.classes.clone(),
            image_size: train.image_size,
        })?;

        Ok(report)
    }
}
