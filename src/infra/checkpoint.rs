// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Writes the trained parameters once, at the end of training,
// and reads them back for inference.
//
// Files, for an output path such as `/models/baseline-resnet50`:
//
//   /models/baseline-resnet50.mpk.gz   every parameter tensor by name
//   /models/baseline-resnet50.json     network config + class names
//
// Parameters are stored at full precision, so a reloaded model
// produces exactly the logits the saved one did.
//
// Reference: Burn Book §5 (Records)

use anyhow::{Context, Result};
use std::{
    fs,
    path::PathBuf,
};
use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkGzFileRecorder, Recorder},
};
use serde::{Deserialize, Serialize};

use crate::ml::model::{ResNet, ResNetConfig};

type ParamRecorder = NamedMpkGzFileRecorder<FullPrecisionSettings>;

/// Everything needed to rebuild the network before loading its weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointMeta {
    pub model:      ResNetConfig,
    /// Class names in label order
    pub classes:    Vec<String>,
    /// `[height, width]` the network was trained on
    pub image_size: [usize; 2],
}

pub struct CheckpointManager {
    /// Output path without extension
    base: PathBuf,
}

impl CheckpointManager {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn params_path(&self) -> PathBuf {
        self.base.with_extension("mpk.gz")
    }

    pub fn meta_path(&self) -> PathBuf {
        self.base.with_extension("json")
    }

    fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.base.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create '{}'", parent.display()))?;
        }
        Ok(())
    }

    /// Serialise every parameter of `model` (name → tensor).
    pub fn save_model<B: Backend>(&self, model: &ResNet<B>) -> Result<()> {
        self.ensure_parent()?;

        ParamRecorder::new()
            .record(model.clone().into_record(), self.base.clone())
            .with_context(|| {
                format!("Failed to save parameters to '{}'", self.params_path().display())
            })?;

        tracing::debug!("Saved parameters to '{}'", self.params_path().display());
        Ok(())
    }

    /// Load saved parameters into `model`, which must have the same layout.
    pub fn load_model<B: Backend>(&self, model: ResNet<B>, device: &B::Device) -> Result<ResNet<B>> {
        let record = ParamRecorder::new()
            .load(self.base.clone(), device)
            .with_context(|| {
                format!(
                    "Cannot load parameters from '{}'. Have you trained the model first?",
                    self.params_path().display()
                )
            })?;

        Ok(model.load_record(record))
    }

    pub fn save_meta(&self, meta: &CheckpointMeta) -> Result<()> {
        self.ensure_parent()?;
        let path = self.meta_path();
        let json = serde_json::to_string_pretty(meta)?;

        fs::write(&path, json)
            .with_context(|| format!("Cannot write '{}'", path.display()))?;

        tracing::debug!("Saved checkpoint metadata to '{}'", path.display());
        Ok(())
    }

    pub fn load_meta(&self) -> Result<CheckpointMeta> {
        let path = self.meta_path();
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read '{}'", path.display()))?;

        serde_json::from_str(&json)
            .with_context(|| format!("Malformed checkpoint metadata in '{}'", path.display()))
    }
}
