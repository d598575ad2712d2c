// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Rebuilds a trained network from its checkpoint and classifies
// single images:
//
//   <output>.json    → ResNetConfig + class names + image size
//   <output>.mpk.gz  → parameters
//   image file       → RgbPixels → [1, 3, H, W] → logits → softmax
//
// Runs on the bare backend (no autodiff), so batch norm uses its
// running statistics.

use anyhow::{bail, Result};
use burn::{prelude::*, tensor::activation::softmax};
use std::path::Path;

use crate::data::preprocessor::{Preprocessor, RgbPixels, CHANNELS};
use crate::domain::compute_target::ComputeTarget;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::backend::{accelerator_device, cpu_device, AcceleratorBackend, CpuBackend};
use crate::ml::model::ResNet;

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label:       usize,
    pub class_name:  String,
    pub probability: f32,
}

pub struct Classifier<B: Backend> {
    model:        ResNet<B>,
    classes:      Vec<String>,
    image_size:   [usize; 2],
    device:       B::Device,
    preprocessor: Preprocessor,
}

impl<B: Backend> Classifier<B> {
    pub fn new(
        model:      ResNet<B>,
        classes:    Vec<String>,
        image_size: [usize; 2],
        device:     B::Device,
    ) -> Self {
        Self { model, classes, image_size, device, preprocessor: Preprocessor::new() }
    }

    pub fn from_checkpoint(ckpt: &CheckpointManager, device: B::Device) -> Result<Self> {
        let meta  = ckpt.load_meta()?;
        let model = meta.model.init::<B>(&device)?;
        let model = ckpt.load_model(model, &device)?;
        tracing::info!(
            "Model loaded from '{}' ({} classes)",
            ckpt.params_path().display(),
            meta.classes.len()
        );
        Ok(Self::new(model, meta.classes, meta.image_size, device))
    }

    pub fn classify(&self, path: &Path) -> Result<Prediction> {
        let pixels = self.preprocessor.decode(path)?;
        self.classify_pixels(&pixels)
    }

    pub fn classify_pixels(&self, pixels: &RgbPixels) -> Result<Prediction> {
        let [h, w] = self.image_size;
        if [pixels.height, pixels.width] != self.image_size {
            bail!(
                "Image is {}x{} but the model was trained on {}x{} images",
                pixels.height, pixels.width, h, w
            );
        }

        let mut flat = Vec::with_capacity(CHANNELS * h * w);
        self.preprocessor.to_tensor_layout(pixels, &mut flat);
        let data   = TensorData::new(flat, [1, CHANNELS, h, w]).convert::<B::FloatElem>();
        let images = Tensor::<B, 4>::from_data(data, &self.device);

        let probs: Vec<f32> = softmax(self.model.forward(images), 1)
            .into_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .map_err(|e| anyhow::anyhow!("Cannot read probabilities: {e:?}"))?;

        let (label, probability) = probs
            .iter()
            .copied()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .ok_or_else(|| anyhow::anyhow!("Model produced no logits"))?;

        let class_name = self
            .classes
            .get(label)
            .cloned()
            .unwrap_or_else(|| format!("#{label}"));

        tracing::debug!("Predicted class {} ('{}') p={:.4}", label, class_name, probability);
        Ok(Prediction { label, class_name, probability })
    }
}

/// Load the checkpoint on `target` and classify one image file.
pub fn classify_file(
    ckpt:   &CheckpointManager,
    image:  &Path,
    target: ComputeTarget,
) -> Result<Prediction> {
    match target {
        ComputeTarget::Cpu => {
            Classifier::<CpuBackend>::from_checkpoint(ckpt, cpu_device())?.classify(image)
        }
        ComputeTarget::Accelerator => {
            Classifier::<AcceleratorBackend>::from_checkpoint(ckpt, accelerator_device())?
                .classify(image)
        }
    }
}
