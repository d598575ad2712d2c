// ============================================================
// Layer 2 — PredictUseCase
// ============================================================
// Loads a trained checkpoint and classifies one image:
//
//   Step 1: Locate the checkpoint files   (Layer 6 - infra)
//   Step 2: Rebuild and classify          (Layer 5 - ml)

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

use crate::domain::compute_target::ComputeTarget;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::inferencer::{classify_file, Prediction};

pub struct PredictUseCase {
    ckpt:   CheckpointManager,
    target: ComputeTarget,
}

impl PredictUseCase {
    /// `model` is the `--output` path the network was trained with.
    pub fn new(model: impl Into<PathBuf>, target: ComputeTarget) -> Self {
        Self { ckpt: CheckpointManager::new(model), target }
    }

    pub fn classify(&self, image: &Path) -> Result<Prediction> {
        if !image.is_file() {
            bail!("Image '{}' does not exist", image.display());
        }
        tracing::info!("Classifying '{}' on {}", image.display(), self.target);
        classify_file(&self.ckpt, image, self.target)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    use crate::data::loader::tests::write_png;
    use crate::domain::architecture::BlockKind;
    use crate::infra::checkpoint::CheckpointMeta;
    use crate::ml::model::{ResNet, ResNetConfig};

    #[test]
    fn test_classifies_with_a_saved_checkpoint() {
        let dir   = tempfile::tempdir().unwrap();
        let base  = dir.path().join("run");
        let model_cfg = ResNetConfig::new(BlockKind::Bottleneck, [1, 1, 1, 1])
            .with_num_classes(2)
            .with_widths([2, 4, 4, 8])
            .with_stem_width(4);

        let ckpt  = CheckpointManager::new(&base);
        let model: ResNet<NdArray> = model_cfg.init(&Default::default()).unwrap();
        ckpt.save_model(&model).unwrap();
        ckpt.save_meta(&CheckpointMeta {
            model:      model_cfg,
            classes:    vec!["left".into(), "right".into()],
            image_size: [16, 16],
        })
        .unwrap();

        let img = dir.path().join("x.png");
        write_png(&img, 16, 16, [40, 80, 120]);

        let prediction = PredictUseCase::new(&base, ComputeTarget::Cpu).classify(&img).unwrap();
        assert!(["left", "right"].contains(&prediction.class_name.as_str()));
    }

    #[test]
    fn test_missing_image_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let use_case = PredictUseCase::new(dir.path().join("run"), ComputeTarget::Cpu);
        let err = use_case.classify(&dir.path().join("none.png")).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
