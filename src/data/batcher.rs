// ============================================================
// Layer 4 — Image Batcher
// ============================================================
// Implements Burn's Batcher trait to turn a Vec<ImageSample>
// into tensors on the training device.
//
//   Input:  N samples, each H x W RGB
//   Output: images  [N, 3, H, W]  f32 in [0, 1]
//           targets [N]           class indices
//
// Every sample in a batch must have the same size; the loader
// already rejects folders with mixed sizes.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
    tensor::TensorData,
};

use crate::data::dataset::ImageSample;
use crate::data::preprocessor::{Preprocessor, CHANNELS};

// ─── ImageBatch ───────────────────────────────────────────────────────────────
/// A mini-batch ready for the forward pass.
#[derive(Debug, Clone)]
pub struct ImageBatch<B: Backend> {
    /// shape: [batch_size, 3, height, width]
    pub images: Tensor<B, 4>,

    /// Ground truth class indices — shape: [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

// ─── ImageBatcher ─────────────────────────────────────────────────────────────
/// Holds the target device so tensors are created where the model lives.
#[derive(Clone, Debug)]
pub struct ImageBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> ImageBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<ImageSample, ImageBatch<B>> for ImageBatcher<B> {
    /// # Panics
    /// Panics on an empty batch or on samples of different sizes.
    fn batch(&self, items: Vec<ImageSample>) -> ImageBatch<B> {
        let batch_size = items.len();
        let height     = items[0].pixels.height;
        let width      = items[0].pixels.width;

        // ── Flatten images in CHW order, one after another ────────────────────
        let preprocessor = Preprocessor::new();
        let mut flat     = Vec::with_capacity(batch_size * CHANNELS * height * width);
        for item in &items {
            assert!(
                item.pixels.height == height && item.pixels.width == width,
                "batch mixes {}x{} and {}x{} images",
                width,
                height,
                item.pixels.width,
                item.pixels.height,
            );
            preprocessor.to_tensor_layout(&item.pixels, &mut flat);
        }

        let labels: Vec<i64> = items.iter().map(|s| s.label as i64).collect();

        // ── Create tensors ────────────────────────────────────────────────────
        let data   = TensorData::new(flat, [batch_size, CHANNELS, height, width]);
        let images = Tensor::<B, 4>::from_data(data.convert::<B::FloatElem>(), &self.device);

        let targets = Tensor::<B, 1, Int>::from_data(
            TensorData::from(labels.as_slice()).convert::<B::IntElem>(),
            &self.device,
        );

        ImageBatch { images, targets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::preprocessor::RgbPixels;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn solid(height: usize, width: usize, rgb: [u8; 3], label: usize) -> ImageSample {
        let data = rgb.iter().copied().cycle().take(height * width * 3).collect();
        ImageSample { pixels: RgbPixels { height, width, data }, label }
    }

    #[test]
    fn test_batch_shapes_and_values() {
        let batcher = ImageBatcher::<TestBackend>::new(Default::default());
        let batch   = batcher.batch(vec![
            solid(2, 3, [255, 0, 0], 1),
            solid(2, 3, [0, 0, 255], 3),
        ]);

        assert_eq!(batch.images.dims(), [2, 3, 2, 3]);
        assert_eq!(batch.targets.dims(), [2]);

        let values = batch.images.into_data().to_vec::<f32>().unwrap();
        // first image: red plane of ones, green and blue zero
        assert!(values[0..6].iter().all(|&v| v == 1.0));
        assert!(values[6..18].iter().all(|&v| v == 0.0));
        // second image: blue plane only
        assert!(values[18..30].iter().all(|&v| v == 0.0));
        assert!(values[30..36].iter().all(|&v| v == 1.0));

        let targets = batch.targets.into_data().to_vec::<i64>().unwrap();
        assert_eq!(targets, vec![1, 3]);
    }

    #[test]
    #[should_panic]
    fn test_mixed_sizes_panic() {
        let batcher = ImageBatcher::<TestBackend>::new(Default::default());
        let _ = batcher.batch(vec![solid(2, 2, [0, 0, 0], 0), solid(4, 4, [0, 0, 0], 0)]);
    }
}
