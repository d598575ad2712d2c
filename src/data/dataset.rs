// ============================================================
// Layer 4 — Image Dataset
// ============================================================
// Implements Burn's Dataset trait over an indexed image folder.
// Items are returned in index order; nothing is shuffled.
//
// Reference: Burn Book §4 (Dataset)

use burn::data::dataset::Dataset;

use crate::data::preprocessor::{Preprocessor, RgbPixels};
use crate::domain::image_folder::{ImageFolder, LabeledImage};

/// One decoded image and its class index.
#[derive(Debug, Clone)]
pub struct ImageSample {
    pub pixels: RgbPixels,
    pub label:  usize,
}

/// Burn dataset over an indexed image folder. Images are decoded on `get`.
pub struct ImageDataset {
    images:       Vec<LabeledImage>,
    preprocessor: Preprocessor,
}

impl ImageDataset {
    pub fn new(images: Vec<LabeledImage>) -> Self {
        Self { images, preprocessor: Preprocessor::new() }
    }

    pub fn from_folder(folder: &ImageFolder) -> Self {
        Self::new(folder.images.clone())
    }
}

impl Dataset<ImageSample> for ImageDataset {
    /// # Panics
    /// Panics if a file indexed by the loader can no longer be decoded.
    /// `Dataset` has no error channel, and skipping the item would
    /// silently end the epoch early.
    fn get(&self, index: usize) -> Option<ImageSample> {
        let item = self.images.get(index)?;
        match self.preprocessor.decode(&item.path) {
            Ok(pixels) => Some(ImageSample { pixels, label: item.label }),
            Err(e) => panic!("{e:#}"),
        }
    }

    fn len(&self) -> usize {
        self.images.len()
    }
}
