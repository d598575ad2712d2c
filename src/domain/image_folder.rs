// ============================================================
// Layer 3 — Image Folder Domain Types
// ============================================================
// A labelled image collection as found on disk:
//
//   root/
//     class_a/  img0.png  img1.png ...
//     class_b/  ...
//
// Class indices follow the sorted order of the class directory
// names, so the same folder always yields the same labels.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One image file and the index of the class it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledImage {
    pub path:  PathBuf,
    pub label: usize,
}

impl LabeledImage {
    pub fn new(path: impl Into<PathBuf>, label: usize) -> Self {
        Self { path: path.into(), label }
    }
}

/// Every image found under a root, with the class names in label order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageFolder {
    pub root:    PathBuf,
    pub classes: Vec<String>,
    pub images:  Vec<LabeledImage>,
    /// Shared `[height, width]` of every image in the folder
    pub image_size: [usize; 2],
}

impl ImageFolder {
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn class_name(&self, label: usize) -> Option<&str> {
        self.classes.get(label).map(String::as_str)
    }

    /// Number of images per class, indexed by label.
    pub fn class_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.classes.len()];
        for image in &self.images {
            if let Some(c) = counts.get_mut(image.label) {
                *c += 1;
            }
        }
        counts
    }
}
