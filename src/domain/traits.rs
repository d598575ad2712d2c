// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================

use anyhow::Result;
use crate::domain::image_folder::ImageFolder;

// ─── ImageSource ──────────────────────────────────────────────────────────────
/// Any component that can index a labelled image collection.
///
/// Implementations:
///   - ImageFolderLoader → class-per-directory layout on disk
pub trait ImageSource {
    /// Index every image and its label.
    fn load(&self) -> Result<ImageFolder>;
}
