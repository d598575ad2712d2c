// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// From a directory of labelled images to tensor batches:
//
//   class-per-directory image folder
//       │
//       ▼
//   ImageFolderLoader → indexes files, assigns class labels
//       │
//       ▼
//   ImageDataset      → implements Burn's Dataset trait,
//       │               decodes one image per `get`
//       ▼
//   Preprocessor      → RGB, HWC → CHW, scale to [0, 1]
//       │
//       ▼
//   ImageBatcher      → stacks samples into [N, 3, H, W]
//       │
//       ▼
//   DataLoader        → feeds batches to the training loop
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Indexes a class-per-directory image folder
pub mod loader;

/// Decodes images and converts them to tensor layout
pub mod preprocessor;

/// Implements Burn's Dataset trait for labelled images
pub mod dataset;

/// Implements Burn's Batcher trait to create image batches
pub mod batcher;
