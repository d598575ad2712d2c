// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers for one user goal each.
//
// Rules for this layer:
//   - No model code here (that's Layer 5)
//   - No printing here (that's Layer 1)
//   - No direct file access (that's Layers 4 and 6)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern

/// Train a network on an image folder
pub mod train_use_case;

/// Classify an image with a trained checkpoint
pub mod predict_use_case;

/// Describe a network layout without training it
pub mod summary_use_case;
