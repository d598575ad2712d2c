// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Everything that touches the filesystem on behalf of the
// training and inference workflows:
//
//   checkpoint.rs — Saving and loading model parameters with
//                   Burn's full-precision named MessagePack
//                   recorder, plus a JSON sidecar holding the
//                   network config and class names so the
//                   model can be rebuilt for inference.
//
//   metrics.rs    — Appends one CSV row per finished epoch
//                   (batch count, total and mean loss).
//
// Reference: Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Records)

/// Model parameter and metadata persistence
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;
