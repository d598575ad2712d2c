// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn network, optimizer and backend code lives here.
// Layers 1-3 only see plain Rust types; the domain layer's
// NetworkPlan is what this layer turns into real modules.
//
//   block.rs      — Basic and bottleneck residual blocks,
//                   the optional 1x1 projection shortcut and
//                   the weight initialisation helpers
//
//   model.rs      — ResNetConfig (burn Config) and the full
//                   network: stem, four stages, global average
//                   pool, fully connected classifier
//
//   backend.rs    — The CPU (NdArray) and accelerator (Wgpu)
//                   backends and their devices
//
//   session.rs    — Training state machine and running loss
//
//   trainer.rs    — The SGD training loop
//
//   inferencer.rs — Loads a checkpoint and classifies images
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            He et al. (2016) Deep Residual Learning

/// Residual building blocks
pub mod block;

/// Full ResNet architecture
pub mod model;

/// Backend and device selection
pub mod backend;

/// Epoch / batch bookkeeping for the training loop
pub mod session;

/// SGD training loop
pub mod trainer;

/// Single-image classification from a checkpoint
pub mod inferencer;
