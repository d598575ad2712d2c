// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs, enums and traits describing the system:
// the network layout, where it runs, and what the data is.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits

// Block kinds, presets and the validated network plan
pub mod architecture;

// CPU or accelerator
pub mod compute_target;

// Labelled images indexed from a class-per-directory layout
pub mod image_folder;

// Core abstractions (traits) that other layers implement
pub mod traits;
