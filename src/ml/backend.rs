// ============================================================
// Layer 5 — Backends
// ============================================================
// The two places a network can run, one per ComputeTarget:
//
//   Cpu         → NdArray (always available)
//   Accelerator → Wgpu    (Vulkan / Metal / DX12 / WebGPU)
//
// Training wraps either in Autodiff; inference uses them bare.

use burn::backend::{
    ndarray::NdArrayDevice,
    wgpu::WgpuDevice,
    Autodiff, NdArray, Wgpu,
};

pub type CpuBackend         = NdArray;
pub type AcceleratorBackend = Wgpu;

pub type CpuTrainBackend         = Autodiff<CpuBackend>;
pub type AcceleratorTrainBackend = Autodiff<AcceleratorBackend>;

pub fn cpu_device() -> NdArrayDevice {
    NdArrayDevice::Cpu
}

pub fn accelerator_device() -> WgpuDevice {
    WgpuDevice::default()
}
