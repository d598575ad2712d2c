// ============================================================
// Layer 3 — Compute Target
// ============================================================
// Where the network's parameters and every batch live.
// Chosen once at start-up and threaded into initialisation.

use serde::{Deserialize, Serialize};

/// Environment variable that selects the compute target.
pub const CUDA_ENV_VAR: &str = "CUDA";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComputeTarget {
    Cpu,
    Accelerator,
}

impl ComputeTarget {
    /// Resolve from the value of `CUDA`.
    ///
    /// Only the exact string `"False"` disables the accelerator;
    /// any other value, or no value at all, enables it.
    pub fn from_cuda_env(value: Option<&str>) -> Self {
        match value {
            Some("False") => Self::Cpu,
            _             => Self::Accelerator,
        }
    }

    /// Read `CUDA` from the process environment.
    pub fn from_env() -> Self {
        Self::from_cuda_env(std::env::var(CUDA_ENV_VAR).ok().as_deref())
    }
}

impl std::fmt::Display for ComputeTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cpu         => write!(f, "cpu"),
            Self::Accelerator => write!(f, "accelerator"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_false_disables_accelerator() {
        assert_eq!(ComputeTarget::from_cuda_env(Some("False")), ComputeTarget::Cpu);
    }

    #[test]
    fn test_unset_enables_accelerator() {
        assert_eq!(ComputeTarget::from_cuda_env(None), ComputeTarget::Accelerator);
    }

    #[test]
    fn test_only_exact_false_disables() {
        for v in ["false", "0", "", "True", "FALSE"] {
            assert_eq!(ComputeTarget::from_cuda_env(Some(v)), ComputeTarget::Accelerator, "{v}");
        }
    }
}
