use thiserror::Error;

/// Structural errors detectable before any mutation happens (spec §7):
/// dimension mismatches, workspace misbinding, and Arnoldi/exponential
/// failures that the caller must react to. Numerical pathologies (NaN
/// propagation from `f`) are deliberately not represented here — they are
/// observables the driver inspects via `EEst`, not errors this core raises.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("dimension mismatch: expected length {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("workspace is sized for dimension {workspace_dim} but was bound to a system of dimension {system_dim}")]
    WorkspaceBinding {
        workspace_dim: usize,
        system_dim: usize,
    },

    #[error("Arnoldi iteration broke down after {achieved_m} of {requested_m} requested basis vectors (‖w‖ ≈ 0)")]
    ArnoldiBreakdown { achieved_m: usize, requested_m: usize },

    #[error("dense matrix exponential failed: {0}")]
    DenseExponentialFailed(String),

    #[error("Krylov subspace size m={m} exceeds problem dimension n={n}")]
    SubspaceTooLarge { m: usize, n: usize },
}

pub type CoreResult<T> = Result<T, CoreError>;
