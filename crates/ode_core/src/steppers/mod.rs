//! The Runge-Kutta stepper family. Each variant is a distinct type
//! implementing `Stepper`, selected statically by the caller — no virtual
//! dispatch in the inner stage loop.

mod bs3;
mod bs5;
mod dp5;
mod euler;
mod midpoint;
mod rk4;
mod tsit5;

pub use bs3::Bs3;
pub use bs5::Bs5;
pub use dp5::Dp5;
pub use euler::Euler;
pub use midpoint::Midpoint;
pub use rk4::Rk4;
pub use tsit5::Tsit5;

use crate::error::{CoreError, CoreResult};
use crate::integrator::Integrator;
use crate::traits::{Elem, RhsFn, Scalar, StateVector};

/// Public contract every method implements.
pub trait Stepper<U: Scalar, Y: StateVector<U>, F: RhsFn<U, Y>> {
    /// Number of dense-output slopes this method retains in `integrator.k`.
    fn kshortsize(&self) -> usize;

    /// Computes `f(t0, u0)` into `fsalfirst` and readies FSAL aliasing.
    /// Called once before the first step.
    fn initialize(&mut self, integrator: &mut Integrator<U, Y, F>) -> CoreResult<()>;

    /// Advances one step `(t, u) -> (t+dt, u_new)`.
    fn perform_step(&mut self, integrator: &mut Integrator<U, Y, F>) -> CoreResult<()>;
}

/// Every stepper is constructed against a fixed dimension; this checks that
/// the integrator it's handed still has that dimension before any field is
/// mutated, so a mismatch fails synchronously instead of panicking partway
/// through a step via out-of-bounds slice indexing.
pub(crate) fn check_dim<U: Scalar, Y: StateVector<U>, F: RhsFn<U, Y>>(
    integrator: &Integrator<U, Y, F>,
    workspace_dim: usize,
) -> CoreResult<()> {
    let system_dim = integrator.dim();
    if system_dim != workspace_dim {
        return Err(CoreError::WorkspaceBinding { workspace_dim, system_dim });
    }
    Ok(())
}

/// `out = base + dt * sum(coef_i * k_i)`, the general stage-combination
/// formula written once against `StateVector` so it drives both the
/// heap-backed array shape and the zero-allocation scalar shape.
pub(crate) fn stage_into<U: Scalar, Y: StateVector<U>>(out: &mut Y, base: &Y, dt: U, terms: &[(U, &Y)]) {
    let n = out.len();
    for i in 0..n {
        let mut acc = base.as_slice()[i];
        for (coef, k) in terms {
            acc = acc + k.as_slice()[i] * (*coef * dt);
        }
        out.as_mut_slice()[i] = acc;
    }
}

/// `out = dt * sum(coef_i * k_i)`, the same combination without a base term
/// (used by DP5's dense-output construction).
pub(crate) fn combine_into<U: Scalar, Y: StateVector<U>>(out: &mut Y, dt: U, terms: &[(U, &Y)]) {
    let n = out.len();
    for i in 0..n {
        let mut acc = Y::Elem::zero();
        for (coef, k) in terms {
            acc = acc + k.as_slice()[i] * (*coef * dt);
        }
        out.as_mut_slice()[i] = acc;
    }
}

/// `out = a - b`, elementwise.
pub(crate) fn sub_into<U: Scalar, Y: StateVector<U>>(out: &mut Y, a: &Y, b: &Y) {
    let n = out.len();
    for i in 0..n {
        out.as_mut_slice()[i] = a.as_slice()[i] - b.as_slice()[i];
    }
}

/// `out = src`, elementwise, overwriting `out`'s existing buffer in place.
/// Used to repopulate `integrator.k`'s retained slopes without the
/// allocation a `Y::clone()` would cost on the array shape.
pub(crate) fn copy_into<U: Scalar, Y: StateVector<U>>(out: &mut Y, src: &Y) {
    out.as_mut_slice().copy_from_slice(src.as_slice());
}

/// The embedded-pair error estimate:
/// `‖(utilde - u) / (abstol + max(|uprev|, |u|) * reltol)‖`.
/// `scratch` is a preallocated real-valued buffer (the workspace's `atmp`),
/// sized once at construction and overwritten here, never (re)allocated.
pub(crate) fn error_estimate<U: Scalar, Y: StateVector<U>>(
    utilde: &Y,
    u: &Y,
    uprev: &Y,
    abstol: U,
    reltol: U,
    scratch: &mut [U],
    internalnorm: &dyn Fn(&[U]) -> U,
) -> U {
    let n = u.len();
    for i in 0..n {
        let diff = (utilde.as_slice()[i] - u.as_slice()[i]).magnitude();
        let scale = abstol + uprev.as_slice()[i].magnitude().max(u.as_slice()[i].magnitude()) * reltol;
        scratch[i] = diff / scale;
    }
    internalnorm(&scratch[..n])
}
