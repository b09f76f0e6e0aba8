use super::{check_dim, copy_into, stage_into, Stepper};
use crate::error::CoreResult;
use crate::integrator::Integrator;
use crate::traits::{RhsFn, Scalar, StateVector};

/// Explicit (forward) Euler, order 1, FSAL. The step itself needs no new
/// function evaluation — it consumes `fsalfirst` computed by the previous
/// step (or by `initialize` for the very first one) — and produces exactly
/// one new evaluation, `fsallast = f(t+dt, u)`, which becomes the next
/// step's `fsalfirst` without recomputation.
pub struct Euler {
    dim: usize,
}

impl Euler {
    pub fn new(dim: usize) -> Self {
        Euler { dim }
    }
}

impl<U, Y, F> Stepper<U, Y, F> for Euler
where
    U: Scalar,
    Y: StateVector<U>,
    F: RhsFn<U, Y>,
{
    fn kshortsize(&self) -> usize {
        1
    }

    fn initialize(&mut self, integrator: &mut Integrator<U, Y, F>) -> CoreResult<()> {
        check_dim(integrator, self.dim)?;
        integrator
            .f
            .eval(integrator.t, &integrator.uprev, &mut integrator.fsalfirst);
        Ok(())
    }

    fn perform_step(&mut self, integrator: &mut Integrator<U, Y, F>) -> CoreResult<()> {
        check_dim(integrator, self.dim)?;
        let t0 = integrator.t;
        let dt = integrator.dt;
        let one = U::from_f64(1.0).unwrap();

        stage_into(&mut integrator.u, &integrator.uprev, dt, &[(one, &integrator.fsalfirst)]);
        integrator.t = t0 + dt;

        if integrator.calck {
            if integrator.k.is_empty() {
                integrator.k.push(integrator.fsalfirst.clone());
            } else {
                copy_into(&mut integrator.k[0], &integrator.fsalfirst);
            }
        }

        integrator.f.eval(integrator.t, &integrator.u, &mut integrator.fsallast);
        Ok(())
    }
}
