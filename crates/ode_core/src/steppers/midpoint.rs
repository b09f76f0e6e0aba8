use super::{check_dim, copy_into, stage_into, Stepper};
use crate::error::CoreResult;
use crate::integrator::Integrator;
use crate::tableau::MidpointTableau;
use crate::traits::{RhsFn, Scalar, StateVector};
use num_traits::Zero;

/// Explicit midpoint rule, order 2, not FSAL: the second stage is evaluated
/// at the step's midpoint, not its endpoint, so it cannot seed the next
/// step's `fsalfirst`. `fsalfirst` is therefore recomputed at the top of
/// every `perform_step` rather than trusted from the driver.
pub struct Midpoint<U, Y> {
    dim: usize,
    tableau: MidpointTableau<U>,
    k2: Y,
    tmp: Y,
}

impl<U: Scalar, Y: StateVector<U>> Midpoint<U, Y> {
    pub fn new(dim: usize) -> Self {
        let zero = Y::Elem::zero();
        Self {
            dim,
            tableau: MidpointTableau::new(),
            k2: Y::filled(dim, zero),
            tmp: Y::filled(dim, zero),
        }
    }
}

impl<U, Y, F> Stepper<U, Y, F> for Midpoint<U, Y>
where
    U: Scalar,
    Y: StateVector<U>,
    F: RhsFn<U, Y>,
{
    fn kshortsize(&self) -> usize {
        2
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

        integrator
            .f
            .eval(t0, &integrator.uprev, &mut integrator.fsalfirst);

        stage_into(&mut self.tmp, &integrator.uprev, dt, &[(self.tableau.half, &integrator.fsalfirst)]);
        integrator
            .f
            .eval(t0 + self.tableau.half * dt, &self.tmp, &mut self.k2);

        stage_into(&mut integrator.u, &integrator.uprev, dt, &[(one, &self.k2)]);
        integrator.t = t0 + dt;

        if integrator.calck {
            if integrator.k.len() < 2 {
                integrator.k.clear();
                integrator.k.push(integrator.fsalfirst.clone());
                integrator.k.push(self.k2.clone());
            } else {
                copy_into(&mut integrator.k[0], &integrator.fsalfirst);
                copy_into(&mut integrator.k[1], &self.k2);
            }
        }

        integrator.f.eval(integrator.t, &integrator.u, &mut integrator.fsallast);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrator::Integrator;

    fn decay(_t: f64, x: &[f64], out: &mut [f64]) {
        out[0] = -x[0];
    }

    fn global_error(dt: f64) -> f64 {
        let steps = (1.0 / dt).round() as usize;
        let mut integ = Integrator::new(0.0_f64, dt, vec![1.0_f64], decay, 0.0, 0.0);
        let mut stepper = Midpoint::new(1);
        stepper.initialize(&mut integ).unwrap();
        for _ in 0..steps {
            stepper.perform_step(&mut integ).unwrap();
            integ.uprev = integ.u.clone();
            integ.fsalfirst = integ.fsallast.clone();
        }
        (integ.u[0] - (-1.0_f64).exp()).abs()
    }

    /// Order 2: halving `dt` five times must shrink the global error by a
    /// factor of 2^2 = 4, within a factor of 2.
    #[test]
    fn order_of_accuracy_is_two() {
        let mut dt = 0.2;
        let mut errs = Vec::new();
        for _ in 0..6 {
            errs.push(global_error(dt));
            dt *= 0.5;
        }
        for w in errs.windows(2) {
            let ratio = w[0] / w[1];
            assert!((2.0..=8.0).contains(&ratio), "ratio {ratio} out of range for order 2");
        }
    }

    #[test]
    fn fsal_identity_holds_after_a_step() {
        let mut integ = Integrator::new(0.0_f64, 0.1, vec![1.0_f64], decay, 0.0, 0.0);
        let mut stepper = Midpoint::new(1);
        stepper.initialize(&mut integ).unwrap();
        stepper.perform_step(&mut integ).unwrap();

        let mut want = vec![0.0_f64];
        decay(integ.t, &integ.u, &mut want);
        assert_eq!(integ.fsallast[0], want[0]);
    }
}
