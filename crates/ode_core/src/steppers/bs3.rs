use super::{check_dim, copy_into, error_estimate, stage_into, Stepper};
use crate::error::CoreResult;
use crate::integrator::Integrator;
use crate::tableau::Bs3Tableau;
use crate::traits::{RhsFn, Scalar, StateVector};
use num_traits::Zero;

/// Bogacki-Shampine 3(2), FSAL, cubic-Hermite dense output (needs only the
/// step's first and last slopes, `k1 = fsalfirst` and `k4 = fsallast`).
pub struct Bs3<U, Y> {
    dim: usize,
    tableau: Bs3Tableau<U>,
    k2: Y,
    k3: Y,
    tmp: Y,
    utilde: Y,
    atmp: Vec<U>,
}

impl<U: Scalar, Y: StateVector<U>> Bs3<U, Y> {
    pub fn new(dim: usize) -> Self {
        let zero = Y::Elem::zero();
        Self {
            dim,
            tableau: Bs3Tableau::new(),
            k2: Y::filled(dim, zero),
            k3: Y::filled(dim, zero),
            tmp: Y::filled(dim, zero),
            utilde: Y::filled(dim, zero),
            atmp: vec![U::zero(); dim],
        }
    }
}

impl<U, Y, F> Stepper<U, Y, F> for Bs3<U, Y>
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
        let tab = &self.tableau;

        stage_into(&mut self.tmp, &integrator.uprev, dt, &[(tab.a21, &integrator.fsalfirst)]);
        integrator.f.eval(t0 + tab.c2 * dt, &self.tmp, &mut self.k2);

        stage_into(&mut self.tmp, &integrator.uprev, dt, &[(tab.a32, &self.k2)]);
        integrator.f.eval(t0 + tab.c3 * dt, &self.tmp, &mut self.k3);

        stage_into(
            &mut integrator.u,
            &integrator.uprev,
            dt,
            &[(tab.a41, &integrator.fsalfirst), (tab.a42, &self.k2), (tab.a43, &self.k3)],
        );
        integrator.t = t0 + dt;

        integrator.f.eval(integrator.t, &integrator.u, &mut integrator.fsallast);

        if integrator.adaptive {
            stage_into(
                &mut self.utilde,
                &integrator.uprev,
                dt,
                &[
                    (tab.bhat1, &integrator.fsalfirst),
                    (tab.bhat2, &self.k2),
                    (tab.bhat3, &self.k3),
                    (tab.bhat4, &integrator.fsallast),
                ],
            );
            integrator.eest = error_estimate(
                &self.utilde,
                &integrator.u,
                &integrator.uprev,
                integrator.abstol,
                integrator.reltol,
                &mut self.atmp,
                &integrator.internalnorm,
            );
        }

        if integrator.calck {
            if integrator.k.len() < 2 {
                integrator.k.clear();
                integrator.k.push(integrator.fsalfirst.clone());
                integrator.k.push(integrator.fsallast.clone());
            } else {
                copy_into(&mut integrator.k[0], &integrator.fsalfirst);
                copy_into(&mut integrator.k[1], &integrator.fsallast);
            }
        }
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
        let mut stepper = Bs3::new(1);
        stepper.initialize(&mut integ).unwrap();
        for _ in 0..steps {
            stepper.perform_step(&mut integ).unwrap();
            integ.uprev = integ.u.clone();
            integ.fsalfirst = integ.fsallast.clone();
        }
        (integ.u[0] - (-1.0_f64).exp()).abs()
    }

    #[test]
    fn order_of_accuracy_is_three() {
        let mut dt = 0.2;
        let mut errs = Vec::new();
        for _ in 0..6 {
            errs.push(global_error(dt));
            dt *= 0.5;
        }
        for w in errs.windows(2) {
            let ratio = w[0] / w[1];
            assert!((4.0..=16.0).contains(&ratio), "ratio {ratio} out of range for order 3");
        }
    }

    #[test]
    fn fsal_identity_holds_after_a_step() {
        let mut integ = Integrator::new(0.0_f64, 0.1, vec![1.0_f64], decay, 0.0, 0.0);
        let mut stepper = Bs3::new(1);
        stepper.initialize(&mut integ).unwrap();
        stepper.perform_step(&mut integ).unwrap();

        let mut want = vec![0.0_f64];
        decay(integ.t, &integ.u, &mut want);
        assert_eq!(integ.fsallast[0], want[0]);
    }

    /// `EEst` must equal the hand-recomputed `‖(utilde - u) / (abstol +
    /// max(|uprev|,|u|) * reltol)‖` from the stepper's own internal embedded
    /// estimate.
    #[test]
    fn embedded_error_matches_recomputed_formula() {
        let mut integ = Integrator::new(0.0_f64, 0.1, vec![1.0_f64], decay, 1e-6, 1e-6);
        integ.adaptive = true;
        let mut stepper = Bs3::new(1);
        stepper.initialize(&mut integ).unwrap();
        stepper.perform_step(&mut integ).unwrap();

        let diff = (stepper.utilde.as_slice()[0] - integ.u.as_slice()[0]).abs();
        let scale = integ.abstol + integ.uprev.as_slice()[0].abs().max(integ.u.as_slice()[0].abs()) * integ.reltol;
        let want = diff / scale;
        assert!((integ.eest - want).abs() < 1e-14, "eest {} want {}", integ.eest, want);
    }

    #[test]
    fn rejects_an_integrator_of_the_wrong_dimension() {
        let mut integ = Integrator::new(0.0_f64, 0.1, vec![1.0_f64, 2.0_f64], decay, 0.0, 0.0);
        let mut stepper = Bs3::new(1);
        assert!(stepper.initialize(&mut integ).is_err());
    }
}
