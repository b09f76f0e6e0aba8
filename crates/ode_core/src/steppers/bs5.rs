use super::{check_dim, copy_into, error_estimate, stage_into, Stepper};
use crate::error::CoreResult;
use crate::integrator::Integrator;
use crate::tableau::Bs5Tableau;
use crate::traits::{RhsFn, Scalar, StateVector};
use num_traits::Zero;

/// Bogacki-Shampine 5(4), FSAL, 8 stages, with the pair's characteristic
/// double error estimator: `EEst = max(EEst1, EEst2)` computed from two
/// independent embedded weight sets (`bhat` and `btilde`) rather than one.
pub struct Bs5<U, Y> {
    dim: usize,
    tableau: Bs5Tableau<U>,
    k2: Y,
    k3: Y,
    k4: Y,
    k5: Y,
    k6: Y,
    k7: Y,
    tmp: Y,
    utilde1: Y,
    utilde2: Y,
    atmp: Vec<U>,
}

impl<U: Scalar, Y: StateVector<U>> Bs5<U, Y> {
    pub fn new(dim: usize) -> Self {
        let zero = Y::Elem::zero();
        Self {
            dim,
            tableau: Bs5Tableau::new(),
            k2: Y::filled(dim, zero),
            k3: Y::filled(dim, zero),
            k4: Y::filled(dim, zero),
            k5: Y::filled(dim, zero),
            k6: Y::filled(dim, zero),
            k7: Y::filled(dim, zero),
            tmp: Y::filled(dim, zero),
            utilde1: Y::filled(dim, zero),
            utilde2: Y::filled(dim, zero),
            atmp: vec![U::zero(); dim],
        }
    }
}

impl<U, Y, F> Stepper<U, Y, F> for Bs5<U, Y>
where
    U: Scalar,
    Y: StateVector<U>,
    F: RhsFn<U, Y>,
{
    fn kshortsize(&self) -> usize {
        8
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
        let k1 = &integrator.fsalfirst;

        stage_into(&mut self.tmp, &integrator.uprev, dt, &[(tab.a21, k1)]);
        integrator.f.eval(t0 + tab.c2 * dt, &self.tmp, &mut self.k2);

        stage_into(&mut self.tmp, &integrator.uprev, dt, &[(tab.a31, k1), (tab.a32, &self.k2)]);
        integrator.f.eval(t0 + tab.c3 * dt, &self.tmp, &mut self.k3);

        stage_into(
            &mut self.tmp,
            &integrator.uprev,
            dt,
            &[(tab.a41, k1), (tab.a42, &self.k2), (tab.a43, &self.k3)],
        );
        integrator.f.eval(t0 + tab.c4 * dt, &self.tmp, &mut self.k4);

        stage_into(
            &mut self.tmp,
            &integrator.uprev,
            dt,
            &[(tab.a51, k1), (tab.a52, &self.k2), (tab.a53, &self.k3), (tab.a54, &self.k4)],
        );
        integrator.f.eval(t0 + tab.c5 * dt, &self.tmp, &mut self.k5);

        stage_into(
            &mut self.tmp,
            &integrator.uprev,
            dt,
            &[
                (tab.a61, k1),
                (tab.a62, &self.k2),
                (tab.a63, &self.k3),
                (tab.a64, &self.k4),
                (tab.a65, &self.k5),
            ],
        );
        integrator.f.eval(t0 + tab.c6 * dt, &self.tmp, &mut self.k6);

        stage_into(
            &mut self.tmp,
            &integrator.uprev,
            dt,
            &[
                (tab.a71, k1),
                (tab.a72, &self.k2),
                (tab.a73, &self.k3),
                (tab.a74, &self.k4),
                (tab.a75, &self.k5),
                (tab.a76, &self.k6),
            ],
        );
        integrator.f.eval(t0 + dt, &self.tmp, &mut self.k7);

        stage_into(
            &mut integrator.u,
            &integrator.uprev,
            dt,
            &[
                (tab.b1, k1),
                (tab.b3, &self.k3),
                (tab.b4, &self.k4),
                (tab.b5, &self.k5),
                (tab.b6, &self.k6),
                (tab.b7, &self.k7),
            ],
        );
        integrator.t = t0 + dt;

        integrator.f.eval(integrator.t, &integrator.u, &mut integrator.fsallast);

        if integrator.adaptive {
            stage_into(
                &mut self.utilde1,
                &integrator.uprev,
                dt,
                &[
                    (tab.bhat1, k1),
                    (tab.bhat3, &self.k3),
                    (tab.bhat4, &self.k4),
                    (tab.bhat5, &self.k5),
                    (tab.bhat6, &self.k6),
                    (tab.bhat7, &self.k7),
                    (tab.bhat8, &integrator.fsallast),
                ],
            );
            let eest1 = error_estimate(
                &self.utilde1,
                &integrator.u,
                &integrator.uprev,
                integrator.abstol,
                integrator.reltol,
                &mut self.atmp,
                &integrator.internalnorm,
            );

            stage_into(
                &mut self.utilde2,
                &integrator.uprev,
                dt,
                &[
                    (tab.btilde1, k1),
                    (tab.btilde3, &self.k3),
                    (tab.btilde4, &self.k4),
                    (tab.btilde5, &self.k5),
                    (tab.btilde6, &self.k6),
                    (tab.btilde7, &self.k7),
                    (tab.btilde8, &integrator.fsallast),
                ],
            );
            let eest2 = error_estimate(
                &self.utilde2,
                &integrator.u,
                &integrator.uprev,
                integrator.abstol,
                integrator.reltol,
                &mut self.atmp,
                &integrator.internalnorm,
            );

            integrator.eest = if eest1 > eest2 { eest1 } else { eest2 };
        }

        if integrator.calck {
            if integrator.k.len() < 8 {
                integrator.k = vec![
                    integrator.fsalfirst.clone(),
                    self.k2.clone(),
                    self.k3.clone(),
                    self.k4.clone(),
                    self.k5.clone(),
                    self.k6.clone(),
                    self.k7.clone(),
                    integrator.fsallast.clone(),
                ];
            } else {
                copy_into(&mut integrator.k[0], &integrator.fsalfirst);
                copy_into(&mut integrator.k[1], &self.k2);
                copy_into(&mut integrator.k[2], &self.k3);
                copy_into(&mut integrator.k[3], &self.k4);
                copy_into(&mut integrator.k[4], &self.k5);
                copy_into(&mut integrator.k[5], &self.k6);
                copy_into(&mut integrator.k[6], &self.k7);
                copy_into(&mut integrator.k[7], &integrator.fsallast);
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
        let mut stepper = Bs5::new(1);
        stepper.initialize(&mut integ).unwrap();
        for _ in 0..steps {
            stepper.perform_step(&mut integ).unwrap();
            integ.uprev = integ.u.clone();
            integ.fsalfirst = integ.fsallast.clone();
        }
        (integ.u[0] - (-1.0_f64).exp()).abs()
    }

    #[test]
    fn order_of_accuracy_is_five() {
        let mut dt = 0.2;
        let mut errs = Vec::new();
        for _ in 0..6 {
            errs.push(global_error(dt));
            dt *= 0.5;
        }
        for w in errs.windows(2) {
            let ratio = w[0] / w[1];
            assert!((16.0..=64.0).contains(&ratio), "ratio {ratio} out of range for order 5");
        }
    }

    #[test]
    fn fsal_identity_holds_after_a_step() {
        let mut integ = Integrator::new(0.0_f64, 0.1, vec![1.0_f64], decay, 0.0, 0.0);
        let mut stepper = Bs5::new(1);
        stepper.initialize(&mut integ).unwrap();
        stepper.perform_step(&mut integ).unwrap();

        let mut want = vec![0.0_f64];
        decay(integ.t, &integ.u, &mut want);
        assert_eq!(integ.fsallast[0], want[0]);
    }

    /// `EEst = max(EEst1, EEst2)` computed from the two independent
    /// embedded weight sets.
    #[test]
    fn double_estimator_reports_the_max_of_both_estimates() {
        let mut integ = Integrator::new(0.0_f64, 0.1, vec![1.0_f64], decay, 1e-6, 1e-6);
        integ.adaptive = true;
        let mut stepper = Bs5::new(1);
        stepper.initialize(&mut integ).unwrap();
        stepper.perform_step(&mut integ).unwrap();

        let scale = |x: f64, y: f64| integ.abstol + x.abs().max(y.abs()) * integ.reltol;
        let eest1 = (stepper.utilde1.as_slice()[0] - integ.u.as_slice()[0]).abs()
            / scale(integ.uprev.as_slice()[0], integ.u.as_slice()[0]);
        let eest2 = (stepper.utilde2.as_slice()[0] - integ.u.as_slice()[0]).abs()
            / scale(integ.uprev.as_slice()[0], integ.u.as_slice()[0]);
        let want = eest1.max(eest2);
        assert!((integ.eest - want).abs() < 1e-14, "eest {} want {}", integ.eest, want);
    }

    #[test]
    fn rejects_an_integrator_of_the_wrong_dimension() {
        let mut integ = Integrator::new(0.0_f64, 0.1, vec![1.0_f64, 2.0_f64], decay, 0.0, 0.0);
        let mut stepper = Bs5::new(1);
        assert!(stepper.initialize(&mut integ).is_err());
    }
}
