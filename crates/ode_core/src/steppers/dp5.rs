use super::{check_dim, combine_into, copy_into, error_estimate, stage_into, sub_into, Stepper};
use crate::error::CoreResult;
use crate::integrator::Integrator;
use crate::tableau::Dp5Tableau;
use crate::traits::{RhsFn, Scalar, StateVector};
use num_traits::Zero;

/// Dormand-Prince 5(4), FSAL. Dense output is the special 4-slope
/// construction (`update`, `bspl`, `update - k7 - bspl`, `sum(d_i k_i)`)
/// rather than the raw stage slopes.
pub struct Dp5<U, Y> {
    dim: usize,
    tableau: Dp5Tableau<U>,
    k2: Y,
    k3: Y,
    k4: Y,
    k5: Y,
    k6: Y,
    tmp: Y,
    utilde: Y,
    atmp: Vec<U>,
    update: Y,
    bspl: Y,
    dense3: Y,
    dense4: Y,
}

impl<U: Scalar, Y: StateVector<U>> Dp5<U, Y> {
    pub fn new(dim: usize) -> Self {
        let zero = Y::Elem::zero();
        Self {
            dim,
            tableau: Dp5Tableau::new(),
            k2: Y::filled(dim, zero),
            k3: Y::filled(dim, zero),
            k4: Y::filled(dim, zero),
            k5: Y::filled(dim, zero),
            k6: Y::filled(dim, zero),
            tmp: Y::filled(dim, zero),
            utilde: Y::filled(dim, zero),
            atmp: vec![U::zero(); dim],
            update: Y::filled(dim, zero),
            bspl: Y::filled(dim, zero),
            dense3: Y::filled(dim, zero),
            dense4: Y::filled(dim, zero),
        }
    }
}

impl<U, Y, F> Stepper<U, Y, F> for Dp5<U, Y>
where
    U: Scalar,
    Y: StateVector<U>,
    F: RhsFn<U, Y>,
{
    fn kshortsize(&self) -> usize {
        4
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
        let one = U::from_f64(1.0).unwrap();

        {
            let k1 = &integrator.fsalfirst;
            stage_into(&mut self.tmp, &integrator.uprev, dt, &[(tab.a21, k1)]);
        }
        integrator.f.eval(t0 + tab.c2 * dt, &self.tmp, &mut self.k2);

        stage_into(
            &mut self.tmp,
            &integrator.uprev,
            dt,
            &[(tab.a31, &integrator.fsalfirst), (tab.a32, &self.k2)],
        );
        integrator.f.eval(t0 + tab.c3 * dt, &self.tmp, &mut self.k3);

        stage_into(
            &mut self.tmp,
            &integrator.uprev,
            dt,
            &[(tab.a41, &integrator.fsalfirst), (tab.a42, &self.k2), (tab.a43, &self.k3)],
        );
        integrator.f.eval(t0 + tab.c4 * dt, &self.tmp, &mut self.k4);

        stage_into(
            &mut self.tmp,
            &integrator.uprev,
            dt,
            &[
                (tab.a51, &integrator.fsalfirst),
                (tab.a52, &self.k2),
                (tab.a53, &self.k3),
                (tab.a54, &self.k4),
            ],
        );
        integrator.f.eval(t0 + tab.c5 * dt, &self.tmp, &mut self.k5);

        stage_into(
            &mut self.tmp,
            &integrator.uprev,
            dt,
            &[
                (tab.a61, &integrator.fsalfirst),
                (tab.a62, &self.k2),
                (tab.a63, &self.k3),
                (tab.a64, &self.k4),
                (tab.a65, &self.k5),
            ],
        );
        integrator.f.eval(t0 + dt, &self.tmp, &mut self.k6);

        stage_into(
            &mut integrator.u,
            &integrator.uprev,
            dt,
            &[
                (tab.b1, &integrator.fsalfirst),
                (tab.b3, &self.k3),
                (tab.b4, &self.k4),
                (tab.b5, &self.k5),
                (tab.b6, &self.k6),
            ],
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
                    (tab.bhat3, &self.k3),
                    (tab.bhat4, &self.k4),
                    (tab.bhat5, &self.k5),
                    (tab.bhat6, &self.k6),
                    (tab.bhat7, &integrator.fsallast),
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
            combine_into(
                &mut self.update,
                one,
                &[
                    (tab.a71, &integrator.fsalfirst),
                    (tab.a73, &self.k3),
                    (tab.a74, &self.k4),
                    (tab.a75, &self.k5),
                    (tab.a76, &self.k6),
                ],
            );
            sub_into(&mut self.bspl, &integrator.fsalfirst, &self.update);

            let n = self.dense3.len();
            for i in 0..n {
                self.dense3.as_mut_slice()[i] =
                    self.update.as_slice()[i] - integrator.fsallast.as_slice()[i] - self.bspl.as_slice()[i];
            }

            combine_into(
                &mut self.dense4,
                one,
                &[
                    (tab.d1, &integrator.fsalfirst),
                    (tab.d3, &self.k3),
                    (tab.d4, &self.k4),
                    (tab.d5, &self.k5),
                    (tab.d6, &self.k6),
                    (tab.d7, &integrator.fsallast),
                ],
            );

            if integrator.k.len() < 4 {
                integrator.k = vec![self.update.clone(), self.bspl.clone(), self.dense3.clone(), self.dense4.clone()];
            } else {
                copy_into(&mut integrator.k[0], &self.update);
                copy_into(&mut integrator.k[1], &self.bspl);
                copy_into(&mut integrator.k[2], &self.dense3);
                copy_into(&mut integrator.k[3], &self.dense4);
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
        let mut stepper = Dp5::new(1);
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
        let mut stepper = Dp5::new(1);
        stepper.initialize(&mut integ).unwrap();
        stepper.perform_step(&mut integ).unwrap();

        let mut want = vec![0.0_f64];
        decay(integ.t, &integ.u, &mut want);
        assert_eq!(integ.fsallast[0], want[0]);
    }

    /// `calck` must populate all four of DP5's special dense-output slopes,
    /// not just the raw stages.
    #[test]
    fn calck_populates_four_dense_output_slopes() {
        let mut integ = Integrator::new(0.0_f64, 0.1, vec![1.0_f64], decay, 0.0, 0.0);
        integ.calck = true;
        let mut stepper = Dp5::new(1);
        stepper.initialize(&mut integ).unwrap();
        stepper.perform_step(&mut integ).unwrap();
        assert_eq!(integ.k.len(), 4);
    }

    #[test]
    fn calck_reuses_retained_slope_buffers_on_later_steps() {
        let mut integ = Integrator::new(0.0_f64, 0.1, vec![1.0_f64], decay, 0.0, 0.0);
        integ.calck = true;
        let mut stepper = Dp5::new(1);
        stepper.initialize(&mut integ).unwrap();
        stepper.perform_step(&mut integ).unwrap();
        let first_step_update = integ.k[0].as_slice()[0];
        integ.uprev = integ.u.clone();
        integ.fsalfirst = integ.fsallast.clone();
        stepper.perform_step(&mut integ).unwrap();
        assert_eq!(integ.k.len(), 4);
        assert_ne!(integ.k[0].as_slice()[0], first_step_update);
    }

    #[test]
    fn embedded_error_matches_recomputed_formula() {
        let mut integ = Integrator::new(0.0_f64, 0.1, vec![1.0_f64], decay, 1e-6, 1e-6);
        integ.adaptive = true;
        let mut stepper = Dp5::new(1);
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
        let mut stepper = Dp5::new(1);
        assert!(stepper.initialize(&mut integ).is_err());
    }
}
