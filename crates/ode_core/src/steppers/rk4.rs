use super::{check_dim, copy_into, stage_into, Stepper};
use crate::error::CoreResult;
use crate::integrator::Integrator;
use crate::tableau::Rk4Tableau;
use crate::traits::{RhsFn, Scalar, StateVector};
use num_traits::Zero;

/// Classical 4th-order Runge-Kutta. Not naturally FSAL (`k4` is evaluated at
/// the step's interior, not its endpoint), so an extra end-of-step
/// evaluation produces `fsallast = f(t+dt, u)` for the next step's
/// `fsalfirst`, retained alongside the step's first slope for linear
/// dense-output reconstruction.
pub struct Rk4<U, Y> {
    dim: usize,
    tableau: Rk4Tableau<U>,
    k2: Y,
    k3: Y,
    k4: Y,
    tmp: Y,
}

impl<U: Scalar, Y: StateVector<U>> Rk4<U, Y> {
    pub fn new(dim: usize) -> Self {
        let zero = Y::Elem::zero();
        Self {
            dim,
            tableau: Rk4Tableau::new(),
            k2: Y::filled(dim, zero),
            k3: Y::filled(dim, zero),
            k4: Y::filled(dim, zero),
            tmp: Y::filled(dim, zero),
        }
    }
}

impl<U, Y, F> Stepper<U, Y, F> for Rk4<U, Y>
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
        let one = U::from_f64(1.0).unwrap();

        stage_into(&mut self.tmp, &integrator.uprev, dt, &[(tab.half, &integrator.fsalfirst)]);
        integrator.f.eval(t0 + tab.half * dt, &self.tmp, &mut self.k2);

        stage_into(&mut self.tmp, &integrator.uprev, dt, &[(tab.half, &self.k2)]);
        integrator.f.eval(t0 + tab.half * dt, &self.tmp, &mut self.k3);

        stage_into(&mut self.tmp, &integrator.uprev, dt, &[(one, &self.k3)]);
        integrator.f.eval(t0 + dt, &self.tmp, &mut self.k4);

        stage_into(
            &mut integrator.u,
            &integrator.uprev,
            dt,
            &[
                (tab.sixth, &integrator.fsalfirst),
                (tab.sixth * tab.two, &self.k2),
                (tab.sixth * tab.two, &self.k3),
                (tab.sixth, &self.k4),
            ],
        );
        integrator.t = t0 + dt;

        integrator.f.eval(integrator.t, &integrator.u, &mut integrator.fsallast);

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
        let mut stepper = Rk4::new(1);
        stepper.initialize(&mut integ).unwrap();
        for _ in 0..steps {
            stepper.perform_step(&mut integ).unwrap();
            integ.uprev = integ.u.clone();
            integ.fsalfirst = integ.fsallast.clone();
        }
        (integ.u[0] - (-1.0_f64).exp()).abs()
    }

    #[test]
    fn order_of_accuracy_is_four() {
        let mut dt = 0.2;
        let mut errs = Vec::new();
        for _ in 0..6 {
            errs.push(global_error(dt));
            dt *= 0.5;
        }
        for w in errs.windows(2) {
            let ratio = w[0] / w[1];
            assert!((8.0..=32.0).contains(&ratio), "ratio {ratio} out of range for order 4");
        }
    }

    #[test]
    fn fsal_identity_holds_after_a_step() {
        let mut integ = Integrator::new(0.0_f64, 0.1, vec![1.0_f64], decay, 0.0, 0.0);
        let mut stepper = Rk4::new(1);
        stepper.initialize(&mut integ).unwrap();
        stepper.perform_step(&mut integ).unwrap();

        let mut want = vec![0.0_f64];
        decay(integ.t, &integ.u, &mut want);
        assert_eq!(integ.fsallast[0], want[0]);
    }

    /// 2D harmonic oscillator `u' = [u2, -u1]`, `u(0) = [1, 0]`, `dt =
    /// pi/100`, 200 steps: one full period returns to `[1, 0]`.
    #[test]
    fn harmonic_oscillator_returns_to_start_after_one_period() {
        fn oscillator(_t: f64, x: &[f64], out: &mut [f64]) {
            out[0] = x[1];
            out[1] = -x[0];
        }
        let dt = std::f64::consts::PI / 100.0;
        let mut integ = Integrator::new(0.0_f64, dt, vec![1.0_f64, 0.0_f64], oscillator, 0.0, 0.0);
        let mut stepper = Rk4::new(2);
        stepper.initialize(&mut integ).unwrap();
        for _ in 0..200 {
            stepper.perform_step(&mut integ).unwrap();
            integ.uprev = integ.u.clone();
            integ.fsalfirst = integ.fsallast.clone();
        }
        assert!((integ.u[0] - 1.0).abs() < 1e-8, "u1 = {}", integ.u[0]);
        assert!(integ.u[1].abs() < 1e-8, "u2 = {}", integ.u[1]);
    }

    #[test]
    fn rejects_an_integrator_of_the_wrong_dimension() {
        let mut integ = Integrator::new(0.0_f64, 0.1, vec![1.0_f64, 2.0_f64], decay, 0.0, 0.0);
        let mut stepper = Rk4::new(1);
        assert!(stepper.initialize(&mut integ).is_err());
    }
}
