use super::{check_dim, copy_into, error_estimate, stage_into, Stepper};
use crate::error::CoreResult;
use crate::integrator::Integrator;
use crate::tableau::Tsit5Tableau;
use crate::traits::{RhsFn, Scalar, StateVector};
use num_traits::Zero;

/// Tsitouras 5(4), FSAL, 7-slope dense output.
pub struct Tsit5<U, Y> {
    dim: usize,
    tableau: Tsit5Tableau<U>,
    k2: Y,
    k3: Y,
    k4: Y,
    k5: Y,
    k6: Y,
    tmp: Y,
    utilde: Y,
    atmp: Vec<U>,
}

impl<U: Scalar, Y: StateVector<U>> Tsit5<U, Y> {
    pub fn new(dim: usize) -> Self {
        let zero = Y::Elem::zero();
        Self {
            dim,
            tableau: Tsit5Tableau::new(),
            k2: Y::filled(dim, zero),
            k3: Y::filled(dim, zero),
            k4: Y::filled(dim, zero),
            k5: Y::filled(dim, zero),
            k6: Y::filled(dim, zero),
            tmp: Y::filled(dim, zero),
            utilde: Y::filled(dim, zero),
            atmp: vec![U::zero(); dim],
        }
    }
}

impl<U, Y, F> Stepper<U, Y, F> for Tsit5<U, Y>
where
    U: Scalar,
    Y: StateVector<U>,
    F: RhsFn<U, Y>,
{
    fn kshortsize(&self) -> usize {
        7
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
        integrator.f.eval(t0 + dt, &self.tmp, &mut self.k6);

        stage_into(
            &mut integrator.u,
            &integrator.uprev,
            dt,
            &[
                (tab.b1, k1),
                (tab.b2, &self.k2),
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
                    (tab.bhat2, &self.k2),
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
            if integrator.k.len() < 7 {
                integrator.k = vec![
                    integrator.fsalfirst.clone(),
                    self.k2.clone(),
                    self.k3.clone(),
                    self.k4.clone(),
                    self.k5.clone(),
                    self.k6.clone(),
                    integrator.fsallast.clone(),
                ];
            } else {
                copy_into(&mut integrator.k[0], &integrator.fsalfirst);
                copy_into(&mut integrator.k[1], &self.k2);
                copy_into(&mut integrator.k[2], &self.k3);
                copy_into(&mut integrator.k[3], &self.k4);
                copy_into(&mut integrator.k[4], &self.k5);
                copy_into(&mut integrator.k[5], &self.k6);
                copy_into(&mut integrator.k[6], &integrator.fsallast);
            }
        }
        Ok(())
    }
}
