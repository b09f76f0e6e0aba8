//! Cross-module properties that exercise the public API across more than
//! one module — state-shape parity in particular spans `traits` and every
//! stepper, so it belongs here rather than in a single module's
//! `#[cfg(test)]` block.

use ode_core::integrator::Integrator;
use ode_core::steppers::{Bs3, Bs5, Dp5, Rk4, Stepper, Tsit5};
use ode_core::traits::Scalar1;

fn decay(_t: f64, x: &[f64], out: &mut [f64]) {
    out[0] = -x[0];
}

/// The scalar shape and the array-of-length-1 shape must produce identical
/// `u` (to within a handful of ulps) after the same number of steps, for
/// every method.
macro_rules! check_shape_parity {
    ($name:ident, $method:ident) => {
        #[test]
        fn $name() {
            let dt = 0.1_f64;
            let steps = 20;

            let mut array_integ = Integrator::new(0.0_f64, dt, vec![1.0_f64], decay, 1e-6, 1e-6);
            let mut array_stepper = $method::<f64, Vec<f64>>::new(1);
            array_stepper.initialize(&mut array_integ).unwrap();
            for _ in 0..steps {
                array_stepper.perform_step(&mut array_integ).unwrap();
                array_integ.uprev = array_integ.u.clone();
                array_integ.fsalfirst = array_integ.fsallast.clone();
            }

            let mut scalar_integ = Integrator::new(0.0_f64, dt, Scalar1(1.0_f64), decay, 1e-6, 1e-6);
            let mut scalar_stepper = $method::<f64, Scalar1<f64>>::new(1);
            scalar_stepper.initialize(&mut scalar_integ).unwrap();
            for _ in 0..steps {
                scalar_stepper.perform_step(&mut scalar_integ).unwrap();
                scalar_integ.uprev = scalar_integ.u;
                scalar_integ.fsalfirst = scalar_integ.fsallast;
            }

            let array_u = array_integ.u[0];
            let scalar_u = scalar_integ.u.0;
            let ulp_budget = array_u.abs() * f64::EPSILON * 8.0;
            assert!(
                (array_u - scalar_u).abs() <= ulp_budget.max(1e-15),
                "array {} vs scalar {}",
                array_u,
                scalar_u
            );
        }
    };
}

check_shape_parity!(rk4_shapes_agree, Rk4);
check_shape_parity!(bs3_shapes_agree, Bs3);
check_shape_parity!(dp5_shapes_agree, Dp5);
check_shape_parity!(tsit5_shapes_agree, Tsit5);
check_shape_parity!(bs5_shapes_agree, Bs5);
