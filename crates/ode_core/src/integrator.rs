//! The integrator handle consumed by steppers. Owned and constructed by the
//! external driver; this core only reads/writes the fields documented here.

use crate::traits::{Elem, RhsFn, Scalar, StateVector};
use num_traits::Zero;

/// Default `internalnorm`: root-mean-square over the elementwise error
/// ratios. For a length-1 buffer (the scalar shape) this reduces exactly to
/// the absolute value of the single ratio, so it can be used uniformly for
/// both shapes.
pub fn rms_norm<U: Scalar>(values: &[U]) -> U {
    let n = values.len();
    if n == 0 {
        return U::zero();
    }
    let sumsq = values.iter().fold(U::zero(), |acc, v| acc + *v * *v);
    (sumsq / U::from_usize(n).unwrap()).sqrt()
}

/// Carries everything a stepper needs across `initialize`/`perform_step`
/// calls: current time and step, the previous/destination state, the
/// right-hand side, tolerances, the error-norm reduction, and the FSAL /
/// dense-output caches.
pub struct Integrator<U: Scalar, Y: StateVector<U>, F: RhsFn<U, Y>> {
    pub t: U,
    pub dt: U,
    pub uprev: Y,
    pub u: Y,
    pub f: F,

    pub abstol: U,
    pub reltol: U,
    pub adaptive: bool,
    pub calck: bool,
    pub internalnorm: Box<dyn Fn(&[U]) -> U>,

    /// `f(t, uprev)` at the start of a step; aliased to the first stage slot
    /// for FSAL methods.
    pub fsalfirst: Y,
    /// `f(t+dt, u)` after a successful step; becomes the next `fsalfirst`.
    pub fsallast: Y,
    /// Embedded error estimate, unit-free and non-negative; populated only
    /// when `adaptive` is true.
    pub eest: U,
    /// Dense-output slopes retained for interpolation when `calck` is true.
    pub k: Vec<Y>,
}

impl<U: Scalar, Y: StateVector<U>, F: RhsFn<U, Y>> Integrator<U, Y, F> {
    pub fn new(t0: U, dt: U, u0: Y, f: F, abstol: U, reltol: U) -> Self {
        let dim = u0.len();
        let zero = Y::Elem::zero();
        Self {
            t: t0,
            dt,
            uprev: u0.clone(),
            u: u0,
            f,
            abstol,
            reltol,
            adaptive: false,
            calck: false,
            internalnorm: Box::new(rms_norm::<U>),
            fsalfirst: Y::filled(dim, zero),
            fsallast: Y::filled(dim, zero),
            eest: U::zero(),
            k: Vec::new(),
        }
    }

    pub fn dim(&self) -> usize {
        self.u.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rms_norm_of_empty_slice_is_zero() {
        assert_eq!(rms_norm::<f64>(&[]), 0.0);
    }

    #[test]
    fn rms_norm_reduces_a_length_one_slice_to_its_absolute_value() {
        assert_eq!(rms_norm(&[-3.0_f64]), 3.0);
    }

    #[test]
    fn rms_norm_is_the_root_mean_square_of_the_ratios() {
        let got = rms_norm(&[3.0_f64, 4.0]);
        assert!((got - (25.0_f64 / 2.0).sqrt()).abs() < 1e-14);
    }
}
