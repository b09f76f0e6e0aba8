use num_complex::Complex;
use num_traits::{Float, FromPrimitive, Zero};
use std::fmt::Debug;
use std::ops::{Add, Mul, Sub};

/// The unit-free numeric type governing Butcher coefficients, tolerances, and
/// error norms. Kept separate from the state's element type (`Elem`) so that
/// a state carrying units, or a complex phase, can still be weighed against
/// plain dimensionless tolerances.
pub trait Scalar: Float + FromPrimitive + Debug + Copy + 'static {}
impl<T: Float + FromPrimitive + Debug + Copy + 'static> Scalar for T {}

/// An element of the state vector: either the unit-free type itself (real
/// problems) or `Complex<U>` (complex problems). Every stepper is written
/// once against this trait and works for both without duplication.
pub trait Elem<U: Scalar>:
    Copy + Debug + Zero + Add<Output = Self> + Sub<Output = Self> + Mul<U, Output = Self> + 'static
{
    /// Real, non-negative magnitude used by the embedded-error norm.
    fn magnitude(&self) -> U;
}

impl<U: Scalar> Elem<U> for U {
    fn magnitude(&self) -> U {
        self.abs()
    }
}

impl<U: Scalar> Elem<U> for Complex<U> {
    fn magnitude(&self) -> U {
        self.norm()
    }
}

/// A fixed-length container of state elements, implemented once for the
/// heap-backed array shape (`Vec<E>`) and once for the zero-allocation
/// scalar shape (`Scalar1<E>`). Every Runge-Kutta stepper is generic over
/// this trait instead of duplicating its stage arithmetic per shape.
pub trait StateVector<U: Scalar>: Clone {
    type Elem: Elem<U>;

    /// Builds a buffer of the given length, every component set to `value`.
    /// Called only at workspace construction time, never inside a step.
    fn filled(dim: usize, value: Self::Elem) -> Self;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn as_slice(&self) -> &[Self::Elem];

    fn as_mut_slice(&mut self) -> &mut [Self::Elem];
}

impl<U: Scalar, E: Elem<U>> StateVector<U> for Vec<E> {
    type Elem = E;

    fn filled(dim: usize, value: E) -> Self {
        vec![value; dim]
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn as_slice(&self) -> &[E] {
        &self[..]
    }

    fn as_mut_slice(&mut self) -> &mut [E] {
        &mut self[..]
    }
}

/// The scalar state shape: a single value masquerading as a length-1 buffer
/// so it can be driven by the same stage-arithmetic code as `Vec<E>`, without
/// ever touching the heap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scalar1<E>(pub E);

impl<U: Scalar, E: Elem<U>> StateVector<U> for Scalar1<E> {
    type Elem = E;

    fn filled(_dim: usize, value: E) -> Self {
        Scalar1(value)
    }

    fn len(&self) -> usize {
        1
    }

    fn as_slice(&self) -> &[E] {
        std::slice::from_ref(&self.0)
    }

    fn as_mut_slice(&mut self) -> &mut [E] {
        std::slice::from_mut(&mut self.0)
    }
}

/// The right-hand side `f(t, x)` of `u' = f(t, u)`. Implemented directly by
/// callers supplying a closure over slices of state elements; blanket-impl'd
/// below so plain `Fn(t, &[E], &mut [E])` closures work for any `StateVector`.
pub trait RhsFn<U: Scalar, Y: StateVector<U>> {
    fn eval(&self, t: U, x: &Y, out: &mut Y);
}

impl<U, Y, F> RhsFn<U, Y> for F
where
    U: Scalar,
    Y: StateVector<U>,
    F: Fn(U, &[Y::Elem], &mut [Y::Elem]),
{
    fn eval(&self, t: U, x: &Y, out: &mut Y) {
        self(t, x.as_slice(), out.as_mut_slice());
    }
}
