//! The `ode_core` crate is the numerical core of an ODE solver library: an
//! explicit Runge-Kutta stepping engine and a matrix-φ-function evaluator
//! for exponential integrators.
//!
//! Key components:
//! - **Traits**: `Scalar` (unit-free numeric type), `Elem`/`StateVector`
//!   (the state algebra unifying the scalar and array state shapes).
//! - **Tableau / Integrator / Steppers**: frozen Butcher coefficients, the
//!   driver-owned integrator handle, and the seven stepping methods.
//! - **Arnoldi / Phi**: Krylov basis construction and Sidje's augmented
//!   exponential, composed into dense and large-operator φ evaluation.
pub mod arnoldi;
pub mod error;
pub mod integrator;
pub mod phi;
pub mod steppers;
pub mod tableau;
pub mod traits;
