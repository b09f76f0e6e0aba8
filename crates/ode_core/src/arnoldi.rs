//! Krylov basis construction via Arnoldi's method: builds an orthonormal
//! basis of the Krylov subspace of an operator against a seed vector, and
//! the upper-Hessenberg projection of the operator onto that basis.

use crate::error::{CoreError, CoreResult};
use crate::traits::Scalar;
use nalgebra::{Complex, DMatrix, DVector, RealField};

/// `‖w_j‖` below this is treated as breakdown: the seed has produced an
/// invariant subspace smaller than requested, and continuing would divide
/// by (near) zero.
fn breakdown_tol<U: Scalar>() -> U {
    U::from_f64(1e-14).unwrap()
}

/// Preallocated basis (`v`) and Hessenberg (`h`) buffers, reusable across
/// many [`arnoldi_into`] calls against operators of the same size and
/// subspace dimension.
pub struct ArnoldiWorkspace<U: Scalar + RealField + Copy> {
    pub v: DMatrix<Complex<U>>,
    pub h: DMatrix<Complex<U>>,
}

impl<U: Scalar + RealField + Copy> ArnoldiWorkspace<U> {
    pub fn new(n: usize, m: usize) -> Self {
        Self { v: DMatrix::zeros(n, m), h: DMatrix::zeros(m, m) }
    }
}

/// Builds an orthonormal Krylov basis `V ∈ ℂ^{n×m}` and the upper-Hessenberg
/// projection `H ∈ ℂ^{m×m}` of `A` against seed `b`, via a single
/// modified-Gram-Schmidt pass (no reorthogonalization).
///
/// The final iteration draws its matrix-vector product from the freshly
/// computed `V[:, m-1]` column like every other iteration, rather than
/// recycling a stale column from the previous one.
pub fn arnoldi_into<U>(a: &DMatrix<Complex<U>>, b: &DVector<Complex<U>>, ws: &mut ArnoldiWorkspace<U>) -> CoreResult<()>
where
    U: Scalar + RealField + Copy,
{
    let n = a.nrows();
    let m = ws.v.ncols();
    if a.ncols() != n {
        return Err(CoreError::DimensionMismatch { expected: n, actual: a.ncols() });
    }
    if b.len() != n {
        return Err(CoreError::DimensionMismatch { expected: n, actual: b.len() });
    }
    if ws.v.nrows() != n {
        return Err(CoreError::DimensionMismatch { expected: n, actual: ws.v.nrows() });
    }
    if ws.h.nrows() != m || ws.h.ncols() != m {
        return Err(CoreError::DimensionMismatch { expected: m, actual: ws.h.nrows() });
    }
    if m > n {
        return Err(CoreError::SubspaceTooLarge { m, n });
    }

    let beta = b.norm();
    ws.v.set_column(0, &(b / Complex::new(beta, U::zero())));

    let tol = breakdown_tol::<U>();

    for j in 0..m {
        let vj = ws.v.column(j).clone_owned();
        let mut w = a * &vj;
        for i in 0..=j {
            let vi = ws.v.column(i).clone_owned();
            let hij = vi.dotc(&w);
            ws.h[(i, j)] = hij;
            w -= vi * hij;
        }
        let hnext = w.norm();

        if j + 1 < m {
            if hnext < tol {
                return Err(CoreError::ArnoldiBreakdown { achieved_m: j + 1, requested_m: m });
            }
            ws.h[(j + 1, j)] = Complex::new(hnext, U::zero());
            ws.v.set_column(j + 1, &(w / Complex::new(hnext, U::zero())));
        }
    }

    Ok(())
}

/// Allocating convenience wrapper around [`arnoldi_into`] for callers that
/// don't already hold a workspace.
pub fn arnoldi<U>(
    a: &DMatrix<Complex<U>>,
    b: &DVector<Complex<U>>,
    m: usize,
) -> CoreResult<(DMatrix<Complex<U>>, DMatrix<Complex<U>>)>
where
    U: Scalar + RealField + Copy,
{
    let n = a.nrows();
    let mut ws = ArnoldiWorkspace::new(n, m);
    arnoldi_into(a, b, &mut ws)?;
    Ok((ws.v, ws.h))
}
