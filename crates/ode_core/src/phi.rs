//! Matrix-φ-function evaluation: Sidje's augmented-matrix construction for
//! the dense path, and its Krylov-projected composition with
//! [`crate::arnoldi`] for large operators.

use crate::arnoldi::{arnoldi_into, ArnoldiWorkspace};
use crate::error::{CoreError, CoreResult};
use crate::traits::Scalar;
use nalgebra::{Complex, DMatrix, DVector, RealField};

const TAYLOR_TERMS: u32 = 24;

/// Scaling-and-squaring matrix exponential. nalgebra has no built-in `expm`;
/// this squares down to a sub-0.5-norm regime (where a truncated Taylor
/// series converges to machine precision well within `TAYLOR_TERMS`) and
/// squares back up. Surfaces `CoreError::DenseExponentialFailed` if the
/// result is not finite rather than handing the caller a silent NaN.
fn mat_exp<U>(a: &DMatrix<Complex<U>>) -> CoreResult<DMatrix<Complex<U>>>
where
    U: Scalar + RealField + Copy,
{
    let n = a.nrows();
    let half = U::from_f64(0.5).unwrap();

    let mut reduced_norm = a.norm();
    let mut squarings = 0u32;
    while reduced_norm > half {
        reduced_norm = reduced_norm * half;
        squarings += 1;
    }

    let mut divisor = U::one();
    for _ in 0..squarings {
        divisor = divisor + divisor;
    }
    let scaled = a.map(|x| x / Complex::new(divisor, U::zero()));

    let identity = DMatrix::<Complex<U>>::identity(n, n);
    let mut term = identity.clone();
    let mut result = identity;
    for k in 1..=TAYLOR_TERMS {
        term = &term * &scaled / Complex::new(U::from_u32(k).unwrap(), U::zero());
        result += &term;
    }

    for _ in 0..squarings {
        result = &result * &result;
    }

    if result.iter().any(|c| !c.re.is_finite() || !c.im.is_finite()) {
        return Err(CoreError::DenseExponentialFailed(
            "matrix exponential produced a non-finite entry".to_string(),
        ));
    }
    Ok(result)
}

/// Scalar φ-function evaluation: builds a `(k+1)×(k+1)` matrix with `z` at
/// `(0,0)` and ones on the superdiagonal; the first row of its exponential
/// is `[φ₀(z), …, φ_k(z)]`. Writes into the caller-preallocated `out`
/// (length `k+1`).
pub fn phi_into<U: Scalar + RealField + Copy>(z: U, k: usize, out: &mut [U]) -> CoreResult<()> {
    let size = k + 1;
    if out.len() != size {
        return Err(CoreError::DimensionMismatch { expected: size, actual: out.len() });
    }
    let mut m = DMatrix::<Complex<U>>::zeros(size, size);
    m[(0, 0)] = Complex::new(z, U::zero());
    for i in 0..k {
        m[(i, i + 1)] = Complex::new(U::one(), U::zero());
    }
    let p = mat_exp(&m)?;
    for (j, slot) in out.iter_mut().enumerate() {
        *slot = p[(0, j)].re;
    }
    Ok(())
}

/// Allocating convenience wrapper around [`phi_into`].
pub fn phi<U: Scalar + RealField + Copy>(z: U, k: usize) -> CoreResult<Vec<U>> {
    let mut out = vec![U::zero(); k + 1];
    phi_into(z, k, &mut out)?;
    Ok(out)
}

/// Dense φ-evaluator: `[φ₀(A)v, …, φ_k(A)v]` as an `n × (k+1)` matrix, via
/// Sidje's augmented exponential. `A` must be square and `v` of matching
/// length. Writes into the caller-preallocated `out` (`m × (k+1)`).
pub fn phimv_dense_into<U>(
    a: &DMatrix<Complex<U>>,
    v: &DVector<Complex<U>>,
    k: usize,
    out: &mut DMatrix<Complex<U>>,
) -> CoreResult<()>
where
    U: Scalar + RealField + Copy,
{
    let m = a.nrows();
    if a.ncols() != m {
        return Err(CoreError::DimensionMismatch { expected: m, actual: a.ncols() });
    }
    if v.len() != m {
        return Err(CoreError::DimensionMismatch { expected: m, actual: v.len() });
    }
    if out.nrows() != m || out.ncols() != k + 1 {
        return Err(CoreError::DimensionMismatch { expected: m, actual: out.nrows() });
    }

    let size = m + k;
    let mut block = DMatrix::<Complex<U>>::zeros(size, size);
    for r in 0..m {
        for c in 0..m {
            block[(r, c)] = a[(r, c)];
        }
        block[(r, m)] = v[r];
    }
    for j in 0..k.saturating_sub(1) {
        block[(m + j, m + j + 1)] = Complex::new(U::one(), U::zero());
    }

    let p = mat_exp(&block)?;

    for r in 0..m {
        let mut phi0 = Complex::new(U::zero(), U::zero());
        for c in 0..m {
            phi0 += p[(r, c)] * v[c];
        }
        out[(r, 0)] = phi0;
    }
    for i in 1..=k {
        for r in 0..m {
            out[(r, i)] = p[(r, m + i - 1)];
        }
    }
    Ok(())
}

/// Allocating convenience wrapper around [`phimv_dense_into`].
pub fn phimv_dense<U>(a: &DMatrix<Complex<U>>, v: &DVector<Complex<U>>, k: usize) -> CoreResult<DMatrix<Complex<U>>>
where
    U: Scalar + RealField + Copy,
{
    let m = a.nrows();
    let mut out = DMatrix::<Complex<U>>::zeros(m, k + 1);
    phimv_dense_into(a, v, k, &mut out)?;
    Ok(out)
}

/// Matrix-of-matrices variant: invokes `phimv_dense` once per basis vector
/// and assembles the columns of `φ_0(A) … φ_k(A)`. Writes into the
/// caller-preallocated `mats` (`k+1` entries, each `m × m`).
pub fn phim_into<U>(a: &DMatrix<Complex<U>>, k: usize, mats: &mut [DMatrix<Complex<U>>]) -> CoreResult<()>
where
    U: Scalar + RealField + Copy,
{
    let m = a.nrows();
    if a.ncols() != m {
        return Err(CoreError::DimensionMismatch { expected: m, actual: a.ncols() });
    }
    if mats.len() != k + 1 {
        return Err(CoreError::DimensionMismatch { expected: k + 1, actual: mats.len() });
    }
    for mat in mats.iter() {
        if mat.nrows() != m || mat.ncols() != m {
            return Err(CoreError::DimensionMismatch { expected: m, actual: mat.nrows() });
        }
    }

    let mut cols = DMatrix::<Complex<U>>::zeros(m, k + 1);
    for col in 0..m {
        let mut e = DVector::<Complex<U>>::zeros(m);
        e[col] = Complex::new(U::one(), U::zero());
        phimv_dense_into(a, &e, k, &mut cols)?;
        for j in 0..=k {
            mats[j].set_column(col, &cols.column(j));
        }
    }
    Ok(())
}

/// Allocating convenience wrapper around [`phim_into`].
pub fn phim<U>(a: &DMatrix<Complex<U>>, k: usize) -> CoreResult<Vec<DMatrix<Complex<U>>>>
where
    U: Scalar + RealField + Copy,
{
    let m = a.nrows();
    let mut mats: Vec<DMatrix<Complex<U>>> = (0..=k).map(|_| DMatrix::<Complex<U>>::zeros(m, m)).collect();
    phim_into(a, k, &mut mats)?;
    Ok(mats)
}

/// Krylov φmv: `φ_j(A)·b` for `j = 0…k` via Arnoldi projection, exact once
/// `m ≥ n` and otherwise a subspace approximation whose error decays with
/// `m`. `ws` is the caller-owned Arnoldi cache (reusable across calls of
/// the same `n`/`m`); `out` is the preallocated `n × (k+1)` output.
///
/// Final scaling is `‖b‖₂ · V · C` (scale-then-project).
pub fn phimv_into<U>(
    a: &DMatrix<Complex<U>>,
    b: &DVector<Complex<U>>,
    k: usize,
    ws: &mut ArnoldiWorkspace<U>,
    out: &mut DMatrix<Complex<U>>,
) -> CoreResult<()>
where
    U: Scalar + RealField + Copy,
{
    let n = a.nrows();
    if out.nrows() != n || out.ncols() != k + 1 {
        return Err(CoreError::DimensionMismatch { expected: n, actual: out.nrows() });
    }
    arnoldi_into(a, b, ws)?;
    let m = ws.h.nrows();

    let mut e1 = DVector::<Complex<U>>::zeros(m);
    e1[0] = Complex::new(U::one(), U::zero());
    let c = phimv_dense(&ws.h, &e1, k)?;

    let beta = b.norm();
    let projected = &ws.v * c * Complex::new(beta, U::zero());
    out.copy_from(&projected);
    Ok(())
}

/// Allocating convenience wrapper around [`phimv_into`].
pub fn phimv<U>(a: &DMatrix<Complex<U>>, b: &DVector<Complex<U>>, k: usize, m: usize) -> CoreResult<DMatrix<Complex<U>>>
where
    U: Scalar + RealField + Copy,
{
    let n = a.nrows();
    let mut ws = ArnoldiWorkspace::new(n, m);
    let mut out = DMatrix::<Complex<U>>::zeros(n, k + 1);
    phimv_into(a, b, k, &mut ws, &mut out)?;
    Ok(out)
}
