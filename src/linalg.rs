//! Small dense linear algebra for the per-arm ridge models.
//!
//! Matrices are row-major `Vec<f64>` of length `d * d`. Dimensions are tiny
//! (a handful of features), so everything is a straightforward loop.
//!
//! The Cholesky routines assume a symmetric positive-definite input. Arm
//! design matrices start at the identity and only ever gain `x xᵗ` terms, so
//! that precondition holds for every matrix this crate factors; there is no
//! fallback path for singular input.

pub(crate) fn dot(a: &[f64], b: &[f64]) -> f64 {
    let mut s = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        s += x * y;
    }
    s
}

pub(crate) fn identity(dim: usize) -> Vec<f64> {
    let mut m = vec![0.0; dim * dim];
    for i in 0..dim {
        m[i * dim + i] = 1.0;
    }
    m
}

/// `a <- a + x xᵗ`
pub(crate) fn add_outer(a: &mut [f64], dim: usize, x: &[f64]) {
    for i in 0..dim {
        for j in 0..dim {
            a[i * dim + j] += x[i] * x[j];
        }
    }
}

/// Lower-triangular `L` with `A = L Lᵗ`.
pub(crate) fn cholesky(a: &[f64], dim: usize) -> Vec<f64> {
    let mut l = vec![0.0; dim * dim];
    for i in 0..dim {
        for j in 0..=i {
            let mut sum = a[i * dim + j];
            for k in 0..j {
                sum -= l[i * dim + k] * l[j * dim + k];
            }
            if i == j {
                l[i * dim + j] = sum.sqrt();
            } else {
                l[i * dim + j] = sum / l[j * dim + j];
            }
        }
    }
    l
}

/// Solve `L y = b` (forward substitution).
pub(crate) fn forward_sub(l: &[f64], dim: usize, b: &[f64]) -> Vec<f64> {
    let mut y = vec![0.0; dim];
    for i in 0..dim {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i * dim + j] * y[j];
        }
        y[i] = sum / l[i * dim + i];
    }
    y
}

/// Solve `Lᵗ x = y` (backward substitution on the transpose).
pub(crate) fn back_sub_transposed(l: &[f64], dim: usize, y: &[f64]) -> Vec<f64> {
    let mut x = vec![0.0; dim];
    for i in (0..dim).rev() {
        let mut sum = y[i];
        for j in (i + 1)..dim {
            sum -= l[j * dim + i] * x[j];
        }
        x[i] = sum / l[i * dim + i];
    }
    x
}

/// Solve `A x = b` given the Cholesky factor of `A`.
pub(crate) fn cholesky_solve(l: &[f64], dim: usize, b: &[f64]) -> Vec<f64> {
    let y = forward_sub(l, dim, b);
    back_sub_transposed(l, dim, &y)
}

/// Inverse of a symmetric positive-definite matrix.
pub(crate) fn spd_inverse(a: &[f64], dim: usize) -> Vec<f64> {
    let l = cholesky(a, dim);
    let mut inv = vec![0.0; dim * dim];
    let mut e = vec![0.0; dim];
    for col in 0..dim {
        e.iter_mut().for_each(|v| *v = 0.0);
        e[col] = 1.0;
        let x = cholesky_solve(&l, dim, &e);
        for row in 0..dim {
            inv[row * dim + col] = x[row];
        }
    }
    inv
}
