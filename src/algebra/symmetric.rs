#![allow(non_snake_case)]
use super::{packed_index, FloatT};

// Small dense helpers for symmetric matrices held in packed lower
// triangular column-major form.  Only used for point membership checks
// of SVEC PSD domains, never on a solve path.

/// Expand a scaled svec vector of an order `k` matrix into a dense
/// column-major symmetric matrix.  Off-diagonal svec entries carry a
/// factor √2 which is removed here.
pub(crate) fn svec_to_dense<T: FloatT>(svec: &[T], k: usize) -> Vec<T> {
    let mut X = vec![T::zero(); k * k];
    let isqrt2 = T::FRAC_1_SQRT_2();
    for j in 0..k {
        for i in j..k {
            let v = svec[packed_index(i, j, k)];
            let v = if i == j { v } else { v * isqrt2 };
            X[i + j * k] = v;
            X[j + i * k] = v;
        }
    }
    X
}

/// Checks that the dense symmetric matrix `X` of order `k` satisfies
/// X + tol·I ≻ 0 by attempting a Cholesky factorization in place.
pub(crate) fn is_psd<T: FloatT>(mut X: Vec<T>, k: usize, tol: T) -> bool {
    for i in 0..k {
        X[i + i * k] += tol;
    }
    for j in 0..k {
        let mut d = X[j + j * k];
        for p in 0..j {
            d -= X[j + p * k] * X[j + p * k];
        }
        if !(d > T::zero()) {
            return false;
        }
        let d = d.sqrt();
        X[j + j * k] = d;
        for i in (j + 1)..k {
            let mut s = X[i + j * k];
            for p in 0..j {
                s -= X[i + p * k] * X[j + p * k];
            }
            X[i + j * k] = s / d;
        }
    }
    true
}

#[test]
fn test_is_psd() {
    // [2 1; 1 2] is PD, [1 2; 2 1] is indefinite
    assert!(is_psd(vec![2.0, 1.0, 1.0, 2.0], 2, 0.0));
    assert!(!is_psd(vec![1.0, 2.0, 2.0, 1.0], 2, 1e-9));
    // rank one matrix is PSD only up to the tolerance shift
    assert!(is_psd(vec![1.0, 1.0, 1.0, 1.0], 2, 1e-9));
    assert!(!is_psd(vec![1.0, 1.0, 1.0, 1.0], 2, 0.0));
}

#[test]
fn test_svec_to_dense() {
    let s2 = std::f64::consts::SQRT_2;
    // X = [1 2; 2 3]
    let X = svec_to_dense(&[1.0, 2.0 * s2, 3.0], 2);
    assert!((X[1] - 2.0).abs() < 1e-12);
    assert!((X[2] - 2.0).abs() < 1e-12);
    assert_eq!(X[0], 1.0);
    assert_eq!(X[3], 3.0);
}
