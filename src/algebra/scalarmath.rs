// helpers for packed lower triangular storage.  A symmetric matrix of
// order k is stored column-wise as (X_00, X_10, .., X_k0, X_11, X_21, ..)

pub(crate) fn triangular_number(k: usize) -> usize {
    (k * (k + 1)) >> 1
}

/// Returns `k` such that `n == k(k+1)/2`, if it exists.
pub(crate) fn triangular_root(n: usize) -> Option<usize> {
    // f64 estimate, then corrected by integer checks
    let est = (((8 * n + 1) as f64).sqrt() - 1.0) / 2.0;
    let k = est.round() as usize;
    (k.saturating_sub(1)..=k + 1).find(|&k| triangular_number(k) == n)
}

/// Offset of entry (i,j), i >= j, of an order `k` matrix in packed
/// lower triangular column-major storage.
pub(crate) fn packed_index(i: usize, j: usize, k: usize) -> usize {
    debug_assert!(i >= j && i < k);
    // columns 0..j hold k + (k-1) + ... + (k-j+1) entries
    j * k - (j * j - j) / 2 + (i - j)
}

#[test]
fn test_triangular_root() {
    assert_eq!(triangular_root(0), Some(0));
    assert_eq!(triangular_root(1), Some(1));
    assert_eq!(triangular_root(3), Some(2));
    assert_eq!(triangular_root(6), Some(3));
    assert_eq!(triangular_root(5050), Some(100));
    assert_eq!(triangular_root(4), None);
    assert_eq!(triangular_root(7), None);
}

#[test]
fn test_packed_index() {
    // order 3 : (0,0) (1,0) (2,0) (1,1) (2,1) (2,2)
    let k = 3;
    let expected = [(0, 0), (1, 0), (2, 0), (1, 1), (2, 1), (2, 2)];
    for (idx, &(i, j)) in expected.iter().enumerate() {
        assert_eq!(packed_index(i, j, k), idx);
    }
}
