#![allow(non_snake_case)]

use num_traits::Num;
use std::iter::zip;

/// Sparse vector type.
///
/// Returned when materializing a single affine expression row.  Indices
/// in `nzind` are strictly increasing.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparseVector<T = f64> {
    /// vector dimension
    pub n: usize,
    /// vector of entry indices
    pub nzind: Vec<usize>,
    /// vector of non-zero vector elements
    pub nzval: Vec<T>,
}

impl<T> SparseVector<T>
where
    T: Num + Copy,
{
    /// Creates a `SparseVector` from a dense slice.
    pub fn new(values: &[T]) -> Self {
        let mut nzind = Vec::new();
        let mut nzval = Vec::new();

        for (i, &v) in values.iter().enumerate() {
            if v != T::zero() {
                nzind.push(i);
                nzval.push(v);
            }
        }
        SparseVector {
            n: values.len(),
            nzind,
            nzval,
        }
    }

    /// Creates a `SparseVector` of dimension `n` from unsorted
    /// (index, value) pairs.  Values sharing an index are summed.
    /// Structural entries are kept even if they sum to zero.
    pub fn from_unsorted(n: usize, pairs: impl IntoIterator<Item = (usize, T)>) -> Self {
        let mut pairs: Vec<(usize, T)> = pairs.into_iter().collect();
        pairs.sort_by_key(|&(i, _)| i);

        let mut nzind: Vec<usize> = Vec::with_capacity(pairs.len());
        let mut nzval: Vec<T> = Vec::with_capacity(pairs.len());

        for (i, v) in pairs {
            debug_assert!(i < n);
            match nzind.last() {
                Some(&last) if last == i => {
                    let acc = nzval.last_mut().unwrap();
                    *acc = *acc + v;
                }
                _ => {
                    nzind.push(i);
                    nzval.push(v);
                }
            }
        }
        SparseVector { n, nzind, nzval }
    }

    pub fn nnz(&self) -> usize {
        self.nzval.len()
    }

    /// value at index `i`, zero if structurally absent
    pub fn get(&self, i: usize) -> T {
        match self.nzind.binary_search(&i) {
            Ok(k) => self.nzval[k],
            Err(_) => T::zero(),
        }
    }

    pub fn dropzeros(&mut self) {
        let mut writeidx: usize = 0;

        for readidx in 0..self.nzval.len() {
            let val = self.nzval[readidx];
            let idx = self.nzind[readidx];

            // If nonzero and a shift so far, move the value
            if val != T::zero() {
                if writeidx != readidx {
                    self.nzval[writeidx] = val;
                    self.nzind[writeidx] = idx;
                }
                writeidx += 1;
            }
        }

        self.nzind.resize(writeidx, 0);
        self.nzval.resize(writeidx, T::zero());
    }
}

impl<T> From<SparseVector<T>> for Vec<T>
where
    T: Num + Copy,
{
    fn from(sv: SparseVector<T>) -> Vec<T> {
        let mut v = vec![T::zero(); sv.n];
        for (i, nz) in zip(sv.nzind, sv.nzval) {
            v[i] = nz;
        }
        v
    }
}

#[test]
fn test_sparsevector_new() {
    let v = vec![0.1, 0.3, 0.0, 0.0, 0.4, 0.0];

    let vs = SparseVector::new(&v);

    assert_eq!(vs.n, v.len());
    assert_eq!(vs.nzind, vec![0, 1, 4]);
    assert_eq!(vs.nzval, vec![0.1, 0.3, 0.4]);

    let vback: Vec<f64> = vs.into();
    assert_eq!(v, vback);
}

#[test]
fn test_sparsevector_from_unsorted() {
    let vs = SparseVector::from_unsorted(5, vec![(3, 1.0), (0, 2.0), (3, 0.5), (1, -1.0), (1, 1.0)]);

    assert_eq!(vs.nzind, vec![0, 1, 3]);
    assert_eq!(vs.nzval, vec![2.0, 0.0, 1.5]);
    assert_eq!(vs.get(3), 1.5);
    assert_eq!(vs.get(4), 0.0);
}

#[test]
fn test_sparsevector_dropzeros() {
    let x = vec![0.1, 0.3, 0.2, 0.0, 0.4, 0.0];
    let y = vec![0.1, 0.3, 0.0, 0.0, 0.4, 0.0];

    let mut xs = SparseVector::new(&x);
    xs.nzval[2] = 0.0;
    xs.dropzeros();

    let ys = SparseVector::new(&y);

    assert_eq!(xs, ys);
}
