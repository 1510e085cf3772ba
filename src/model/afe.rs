use super::constraints::check_lengths;
use super::{HandleKind, IndexCounter, ModelError};
use crate::algebra::{FloatT, SparseVector};
use itertools::izip;

/// Sparse affine expression rows `F x + g`.
///
/// `F` is held as unsorted `(row, var, value)` triplets.  Triplets sharing
/// a `(row, var)` position accumulate.  Triplets may name rows or
/// variables that do not exist yet; they are checked by
/// [`check_indices`](Self::check_indices) when the model is validated.
#[derive(Debug, Clone)]
pub(crate) struct AffineExpressionStore<T> {
    pub(crate) counter: IndexCounter,
    pub(crate) f_rows: Vec<usize>,
    pub(crate) f_vars: Vec<usize>,
    pub(crate) f_vals: Vec<T>,
    pub(crate) g: Vec<T>,
}

impl<T: FloatT> Default for AffineExpressionStore<T> {
    fn default() -> Self {
        Self {
            counter: IndexCounter::default(),
            f_rows: Vec::new(),
            f_vars: Vec::new(),
            f_vals: Vec::new(),
            g: Vec::new(),
        }
    }
}

impl<T: FloatT> AffineExpressionStore<T> {
    pub fn append_rows(&mut self, n: usize) -> usize {
        let first = self.counter.append(n);
        self.g.resize(self.counter.len(), T::zero());
        first
    }

    pub fn row_count(&self) -> usize {
        self.counter.len()
    }

    pub fn nnz(&self) -> usize {
        self.f_vals.len()
    }

    pub fn check_row(&self, row: usize) -> Result<(), ModelError> {
        if self.counter.contains(row) {
            Ok(())
        } else {
            Err(ModelError::UnknownHandle(HandleKind::AfeRow(row)))
        }
    }

    pub fn set_entry(&mut self, row: usize, var: usize, value: T) {
        self.f_rows.push(row);
        self.f_vars.push(var);
        self.f_vals.push(value);
    }

    pub fn set_entries_bulk(&mut self, rows: &[usize], vars: &[usize], vals: &[T]) -> Result<(), ModelError> {
        check_lengths("affine variable indices", rows.len(), vars.len())?;
        check_lengths("affine values", rows.len(), vals.len())?;
        self.f_rows.extend_from_slice(rows);
        self.f_vars.extend_from_slice(vars);
        self.f_vals.extend_from_slice(vals);
        Ok(())
    }

    /// Replaces every F entry of an existing row.
    pub fn set_row(&mut self, row: usize, vars: &[usize], vals: &[T]) -> Result<(), ModelError> {
        self.check_row(row)?;
        check_lengths("affine values", vars.len(), vals.len())?;

        let kept: Vec<(usize, usize, T)> = self.triplets().filter(|&(r, _, _)| r != row).collect();
        self.f_rows = kept.iter().map(|t| t.0).collect();
        self.f_vars = kept.iter().map(|t| t.1).collect();
        self.f_vals = kept.iter().map(|t| t.2).collect();

        for (&j, &v) in vars.iter().zip(vals) {
            self.set_entry(row, j, v);
        }
        Ok(())
    }

    pub fn set_constant(&mut self, row: usize, value: T) -> Result<(), ModelError> {
        self.check_row(row)?;
        self.g[row] = value;
        Ok(())
    }

    pub fn set_constant_slice(&mut self, start: usize, values: &[T]) -> Result<(), ModelError> {
        let end = match start.checked_add(values.len()) {
            Some(end) if end <= self.row_count() => end,
            _ => {
                let missing = usize::max(start, self.row_count());
                return Err(ModelError::UnknownHandle(HandleKind::AfeRow(missing)));
            }
        };
        self.g[start..end].copy_from_slice(values);
        Ok(())
    }

    pub fn constant(&self, row: usize) -> Result<T, ModelError> {
        self.check_row(row)?;
        Ok(self.g[row])
    }

    /// Raw `(row, var, value)` triplets in insertion order.
    pub fn triplets(&self) -> impl Iterator<Item = (usize, usize, T)> + '_ {
        izip!(&self.f_rows, &self.f_vars, &self.f_vals).map(|(&r, &j, &v)| (r, j, v))
    }

    /// Gathers the F entries of one row into a sorted sparse vector of
    /// dimension `nvars`.  Duplicates are summed and zero sums dropped.
    pub fn materialize_row(&self, row: usize, nvars: usize) -> Result<SparseVector<T>, ModelError> {
        self.check_row(row)?;
        let entries: Vec<(usize, T)> = self
            .triplets()
            .filter(|&(r, _, _)| r == row)
            .map(|(_, j, v)| (j, v))
            .collect();
        if let Some(&(j, _)) = entries.iter().find(|&&(j, _)| j >= nvars) {
            return Err(ModelError::UnknownHandle(HandleKind::Variable(j)));
        }
        let mut sv = SparseVector::from_unsorted(nvars, entries);
        sv.dropzeros();
        Ok(sv)
    }

    pub fn check_indices(&self, nvars: usize) -> Result<(), ModelError> {
        for (r, j, _) in self.triplets() {
            self.check_row(r)?;
            if j >= nvars {
                return Err(ModelError::UnknownHandle(HandleKind::Variable(j)));
            }
        }
        Ok(())
    }

    /// `F x + g` over every row.  Indices must have been checked.
    pub fn evaluate(&self, x: &[T]) -> Vec<T> {
        let mut out = self.g.clone();
        for (r, j, v) in self.triplets() {
            out[r] += v * x[j];
        }
        out
    }
}

#[test]
fn test_afe_accumulates() {
    let mut afe = AffineExpressionStore::<f64>::default();
    assert_eq!(afe.append_rows(2), 0);

    afe.set_entry(1, 0, 1.0);
    afe.set_entries_bulk(&[1, 1, 0, 1], &[2, 0, 0, 2], &[0.5, 2.0, 4.0, -0.5])
        .unwrap();

    let row = afe.materialize_row(1, 3).unwrap();
    // var 2 sums to zero and is dropped
    assert_eq!(row.nzind, vec![0]);
    assert_eq!(row.nzval, vec![3.0]);

    afe.set_constant_slice(0, &[1.0, -1.0]).unwrap();
    assert_eq!(afe.evaluate(&[1.0, 0.0, 10.0]), vec![5.0, 2.0]);
}

#[test]
fn test_afe_transactional() {
    let mut afe = AffineExpressionStore::<f64>::default();
    afe.append_rows(3);

    let err = afe.set_entries_bulk(&[0, 1], &[0], &[1.0, 1.0]);
    assert!(matches!(err, Err(ModelError::DimensionMismatch { .. })));
    assert_eq!(afe.nnz(), 0);

    let err = afe.set_constant_slice(2, &[1.0, 2.0]);
    assert_eq!(err, Err(ModelError::UnknownHandle(HandleKind::AfeRow(3))));
    assert_eq!(afe.constant(2).unwrap(), 0.0);

    // a slice reaching past the end of the address space
    let err = afe.set_constant_slice(usize::MAX, &[1.0, 2.0]);
    assert_eq!(err, Err(ModelError::UnknownHandle(HandleKind::AfeRow(usize::MAX))));
    assert!(afe.set_constant_slice(3, &[]).is_ok());

    // entries for future rows are accepted, and fail the index check
    afe.set_entry(5, 0, 1.0);
    assert_eq!(
        afe.check_indices(1),
        Err(ModelError::UnknownHandle(HandleKind::AfeRow(5)))
    );
    afe.append_rows(3);
    assert!(afe.check_indices(1).is_ok());
}

#[test]
fn test_afe_set_row() {
    let mut afe = AffineExpressionStore::<f64>::default();
    afe.append_rows(2);
    afe.set_entries_bulk(&[0, 1, 0], &[0, 1, 2], &[1.0, 2.0, 3.0])
        .unwrap();
    afe.set_row(0, &[1], &[7.0]).unwrap();

    assert_eq!(afe.materialize_row(0, 3).unwrap().nzind, vec![1]);
    assert_eq!(afe.materialize_row(1, 3).unwrap().nzval, vec![2.0]);
    assert_eq!(afe.nnz(), 2);
}
