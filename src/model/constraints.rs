use super::variables::build_bounds;
use super::{Bound, BoundKey, HandleKind, IndexCounter, ModelError};
use crate::algebra::FloatT;

/// One sparse linear row, kept sorted by variable index.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SparseRow<T> {
    pub idx: Vec<usize>,
    pub val: Vec<T>,
}

impl<T: FloatT> SparseRow<T> {
    // overwrite or insert, keeping idx sorted
    fn put(&mut self, j: usize, v: T) {
        match self.idx.binary_search(&j) {
            Ok(k) => self.val[k] = v,
            Err(k) => {
                self.idx.insert(k, j);
                self.val.insert(k, v);
            }
        }
    }

    pub fn dot(&self, x: &[T]) -> T {
        self.idx
            .iter()
            .zip(&self.val)
            .fold(T::zero(), |acc, (&j, &v)| acc + v * x[j])
    }
}

/// Linear constraints `lc ≤ A x ≤ uc`.
///
/// A row coefficient is a single value: putting `(i,j)` twice keeps the
/// last value.  Variable references are checked by `Model::validate`.
#[derive(Debug, Clone)]
pub(crate) struct ConstraintStore<T> {
    pub(crate) counter: IndexCounter,
    pub(crate) rows: Vec<SparseRow<T>>,
    pub(crate) bounds: Vec<Bound<T>>,
    pub(crate) names: Vec<Option<String>>,
}

impl<T: FloatT> Default for ConstraintStore<T> {
    fn default() -> Self {
        Self {
            counter: IndexCounter::default(),
            rows: Vec::new(),
            bounds: Vec::new(),
            names: Vec::new(),
        }
    }
}

impl<T: FloatT> ConstraintStore<T> {
    pub fn append(&mut self, n: usize) -> usize {
        let first = self.counter.append(n);
        self.rows.resize_with(self.counter.len(), SparseRow::default);
        self.bounds.resize(self.counter.len(), Bound::free());
        self.names.resize(self.counter.len(), None);
        first
    }

    pub fn len(&self) -> usize {
        self.counter.len()
    }

    pub fn check(&self, i: usize) -> Result<(), ModelError> {
        if self.counter.contains(i) {
            Ok(())
        } else {
            Err(ModelError::UnknownHandle(HandleKind::Constraint(i)))
        }
    }

    /// Replaces row `i`.  Repeated variable indices keep the last value.
    pub fn put_row(&mut self, i: usize, vars: &[usize], vals: &[T]) -> Result<(), ModelError> {
        self.check(i)?;
        check_lengths("row coefficients", vars.len(), vals.len())?;
        let mut row = SparseRow::default();
        for (&j, &v) in vars.iter().zip(vals) {
            row.put(j, v);
        }
        self.rows[i] = row;
        Ok(())
    }

    pub fn put_aij(&mut self, i: usize, j: usize, v: T) -> Result<(), ModelError> {
        self.check(i)?;
        self.rows[i].put(j, v);
        Ok(())
    }

    pub fn put_aij_list(&mut self, cons: &[usize], vars: &[usize], vals: &[T]) -> Result<(), ModelError> {
        check_lengths("constraint indices", vars.len(), cons.len())?;
        check_lengths("coefficient values", vars.len(), vals.len())?;
        if let Some(&bad) = cons.iter().find(|&&i| !self.counter.contains(i)) {
            return Err(ModelError::UnknownHandle(HandleKind::Constraint(bad)));
        }
        for ((&i, &j), &v) in cons.iter().zip(vars).zip(vals) {
            self.rows[i].put(j, v);
        }
        Ok(())
    }

    pub fn set_bound(&mut self, i: usize, key: BoundKey, lower: T, upper: T) -> Result<(), ModelError> {
        self.check(i)?;
        self.bounds[i] = Bound::new(key, lower, upper)?;
        Ok(())
    }

    pub fn set_bounds_slice(
        &mut self,
        first: usize,
        keys: &[BoundKey],
        lower: &[T],
        upper: &[T],
    ) -> Result<(), ModelError> {
        let bounds = build_bounds(keys, lower, upper)?;
        if !bounds.is_empty() {
            self.check(first + bounds.len() - 1)?;
        }
        self.bounds[first..first + bounds.len()].copy_from_slice(&bounds);
        Ok(())
    }

    pub fn set_name(&mut self, i: usize, name: &str) -> Result<(), ModelError> {
        self.check(i)?;
        self.names[i] = Some(name.to_string());
        Ok(())
    }

    /// fails on the first row coefficient with a variable index `>= nvars`
    pub fn check_variables(&self, nvars: usize) -> Result<(), ModelError> {
        for row in &self.rows {
            // rows are sorted, so the last index is the largest
            if let Some(&j) = row.idx.last() {
                if j >= nvars {
                    return Err(ModelError::UnknownHandle(HandleKind::Variable(j)));
                }
            }
        }
        Ok(())
    }
}

pub(crate) fn check_lengths(what: &'static str, expected: usize, found: usize) -> Result<(), ModelError> {
    if expected != found {
        Err(ModelError::DimensionMismatch {
            what,
            expected,
            found,
        })
    } else {
        Ok(())
    }
}

#[test]
fn test_constraint_rows_overwrite() {
    let mut cons = ConstraintStore::<f64>::default();
    cons.append(2);
    cons.put_row(0, &[3, 1, 3], &[1.0, 2.0, 5.0]).unwrap();
    assert_eq!(cons.rows[0].idx, vec![1, 3]);
    assert_eq!(cons.rows[0].val, vec![2.0, 5.0]);

    cons.put_aij(0, 1, -1.0).unwrap();
    assert_eq!(cons.rows[0].val, vec![-1.0, 5.0]);
    assert_eq!(cons.rows[0].dot(&[0.0, 1.0, 0.0, 2.0]), 9.0);

    // a bad constraint index in the list leaves every row untouched
    let err = cons.put_aij_list(&[1, 2], &[0, 0], &[1.0, 1.0]);
    assert_eq!(err, Err(ModelError::UnknownHandle(HandleKind::Constraint(2))));
    assert!(cons.rows[1].idx.is_empty());

    assert!(cons.check_variables(4).is_ok());
    assert_eq!(
        cons.check_variables(3),
        Err(ModelError::UnknownHandle(HandleKind::Variable(3)))
    );
}
