use super::{Bound, BoundKey, HandleKind, IndexCounter, ModelError};
use crate::algebra::FloatT;

/// Scalar variables of a model: bounds, names and integrality flags.
#[derive(Debug, Clone)]
pub(crate) struct VariableStore<T> {
    pub(crate) counter: IndexCounter,
    pub(crate) bounds: Vec<Bound<T>>,
    pub(crate) names: Vec<Option<String>>,
    pub(crate) integer: Vec<bool>,
}

impl<T: FloatT> Default for VariableStore<T> {
    fn default() -> Self {
        Self {
            counter: IndexCounter::default(),
            bounds: Vec::new(),
            names: Vec::new(),
            integer: Vec::new(),
        }
    }
}

impl<T: FloatT> VariableStore<T> {
    pub fn append(&mut self, n: usize) -> usize {
        let first = self.counter.append(n);
        self.bounds.resize(self.counter.len(), Bound::free());
        self.names.resize(self.counter.len(), None);
        self.integer.resize(self.counter.len(), false);
        first
    }

    pub fn len(&self) -> usize {
        self.counter.len()
    }

    pub fn check(&self, j: usize) -> Result<(), ModelError> {
        if self.counter.contains(j) {
            Ok(())
        } else {
            Err(ModelError::UnknownHandle(HandleKind::Variable(j)))
        }
    }

    pub fn bound(&self, j: usize) -> Result<&Bound<T>, ModelError> {
        self.check(j)?;
        Ok(&self.bounds[j])
    }

    pub fn set_bound(&mut self, j: usize, key: BoundKey, lower: T, upper: T) -> Result<(), ModelError> {
        self.check(j)?;
        self.bounds[j] = Bound::new(key, lower, upper)?;
        Ok(())
    }

    /// Sets bounds on the variables `first..first + keys.len()`.  All
    /// bounds are checked before any is written.
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

    /// Same bound on every variable in `first..first + count`.
    pub fn set_bounds_const(
        &mut self,
        first: usize,
        count: usize,
        key: BoundKey,
        lower: T,
        upper: T,
    ) -> Result<(), ModelError> {
        let bound = Bound::new(key, lower, upper)?;
        if count > 0 {
            self.check(first + count - 1)?;
        }
        self.bounds[first..first + count].fill(bound);
        Ok(())
    }

    pub fn set_integer(&mut self, j: usize, flag: bool) -> Result<(), ModelError> {
        self.check(j)?;
        self.integer[j] = flag;
        Ok(())
    }

    pub fn set_name(&mut self, j: usize, name: &str) -> Result<(), ModelError> {
        self.check(j)?;
        self.names[j] = Some(name.to_string());
        Ok(())
    }
}

// shared with the constraint store
pub(crate) fn build_bounds<T: FloatT>(
    keys: &[BoundKey],
    lower: &[T],
    upper: &[T],
) -> Result<Vec<Bound<T>>, ModelError> {
    for (what, found) in [("lower bounds", lower.len()), ("upper bounds", upper.len())] {
        if found != keys.len() {
            return Err(ModelError::DimensionMismatch {
                what,
                expected: keys.len(),
                found,
            });
        }
    }
    itertools::izip!(keys, lower, upper)
        .map(|(&k, &l, &u)| Bound::new(k, l, u))
        .collect()
}

#[test]
fn test_variable_bounds_transactional() {
    let mut vars = VariableStore::<f64>::default();
    assert_eq!(vars.append(3), 0);
    assert_eq!(vars.bound(1).unwrap().key, BoundKey::Free);

    vars.set_bound(0, BoundKey::Lower, 0.0, 0.0).unwrap();

    // second bound is invalid, so nothing is written
    let err = vars.set_bounds_slice(
        0,
        &[BoundKey::Fixed, BoundKey::Range],
        &[1.0, 5.0],
        &[1.0, 4.0],
    );
    assert!(matches!(err, Err(ModelError::InvalidBounds { .. })));
    assert_eq!(vars.bound(0).unwrap().key, BoundKey::Lower);

    // past the last variable
    let err = vars.set_bounds_const(2, 2, BoundKey::Upper, 0.0, 1.0);
    assert_eq!(err, Err(ModelError::UnknownHandle(HandleKind::Variable(3))));
    assert_eq!(vars.bound(2).unwrap().key, BoundKey::Free);

    let err = vars.set_bounds_slice(0, &[BoundKey::Free], &[], &[0.0]);
    assert!(matches!(err, Err(ModelError::DimensionMismatch { .. })));
}
