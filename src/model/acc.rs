use super::constraints::check_lengths;
use super::domain::Domain;
use super::{HandleKind, IndexCounter, ModelError};
use crate::algebra::FloatT;

/// An affine conic constraint: the values of `afe_rows` lie in the
/// domain, repeated once per `dim` rows.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Acc {
    pub(crate) domain: usize,
    pub(crate) afe_rows: Vec<usize>,
}

impl Acc {
    /// index of the bound domain within its model
    pub fn domain_index(&self) -> usize {
        self.domain
    }

    pub fn afe_rows(&self) -> &[usize] {
        &self.afe_rows
    }

    /// how many copies of the domain the constraint spans
    pub fn repeats(&self, dim: usize) -> usize {
        self.afe_rows.len() / dim
    }

    pub fn is_satisfied<T: FloatT>(&self, domain: &Domain<T>, afe_values: &[T], tol: T) -> bool {
        let point: Vec<T> = self.afe_rows.iter().map(|&r| afe_values[r]).collect();
        point
            .chunks(domain.dim())
            .all(|chunk| domain.contains(chunk, tol))
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ConicConstraintSet {
    pub(crate) counter: IndexCounter,
    pub(crate) accs: Vec<Acc>,
}

impl ConicConstraintSet {
    /// Binds `rows` to the domain stored at `domain_index`.  The optional
    /// `weights` carry no meaning here and are only length checked.
    pub fn append_acc<T: FloatT>(
        &mut self,
        domain_index: usize,
        domain: &Domain<T>,
        rows: &[usize],
        weights: Option<&[T]>,
        row_count: usize,
    ) -> Result<usize, ModelError> {
        let dim = domain.dim();
        if rows.is_empty() || rows.len() % dim != 0 {
            return Err(ModelError::DimensionMismatch {
                what: "conic constraint rows",
                expected: dim * usize::max(1, rows.len() / dim),
                found: rows.len(),
            });
        }
        if let Some(w) = weights {
            check_lengths("conic constraint weights", rows.len(), w.len())?;
        }
        if let Some(&r) = rows.iter().find(|&&r| r >= row_count) {
            return Err(ModelError::UnknownHandle(HandleKind::AfeRow(r)));
        }

        self.accs.push(Acc {
            domain: domain_index,
            afe_rows: rows.to_vec(),
        });
        Ok(self.counter.append(1))
    }

    /// Appends `count` constraints over consecutive windows of `dim` rows
    /// starting at `first_row`.  Returns the index of the first.
    pub fn append_sequence(
        &mut self,
        domain_index: usize,
        dim: usize,
        first_row: usize,
        count: usize,
        row_count: usize,
    ) -> Result<usize, ModelError> {
        let end = count
            .checked_mul(dim)
            .and_then(|n| n.checked_add(first_row))
            .unwrap_or(usize::MAX);
        if end > row_count {
            return Err(ModelError::RowRangeExceeded {
                first: first_row,
                end,
                rows: row_count,
            });
        }

        let first = self.counter.append(count);
        self.accs.extend((0..count).map(|k| {
            let start = first_row + k * dim;
            Acc {
                domain: domain_index,
                afe_rows: (start..start + dim).collect(),
            }
        }));
        Ok(first)
    }

    pub fn get(&self, i: usize) -> Result<&Acc, ModelError> {
        self.accs
            .get(i)
            .ok_or(ModelError::UnknownHandle(HandleKind::Acc(i)))
    }

    pub fn len(&self) -> usize {
        self.counter.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Acc> {
        self.accs.iter()
    }

    /// offset of each constraint in the concatenation of all ACC rows,
    /// with the total as the final element
    pub fn row_offsets(&self) -> Vec<usize> {
        let mut offsets = Vec::with_capacity(self.accs.len() + 1);
        let mut total = 0;
        offsets.push(0);
        for acc in &self.accs {
            total += acc.afe_rows.len();
            offsets.push(total);
        }
        offsets
    }
}
