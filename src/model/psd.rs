use super::constraints::check_lengths;
use super::{HandleKind, IndexCounter, ModelError};
use crate::algebra::{packed_index, triangular_number, FloatT};

/// Objective coefficient of one lower triangular entry of a PSD block.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BarcEntry<T> {
    pub block: usize,
    pub i: usize,
    pub j: usize,
    pub value: T,
}

/// Coefficient of one lower triangular PSD block entry in an affine row.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BarfEntry<T> {
    pub row: usize,
    pub block: usize,
    pub i: usize,
    pub j: usize,
    pub value: T,
}

/// Symmetric matrix variables `X̄ₖ ⪰ 0` and their sparse contributions.
///
/// Entries are given for the lower triangle only (`i ≥ j`).  An entry
/// with `i ≠ j` stands for both `(i,j)` and `(j,i)`, so its contribution to
/// an inner product `⟨C, X̄⟩` is `2·v·X̄ᵢⱼ`.
#[derive(Debug, Clone)]
pub(crate) struct SemidefiniteBlockStore<T> {
    pub(crate) counter: IndexCounter,
    pub(crate) dims: Vec<usize>,
    pub(crate) barc: Vec<BarcEntry<T>>,
    pub(crate) barf: Vec<BarfEntry<T>>,
}

impl<T: FloatT> Default for SemidefiniteBlockStore<T> {
    fn default() -> Self {
        Self {
            counter: IndexCounter::default(),
            dims: Vec::new(),
            barc: Vec::new(),
            barf: Vec::new(),
        }
    }
}

impl<T: FloatT> SemidefiniteBlockStore<T> {
    pub fn append_blocks(&mut self, dims: &[usize]) -> Result<usize, ModelError> {
        if dims.iter().any(|&d| d == 0) {
            return Err(ModelError::InvalidDomainDimension {
                kind: "semidefinite block",
                dim: 0,
            });
        }
        self.dims.extend_from_slice(dims);
        Ok(self.counter.append(dims.len()))
    }

    pub fn len(&self) -> usize {
        self.counter.len()
    }

    pub fn dim(&self, block: usize) -> Result<usize, ModelError> {
        self.dims
            .get(block)
            .copied()
            .ok_or(ModelError::UnknownHandle(HandleKind::PsdBlock(block)))
    }

    fn check_entry(&self, block: usize, i: usize, j: usize) -> Result<(), ModelError> {
        let dim = self.dim(block)?;
        if i < j || i >= dim {
            return Err(ModelError::InvalidPsdIndex { i, j, dim });
        }
        Ok(())
    }

    pub fn put_barc_triplets(
        &mut self,
        blocks: &[usize],
        i: &[usize],
        j: &[usize],
        vals: &[T],
    ) -> Result<(), ModelError> {
        check_lengths("semidefinite row indices", blocks.len(), i.len())?;
        check_lengths("semidefinite column indices", blocks.len(), j.len())?;
        check_lengths("semidefinite values", blocks.len(), vals.len())?;
        for (&b, (&ii, &jj)) in blocks.iter().zip(i.iter().zip(j)) {
            self.check_entry(b, ii, jj)?;
        }
        self.barc.extend(
            itertools::izip!(blocks, i, j, vals).map(|(&block, &i, &j, &value)| BarcEntry {
                block,
                i,
                j,
                value,
            }),
        );
        Ok(())
    }

    pub fn put_barf_triplets(
        &mut self,
        rows: &[usize],
        blocks: &[usize],
        i: &[usize],
        j: &[usize],
        vals: &[T],
    ) -> Result<(), ModelError> {
        check_lengths("semidefinite block indices", rows.len(), blocks.len())?;
        check_lengths("semidefinite row indices", rows.len(), i.len())?;
        check_lengths("semidefinite column indices", rows.len(), j.len())?;
        check_lengths("semidefinite values", rows.len(), vals.len())?;
        for (&b, (&ii, &jj)) in blocks.iter().zip(i.iter().zip(j)) {
            self.check_entry(b, ii, jj)?;
        }
        self.barf.extend(itertools::izip!(rows, blocks, i, j, vals).map(
            |(&row, &block, &i, &j, &value)| BarfEntry {
                row,
                block,
                i,
                j,
                value,
            },
        ));
        Ok(())
    }

    /// Re-checks the block and triangle indices of every stored entry.
    pub fn check_entries(&self) -> Result<(), ModelError> {
        for e in &self.barc {
            self.check_entry(e.block, e.i, e.j)?;
        }
        for e in &self.barf {
            self.check_entry(e.block, e.i, e.j)?;
        }
        Ok(())
    }

    pub fn check_rows(&self, row_count: usize) -> Result<(), ModelError> {
        match self.barf.iter().find(|e| e.row >= row_count) {
            Some(e) => Err(ModelError::UnknownHandle(HandleKind::AfeRow(e.row))),
            None => Ok(()),
        }
    }

    /// length of a packed lower triangle of every block, in block order
    pub fn packed_lengths(&self) -> Vec<usize> {
        self.dims.iter().map(|&d| triangular_number(d)).collect()
    }

    /// Adds `Σ ⟨F̄ᵣₖ, X̄ₖ⟩` to each affine row value.  `barx[k]` holds the
    /// unscaled packed lower triangle of block `k`.
    pub fn accumulate_rows(&self, barx: &[Vec<T>], out: &mut [T]) {
        for e in &self.barf {
            out[e.row] += self.weighted(e.block, e.i, e.j, e.value, barx);
        }
    }

    /// `Σₖ ⟨C̄ₖ, X̄ₖ⟩`
    pub fn objective(&self, barx: &[Vec<T>]) -> T {
        self.barc.iter().fold(T::zero(), |acc, e| {
            acc + self.weighted(e.block, e.i, e.j, e.value, barx)
        })
    }

    fn weighted(&self, block: usize, i: usize, j: usize, v: T, barx: &[Vec<T>]) -> T {
        let x = barx[block][packed_index(i, j, self.dims[block])];
        if i == j {
            v * x
        } else {
            (v + v) * x
        }
    }
}

#[test]
fn test_psd_triplets() {
    let mut psd = SemidefiniteBlockStore::<f64>::default();
    assert_eq!(psd.append_blocks(&[3, 2]), Ok(0));
    assert!(psd.append_blocks(&[0]).is_err());
    assert_eq!(psd.len(), 2);

    assert_eq!(
        psd.put_barc_triplets(&[0, 1], &[0, 0], &[0, 1], &[1.0, 1.0]),
        Err(ModelError::InvalidPsdIndex { i: 0, j: 1, dim: 2 })
    );
    assert_eq!(
        psd.put_barc_triplets(&[2], &[0], &[0], &[1.0]),
        Err(ModelError::UnknownHandle(HandleKind::PsdBlock(2)))
    );
    assert!(psd.barc.is_empty());

    // C = I on block 0, plus an off diagonal entry on block 1
    psd.put_barc_triplets(&[0, 0, 0, 1], &[0, 1, 2, 1], &[0, 1, 2, 0], &[1.0, 1.0, 1.0, 0.5])
        .unwrap();
    psd.put_barf_triplets(&[0], &[1], &[1], &[0], &[3.0]).unwrap();

    // X0 = diag(1,2,3), X1 = [1 4; 4 1]
    let barx = vec![vec![1.0, 0.0, 0.0, 2.0, 0.0, 3.0], vec![1.0, 4.0, 1.0]];
    assert_eq!(psd.objective(&barx), 6.0 + 4.0);

    let mut rows = vec![0.0; 1];
    psd.accumulate_rows(&barx, &mut rows);
    assert_eq!(rows, vec![24.0]);

    assert!(psd.check_rows(1).is_ok());
    assert!(psd.check_rows(0).is_err());
    assert_eq!(psd.packed_lengths(), vec![6, 3]);
    assert!(psd.check_entries().is_ok());
}

#[test]
fn test_psd_check_entries() {
    let mut psd = SemidefiniteBlockStore::<f64>::default();
    psd.append_blocks(&[2]).unwrap();
    psd.put_barc_triplets(&[0], &[1], &[0], &[1.0]).unwrap();
    psd.put_barf_triplets(&[0], &[0], &[1], &[1], &[1.0]).unwrap();
    assert!(psd.check_entries().is_ok());

    // entries written around the checked setters
    psd.barc[0].i = 7;
    assert_eq!(
        psd.check_entries(),
        Err(ModelError::InvalidPsdIndex { i: 7, j: 0, dim: 2 })
    );
    psd.barc[0].i = 1;
    psd.barf[0].block = 3;
    assert_eq!(
        psd.check_entries(),
        Err(ModelError::UnknownHandle(HandleKind::PsdBlock(3)))
    );
    psd.barf[0].block = 0;
    psd.barf[0].j = 1;
    psd.barf[0].i = 0;
    assert!(psd.check_entries().is_err());
}
