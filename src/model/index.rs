use std::ops::Range;

/// An append-only counter handing out dense 0-based indices.
///
/// Every store in a [`Model`](super::Model) owns one.  Indices are never
/// reused or removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndexCounter {
    len: usize,
}

impl IndexCounter {
    /// Reserves `n` new indices and returns the first of them.
    pub fn append(&mut self, n: usize) -> usize {
        let first = self.len;
        self.len += n;
        first
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, i: usize) -> bool {
        i < self.len
    }

    pub fn range(&self) -> Range<usize> {
        0..self.len
    }
}

/// Snapshot of every index space in a model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexAllocator {
    pub variables: usize,
    pub constraints: usize,
    pub afe_rows: usize,
    pub psd_blocks: usize,
    pub domains: usize,
    pub accs: usize,
    pub djcs: usize,
}

#[test]
fn test_index_counter() {
    let mut c = IndexCounter::default();
    assert!(c.is_empty());
    assert_eq!(c.append(3), 0);
    assert_eq!(c.append(0), 3);
    assert_eq!(c.append(2), 3);
    assert_eq!(c.len(), 5);
    assert!(c.contains(4));
    assert!(!c.contains(5));
    assert_eq!(c.range(), 0..5);
}
