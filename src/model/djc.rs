use super::domain::{DomainHandle, DomainRegistry};
use super::{HandleKind, IndexCounter, ModelError};
use crate::algebra::FloatT;

/// One domain membership inside a disjunction term: the values of
/// `afe_rows` must lie in `domain`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainMembership {
    pub domain: DomainHandle,
    pub afe_rows: Vec<usize>,
}

impl DomainMembership {
    pub fn new(domain: DomainHandle, afe_rows: impl Into<Vec<usize>>) -> Self {
        Self {
            domain,
            afe_rows: afe_rows.into(),
        }
    }
}

/// A membership as stored in the model, with the domain resolved to
/// its index.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Membership {
    pub domain: usize,
    pub afe_rows: Vec<usize>,
}

/// A disjunctive constraint: an OR over AND-terms.
///
/// Memberships of all terms are held in one flat list, and
/// `term_sizes[t]` memberships in a row form term `t`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Djc {
    memberships: Vec<Membership>,
    term_sizes: Vec<usize>,
}

impl Djc {
    pub fn term_sizes(&self) -> &[usize] {
        &self.term_sizes
    }

    pub fn membership_count(&self) -> usize {
        self.memberships.len()
    }

    pub fn memberships(&self) -> &[Membership] {
        &self.memberships
    }

    /// domain index of every membership, in flat order
    pub fn domains(&self) -> Vec<usize> {
        self.memberships.iter().map(|m| m.domain).collect()
    }

    /// concatenated rows of every membership, in flat order
    pub fn afe_rows(&self) -> Vec<usize> {
        self.memberships
            .iter()
            .flat_map(|m| m.afe_rows.iter().copied())
            .collect()
    }

    pub fn terms(&self) -> impl Iterator<Item = &[Membership]> + '_ {
        let mut start = 0;
        self.term_sizes.iter().map(move |&n| {
            let term = &self.memberships[start..start + n];
            start += n;
            term
        })
    }

    /// true if every membership of at least one term holds
    pub fn is_satisfied<T: FloatT>(&self, afe_values: &[T], domains: &DomainRegistry<T>, tol: T) -> bool {
        self.terms().any(|term| {
            term.iter().all(|m| {
                let point: Vec<T> = m.afe_rows.iter().map(|&r| afe_values[r]).collect();
                domains
                    .get(m.domain)
                    .map_or(false, |d| d.contains(&point, tol))
            })
        })
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct DisjunctiveConstraintSet {
    pub(crate) counter: IndexCounter,
    pub(crate) djcs: Vec<Djc>,
}

impl DisjunctiveConstraintSet {
    /// Appends the disjunction of `terms`.  Nothing is stored unless every
    /// term and membership checks out.
    pub fn append<T: FloatT>(
        &mut self,
        terms: &[Vec<DomainMembership>],
        domains: &DomainRegistry<T>,
        row_count: usize,
    ) -> Result<usize, ModelError> {
        if terms.is_empty() {
            return Err(ModelError::EmptyDisjunction);
        }

        let mut memberships = Vec::new();
        let mut term_sizes = Vec::with_capacity(terms.len());

        for (t, term) in terms.iter().enumerate() {
            if term.is_empty() {
                return Err(ModelError::EmptyTerm(t));
            }
            for m in term {
                let domain = domains.resolve(m.domain)?;
                let dim = domains.get(domain).map_or(0, |d| d.dim());
                if m.afe_rows.len() != dim {
                    return Err(ModelError::DimensionMismatch {
                        what: "disjunction membership rows",
                        expected: dim,
                        found: m.afe_rows.len(),
                    });
                }
                if let Some(&r) = m.afe_rows.iter().find(|&&r| r >= row_count) {
                    return Err(ModelError::UnknownHandle(HandleKind::AfeRow(r)));
                }
                memberships.push(Membership {
                    domain,
                    afe_rows: m.afe_rows.clone(),
                });
            }
            term_sizes.push(term.len());
        }

        self.djcs.push(Djc {
            memberships,
            term_sizes,
        });
        Ok(self.counter.append(1))
    }

    /// Flattened form: `domains` lists every membership's domain,
    /// `afe_rows` their concatenated rows, and `term_sizes` partitions the
    /// memberships into terms.
    pub fn append_flat<T: FloatT>(
        &mut self,
        domain_list: &[DomainHandle],
        afe_rows: &[usize],
        term_sizes: &[usize],
        domains: &DomainRegistry<T>,
        row_count: usize,
    ) -> Result<usize, ModelError> {
        if term_sizes.is_empty() {
            return Err(ModelError::EmptyDisjunction);
        }
        if let Some(t) = term_sizes.iter().position(|&n| n == 0) {
            return Err(ModelError::EmptyTerm(t));
        }
        let total: usize = term_sizes.iter().sum();
        if total != domain_list.len() {
            return Err(ModelError::DimensionMismatch {
                what: "disjunction term sizes",
                expected: domain_list.len(),
                found: total,
            });
        }

        let mut flat = Vec::with_capacity(domain_list.len());
        let mut offset = 0;
        for &handle in domain_list {
            let dim = domains
                .get(domains.resolve(handle)?)
                .map_or(0, |d| d.dim());
            let Some(rows) = afe_rows.get(offset..offset + dim) else {
                return Err(ModelError::DimensionMismatch {
                    what: "disjunction rows",
                    expected: offset + dim,
                    found: afe_rows.len(),
                });
            };
            flat.push(DomainMembership::new(handle, rows));
            offset += dim;
        }
        if offset != afe_rows.len() {
            return Err(ModelError::DimensionMismatch {
                what: "disjunction rows",
                expected: offset,
                found: afe_rows.len(),
            });
        }

        let mut it = flat.into_iter();
        let terms: Vec<Vec<DomainMembership>> = term_sizes
            .iter()
            .map(|&n| it.by_ref().take(n).collect())
            .collect();
        self.append(&terms, domains, row_count)
    }

    pub fn get(&self, i: usize) -> Result<&Djc, ModelError> {
        self.djcs
            .get(i)
            .ok_or(ModelError::UnknownHandle(HandleKind::Djc(i)))
    }

    pub fn len(&self) -> usize {
        self.counter.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Djc> {
        self.djcs.iter()
    }
}
