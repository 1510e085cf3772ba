use super::{HandleKind, ModelError};
use crate::algebra::{symmetric, triangular_root, FloatT};
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of a model, used to scope domain handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelId(u64);

impl ModelId {
    pub(crate) fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        ModelId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// The cone a domain describes, with any shape parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DomainKind<T = f64> {
    /// ℝⁿ
    Real,
    /// {0}ⁿ
    Zero,
    /// ℝⁿ₊
    NonNegative,
    /// ℝⁿ₋
    NonPositive,
    /// x₀ ≥ ‖x₁..‖
    Quadratic,
    /// 2x₀x₁ ≥ ‖x₂..‖², x₀, x₁ ≥ 0
    RotatedQuadratic,
    /// x₀ ≥ x₁ exp(x₂/x₁), x₀, x₁ ≥ 0
    PrimalExponential,
    /// x₀ ≥ -x₂ exp(x₁/x₂ - 1), x₀ ≥ 0, x₂ ≤ 0
    DualExponential,
    /// ∏ xᵢ^αᵢ ≥ |x_last|, with normalized exponents α
    PrimalPower(Vec<T>),
    /// ∏ (xᵢ/αᵢ)^αᵢ ≥ |x_last|, with normalized exponents α
    DualPower(Vec<T>),
    /// scaled lower triangular vectorization of a PSD matrix
    SvecPsd,
}

impl<T> DomainKind<T> {
    pub fn name(&self) -> &'static str {
        match self {
            DomainKind::Real => "real",
            DomainKind::Zero => "zero",
            DomainKind::NonNegative => "nonnegative",
            DomainKind::NonPositive => "nonpositive",
            DomainKind::Quadratic => "quadratic",
            DomainKind::RotatedQuadratic => "rotated quadratic",
            DomainKind::PrimalExponential => "primal exponential",
            DomainKind::DualExponential => "dual exponential",
            DomainKind::PrimalPower(_) => "primal power",
            DomainKind::DualPower(_) => "dual power",
            DomainKind::SvecPsd => "svec psd",
        }
    }
}

/// A validated cone domain of fixed dimension.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Domain<T = f64> {
    kind: DomainKind<T>,
    dim: usize,
}

impl<T: FloatT> Domain<T> {
    /// Checks `dim` against the kind and normalizes power cone exponents
    /// to sum to one.
    pub fn new(kind: DomainKind<T>, dim: usize) -> Result<Self, ModelError> {
        let bad_dim = |kind: &DomainKind<T>| ModelError::InvalidDomainDimension {
            kind: kind.name(),
            dim,
        };

        let kind = match kind {
            DomainKind::Real
            | DomainKind::Zero
            | DomainKind::NonNegative
            | DomainKind::NonPositive
            | DomainKind::Quadratic => {
                if dim < 1 {
                    return Err(bad_dim(&kind));
                }
                kind
            }
            DomainKind::RotatedQuadratic => {
                if dim < 2 {
                    return Err(bad_dim(&kind));
                }
                kind
            }
            DomainKind::PrimalExponential | DomainKind::DualExponential => {
                if dim != 3 {
                    return Err(bad_dim(&kind));
                }
                kind
            }
            DomainKind::PrimalPower(alpha) => DomainKind::PrimalPower(normalize_exponents(&alpha, dim)?),
            DomainKind::DualPower(alpha) => DomainKind::DualPower(normalize_exponents(&alpha, dim)?),
            DomainKind::SvecPsd => {
                match triangular_root(dim) {
                    Some(k) if k >= 1 => {}
                    _ => return Err(bad_dim(&kind)),
                }
                kind
            }
        };
        Ok(Self { kind, dim })
    }

    pub fn kind(&self) -> &DomainKind<T> {
        &self.kind
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Tests whether `point` lies in the domain, allowing a violation of
    /// up to `tol`.  A point of the wrong length is never contained.
    pub fn contains(&self, point: &[T], tol: T) -> bool {
        if point.len() != self.dim {
            return false;
        }
        let x = point;

        match &self.kind {
            DomainKind::Real => true,
            DomainKind::Zero => x.iter().all(|v| v.abs() <= tol),
            DomainKind::NonNegative => x.iter().all(|&v| v >= -tol),
            DomainKind::NonPositive => x.iter().all(|&v| v <= tol),
            DomainKind::Quadratic => x[0] + tol >= norm(&x[1..]),
            DomainKind::RotatedQuadratic => {
                let two: T = T::one() + T::one();
                x[0] >= -tol && x[1] >= -tol && two * x[0] * x[1] + tol >= sumsq(&x[2..])
            }
            DomainKind::PrimalExponential => {
                if x[1] > tol {
                    x[0] + tol >= x[1] * (x[2] / x[1]).exp()
                } else {
                    x[1] >= -tol && x[0] >= -tol && x[2] <= tol
                }
            }
            DomainKind::DualExponential => {
                if x[2] < -tol {
                    x[0] + tol >= -x[2] * (x[1] / x[2] - T::one()).exp()
                } else {
                    x[2] <= tol && x[0] >= -tol && x[1] >= -tol
                }
            }
            DomainKind::PrimalPower(alpha) => {
                let (lhs, rhs) = x.split_at(alpha.len());
                lhs.iter().all(|&v| v >= -tol)
                    && power_mean(lhs, alpha, |v, _| v) + tol >= norm(rhs)
            }
            DomainKind::DualPower(alpha) => {
                let (lhs, rhs) = x.split_at(alpha.len());
                lhs.iter().all(|&v| v >= -tol)
                    && power_mean(lhs, alpha, |v, a| v / a) + tol >= norm(rhs)
            }
            DomainKind::SvecPsd => {
                let k = triangular_root(self.dim).unwrap_or(0);
                symmetric::is_psd(symmetric::svec_to_dense(x, k), k, tol)
            }
        }
    }
}

fn normalize_exponents<T: FloatT>(alpha: &[T], dim: usize) -> Result<Vec<T>, ModelError> {
    if dim < 2 {
        return Err(ModelError::InvalidDomainParameters(format!(
            "power cone dimension {} is less than 2",
            dim
        )));
    }
    if alpha.len() + 1 != dim {
        return Err(ModelError::InvalidDomainParameters(format!(
            "{} exponents given for a power cone of dimension {}",
            alpha.len(),
            dim
        )));
    }
    if let Some(a) = alpha.iter().find(|a| !(a.is_finite() && **a > T::zero())) {
        return Err(ModelError::InvalidDomainParameters(format!(
            "power cone exponent {} is not positive",
            a
        )));
    }
    let total = alpha.iter().fold(T::zero(), |acc, &a| acc + a);
    Ok(alpha.iter().map(|&a| a / total).collect())
}

fn sumsq<T: FloatT>(x: &[T]) -> T {
    x.iter().fold(T::zero(), |acc, &v| acc + v * v)
}

fn norm<T: FloatT>(x: &[T]) -> T {
    sumsq(x).sqrt()
}

// ∏ f(xᵢ,αᵢ)^αᵢ for xᵢ clipped at zero
fn power_mean<T: FloatT>(x: &[T], alpha: &[T], f: impl Fn(T, T) -> T) -> T {
    x.iter().zip(alpha).fold(T::one(), |acc, (&v, &a)| {
        acc * f(T::max(v, T::zero()), a).powf(a)
    })
}

/// A typed reference to a domain registered with one model.
///
/// Handles are only accepted by the model that created them, and by
/// clones taken after they were created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DomainHandle {
    owner: ModelId,
    index: usize,
}

impl DomainHandle {
    /// position of the domain within its model
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Domains of one model, addressed through [`DomainHandle`]s.
#[derive(Debug, Clone)]
pub(crate) struct DomainRegistry<T> {
    owner: ModelId,
    // (model id, domain count) of every model this one was cloned from,
    // taken at the time of the clone
    ancestors: Vec<(ModelId, usize)>,
    domains: Vec<Domain<T>>,
}

impl<T: FloatT> DomainRegistry<T> {
    pub fn new(owner: ModelId) -> Self {
        Self {
            owner,
            ancestors: Vec::new(),
            domains: Vec::new(),
        }
    }

    pub fn owner(&self) -> ModelId {
        self.owner
    }

    /// A copy of the registry owned by `new_owner`, still accepting the
    /// handles minted so far.
    pub fn fork(&self, new_owner: ModelId) -> Self {
        let mut ancestors = self.ancestors.clone();
        ancestors.push((self.owner, self.domains.len()));
        Self {
            owner: new_owner,
            ancestors,
            domains: self.domains.clone(),
        }
    }

    pub fn append(&mut self, domain: Domain<T>) -> DomainHandle {
        self.domains.push(domain);
        DomainHandle {
            owner: self.owner,
            index: self.domains.len() - 1,
        }
    }

    /// Maps a handle to its index in this registry.
    pub fn resolve(&self, handle: DomainHandle) -> Result<usize, ModelError> {
        let valid = if handle.owner == self.owner {
            handle.index < self.domains.len()
        } else {
            self.ancestors
                .iter()
                .any(|&(id, count)| id == handle.owner && handle.index < count)
        };
        if valid {
            Ok(handle.index)
        } else {
            Err(ModelError::UnknownHandle(HandleKind::Domain(handle.index)))
        }
    }

    pub fn get(&self, index: usize) -> Option<&Domain<T>> {
        self.domains.get(index)
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Domain<T>> {
        self.domains.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_domain_validation() {
        let d = Domain::new(DomainKind::PrimalPower(vec![1.0, 3.0]), 3).unwrap();
        assert_eq!(d.kind(), &DomainKind::PrimalPower(vec![0.25, 0.75]));

        for (alpha, dim) in [
            (vec![0.5, 0.5], 4),
            (vec![0.5], 1),
            (vec![0.0, 1.0], 3),
            (vec![-1.0, 2.0], 3),
            (vec![f64::NAN, 1.0], 3),
        ] {
            assert!(matches!(
                Domain::new(DomainKind::DualPower(alpha), dim),
                Err(ModelError::InvalidDomainParameters(_))
            ));
        }
    }

    #[test]
    fn test_domain_dimensions() {
        assert!(Domain::<f64>::new(DomainKind::SvecPsd, 6).is_ok());
        assert_eq!(
            Domain::<f64>::new(DomainKind::SvecPsd, 4),
            Err(ModelError::InvalidDomainDimension {
                kind: "svec psd",
                dim: 4
            })
        );
        assert!(Domain::<f64>::new(DomainKind::SvecPsd, 0).is_err());
        assert!(Domain::<f64>::new(DomainKind::PrimalExponential, 4).is_err());
        assert!(Domain::<f64>::new(DomainKind::RotatedQuadratic, 1).is_err());
        assert!(Domain::<f64>::new(DomainKind::Zero, 0).is_err());
    }

    #[test]
    fn test_domain_membership() {
        let tol = 1e-9;
        let q = Domain::new(DomainKind::Quadratic, 3).unwrap();
        assert!(q.contains(&[5.0, 3.0, 4.0], tol));
        assert!(!q.contains(&[4.9, 3.0, 4.0], tol));
        assert!(!q.contains(&[5.0, 3.0], tol));

        let r = Domain::new(DomainKind::RotatedQuadratic, 3).unwrap();
        assert!(r.contains(&[1.0, 2.0, 2.0], tol));
        assert!(!r.contains(&[-1.0, -2.0, 0.0], tol));

        let e = Domain::new(DomainKind::PrimalExponential, 3).unwrap();
        assert!(e.contains(&[std::f64::consts::E, 1.0, 1.0], 1e-12));
        assert!(!e.contains(&[2.7, 1.0, 1.0], tol));
        assert!(e.contains(&[1.0, 0.0, -3.0], tol));

        let de = Domain::new(DomainKind::DualExponential, 3).unwrap();
        assert!(de.contains(&[1.0, 1.0, -1.0], tol));
        assert!(!de.contains(&[0.1, 1.0, -1.0], tol));

        let p = Domain::new(DomainKind::PrimalPower(vec![0.5, 0.5]), 3).unwrap();
        assert!(p.contains(&[4.0, 1.0, -2.0], tol));
        assert!(!p.contains(&[4.0, 1.0, 2.5], tol));

        let dp = Domain::new(DomainKind::DualPower(vec![0.5, 0.5]), 3).unwrap();
        assert!(dp.contains(&[1.0, 1.0, 2.0], tol));
        assert!(!dp.contains(&[1.0, 1.0, 2.1], tol));

        // svec of [1 1; 1 1] is PSD, [1 2; 2 1] is not
        let s2 = std::f64::consts::SQRT_2;
        let s = Domain::new(DomainKind::SvecPsd, 3).unwrap();
        assert!(s.contains(&[1.0, s2, 1.0], 1e-9));
        assert!(!s.contains(&[1.0, 2.0 * s2, 1.0], 1e-9));
    }

    #[test]
    fn test_registry_scoping() {
        let mut reg = DomainRegistry::<f64>::new(ModelId::next());
        let h0 = reg.append(Domain::new(DomainKind::Zero, 2).unwrap());

        let mut other = DomainRegistry::<f64>::new(ModelId::next());
        assert_eq!(
            other.resolve(h0),
            Err(ModelError::UnknownHandle(HandleKind::Domain(0)))
        );

        let mut fork = reg.fork(ModelId::next());
        assert_eq!(fork.resolve(h0), Ok(0));

        // handles minted after the fork belong to one side only
        let h1 = reg.append(Domain::new(DomainKind::Real, 1).unwrap());
        assert!(fork.resolve(h1).is_err());
        let f1 = fork.append(Domain::new(DomainKind::Real, 1).unwrap());
        assert!(reg.resolve(f1).is_err());
        assert!(other.resolve(f1).is_err());
        let _ = other.append(Domain::new(DomainKind::Real, 1).unwrap());
    }
}
