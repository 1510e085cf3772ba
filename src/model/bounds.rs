use super::ModelError;
use crate::algebra::FloatT;
use crate::utils::infbounds::saturate_infinite;

/// Bound kind of a variable or linear constraint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoundKey {
    /// -∞ ≤ x ≤ +∞
    #[default]
    Free,
    /// x = l
    Fixed,
    /// l ≤ x
    Lower,
    /// x ≤ u
    Upper,
    /// l ≤ x ≤ u
    Range,
}

impl std::fmt::Display for BoundKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A bound key together with its (normalized) lower and upper values.
///
/// Values whose magnitude is at or beyond the current
/// [infinity threshold](crate::get_infinity) are stored as ±∞.  Ends not
/// used by the key are stored as ±∞ as well.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bound<T = f64> {
    pub key: BoundKey,
    pub lower: T,
    pub upper: T,
}

impl<T: FloatT> Default for Bound<T> {
    fn default() -> Self {
        Self::free()
    }
}

impl<T: FloatT> Bound<T> {
    pub fn free() -> Self {
        Self {
            key: BoundKey::Free,
            lower: T::neg_infinity(),
            upper: T::infinity(),
        }
    }

    /// Builds a checked bound.  Fails with [`ModelError::InvalidBounds`]
    /// for NaN values, an infinite fixed value, or a range with
    /// `lower > upper`.
    pub fn new(key: BoundKey, lower: T, upper: T) -> Result<Self, ModelError> {
        let invalid = || ModelError::InvalidBounds {
            lower: lower.to_f64().unwrap_or(f64::NAN),
            upper: upper.to_f64().unwrap_or(f64::NAN),
        };

        let lo = saturate_infinite(lower);
        let up = saturate_infinite(upper);

        let (lo, up) = match key {
            BoundKey::Free => (T::neg_infinity(), T::infinity()),
            BoundKey::Fixed => {
                if !lo.is_finite() {
                    return Err(invalid());
                }
                (lo, lo)
            }
            BoundKey::Lower => {
                if lo.is_nan() || lo == T::infinity() {
                    return Err(invalid());
                }
                (lo, T::infinity())
            }
            BoundKey::Upper => {
                if up.is_nan() || up == T::neg_infinity() {
                    return Err(invalid());
                }
                (T::neg_infinity(), up)
            }
            BoundKey::Range => {
                if lo.is_nan() || up.is_nan() || lo > up {
                    return Err(invalid());
                }
                (lo, up)
            }
        };

        Ok(Self {
            key,
            lower: lo,
            upper: up,
        })
    }

    /// true if `v` lies within the bound, allowing a slack of `tol`
    pub fn contains(&self, v: T, tol: T) -> bool {
        v >= self.lower - tol && v <= self.upper + tol
    }
}

#[test]
fn test_bound_normalization() {
    let b = Bound::new(BoundKey::Lower, 1.0, 7.0).unwrap();
    assert_eq!(b.upper, f64::INFINITY);
    assert_eq!(b.lower, 1.0);

    let b = Bound::new(BoundKey::Fixed, 2.5, -100.0).unwrap();
    assert_eq!((b.lower, b.upper), (2.5, 2.5));

    let b = Bound::new(BoundKey::Range, -1e30, 4.0).unwrap();
    assert_eq!(b.lower, f64::NEG_INFINITY);
    assert!(b.contains(-1e40, 0.0));
    assert!(!b.contains(4.1, 1e-3));

    let b: Bound = Bound::new(BoundKey::Free, 1.0, 0.0).unwrap();
    assert_eq!(b, Bound::free());
}

#[test]
fn test_bound_rejects() {
    assert!(matches!(
        Bound::new(BoundKey::Range, 2.0, 1.0),
        Err(ModelError::InvalidBounds { .. })
    ));
    assert!(Bound::new(BoundKey::Fixed, f64::INFINITY, 0.0).is_err());
    assert!(Bound::new(BoundKey::Lower, f64::NAN, 0.0).is_err());
    assert!(Bound::new(BoundKey::Upper, 0.0, -1e25).is_err());
}
