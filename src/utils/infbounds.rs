use crate::algebra::FloatT;
use crate::utils::atomic::{AtomicF64, Ordering};
use lazy_static::lazy_static;

pub(crate) const _INFINITY_DEFAULT: f64 = 1e20;

lazy_static! {
    static ref INFINITY: AtomicF64 = AtomicF64::new(_INFINITY_DEFAULT);
}

/// Revert the bound infinity threshold to its default value.
pub fn default_infinity() {
    INFINITY.store(_INFINITY_DEFAULT, Ordering::Relaxed);
}
/// Set the bound infinity threshold to a new value.
///
/// Bound values with magnitude at or above the threshold are treated as
/// ±∞ when passed to a variable or constraint bound.
pub fn set_infinity(v: f64) {
    INFINITY.store(v, Ordering::Relaxed);
}
/// Get the current bound infinity threshold.
pub fn get_infinity() -> f64 {
    INFINITY.load(Ordering::Relaxed)
}

// map values beyond the threshold to true ±∞
pub(crate) fn saturate_infinite<T: FloatT>(v: T) -> T {
    let inf = T::from_f64(get_infinity()).unwrap_or_else(T::infinity);
    if v >= inf {
        T::infinity()
    } else if v <= -inf {
        T::neg_infinity()
    } else {
        v
    }
}

#[test]
fn test_saturate_infinite() {
    assert_eq!(saturate_infinite(1e21_f64), f64::INFINITY);
    assert_eq!(saturate_infinite(-1e20_f64), f64::NEG_INFINITY);
    assert_eq!(saturate_infinite(3.0_f64), 3.0);
    assert_eq!(saturate_infinite(f64::NEG_INFINITY), f64::NEG_INFINITY);
}
