//! Scalar and small vector types shared by the model layer.
//!
//! The model never assembles a dense
//! matrix; the only vector type exposed is [`SparseVector`], returned when
//! materializing a single affine row for inspection.

mod floats;
mod scalarmath;
mod sparsevector;
pub(crate) mod symmetric;

pub use floats::*;
pub(crate) use scalarmath::*;
pub use sparsevector::*;
