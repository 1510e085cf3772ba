use crate::algebra::*;
use derive_builder::Builder;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Error type returned by settings validation
pub enum SettingsError {
    /// An error attributable to one of the fields
    #[error("Bad value for field {0}")]
    BadFieldValue(&'static str),
}

/// Settings carried by a [`Model`](crate::model::Model) and handed to the
/// solver on every solve.

#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(build_fn(validate = "Self::validate"))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ModelSettings<T: FloatT> {
    ///verbose printing to the model print target
    #[builder(default = "false")]
    pub verbose: bool,

    ///worker threads the solver may use for this model.
    ///0 is treated as 1
    #[builder(default = "1")]
    pub num_threads: u32,

    ///maximum run time (seconds), passed to the solver
    #[builder(default = "f64::INFINITY")]
    pub time_limit: f64,

    ///maximum number of solver iterations
    #[builder(default = "400")]
    pub max_iter: u32,

    ///feasibility tolerance passed to the solver
    #[builder(default = "(1e-8).as_T()")]
    pub tol_feas: T,

    ///tolerance for testing domain membership at a point
    #[builder(default = "(1e-7).as_T()")]
    pub tol_membership: T,
}

impl<T> Default for ModelSettings<T>
where
    T: FloatT,
{
    fn default() -> ModelSettings<T> {
        ModelSettingsBuilder::<T>::default().build().unwrap()
    }
}

impl<T: FloatT> ModelSettings<T> {
    /// Checks that numerical values are within range.
    pub fn validate(&self) -> Result<(), SettingsError> {
        validate_time_limit(self.time_limit)?;
        validate_tolerance("tol_feas", self.tol_feas)?;
        validate_tolerance("tol_membership", self.tol_membership)?;
        Ok(())
    }

    /// worker threads requested from a batch thread budget
    pub fn requested_threads(&self) -> usize {
        usize::max(1, self.num_threads as usize)
    }
}

// pre build checker (for auto-validation when using the builder)

impl From<SettingsError> for ModelSettingsBuilderError {
    fn from(e: SettingsError) -> Self {
        ModelSettingsBuilderError::ValidationError(e.to_string())
    }
}

/// Automatic pre-build settings validation
impl<T> ModelSettingsBuilder<T>
where
    T: FloatT,
{
    pub fn validate(&self) -> Result<(), SettingsError> {
        if let Some(time_limit) = self.time_limit {
            validate_time_limit(time_limit)?;
        }
        if let Some(tol) = self.tol_feas {
            validate_tolerance("tol_feas", tol)?;
        }
        if let Some(tol) = self.tol_membership {
            validate_tolerance("tol_membership", tol)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------
// individual validation functions go here
// ---------------------------------------------------------

fn validate_time_limit(time_limit: f64) -> Result<(), SettingsError> {
    if time_limit.is_nan() || time_limit < 0.0 {
        return Err(SettingsError::BadFieldValue("time_limit"));
    }
    Ok(())
}

fn validate_tolerance<T: FloatT>(field: &'static str, tol: T) -> Result<(), SettingsError> {
    if !(tol > T::zero()) {
        return Err(SettingsError::BadFieldValue(field));
    }
    Ok(())
}

#[test]
fn test_settings_validate() {
    // all standard settings
    ModelSettingsBuilder::<f64>::default().build().unwrap();

    let s = ModelSettingsBuilder::<f64>::default()
        .num_threads(0)
        .build()
        .unwrap();
    assert_eq!(s.requested_threads(), 1);

    assert!(ModelSettingsBuilder::<f64>::default()
        .time_limit(-1.0)
        .build()
        .is_err());
    assert!(ModelSettingsBuilder::<f64>::default()
        .tol_membership(0.0)
        .build()
        .is_err());

    let mut s = ModelSettings::<f64>::default();
    s.tol_feas = f64::NAN;
    assert_eq!(s.validate(), Err(SettingsError::BadFieldValue("tol_feas")));
}
