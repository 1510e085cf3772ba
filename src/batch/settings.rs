use crate::model::SettingsError;
use derive_builder::Builder;
use std::time::Duration;

fn default_pool_size() -> usize {
    std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1)
}

/// Policy for one [`solve_batch`](super::BatchScheduler::solve_batch) run.

#[derive(Builder, Debug, Clone, PartialEq, Eq)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct BatchSettings {
    ///total worker threads shared by all models of the batch
    #[builder(default = "default_pool_size()")]
    pub thread_pool_size: usize,

    ///cancel every other model once one finishes conclusively
    #[builder(default = "false")]
    pub race: bool,

    ///wall clock limit for the whole batch.  `None` is unbounded,
    ///a zero duration starts nothing
    #[builder(default = "None")]
    pub time_limit: Option<Duration>,
}

impl Default for BatchSettings {
    fn default() -> BatchSettings {
        BatchSettingsBuilder::default().build().unwrap()
    }
}

impl BatchSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        validate_thread_pool_size(self.thread_pool_size)
    }
}

impl From<SettingsError> for BatchSettingsBuilderError {
    fn from(e: SettingsError) -> Self {
        BatchSettingsBuilderError::ValidationError(e.to_string())
    }
}

/// Automatic pre-build settings validation
impl BatchSettingsBuilder {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if let Some(size) = self.thread_pool_size {
            validate_thread_pool_size(size)?;
        }
        Ok(())
    }
}

fn validate_thread_pool_size(size: usize) -> Result<(), SettingsError> {
    if size == 0 {
        return Err(SettingsError::BadFieldValue("thread_pool_size"));
    }
    Ok(())
}

#[test]
fn test_batch_settings() {
    let s = BatchSettings::default();
    assert!(s.thread_pool_size >= 1);
    assert!(!s.race);
    assert_eq!(s.time_limit, None);

    let s = BatchSettingsBuilder::default()
        .thread_pool_size(3)
        .race(true)
        .time_limit(Some(Duration::from_millis(20)))
        .build()
        .unwrap();
    assert_eq!(s.thread_pool_size, 3);

    assert!(BatchSettingsBuilder::default()
        .thread_pool_size(0)
        .build()
        .is_err());
}
