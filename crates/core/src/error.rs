use thiserror::Error;

use crate::model::StatsError;
use crate::scheduler::{SchedulerError, SettingsError};

/// Umbrella error for embedders that want a single core error type.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Stats(#[from] StatsError),
}
