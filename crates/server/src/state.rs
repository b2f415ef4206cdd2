//! Shared learner handle.
//!
//! The learner is single-threaded; every request takes the mutex for the
//! whole operation so mutations never interleave.

use std::sync::{Arc, Mutex, MutexGuard};

use learner_core::{FileBackend, Learner, LearnerError};

use crate::config::Config;
use crate::error::AppError;

pub type SharedLearner = Arc<Mutex<Learner<FileBackend>>>;

/// Open the file-backed learner described by `config`.
///
/// Fails when the data file exists but cannot be read or parsed; the file is
/// left as it is.
pub fn open_learner(config: &Config) -> Result<SharedLearner, LearnerError> {
    let backend = FileBackend::new(&config.data_dir);
    let learner = Learner::open(backend, config.analyzer.clone())?;
    Ok(Arc::new(Mutex::new(learner)))
}

pub fn lock(learner: &SharedLearner) -> Result<MutexGuard<'_, Learner<FileBackend>>, AppError> {
    learner
        .lock()
        .map_err(|_| AppError::Internal("Learner lock poisoned".into()))
}
