use crate::error::app_error::AppError;
use crate::models::timetable::Timetable;
use std::sync::RwLock;

/// Shared, replaceable reference schedule. Reads clone a consistent
/// snapshot; a replacement validates first and bumps the version so
/// clients can tell which edition they are looking at.
pub struct TimetableStore {
    inner: RwLock<Versioned>,
}

struct Versioned {
    timetable: Timetable,
    version: u64,
}

impl TimetableStore {
    pub fn with_default() -> Self {
        Self {
            inner: RwLock::new(Versioned {
                timetable: Timetable::default_reference(),
                version: 1,
            }),
        }
    }

    pub fn current(&self) -> (Timetable, u64) {
        let guard = self.inner.read().expect("timetable lock poisoned");
        (guard.timetable.clone(), guard.version)
    }

    /// Swaps in a new schedule. Rejected tables leave the current one
    /// untouched, version included.
    pub fn replace(&self, timetable: Timetable) -> Result<u64, AppError> {
        timetable.validate().map_err(AppError::BadRequest)?;

        let mut guard = self.inner.write().expect("timetable lock poisoned");
        guard.timetable = timetable;
        guard.version += 1;
        Ok(guard.version)
    }
}
