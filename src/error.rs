/*!
 * Error Types
 * Typed failures surfaced by the container operations
 */

use std::fmt;
use thiserror::Error;

/// A push could not allocate its list node.
///
/// The rejected value is handed back so the caller decides what to do
/// with it; the containers never drop an element silently.
#[derive(Error, Clone, Copy, PartialEq, Eq)]
#[error("queue node allocation failed")]
pub struct PushError<T>(pub T);

impl<T> PushError<T> {
    /// Recover the value that could not be enqueued
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

// Manual impl so the error is debuggable without requiring T: Debug
impl<T> fmt::Debug for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PushError").finish()
    }
}
