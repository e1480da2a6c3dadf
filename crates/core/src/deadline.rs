//! Optional time limit for external calls (index search, model completion).

use crate::error::{AppError, AppResult};
use std::future::Future;
use std::time::Duration;

/// A caller-supplied limit. `Deadline::none()` waits indefinitely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Deadline(Option<Duration>);

impl Deadline {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn after(limit: Duration) -> Self {
        Self(Some(limit))
    }

    /// Build from the `synthesis.deadlineSecs` setting.
    pub fn from_secs(secs: Option<u64>) -> Self {
        Self(secs.map(Duration::from_secs))
    }

    pub fn limit(&self) -> Option<Duration> {
        self.0
    }

    /// Await `fut`, converting an elapsed limit into the error built by `on_timeout`.
    pub async fn run<F, T>(
        &self,
        fut: F,
        on_timeout: impl FnOnce(Duration) -> AppError,
    ) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        match self.0 {
            None => fut.await,
            Some(limit) => match tokio::time::timeout(limit, fut).await {
                Ok(result) => result,
                Err(_) => Err(on_timeout(limit)),
            },
        }
    }
}
