//! # Bounded Toolkit Calls
//!
//! Toolkit operations are synchronous and may block. Each call runs on the
//! blocking pool and is abandoned after the configured timeout; the caller
//! sees [`ExchangeError::ToolkitTimeout`] instead of a hung request.

use std::sync::Arc;
use std::time::Duration;

use credex_core::ExchangeError;
use credex_vc::{DidToolkit, ToolkitError};

/// Runs toolkit operations off the async executor, under a time bound.
#[derive(Clone)]
pub struct ToolkitRunner {
    toolkit: Arc<dyn DidToolkit>,
    timeout: Duration,
}

impl ToolkitRunner {
    /// Wrap `toolkit`, bounding each call by `timeout`.
    pub fn new(toolkit: Arc<dyn DidToolkit>, timeout: Duration) -> Self {
        Self { toolkit, timeout }
    }

    /// Run `f` against the toolkit, leaving its own error for the caller to
    /// classify.
    ///
    /// # Errors
    ///
    /// [`ExchangeError::ToolkitTimeout`] if the call does not finish in time,
    /// [`ExchangeError::Internal`] if the blocking task panicked.
    pub async fn run<T, F>(
        &self,
        operation: &'static str,
        f: F,
    ) -> Result<Result<T, ToolkitError>, ExchangeError>
    where
        F: FnOnce(&dyn DidToolkit) -> Result<T, ToolkitError> + Send + 'static,
        T: Send + 'static,
    {
        let toolkit = Arc::clone(&self.toolkit);
        let task = tokio::task::spawn_blocking(move || f(toolkit.as_ref()));
        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(join)) => {
                tracing::error!(operation, error = %join, "toolkit task failed");
                Err(ExchangeError::Internal(format!(
                    "toolkit task '{operation}' failed"
                )))
            }
            Err(_) => {
                tracing::warn!(
                    operation,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "toolkit call timed out"
                );
                Err(ExchangeError::ToolkitTimeout { operation })
            }
        }
    }

    /// Run `f`, reporting a toolkit failure as [`ExchangeError::Toolkit`].
    pub async fn call<T, F>(&self, operation: &'static str, f: F) -> Result<T, ExchangeError>
    where
        F: FnOnce(&dyn DidToolkit) -> Result<T, ToolkitError> + Send + 'static,
        T: Send + 'static,
    {
        self.run(operation, f)
            .await?
            .map_err(|e| ExchangeError::Toolkit {
                operation,
                detail: e.to_string(),
            })
    }
}

impl std::fmt::Debug for ToolkitRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolkitRunner")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
