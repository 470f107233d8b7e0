//! Single bounded attempt against a provider.
//!
//! Each attempt runs on its own task behind an abort-on-drop handle, so a
//! timeout (or the caller going away) aborts it. Backends that own child
//! processes or audio sinks release them when their future is dropped.

use std::future::Future;
use std::time::{Duration, Instant};

use tokio_util::task::AbortOnDropHandle;
use tracing::{debug, warn};

use super::provider::ProviderId;
use crate::error::ProviderError;

/// Result of one provider attempt. Never stored, consumed by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationOutcome<T> {
    Success(T),
    Failure(String),
    Unavailable,
}

impl<T> InvocationOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Output that can be judged empty.
pub trait Deliverable {
    fn is_blank(&self) -> bool;
}

impl Deliverable for String {
    fn is_blank(&self) -> bool {
        self.trim().is_empty()
    }
}

impl Deliverable for () {
    fn is_blank(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BoundedInvoker {
    timeout: Duration,
}

impl BoundedInvoker {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Run `attempt` for `provider` under the timeout. Every fault, panics
    /// included, comes back as `Failure`.
    pub async fn invoke<T, F>(&self, provider: ProviderId, attempt: F) -> InvocationOutcome<T>
    where
        F: Future<Output = Result<T, ProviderError>> + Send + 'static,
        T: Deliverable + Send + 'static,
    {
        let started = Instant::now();
        let task = AbortOnDropHandle::new(tokio::spawn(attempt));

        let outcome = match tokio::time::timeout(self.timeout, task).await {
            Err(_) => InvocationOutcome::Failure("timeout".into()),
            Ok(Err(join_err)) if join_err.is_panic() => {
                InvocationOutcome::Failure("backend panicked".into())
            }
            Ok(Err(join_err)) => InvocationOutcome::Failure(format!("backend task failed: {join_err}")),
            Ok(Ok(Err(e))) => InvocationOutcome::Failure(e.to_string()),
            Ok(Ok(Ok(output))) if output.is_blank() => {
                InvocationOutcome::Failure(ProviderError::EmptyOutput.to_string())
            }
            Ok(Ok(Ok(output))) => InvocationOutcome::Success(output),
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &outcome {
            InvocationOutcome::Failure(reason) => {
                warn!(provider = provider.as_str(), elapsed_ms, reason = reason.as_str(), "provider attempt failed");
            }
            InvocationOutcome::Success(_) => {
                debug!(provider = provider.as_str(), elapsed_ms, "provider attempt succeeded");
            }
            InvocationOutcome::Unavailable => {
                debug!(provider = provider.as_str(), elapsed_ms, "provider unavailable");
            }
        }
        outcome
    }
}
