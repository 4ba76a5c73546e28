//! Lifecycle of one user-triggered execution request.
//!
//! `Idle --execute()--> Busy --(settled)--> Idle`. The return to `Idle` is
//! owned by [`BusyGuard`], so it happens on every exit path, including when
//! the caller drops the future while the request is still in flight.

use std::sync::atomic::{AtomicBool, Ordering};

use super::{
    Backend, BusySurface, EmptyInput, ExecutionRequest, Mode, OutputSurface, SubmitError,
    PROCESSING_MESSAGE,
};

/// Which exit path `execute` took. Everything it describes has already been
/// rendered to the output surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Trimmed input was empty; no request was made.
    Rejected,
    /// Another request was still in flight.
    Skipped,
    Succeeded,
    /// Service answered with `success: false`.
    Failed,
    TransportError { status: u16 },
    NetworkError,
}

impl Outcome {
    pub fn is_success(self) -> bool {
        matches!(self, Outcome::Succeeded)
    }
}

#[derive(Debug)]
pub struct ExecutionController<B> {
    backend: B,
    in_flight: AtomicBool,
}

impl<B: Backend> ExecutionController<B> {
    pub fn new(backend: B) -> Self {
        Self { backend, in_flight: AtomicBool::new(false) }
    }

    #[cfg(test)]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[cfg(test)]
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub async fn execute<S>(&self, mode: Mode, raw_input: &str, surface: &mut S) -> Outcome
    where
        S: OutputSurface + BusySurface + Send,
    {
        let code = raw_input.trim();
        if code.is_empty() {
            surface.show_output(&EmptyInput { mode }.to_string(), true);
            return Outcome::Rejected;
        }

        let Some(mut guard) = BusyGuard::acquire(&self.in_flight, surface) else {
            tracing::warn!(%mode, "execution already in flight, ignoring trigger");
            return Outcome::Skipped;
        };
        guard.surface().show_output(PROCESSING_MESSAGE, false);

        let request = ExecutionRequest::new(code, mode);
        tracing::info!(%mode, bytes = request.code.len(), "submitting code");

        let outcome = match self.backend.submit(&request).await {
            Ok(result) => {
                let (text, is_error) = result.display_text();
                guard.surface().show_output(text, is_error);
                if result.success {
                    Outcome::Succeeded
                } else {
                    Outcome::Failed
                }
            }
            Err(err) => {
                tracing::debug!(%mode, error = %err, "execution request failed");
                guard.surface().show_output(&err.to_string(), true);
                match err {
                    SubmitError::Transport { status } => Outcome::TransportError { status },
                    SubmitError::Network(_) => Outcome::NetworkError,
                }
            }
        };

        drop(guard);
        tracing::info!(%mode, ?outcome, "execution settled");
        outcome
    }
}

/// Holds the busy state. Dropping it re-enables the controls and clears the
/// in-flight flag, once.
struct BusyGuard<'a, S: BusySurface> {
    flag: &'a AtomicBool,
    surface: &'a mut S,
}

impl<'a, S: BusySurface> BusyGuard<'a, S> {
    fn acquire(flag: &'a AtomicBool, surface: &'a mut S) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        surface.set_controls_enabled(false);
        Some(Self { flag, surface })
    }

    fn surface(&mut self) -> &mut S {
        &mut *self.surface
    }
}

impl<S: BusySurface> Drop for BusyGuard<'_, S> {
    fn drop(&mut self) {
        self.surface.set_controls_enabled(true);
        self.flag.store(false, Ordering::Release);
    }
}
