//! Tracing setup.
//!
//! One-shot runs log to stderr. The TUI owns the terminal, so there logs go
//! to a file through a non-blocking writer; keep the returned guard alive
//! until exit or buffered lines are lost.

use std::fs::{self, OpenOptions};
use std::path::Path;

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Request failures are shown by the printer, so they log below this.
const STDERR_DEFAULT: &str = "warn";

fn default_filter(default: &str) -> EnvFilter {
    EnvFilter::new(format!("{default},hyper=warn,reqwest=warn"))
}

fn filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(default))
}

fn stderr_subscriber<W>(filter: EnvFilter, writer: W, ansi: bool) -> impl tracing::Subscriber + Send + Sync
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(false)
        .compact()
        .finish()
}

pub fn init_stderr() {
    let ansi = std::io::stderr().is_terminal();
    let subscriber = stderr_subscriber(filter(STDERR_DEFAULT), std::io::stderr, ansi);
    let _ = tracing::subscriber::set_global_default(subscriber);
}

pub fn init_file(log_path: &Path) -> Result<WorkerGuard> {
    if let Some(dir) = log_path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("creating log dir {}", dir.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("opening log file {}", log_path.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter("info"))
        .with_writer(writer)
        .with_ansi(false)
        .try_init();

    tracing::info!(log_path = %log_path.display(), "logging initialized");
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::execution::surface::recording::RecordingSurface;
    use crate::execution::{
        Backend, ExecutionController, ExecutionRequest, ExecutionResult, Mode, Outcome, SubmitError,
    };

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Refused;

    #[async_trait]
    impl Backend for Refused {
        async fn submit(&self, _request: &ExecutionRequest) -> Result<ExecutionResult, SubmitError> {
            Err(SubmitError::Network("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn request_failure_is_not_repeated_on_stderr() {
        let captured = Captured::default();
        let sink = captured.clone();
        let subscriber = stderr_subscriber(default_filter(STDERR_DEFAULT), move || sink.clone(), false);
        let _default = tracing::subscriber::set_default(subscriber);

        let controller = ExecutionController::new(Refused);
        let mut surface = RecordingSurface::default();
        let outcome = controller.execute(Mode::Run, "int main(){}", &mut surface).await;
        tracing::warn!("still reaches stderr");

        assert_eq!(outcome, Outcome::NetworkError);
        assert_eq!(surface.last_output(), Some(("Network error: connection refused", true)));
        let logged = captured.text();
        assert!(!logged.contains("connection refused"), "logged: {logged}");
        assert!(logged.contains("still reaches stderr"));
    }

    #[test]
    fn ansi_follows_the_flag() {
        for ansi in [false, true] {
            let captured = Captured::default();
            let sink = captured.clone();
            let subscriber = stderr_subscriber(default_filter(STDERR_DEFAULT), move || sink.clone(), ansi);
            tracing::subscriber::with_default(subscriber, || tracing::warn!("piped"));

            let logged = captured.text();
            assert!(logged.contains("piped"));
            assert_eq!(logged.contains('\x1b'), ansi, "logged: {logged:?}");
        }
    }
}
