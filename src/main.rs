mod cli;
mod config;
mod execution;
mod input;
mod logging;
mod prefs;
mod printer;
mod tui;

use std::io::{self, Read};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use config::Config;
use execution::{ExecutionController, HttpBackend, Mode};
use is_terminal::IsTerminal;
use prefs::Prefs;
use printer::TextPrinter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = cli::Cli::parse();

    // Load config, then let flags override it
    let mut cfg = Config::load();
    if let Some(url) = &args.backend_url {
        cfg.set("BACKEND_URL", url.clone());
    }
    if let Some(secs) = args.timeout {
        cfg.set("REQUEST_TIMEOUT", secs.to_string());
    }

    if args.init_config {
        config::write_default_rc(&cfg.config_path)?;
        println!("Wrote {}", cfg.config_path.display());
        return Ok(ExitCode::SUCCESS);
    }

    // stdin handling (pipe support)
    let stdin_is_tty = io::stdin().is_terminal();
    let mut code_from_stdin = String::new();
    if !stdin_is_tty && args.code.is_none() && args.file.is_none() {
        io::stdin().read_to_string(&mut code_from_stdin)?;
    }

    // Resolve code: positional, then --file, then stdin
    let code = match (&args.code, &args.file) {
        (Some(code), _) => Some(code.clone()),
        (None, Some(path)) => Some(
            input::load_text_file(path).map_err(|e| anyhow!("Could not load input: {}", e))?,
        ),
        (None, None) if !code_from_stdin.is_empty() => Some(code_from_stdin),
        (None, None) => None,
    };

    let mode = if args.debug { Mode::Compile } else { Mode::Run };
    let backend = HttpBackend::from_config(&cfg)?;
    let backend_url = backend.endpoint().to_string();
    let controller = Arc::new(ExecutionController::new(backend));

    let interactive = io::stdout().is_terminal() && (args.tui || (code.is_none() && stdin_is_tty));
    if interactive {
        let _guard = logging::init_file(&cfg.log_path())?;
        tracing::info!(backend = %backend_url, "starting editor");
        tui::run_tui(controller, Prefs::from_config(&cfg), backend_url, code).await?;
        return Ok(ExitCode::SUCCESS);
    }

    logging::init_stderr();
    let mut printer = TextPrinter::stdio(cfg.get("DEFAULT_COLOR"), io::stdout().is_terminal());
    let outcome = controller
        .execute(mode, code.as_deref().unwrap_or_default(), &mut printer)
        .await;

    Ok(if outcome.is_success() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
