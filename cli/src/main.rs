//! lyapviz CLI - Binary entry point and terminal session management.
//!
//! # Architecture
//!
//! The CLI checks the configured system with [`lyapviz_engine`], prints the
//! verdict, then hands a [`Session`] to [`lyapviz_tui`] for the interactive
//! surface view.
//!
//! ```text
//! main() -> load config -> LyapunovProblem::verify() -> print report
//!                               |
//!                               v
//!            TerminalSession::new() -> run_app() -> draw + handle_events
//! ```
//!
//! # Event Loop
//!
//! The loop is single threaded: render a frame, block until input arrives
//! (or the poll times out), apply every queued event, repeat until quit.

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::{
    fs::{self, OpenOptions},
    io::{Stdout, stdout},
    path::PathBuf,
    sync::Mutex,
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use lyapviz_config::{ConfigError, LyapvizConfig, VisualizerConfig};
use lyapviz_engine::{GridSpec, LyapunovProblem, Session};
use lyapviz_tui::{draw, handle_events};

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (log_file, init_warnings) = open_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // If we can't open a log file, prefer "no logs" over corrupting the TUI
    // by writing to stdout/stderr.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_log_file() -> (Option<(PathBuf, std::fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: ~/.lyapviz/logs/lyapviz.log
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".lyapviz").join("logs").join("lyapviz.log"));
    }

    // Fallback: ./.lyapviz/logs/lyapviz.log (useful in constrained environments)
    candidates.push(PathBuf::from(".lyapviz").join("logs").join("lyapviz.log"));

    candidates
}

fn load_config() -> LyapvizConfig {
    match LyapvizConfig::load() {
        Ok(Some(config)) => config,
        Ok(None) => LyapvizConfig::default(),
        Err(err) => {
            report_config_error(&err);
            LyapvizConfig::default()
        }
    }
}

fn report_config_error(err: &ConfigError) {
    eprintln!("Warning: {err}; using built-in defaults");
    tracing::warn!(path = %err.path().display(), "Falling back to default config");
}

fn visualizer_grid(config: &VisualizerConfig) -> Result<GridSpec> {
    match GridSpec::new(config.limit, config.resolution) {
        Ok(spec) => Ok(spec),
        Err(err) => {
            tracing::warn!(%err, "Invalid visualizer grid, using defaults");
            let fallback = VisualizerConfig::default();
            GridSpec::new(fallback.limit, fallback.resolution).context("default visualizer grid")
        }
    }
}

/// RAII wrapper for terminal state with guaranteed cleanup on drop.
///
/// Manages raw mode, bracketed paste and the alternate screen. On drop, all
/// terminal state is restored, even after panics or early returns.
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self> {
        enable_raw_mode()?;

        let mut out = stdout();
        if let Err(err) = execute!(out, EnterAlternateScreen, EnableBracketedPaste) {
            let _ = disable_raw_mode();
            let _ = execute!(out, DisableBracketedPaste, LeaveAlternateScreen);
            return Err(err.into());
        }

        let terminal = match Terminal::new(CrosstermBackend::new(out)) {
            Ok(t) => t,
            Err(err) => {
                let _ = disable_raw_mode();
                let _ = execute!(stdout(), DisableBracketedPaste, LeaveAlternateScreen);
                return Err(err.into());
            }
        };

        Ok(Self { terminal })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            DisableBracketedPaste,
            LeaveAlternateScreen
        );
        let _ = self.terminal.show_cursor();
    }
}

fn main() -> Result<()> {
    init_tracing();

    let config = load_config();
    let system = &config.system;
    let problem = LyapunovProblem::parse(&system.f1, &system.f2, &system.v, &system.variables)
        .context("cannot check the configured system")?;

    let verifier = &config.verifier;
    let status = match GridSpec::new(verifier.domain_limit, verifier.num_points) {
        Ok(spec) => {
            let verdict = problem.verify(&spec);
            println!("{}", verdict.report());
            verdict.summary()
        }
        Err(err) => {
            eprintln!("Verification skipped: invalid grid: {err}");
            tracing::warn!(%err, "Verification skipped");
            format!("verification skipped: {err}")
        }
    };

    let spec = visualizer_grid(&config.visualizer)?;
    let mut session = Session::new(problem.v(), problem.vdot(), problem.vars().clone(), spec)
        .with_status(status)
        .with_options(config.app.ui_options());

    let result = {
        let mut terminal = TerminalSession::new()?;
        run_app(&mut terminal.terminal, &mut session)
    };

    if let Err(err) = &result {
        tracing::error!(error = ?err, "Visualizer exited with an error");
    }
    result
}

fn run_app<B>(terminal: &mut Terminal<B>, session: &mut Session) -> Result<()>
where
    B: Backend,
    B::Error: Send + Sync + 'static,
{
    loop {
        terminal.draw(|frame| draw(frame, session))?;
        if handle_events(session)? {
            return Ok(());
        }
    }
}
