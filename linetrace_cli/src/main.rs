mod backend;
mod cli;
mod commands;
mod error_fmt;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::{Result, WrapErr};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use crate::commands::RunCtx;
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    let _ = color_eyre::install();

    let cfg = load_config(&cli.config);
    let logging = cfg.as_ref().ok().map(|c| &c.logging);
    if let Err(e) = init_tracing(&cli, logging) {
        eprintln!("logging disabled: {e}");
    }

    let result = cfg.and_then(|cfg| run(&cli, &cfg));
    if let Err(err) = result {
        tracing::error!(error = ?err, "command failed");
        if JSON_MODE.get().copied().unwrap_or(false) {
            println!("{}", format_error_json(&err));
        } else {
            eprintln!("{}", humanize(&err));
        }
        std::process::exit(exit_code_for_error(&err));
    }
}

fn load_config(path: &Path) -> Result<linetrace_config::Config> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read config {}", path.display()))?;
    let cfg = linetrace_config::load_toml(&text).wrap_err("parse config")?;
    cfg.validate().wrap_err("invalid configuration")?;
    Ok(cfg)
}

fn init_tracing(cli: &Cli, logging: Option<&linetrace_config::Logging>) -> Result<()> {
    let level = cli
        .log_level
        .clone()
        .or_else(|| logging.and_then(|l| l.level.clone()))
        .unwrap_or_else(|| "info".to_string());
    let filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::try_new(&level)?,
    };

    // stdout carries command output; logs go to stderr.
    let console = if cli.json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer().with_writer(std::io::stderr).boxed()
    };

    let file = match logging.and_then(|l| l.file.as_deref()) {
        Some(path) => {
            let path = Path::new(path);
            let dir = path.parent().filter(|d| !d.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let name = path.file_name().unwrap_or(path.as_os_str());
            let appender = match logging.and_then(|l| l.rotation.as_deref()) {
                Some("daily") => tracing_appender::rolling::daily(dir, name),
                Some("hourly") => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            Some(fmt::layer().json().with_ansi(false).with_writer(writer).boxed())
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()?;
    Ok(())
}

fn run(cli: &Cli, cfg: &linetrace_config::Config) -> Result<()> {
    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        ctrlc::set_handler(move || {
            stop.store(true, Ordering::Relaxed);
        })
        .wrap_err("install Ctrl-C handler")?;
    }

    let backend = backend::open(cfg, cli.trace.as_deref())?;
    let ctx = RunCtx {
        cfg,
        json: cli.json,
        samples: cli.samples,
        stop: &stop,
    };
    tracing::info!(command = ?cli.cmd, backend = backend.name(), "start");

    match &cli.cmd {
        Commands::Calibrate { passes } => commands::run_calibrate(&ctx, backend, *passes),
        Commands::Read { count, calibrated } => {
            commands::run_read(&ctx, backend, *count, *calibrated)
        }
        Commands::Track {
            reads,
            line_at,
            sweep,
        } => commands::run_track(&ctx, backend, *reads, *line_at, *sweep),
        Commands::SelfCheck => commands::run_self_check(&ctx, backend),
    }
}
