//! mpvctl - play files through libmpv and report what the engine does.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use mpvctl::event::EndFileReason;
use mpvctl::{Config, Event, EventId, EventPayload, Flow, Handle, LogLevel, LoopOptions};

/// Exits with 1 on setup errors and 2 when the engine rejected a request.
#[derive(Parser)]
#[command(name = "mpvctl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.config/mpvctl/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to libmpv
    #[arg(long)]
    library: Option<PathBuf>,

    /// Pre-init option as NAME=VALUE (repeatable)
    #[arg(short = 'o', long = "option", value_parser = parse_option)]
    options: Vec<(String, String)>,

    /// Property to observe and log (repeatable)
    #[arg(long)]
    observe: Vec<String>,

    /// Minimum engine log level to forward (no, fatal, error, warn, info, v, debug, trace)
    #[arg(long)]
    log_level: Option<LogLevel>,

    /// Seconds to wait per event before re-polling
    #[arg(long)]
    timeout: Option<f64>,

    /// Files or URLs to play, in order
    #[arg(required = true)]
    files: Vec<String>,
}

fn parse_option(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got {s:?}"))?;
    if name.is_empty() {
        return Err("option name is empty".to_string());
    }
    Ok((name.to_string(), value.to_string()))
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            match e.code() {
                Some(_) => ExitCode::from(2),
                None => ExitCode::FAILURE,
            }
        }
    }
}

fn run(cli: Cli) -> mpvctl::Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if cli.library.is_some() {
        config.library = cli.library;
    }
    for (name, value) in cli.options {
        config.set_option(name, value);
    }
    config.observe.extend(cli.observe);
    if cli.log_level.is_some() {
        config.log_level = cli.log_level;
    }
    if cli.timeout.is_some() {
        config.wait_timeout_secs = cli.timeout;
    }

    let mut mpv = Handle::open(&config)?;
    log::info!(
        "Starting mpvctl as '{}' with {} file(s)",
        mpv.client_name()?,
        cli.files.len()
    );

    for name in &config.observe {
        let prop = name.clone();
        mpv.observe_property(name, move |ev| {
            if let Some(change) = ev.property() {
                log::info!(
                    "{} = {}",
                    prop,
                    change.value.as_deref().unwrap_or("<unavailable>")
                );
            }
            Ok(Flow::Continue)
        })?;
    }

    mpv.register_event("log-message", |ev| {
        forward_log(ev);
        Ok(Flow::Continue)
    })?;
    mpv.register_event("end-file", |ev| {
        if let EventPayload::EndFile(end) = &ev.payload {
            match (end.reason, end.error) {
                (EndFileReason::Error, Some(code)) => log::warn!("Playback failed: {}", code),
                (reason, _) => log::info!("Playback ended: {:?}", reason),
            }
        }
        Ok(Flow::Continue)
    })?;

    for (i, file) in cli.files.iter().enumerate() {
        let mode = if i == 0 { "replace" } else { "append-play" };
        let target = file.clone();
        mpv.command_async(&["loadfile", file.as_str(), mode], move |ev| {
            match ev.error {
                Some(code) => log::warn!("Could not queue {}: {}", target, code),
                None => log::debug!("Queued {}", target),
            }
            Ok(Flow::Continue)
        })?;
    }

    let options = LoopOptions {
        timeout: config.wait_timeout(),
        raise_on_error: false,
    };
    let mut started = false;
    let mut finished = false;
    while !finished {
        let result = mpv.each_event(options, |ev| {
            match ev.id {
                EventId::StartFile => started = true,
                EventId::Idle if started => {
                    log::info!("Playlist finished");
                    finished = true;
                    return Ok(Flow::Stop);
                }
                EventId::Shutdown => {
                    log::info!("Engine shut down");
                    finished = true;
                    return Ok(Flow::Stop);
                }
                _ => log::debug!("event: {}", ev.id),
            }
            Ok(Flow::Continue)
        });
        match result {
            Err(e) if e.is_recoverable() => log::warn!("{}", e),
            other => other?,
        }
    }

    mpv.close();
    Ok(())
}

fn forward_log(ev: &Event) {
    if let Some(msg) = ev.log_message()
        && let Some(level) = msg.level.to_log_level()
    {
        log::log!(target: "mpv", level, "[{}] {}", msg.prefix, msg.text);
    }
}
