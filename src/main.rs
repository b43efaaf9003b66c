//! cursor-momentum - Inertial cursor glide
//!
//! Entry point for the binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use cursor_momentum::config::{Config, InputSource};
use cursor_momentum::host::{
    self, HostRunner, MonotonicClock, PathWriter, Simulation, EVENT_CHANNEL_CAPACITY,
};
use cursor_momentum::momentum::MomentumEngine;
use cursor_momentum::pointer::VirtualPointer;

/// Command-line arguments for cursor-momentum
#[derive(Parser, Debug)]
#[command(name = "cursor-momentum")]
#[command(version, about = "Inertial cursor glide", long_about = None)]
struct Args {
    /// Configuration file path (default: <config_dir>/cursor-momentum/config.toml)
    #[arg(short, long, global = true, env = "CURSOR_MOMENTUM_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose logging (can be specified multiple times)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log format (json|pretty|compact)
    #[arg(long, global = true, value_parser = ["json", "pretty", "compact"])]
    log_format: Option<String>,

    /// Write logs to file (in addition to stderr)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the live glide loop (default)
    Run {
        /// Motion source (stdin|trace)
        #[arg(short, long)]
        source: Option<InputSource>,

        /// Replay this JSON-lines trace (implies --source trace)
        #[arg(short, long)]
        trace: Option<PathBuf>,

        /// Write the pointer path here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replay a trace on a virtual clock and print the resulting path
    Simulate {
        /// JSON-lines trace (default: input.trace_path)
        #[arg(short, long)]
        trace: Option<PathBuf>,

        /// Virtual time per host loop iteration while gliding
        #[arg(long, default_value_t = 1000)]
        iteration_us: u64,

        /// Write the pointer path here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Where the configuration came from
enum ConfigOrigin {
    File(PathBuf),
    Defaults(PathBuf),
}

fn main() -> Result<()> {
    let args = Args::parse();
    let command = args.command.unwrap_or(Command::Run {
        source: None,
        trace: None,
        output: None,
    });

    let (config, origin) = match prepare_config(args.config.as_deref(), &command) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("{}", cursor_momentum::utils::format_user_error(&e));
            return Err(e);
        }
    };

    let _log_guard = init_logging(
        args.log_format.as_deref(),
        args.log_file.as_deref(),
        args.verbose,
        &config,
    )?;

    info!("════════════════════════════════════════════════════════");
    info!("  cursor-momentum v{}", env!("CARGO_PKG_VERSION"));
    info!("  Built: {} {}", env!("BUILD_DATE"), env!("BUILD_TIME"));
    info!("  Commit: {}", env!("GIT_HASH"));
    info!("  Profile: {}", if cfg!(debug_assertions) { "debug" } else { "release" });
    info!("════════════════════════════════════════════════════════");

    match &origin {
        ConfigOrigin::File(path) => info!("Configuration loaded from {}", path.display()),
        ConfigOrigin::Defaults(path) => {
            warn!("No config file at {}, using defaults", path.display())
        }
    }
    debug!("Config: {:?}", config);

    let runtime = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;
    let result = runtime.block_on(async {
        match command {
            Command::Run { .. } => run_host(&config).await,
            Command::Simulate {
                trace,
                iteration_us,
                ..
            } => simulate(&config, trace.as_deref(), iteration_us),
        }
    });
    // a pending stdin read cannot be cancelled, so don't wait on it
    runtime.shutdown_timeout(Duration::from_millis(250));

    if let Err(e) = &result {
        eprintln!("{}", cursor_momentum::utils::format_user_error(e));
    }
    result
}

fn prepare_config(path: Option<&Path>, command: &Command) -> Result<(Config, ConfigOrigin)> {
    let (config, origin) = match path {
        Some(path) => (Config::load(path)?, ConfigOrigin::File(path.to_path_buf())),
        None => {
            let path = Config::default_path();
            if path.exists() {
                (Config::load(&path)?, ConfigOrigin::File(path))
            } else {
                (Config::default_config(), ConfigOrigin::Defaults(path))
            }
        }
    };

    let config = match command {
        Command::Run {
            source,
            trace,
            output,
        } => config.with_overrides(*source, trace.clone(), output.clone()),
        Command::Simulate { output, .. } => config.with_overrides(None, None, output.clone()),
    };
    config.validate().context("Invalid config after command-line overrides")?;

    Ok((config, origin))
}

async fn run_host(config: &Config) -> Result<()> {
    let source = config.input.source;
    info!("Input: {} ({})", source, source.description());

    let clock = MonotonicClock::new();
    let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

    let pointer = VirtualPointer::new(config.screen_bounds(), config.start_position());
    let mut runner = HostRunner::new(MomentumEngine::default(), pointer, clock);
    if let Some(writer) = open_path_writer(config)? {
        runner = runner.with_path_writer(writer);
    }

    let source_task = match source {
        InputSource::Stdin => host::spawn_stdin_source(clock, tx.clone()),
        InputSource::Trace => {
            let path = config
                .input
                .trace_path
                .as_deref()
                .context("Input source 'trace' requires a trace path")?;
            let records = host::load_trace(path)?;
            let linger = Duration::from_millis(config.input.linger_ms);
            host::spawn_trace_source(records, clock, linger, tx.clone())
        }
    };
    let signal_task = host::spawn_shutdown_signal(tx);

    let summary = runner.run(rx).await?;
    signal_task.abort();
    source_task.abort();

    info!(
        "Ran {:.2}s: {} samples ({} ignored), {} glides, {} steps ({} gated), {} writes",
        summary.elapsed.as_secs_f64(),
        summary.stats.samples,
        summary.stats.ignored,
        summary.stats.glides,
        summary.stats.steps,
        summary.stats.gated_steps,
        summary.stats.writes
    );
    if let Some(position) = summary.final_position {
        info!("Pointer at ({}, {})", position.x, position.y);
    }
    if summary.stats.pointer_errors > 0 {
        warn!("{} glide passes hit pointer errors", summary.stats.pointer_errors);
    }
    Ok(())
}

fn simulate(config: &Config, trace: Option<&Path>, iteration_us: u64) -> Result<()> {
    let trace = trace
        .or(config.input.trace_path.as_deref())
        .context("No trace given: pass --trace or set input.trace_path")?;
    let records = host::load_trace(trace)?;

    let pointer = VirtualPointer::new(config.screen_bounds(), config.start_position());
    let iteration = Duration::from_micros(iteration_us);
    let report = Simulation::new(MomentumEngine::default(), pointer, iteration).run(&records);
    if report.truncated {
        warn!("Glide still active when the simulation stopped; path is truncated");
    }

    let written = match open_path_writer(config)? {
        Some(mut writer) => {
            for record in &report.path {
                writer.write(record)?;
            }
            writer.finish()?
        }
        None => {
            debug!("output.record_path is off, path not written");
            0
        }
    };

    info!(
        "Simulated {} samples over {:.1} ms: {} glides, {} writes, {} path records",
        report.stats.samples,
        report.elapsed.as_secs_f64() * 1000.0,
        report.stats.glides,
        report.stats.writes,
        written
    );
    if let Some(position) = report.final_position {
        info!("Pointer at ({}, {})", position.x, position.y);
    }
    Ok(())
}

fn open_path_writer(config: &Config) -> Result<Option<PathWriter>> {
    PathWriter::from_config(&config.output).with_context(|| match &config.output.path_file {
        Some(path) => format!("Failed to create path output: {}", path.display()),
        None => "Failed to open path output".to_string(),
    })
}

fn init_logging(
    log_format: Option<&str>,
    log_file: Option<&Path>,
    verbose: u8,
    config: &Config,
) -> Result<Option<WorkerGuard>> {
    let log_level = match verbose {
        0 => config.logging.level.to_lowercase(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };
    let format = log_format.unwrap_or(config.logging.format.as_str());

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("cursor_momentum={},warn", log_level))
    });

    // stdout carries the pointer path, so the console gets stderr
    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer(format));

    let Some(path) = log_file.or(config.logging.log_file.as_deref()) else {
        registry.init();
        return Ok(None);
    };

    let file_name = path
        .file_name()
        .with_context(|| format!("Invalid log file path: {}", path.display()))?;
    let directory = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(directory, file_name));

    registry.with(file_layer(format, writer)).init();
    info!("Logging to file: {}", path.display());
    Ok(Some(guard))
}

fn console_layer<S>(format: &str) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    match format {
        "json" => layer.json().boxed(),
        "compact" => layer.compact().boxed(),
        _ => layer.pretty().boxed(),
    }
}

fn file_layer<S>(format: &str, writer: NonBlocking) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false);
    if format == "json" {
        layer.json().boxed()
    } else {
        layer.boxed()
    }
}
