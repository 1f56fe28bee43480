//! TourBox userland driver entry point.
//!
//! Loads the configuration, opens the serial device, creates the virtual
//! uinput device and runs the polling session until Ctrl-C, SIGTERM, or a
//! serial error.
//!
//! # Startup order
//!
//! ```text
//! main()
//!  └─ load_config()              -- TOML file + CLI overrides
//!  └─ tracing_subscriber init    -- RUST_LOG wins over [log] level
//!  └─ AppConfig::binding_table() -- invalid bindings abort here
//!  └─ SerialTransport::open()
//!  └─ UinputSink::create()
//!  └─ DriverSession::run()       -- until shutdown_signal() or error
//! ```
//!
//! The binding table is validated before any device is touched, so a bad
//! configuration never leaves a half-created virtual device behind.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tourbox_core::Decoder;
use tourbox_driver::application::dispatch_event::{Dispatcher, OutputSink};
use tourbox_driver::application::poll_session::DriverSession;
use tourbox_driver::infrastructure::storage::config::load_config;
use tourbox_driver::infrastructure::transport::serial::SerialTransport;

/// Userland driver for the TourBox Neo editing console.
#[derive(Debug, Parser)]
#[command(name = "tourbox-driver", version, about)]
struct Cli {
    /// Serial device the console is attached to (overrides [device] path).
    device: Option<String>,

    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the effective configuration, including all bindings, and exit.
    #[arg(long)]
    print_config: bool,

    /// Double-activation window in milliseconds (overrides [timing] window_ms).
    #[arg(long)]
    window_ms: Option<u64>,

    /// Log level (overrides [log] level; RUST_LOG takes precedence over both).
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(device) = cli.device {
        config.device.path = device;
    }
    if let Some(window_ms) = cli.window_ms {
        config.timing.window_ms = window_ms;
    }
    if let Some(level) = cli.log_level {
        config.log.level = level;
    }

    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log.level)),
        )
        .init();

    config.validate_timing().context("invalid [timing] section")?;
    let table = config.binding_table().context("invalid [bindings] section")?;

    if cli.print_config {
        let text = config
            .with_effective_bindings(&table)
            .to_toml()
            .context("failed to render configuration")?;
        print!("{text}");
        return Ok(());
    }

    info!("TourBox driver starting");

    let transport = SerialTransport::open(&config.device.path, config.device.baud_rate)
        .with_context(|| format!("cannot open serial device {}", config.device.path))?;
    let dispatcher = Dispatcher::new(table);
    let sink = create_sink(dispatcher.table())?;
    info!(device = transport.path(), "TourBox driver ready");

    let mut session = DriverSession::new(
        Decoder::with_window(config.window()),
        dispatcher,
        Box::new(transport),
        sink,
    );
    session
        .run(config.poll_interval(), shutdown_signal())
        .await
        .context("driver session ended with an error")?;

    info!("TourBox driver stopped");
    Ok(())
}

#[cfg(target_os = "linux")]
fn create_sink(table: &tourbox_core::BindingTable) -> anyhow::Result<Arc<dyn OutputSink>> {
    use tourbox_driver::infrastructure::output::uinput::UinputSink;

    let sink = UinputSink::create(table)
        .context("cannot create uinput device (is /dev/uinput writable?)")?;
    Ok(Arc::new(sink))
}

#[cfg(not(target_os = "linux"))]
fn create_sink(_table: &tourbox_core::BindingTable) -> anyhow::Result<Arc<dyn OutputSink>> {
    anyhow::bail!("virtual input output is only supported on Linux")
}

/// Completes on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => info!("interrupt received"),
                    _ = term.recv() => info!("terminate signal received"),
                }
            }
            Err(e) => {
                tracing::warn!("cannot install SIGTERM handler: {e}");
                let _ = tokio::signal::ctrl_c().await;
                info!("interrupt received");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("interrupt received");
    }
}
