pub mod catalog;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod history;
pub mod idle;
pub mod ipc;
pub mod placement;
pub mod presenter;
pub mod rules;

use tokio::io::{AsyncBufRead, AsyncWrite, BufReader};
use tokio::sync::mpsc;

pub async fn run() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // Logging: rolling log file only. stdout carries the JSON event stream,
    // so nothing else may write to it.
    // Log directory: <app dir>/logs, files rotate daily.
    // -----------------------------------------------------------------------
    let app_dir = config::app_dir();
    let log_dir = app_dir.join("logs");
    let _ = std::fs::create_dir_all(&log_dir);

    let file_appender = tracing_appender::rolling::daily(&log_dir, "tutor.log");
    // Held until run() returns; dropping it flushes the writer.
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dashboard_tutor_lib=debug".parse()?),
        )
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    // -----------------------------------------------------------------------
    // Panic hook: log panics through tracing before the process dies.
    // -----------------------------------------------------------------------
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "unknown location".to_string());
        let message = if let Some(s) = info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        tracing::error!("PANIC at {}: {}", location, message);
    }));

    tracing::info!("Dashboard tutor starting, logs in {}", log_dir.display());

    // --- Config and catalog. A bad catalog aborts startup. ---
    let cfg = config::load_or_init(&app_dir)?;
    let catalog = catalog::RuleCatalog::load(cfg.rules_path.as_deref())?;

    serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout(), catalog, cfg).await?;
    tracing::info!("Dashboard tutor stopped");
    Ok(())
}

/// Runs the reader -> engine -> writer pipeline until the host input ends.
///
/// A failed reader is returned as an error; stopping at EOF is `Ok`.
pub async fn serve<R, W>(
    input:   R,
    output:  W,
    catalog: catalog::RuleCatalog,
    cfg:     config::AppConfig,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (host_tx, host_rx)   = mpsc::channel::<ipc::HostMessage>(256);
    let (event_tx, event_rx) = mpsc::channel::<ipc::EngineEvent>(128);

    let reader = tokio::spawn(ipc::read_host(input, host_tx));
    let writer = tokio::spawn(ipc::write_events(event_rx, output));

    engine::run(host_rx, event_tx, catalog, cfg).await?;

    // Engine dropped its senders; the writer drains what is left and exits.
    writer.await??;

    // The engine only stops on its own once the reader has let go of the host
    // channel, so the reader is done here and its result says why.
    if let Err(e) = reader.await? {
        tracing::error!("Host reader failed: {:#}", e);
        return Err(e);
    }
    Ok(())
}
