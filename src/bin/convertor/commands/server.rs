//! Runs the HTTP API.
//!
//! A single threaded runtime is plenty here: converting a document is quick and never blocks.
use sql_convertor::{server, Config, Converter, Error};
use tokio::net::TcpListener;
use tokio::runtime::Builder;
use tokio::signal;
use tracing::{info, info_span, warn, Level};

pub fn run(mut config: Config, port: Option<u16>) -> Result<(), Error> {
    if let Some(port) = port {
        config.port = port;
    }

    init_tracing(&config);

    let span = info_span!(
        "convertor",
        environment = ?config.environment,
        strategy = ?config.strategy
    );
    let app = server::router(Converter::from_config(&config), span);

    let tokio = Builder::new_current_thread().enable_all().build()?;

    tokio.block_on(async {
        let address = config.address();
        let listener = TcpListener::bind(&address).await?;

        info!("Listening on {address}");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server stopped");

        Ok::<(), Error>(())
    })
}

/// Development gets colorful debug output, production gets plain info output.
fn init_tracing(config: &Config) {
    let (level, ansi) = if config.is_production() {
        (Level::INFO, false)
    } else {
        (Level::DEBUG, true)
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(ansi)
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            warn!("Cannot listen for Ctrl-C: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(error) => {
                warn!("Cannot listen for SIGTERM: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutting down");
}
