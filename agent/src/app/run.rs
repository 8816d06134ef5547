//! Main application run loop

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::app::options::AppOptions;
use crate::app::state::AppState;
use crate::errors::MonitorError;
use crate::server::serve::serve;
use crate::server::state::ServerState;
use crate::workers::poller;

const MAX_SHUTDOWN_DELAY: Duration = Duration::from_secs(30);

/// Run the plugwatch agent until the shutdown signal fires.
pub async fn run(
    options: AppOptions,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), MonitorError> {
    info!("Initializing plugwatch agent...");

    let (shutdown_tx, _shutdown_rx): (broadcast::Sender<()>, _) = broadcast::channel(1);
    let app_state = AppState::init(&options)?;

    let mut handles: Vec<(&str, JoinHandle<Result<(), MonitorError>>)> = Vec::new();

    if options.enable_server {
        let server_state = Arc::new(ServerState::new(app_state.monitor.clone()));
        let mut rx = shutdown_tx.subscribe();
        let handle = serve(&options.server, server_state, async move {
            let _ = rx.recv().await;
        })
        .await?;
        handles.push(("server", handle));
    }

    if options.enable_poller {
        let monitor = app_state.monitor.clone();
        let poller_options = options.poller.clone();
        let mut rx = shutdown_tx.subscribe();
        let handle = tokio::spawn(async move {
            poller::run(
                &poller_options,
                &monitor,
                tokio::time::sleep,
                Box::pin(async move {
                    let _ = rx.recv().await;
                }),
            )
            .await;
            Ok(())
        });
        handles.push(("poller", handle));
    }

    if handles.is_empty() {
        warn!("Both the server and the poller are disabled; nothing to run");
    }

    shutdown_signal.await;
    info!("Shutting down...");

    let _ = shutdown_tx.send(());

    for (name, handle) in handles {
        match tokio::time::timeout(MAX_SHUTDOWN_DELAY, handle).await {
            Ok(Ok(Ok(()))) => info!("{} stopped", name),
            Ok(Ok(Err(e))) => error!("{} stopped with error: {}", name, e),
            Ok(Err(e)) => error!("{} task panicked: {}", name, e),
            Err(_) => error!("{} did not stop within {:?}", name, MAX_SHUTDOWN_DELAY),
        }
    }

    Ok(())
}
