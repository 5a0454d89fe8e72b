// SPDX-FileCopyrightText: 2026 Scribe Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Agent startup and wiring.
//!
//! Connects the gateway, opens the store, attaches the event-forwarding
//! callback, and runs Telegram long polling until SIGINT/SIGTERM.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use scribe_config::ScribeConfig;
use scribe_core::{NewMessage, ScribeError};
use scribe_gateway::{GatewayClient, handle_command};
use scribe_registry::ChannelRegistry;
use scribe_storage::MessageStore;
use scribe_telegram::{IngestionPipeline, TelegramSource};

/// Runs the ingestion agent until a shutdown signal arrives.
pub async fn run_agent(config: ScribeConfig) -> Result<(), ScribeError> {
    init_tracing(&config.agent.log_level);
    info!(agent = %config.agent.name, "starting scribe");

    let bot_token = config
        .telegram
        .bot_token
        .as_deref()
        .ok_or_else(|| ScribeError::Config("telegram.bot_token is required for run".into()))?
        .to_string();
    let gateway_token = config
        .gateway
        .token
        .as_deref()
        .ok_or_else(|| ScribeError::Config("gateway.token is required for run".into()))?
        .to_string();

    let registry = Arc::new(ChannelRegistry::load(&config.registry.persist_path));
    info!(
        channels = registry.channels().len(),
        enabled = registry.enabled(),
        "channel registry loaded"
    );

    let store = Arc::new(MessageStore::open(&config.storage.database_path).await?);
    info!(path = %config.storage.database_path, "message store opened");

    let gateway = Arc::new(GatewayClient::new(config.gateway.url.as_str(), gateway_token));
    gateway.connect().await?;

    // Stored messages are forwarded as gateway events through a channel so
    // the store callback never blocks on the socket.
    let (event_tx, event_rx) = mpsc::unbounded_channel::<(i64, NewMessage)>();
    store.register_callback(move |row_id, msg: &NewMessage| {
        event_tx
            .send((row_id, msg.clone()))
            .map_err(|e| ScribeError::Internal(format!("event channel closed: {e}")))
    });

    let cancel = install_signal_handler();

    let forwarder = tokio::spawn(forward_events(gateway.clone(), event_rx));

    let listener = {
        let gateway = gateway.clone();
        let registry = registry.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            let registry = registry.clone();
            let gw = gateway.clone();
            gateway
                .listen(
                    move |frame| {
                        let registry = registry.clone();
                        let gw = gw.clone();
                        async move {
                            handle_command(frame, &registry, Some(&gw)).await;
                        }
                    },
                    cancel,
                )
                .await;
        })
    };

    let pipeline = Arc::new(IngestionPipeline::new(registry, store.clone()));
    let source = TelegramSource::new(&bot_token, pipeline)?;

    info!("starting Telegram ingestion");
    tokio::select! {
        _ = source.run() => {
            warn!("Telegram polling stopped unexpectedly");
        }
        _ = cancel.cancelled() => {
            info!("shutdown signal received");
        }
    }

    // Teardown order: stop accepting commands, stop the event forwarder,
    // close the socket, then checkpoint the store.
    cancel.cancel();
    if let Err(e) = listener.await {
        warn!(error = %e, "gateway listener task failed");
    }
    forwarder.abort();
    gateway.close().await;
    store.close().await?;
    info!("shutdown complete");
    Ok(())
}

/// Drains stored-message notifications into gateway events.
async fn forward_events(
    gateway: Arc<GatewayClient>,
    mut event_rx: mpsc::UnboundedReceiver<(i64, NewMessage)>,
) {
    while let Some((row_id, msg)) = event_rx.recv().await {
        let params = match serde_json::to_value(&msg) {
            Ok(mut value) => {
                value["row_id"] = serde_json::json!(row_id);
                value
            }
            Err(e) => {
                warn!(error = %e, "failed to encode message event");
                continue;
            }
        };
        let id = gateway.send_event("message.received", params).await;
        debug!(row_id, event_id = id, "forwarded message event");
    }
}

/// Installs signal handlers for SIGTERM and SIGINT.
///
/// Returns a [`CancellationToken`] that is cancelled when either signal
/// is received.
fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};
            let mut sigterm = match signal(SignalKind::terminate()) {
                Ok(sigterm) => sigterm,
                Err(e) => {
                    warn!(error = %e, "failed to install SIGTERM handler");
                    let _ = ctrl_c.await;
                    token_clone.cancel();
                    return;
                }
            };

            tokio::select! {
                _ = ctrl_c => {
                    info!("received SIGINT (Ctrl+C), initiating shutdown");
                }
                _ = sigterm.recv() => {
                    info!("received SIGTERM, initiating shutdown");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            info!("received Ctrl+C, initiating shutdown");
        }

        token_clone.cancel();
    });

    token
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("scribe={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
