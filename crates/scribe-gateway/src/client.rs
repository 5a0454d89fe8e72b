// SPDX-FileCopyrightText: 2026 Scribe Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistent, authenticated WebSocket client for the operator gateway.
//!
//! Lifecycle: `connect()` performs the nonce/signature handshake and is the
//! only operation that raises transport errors. After that, outbound sends
//! are fire-and-forget (`send_event` returns a sentinel id, `send_raw`
//! returns false on failure) and `listen()` drives the inbound frame stream
//! until cancellation or transport loss. There is no auto-reconnect; the
//! owning process decides whether to restart the pipeline.

use std::future::Future;
use std::sync::atomic::{AtomicI64, Ordering};

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use scribe_core::ScribeError;

use crate::auth;
use crate::frames::Frame;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// Sentinel id returned by [`GatewayClient::send_event`] when the frame
/// could not be sent. Never an error.
pub const SEND_FAILED: i64 = -1;

/// Control-channel client: one outbound sink shared by event senders and
/// command responders, one inbound stream owned by the listen loop.
///
/// The sink sits behind an async mutex so sends from different tasks
/// interleave as whole frames.
pub struct GatewayClient {
    url: String,
    token: String,
    sink: Mutex<Option<WsSink>>,
    source: Mutex<Option<WsSource>>,
    next_id: AtomicI64,
}

impl GatewayClient {
    /// Create a disconnected client for `url`, authenticating with the
    /// shared secret `token`.
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
            sink: Mutex::new(None),
            source: Mutex::new(None),
            next_id: AtomicI64::new(0),
        }
    }

    /// Open the transport and perform the connect handshake.
    ///
    /// A fresh nonce is generated per attempt and signed with the shared
    /// secret. Exactly one reply is awaited; anything but a `connected`
    /// ack is a hard failure. No retry happens inside this call.
    pub async fn connect(&self) -> Result<(), ScribeError> {
        info!(url = %self.url, "connecting to gateway");
        let (ws, _) = tokio_tungstenite::connect_async(&self.url)
            .await
            .map_err(|e| ScribeError::Gateway {
                message: format!("failed to open gateway transport: {e}"),
                source: Some(Box::new(e)),
            })?;
        let (mut sink, mut source) = ws.split();

        let nonce = auth::generate_nonce();
        let signature = auth::sign_nonce(&self.token, &nonce);
        let frame = Frame::Connect { nonce, signature };
        let json = serde_json::to_string(&frame).map_err(|e| ScribeError::Internal(
            format!("failed to encode connect frame: {e}"),
        ))?;
        sink.send(Message::Text(json.into()))
            .await
            .map_err(|e| ScribeError::Gateway {
                message: format!("failed to send connect frame: {e}"),
                source: Some(Box::new(e)),
            })?;

        // Exactly one reply decides the handshake. Control frames (ping,
        // pong) are transport-level and not replies.
        let reply = loop {
            match source.next().await {
                None => {
                    return Err(ScribeError::Handshake(
                        "connection closed before handshake reply".into(),
                    ));
                }
                Some(Err(e)) => {
                    return Err(ScribeError::Gateway {
                        message: format!("transport error during handshake: {e}"),
                        source: Some(Box::new(e)),
                    });
                }
                Some(Ok(Message::Text(text))) => break text,
                Some(Ok(Message::Close(_))) => {
                    return Err(ScribeError::Handshake(
                        "gateway closed the connection during handshake".into(),
                    ));
                }
                Some(Ok(_)) => continue,
            }
        };

        match serde_json::from_str::<Frame>(reply.as_str()) {
            Ok(Frame::Connected) => {}
            Ok(other) => {
                error!(?other, "unexpected reply during handshake");
                return Err(ScribeError::Handshake(format!(
                    "gateway rejected the handshake: {other:?}"
                )));
            }
            Err(e) => {
                return Err(ScribeError::Handshake(format!(
                    "malformed handshake reply: {e}"
                )));
            }
        }

        *self.sink.lock().await = Some(sink);
        *self.source.lock().await = Some(source);
        // Request ids restart at 1 for each connection.
        self.next_id.store(0, Ordering::SeqCst);
        info!("gateway handshake complete");
        Ok(())
    }

    /// Whether a connected sink is currently held.
    pub async fn is_connected(&self) -> bool {
        self.sink.lock().await.is_some()
    }

    /// Send a fire-and-forget request frame.
    ///
    /// Returns the allocated id (strictly increasing from 1 for the
    /// connection's lifetime) without awaiting any reply, or
    /// [`SEND_FAILED`] when disconnected or the transport send fails.
    /// Never raises.
    pub async fn send_event(&self, method: &str, params: serde_json::Value) -> i64 {
        let mut guard = self.sink.lock().await;
        let Some(sink) = guard.as_mut() else {
            warn!(method, "gateway not connected, skipping event");
            return SEND_FAILED;
        };

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let frame = Frame::Req {
            id,
            method: method.to_string(),
            params,
        };
        let json = match serde_json::to_string(&frame) {
            Ok(json) => json,
            Err(e) => {
                error!(method, error = %e, "failed to encode event frame");
                return SEND_FAILED;
            }
        };

        match sink.send(Message::Text(json.into())).await {
            Ok(()) => {
                debug!(method, id, "sent event frame");
                id
            }
            Err(e) => {
                error!(method, error = %e, "failed to send event frame");
                SEND_FAILED
            }
        }
    }

    /// Send an arbitrary frame verbatim. Returns false (not an error) on
    /// any failure so response delivery degrades gracefully.
    pub async fn send_raw(&self, frame: &Frame) -> bool {
        let mut guard = self.sink.lock().await;
        let Some(sink) = guard.as_mut() else {
            warn!("gateway not connected, skipping raw frame");
            return false;
        };

        let json = match serde_json::to_string(frame) {
            Ok(json) => json,
            Err(e) => {
                error!(error = %e, "failed to encode raw frame");
                return false;
            }
        };

        match sink.send(Message::Text(json.into())).await {
            Ok(()) => {
                debug!("sent raw frame");
                true
            }
            Err(e) => {
                error!(error = %e, "failed to send raw frame");
                false
            }
        }
    }

    /// Drive the inbound stream, invoking `callback` once per decoded
    /// frame, until cancellation or transport loss.
    ///
    /// A malformed frame is logged and skipped; cancellation stops the
    /// loop cleanly; any transport failure ends the loop and the
    /// connection is considered lost.
    pub async fn listen<F, Fut>(&self, callback: F, cancel: CancellationToken)
    where
        F: Fn(Frame) -> Fut,
        Fut: Future<Output = ()>,
    {
        let Some(mut source) = self.source.lock().await.take() else {
            warn!("gateway not connected, cannot listen");
            return;
        };

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("listen loop cancelled");
                    break;
                }
                item = source.next() => match item {
                    None => {
                        info!("gateway connection closed");
                        break;
                    }
                    Some(Err(e)) => {
                        error!(error = %e, "transport error in listen loop");
                        break;
                    }
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<Frame>(text.as_str()) {
                            Ok(frame) => {
                                debug!(?frame, "received frame");
                                callback(frame).await;
                            }
                            Err(e) => {
                                warn!(error = %e, "skipping malformed frame");
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        info!("gateway sent close");
                        break;
                    }
                    Some(Ok(_)) => {} // ping/pong handled at the transport layer
                }
            }
        }
    }

    /// Release the transport. Idempotent.
    pub async fn close(&self) {
        if let Some(mut sink) = self.sink.lock().await.take() {
            let _ = sink.send(Message::Close(None)).await;
            info!("gateway connection closed");
        }
        self.source.lock().await.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::{SinkExt, StreamExt};
    use std::sync::Arc;
    use tokio::net::TcpListener;
    use tokio::sync::mpsc;

    const SECRET: &str = "shared-secret";

    /// A minimal conformant counterpart: verifies the connect signature,
    /// acks, then forwards scripted frames and records inbound ones.
    async fn spawn_gateway(
        script: Vec<String>,
    ) -> (String, mpsc::UnboundedReceiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}", listener.local_addr().unwrap());
        let (seen_tx, seen_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();

            // Handshake: verify the signature over the client's own nonce.
            let first = ws.next().await.unwrap().unwrap();
            let reply = match serde_json::from_str::<Frame>(first.to_text().unwrap()) {
                Ok(Frame::Connect { nonce, signature })
                    if auth::verify_nonce(SECRET, &nonce, &signature) =>
                {
                    r#"{"type":"connected"}"#.to_string()
                }
                _ => r#"{"type":"rejected"}"#.to_string(),
            };
            ws.send(Message::Text(reply.into())).await.unwrap();

            for frame in script {
                if ws.send(Message::Text(frame.into())).await.is_err() {
                    return;
                }
            }

            while let Some(Ok(msg)) = ws.next().await {
                if let Message::Text(text) = msg {
                    let _ = seen_tx.send(text.as_str().to_string());
                }
            }
        });

        (url, seen_rx)
    }

    #[tokio::test]
    async fn handshake_succeeds_against_conformant_counterpart() {
        let (url, _seen) = spawn_gateway(Vec::new()).await;
        let client = GatewayClient::new(url, SECRET);
        client.connect().await.unwrap();
        assert!(client.is_connected().await);
        client.close().await;
        client.close().await; // idempotent
    }

    #[tokio::test]
    async fn tampered_secret_fails_the_handshake() {
        let (url, _seen) = spawn_gateway(Vec::new()).await;
        let client = GatewayClient::new(url, "wrong-secret");
        let err = client.connect().await.unwrap_err();
        assert!(matches!(err, ScribeError::Handshake(_)), "got {err:?}");
        assert!(!client.is_connected().await);
    }

    #[tokio::test]
    async fn send_event_allocates_increasing_ids() {
        let (url, mut seen) = spawn_gateway(Vec::new()).await;
        let client = GatewayClient::new(url, SECRET);
        client.connect().await.unwrap();

        assert_eq!(client.send_event("a", serde_json::json!({})).await, 1);
        assert_eq!(client.send_event("b", serde_json::json!({})).await, 2);
        assert_eq!(client.send_event("c", serde_json::json!({})).await, 3);

        for expected_id in 1..=3 {
            let raw = seen.recv().await.unwrap();
            let frame: Frame = serde_json::from_str(&raw).unwrap();
            let Frame::Req { id, .. } = frame else {
                panic!("expected req frame, got {frame:?}");
            };
            assert_eq!(id, expected_id);
        }
    }

    #[tokio::test]
    async fn send_event_when_disconnected_returns_sentinel() {
        let client = GatewayClient::new("ws://127.0.0.1:1", SECRET);
        assert_eq!(
            client.send_event("x", serde_json::Value::Null).await,
            SEND_FAILED
        );
        assert!(!client.send_raw(&Frame::Connected).await);
    }

    #[tokio::test]
    async fn listen_skips_malformed_frames_and_delivers_the_rest() {
        let (url, _seen) = spawn_gateway(vec![
            "this is not json".to_string(),
            r#"{"type":"req","id":1,"method":"bot.enable","params":{}}"#.to_string(),
        ])
        .await;
        let client = GatewayClient::new(url, SECRET);
        client.connect().await.unwrap();

        let (frame_tx, mut frame_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let stop = cancel.clone();
        let client = Arc::new(client);
        let listener = {
            let client = client.clone();
            tokio::spawn(async move {
                client
                    .listen(
                        move |frame| {
                            let frame_tx = frame_tx.clone();
                            async move {
                                let _ = frame_tx.send(frame);
                            }
                        },
                        cancel,
                    )
                    .await;
            })
        };

        let frame = frame_rx.recv().await.unwrap();
        assert!(matches!(frame, Frame::Req { id: 1, .. }), "got {frame:?}");

        // Cooperative cancellation terminates the loop without error.
        stop.cancel();
        listener.await.unwrap();
    }

    #[tokio::test]
    async fn unexpected_handshake_reply_is_fatal() {
        // Counterpart that never validates and replies with a res frame.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            let _ = ws.next().await;
            ws.send(Message::Text(
                r#"{"type":"res","id":0,"ok":false}"#.to_string().into(),
            ))
            .await
            .unwrap();
        });

        let client = GatewayClient::new(url, SECRET);
        let err = client.connect().await.unwrap_err();
        assert!(matches!(err, ScribeError::Handshake(_)), "got {err:?}");
    }
}
