//! Realtime socket client with bounded reconnection and heartbeat.

#![allow(clippy::too_many_lines)]

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::Duration;
use taleweave_core::error::NetworkError;
use taleweave_telemetry::masking::SensitiveDataMasker;
use taleweave_telemetry::spans::{connection_span, realtime_event_span};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at, timeout};
use tokio_tungstenite::tungstenite::protocol::Message as TungsteniteMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{Instrument, debug, error, info, warn};
use url::Url;

use super::config::WebSocketConfig;
use super::message::{EventEnvelope, MessageCodec};
use super::state::{ConnectionState, LinkState};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, TungsteniteMessage>;
type WsSource = SplitStream<WsStream>;

const OUTBOUND_QUEUE: usize = 100;
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Callback trait for realtime transport events.
///
/// Callbacks run on the connection task; they must not call
/// [`WebSocketClient::disconnect`].
#[async_trait]
pub trait WebSocketCallback: Send + Sync {
    /// Called for every inbound envelope, in delivery order.
    async fn on_event(&self, envelope: EventEnvelope);

    /// Called when the connection is established, including after a reconnect.
    async fn on_connected(&self);

    /// Called when the connection is lost or closed.
    async fn on_disconnected(&self, reason: Option<String>);

    /// Called when a transport error occurs.
    async fn on_error(&self, error: NetworkError);

    /// Called before each reconnection attempt.
    async fn on_reconnecting(&self, attempt: u32, max_attempts: u32) {
        let _ = (attempt, max_attempts);
    }

    /// Called once the reconnect bound is exhausted.
    async fn on_failed(&self, attempts: u32) {
        let _ = attempts;
    }
}

struct ConnectionHandle {
    send_tx: mpsc::Sender<String>,
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

#[derive(Clone)]
struct TaskContext {
    config: WebSocketConfig,
    url: String,
    state: Arc<RwLock<LinkState>>,
    callback: Option<Arc<dyn WebSocketCallback>>,
    codec: MessageCodec,
}

enum SessionEnd {
    Shutdown,
    ServerClosed(Option<String>),
    Lost(NetworkError),
}

/// Realtime socket client.
///
/// One background task owns the socket: outbound queue, inbound frames,
/// heartbeat pings, and the reconnect loop. Reconnection is bounded by
/// [`WebSocketConfig::max_reconnect_attempts`]; exhausting it leaves the
/// client in [`ConnectionState::Failed`].
///
/// # Example
///
/// ```ignore
/// use taleweave_gateway::ws::{WebSocketClient, WebSocketConfig};
///
/// let config = WebSocketConfig::builder()
///     .url("ws://localhost:3001/socket")
///     .build();
///
/// let mut client = WebSocketClient::new(config);
/// client.set_callback(MyCallback);
/// client.connect(Some("jwt")).await?;
/// ```
pub struct WebSocketClient {
    config: WebSocketConfig,
    state: Arc<RwLock<LinkState>>,
    callback: Option<Arc<dyn WebSocketCallback>>,
    handle: Mutex<Option<ConnectionHandle>>,
    codec: MessageCodec,
    masker: SensitiveDataMasker,
}

impl WebSocketClient {
    /// Creates a new client with the given configuration.
    #[must_use]
    pub fn new(config: WebSocketConfig) -> Self {
        Self {
            config,
            state: Arc::new(RwLock::new(LinkState::new())),
            callback: None,
            handle: Mutex::new(None),
            codec: MessageCodec::new(),
            masker: SensitiveDataMasker::new(),
        }
    }

    /// Sets the callback for receiving events.
    pub fn set_callback(&mut self, callback: impl WebSocketCallback + 'static) {
        self.callback = Some(Arc::new(callback));
    }

    /// Sets a shared callback.
    pub fn set_shared_callback(&mut self, callback: Arc<dyn WebSocketCallback>) {
        self.callback = Some(callback);
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &WebSocketConfig {
        &self.config
    }

    /// Returns the current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state.read().state
    }

    /// Returns whether the client is connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state.read().state.is_connected()
    }

    /// Returns the number of reconnection attempts since the last connect.
    #[must_use]
    pub fn reconnect_attempts(&self) -> u32 {
        self.state.read().reconnect_attempts
    }

    /// Time since the last inbound frame, if any arrived.
    #[must_use]
    pub fn idle_for(&self) -> Option<Duration> {
        self.state.read().last_message.map(|at| at.elapsed())
    }

    /// Builds the upgrade URL, carrying the credential as `?token=`.
    ///
    /// # Errors
    ///
    /// Returns `NetworkError::InvalidUrl` if the configured URL does not parse.
    pub fn connect_url(&self, credential: Option<&str>) -> Result<String, NetworkError> {
        let mut url = Url::parse(&self.config.url).map_err(|e| NetworkError::InvalidUrl {
            url: self.config.url.clone(),
            reason: e.to_string(),
        })?;
        if let Some(token) = credential {
            url.query_pairs_mut().append_pair("token", token);
        }
        Ok(url.into())
    }

    /// Connects to the socket server.
    ///
    /// Does nothing when already connecting, connected, or reconnecting. If
    /// the first attempt fails and reconnection is enabled, the bounded
    /// reconnect loop continues in the background and the error is returned.
    ///
    /// # Errors
    ///
    /// Returns `NetworkError` if the URL is invalid or the first attempt fails.
    pub async fn connect(&self, credential: Option<&str>) -> Result<(), NetworkError> {
        let url = self.connect_url(credential)?;

        if !self.state.write().begin_connect() {
            debug!(state = %self.state(), "Connect ignored, connection already active");
            return Ok(());
        }

        if let Some(stale) = self.handle.lock().take() {
            stale.task.abort();
        }

        let masked_url = self.masker.mask_string(&url).into_owned();
        let ctx = TaskContext {
            config: self.config.clone(),
            url,
            state: Arc::clone(&self.state),
            callback: self.callback.clone(),
            codec: self.codec,
        };

        match Self::open(&ctx).await {
            Ok(ws) => {
                self.state.write().mark_connected();
                self.spawn(ctx, Some(ws), &masked_url);
                info!(url = %masked_url, "Realtime connected");

                if let Some(callback) = &self.callback {
                    callback.on_connected().await;
                }
                Ok(())
            }
            Err(e) => {
                warn!(url = %masked_url, error = %e, "Realtime connect failed");
                if let Some(callback) = &self.callback {
                    callback.on_error(e.clone()).await;
                }

                if self.config.should_reconnect(0) {
                    self.spawn(ctx, None, &masked_url);
                } else {
                    self.state.write().mark_disconnected();
                }
                Err(e)
            }
        }
    }

    /// Disconnects from the server. Idempotent.
    pub async fn disconnect(&self) {
        let handle = self.handle.lock().take();
        let was_active = self.state().is_active();

        let Some(handle) = handle else {
            self.state.write().mark_disconnected();
            return;
        };

        let _ = handle.shutdown_tx.try_send(());
        let abort = handle.task.abort_handle();
        if timeout(SHUTDOWN_GRACE, handle.task).await.is_err() {
            warn!("Connection task did not stop in time, aborting");
            abort.abort();
        }

        self.state.write().mark_disconnected();

        if was_active {
            if let Some(callback) = &self.callback {
                callback
                    .on_disconnected(Some("Client disconnected".to_string()))
                    .await;
            }
            info!("Realtime disconnected");
        }
    }

    /// Queues an envelope for sending.
    ///
    /// # Errors
    ///
    /// Returns `NetworkError::ConnectionClosed` when not connected or when the
    /// outbound queue is full.
    pub fn send(&self, envelope: &EventEnvelope) -> Result<(), NetworkError> {
        if !self.is_connected() {
            return Err(NetworkError::ConnectionClosed {
                reason: "Not connected".to_string(),
            });
        }

        let text = self
            .codec
            .encode(envelope)
            .map_err(|e| NetworkError::WebSocket {
                reason: e.to_string(),
            })?;

        let guard = self.handle.lock();
        let handle = guard.as_ref().ok_or(NetworkError::ConnectionClosed {
            reason: "Not connected".to_string(),
        })?;
        handle
            .send_tx
            .try_send(text)
            .map_err(|e| NetworkError::ConnectionClosed {
                reason: format!("Outbound queue unavailable: {e}"),
            })
    }

    /// Queues a named event with a JSON payload.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub fn emit(&self, event: &str, data: serde_json::Value) -> Result<(), NetworkError> {
        self.send(&EventEnvelope::new(event, data))
    }

    fn spawn(&self, ctx: TaskContext, stream: Option<WsStream>, masked_url: &str) {
        let (send_tx, send_rx) = mpsc::channel::<String>(OUTBOUND_QUEUE);
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);

        let task = tokio::spawn(
            Self::run(ctx, stream, send_rx, shutdown_rx).instrument(connection_span(masked_url)),
        );

        *self.handle.lock() = Some(ConnectionHandle {
            send_tx,
            shutdown_tx,
            task,
        });
    }

    async fn open(ctx: &TaskContext) -> Result<WsStream, NetworkError> {
        let (ws_stream, _) = timeout(ctx.config.connect_timeout(), connect_async(ctx.url.as_str()))
            .await
            .map_err(|_| NetworkError::Timeout {
                timeout_ms: ctx.config.connect_timeout_ms,
            })?
            .map_err(|e| NetworkError::ConnectionFailed {
                reason: e.to_string(),
            })?;
        Ok(ws_stream)
    }

    async fn run(
        ctx: TaskContext,
        mut stream: Option<WsStream>,
        mut send_rx: mpsc::Receiver<String>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        loop {
            let ws = match stream.take() {
                Some(ws) => ws,
                None => match Self::reconnect(&ctx, &mut shutdown_rx).await {
                    Some(ws) => ws,
                    None => return,
                },
            };

            match Self::pump(&ctx, ws, &mut send_rx, &mut shutdown_rx).await {
                SessionEnd::Shutdown => {
                    debug!("Shutdown signal received");
                    return;
                }
                SessionEnd::ServerClosed(reason) => {
                    info!(reason = ?reason, "Server closed the connection");
                    ctx.state.write().mark_disconnected();
                    if let Some(cb) = &ctx.callback {
                        cb.on_disconnected(reason).await;
                    }
                    return;
                }
                SessionEnd::Lost(e) => {
                    error!(error = %e, "Realtime connection lost");
                    ctx.state.write().mark_lost();
                    let mut dropped = 0usize;
                    while send_rx.try_recv().is_ok() {
                        dropped += 1;
                    }
                    if dropped > 0 {
                        debug!(dropped, "Discarded outbound frames queued for the lost socket");
                    }
                    if let Some(cb) = &ctx.callback {
                        cb.on_error(e.clone()).await;
                        cb.on_disconnected(Some(e.to_string())).await;
                    }
                    if !ctx.config.reconnect_enabled {
                        ctx.state.write().mark_disconnected();
                        return;
                    }
                }
            }
        }
    }

    async fn reconnect(
        ctx: &TaskContext,
        shutdown_rx: &mut mpsc::Receiver<()>,
    ) -> Option<WsStream> {
        let max_attempts = ctx.config.max_reconnect_attempts;

        for attempt in 1..=max_attempts {
            ctx.state.write().mark_reconnecting();
            if let Some(cb) = &ctx.callback {
                cb.on_reconnecting(attempt, max_attempts).await;
            }

            let delay = ctx.config.calculate_reconnect_delay(attempt - 1);
            warn!(
                attempt,
                max_attempts,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "Reconnecting"
            );

            let result = tokio::select! {
                _ = shutdown_rx.recv() => return None,
                result = async {
                    tokio::time::sleep(delay).await;
                    Self::open(ctx).await
                } => result,
            };

            match result {
                Ok(ws) => {
                    ctx.state.write().mark_connected();
                    info!(attempt, "Realtime reconnected");
                    if let Some(cb) = &ctx.callback {
                        cb.on_connected().await;
                    }
                    return Some(ws);
                }
                Err(e) => {
                    debug!(attempt, error = %e, "Reconnect attempt failed");
                }
            }
        }

        ctx.state.write().mark_failed();
        error!(attempts = max_attempts, "Reconnect attempts exhausted");
        if let Some(cb) = &ctx.callback {
            cb.on_failed(max_attempts).await;
        }
        None
    }

    async fn pump(
        ctx: &TaskContext,
        ws: WsStream,
        send_rx: &mut mpsc::Receiver<String>,
        shutdown_rx: &mut mpsc::Receiver<()>,
    ) -> SessionEnd {
        let (mut sink, mut source): (WsSink, WsSource) = ws.split();
        let period = ctx.config.heartbeat_interval().max(Duration::from_millis(1));
        let mut heartbeat = interval_at(Instant::now() + period, period);
        heartbeat.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    let _ = sink.close().await;
                    return SessionEnd::Shutdown;
                }

                Some(text) = send_rx.recv() => {
                    if let Err(e) = sink.send(TungsteniteMessage::Text(text)).await {
                        return SessionEnd::Lost(NetworkError::WebSocket {
                            reason: e.to_string(),
                        });
                    }
                }

                frame = source.next() => {
                    let msg = match frame {
                        Some(Ok(msg)) => msg,
                        Some(Err(e)) => {
                            return SessionEnd::Lost(NetworkError::WebSocket {
                                reason: e.to_string(),
                            });
                        }
                        None => {
                            return SessionEnd::Lost(NetworkError::ConnectionClosed {
                                reason: "Stream ended".to_string(),
                            });
                        }
                    };

                    ctx.state.write().record_message();
                    match msg {
                        TungsteniteMessage::Text(text) => Self::deliver(ctx, &text).await,
                        TungsteniteMessage::Close(frame) => {
                            return SessionEnd::ServerClosed(
                                frame.map(|f| f.reason.to_string()).filter(|r| !r.is_empty()),
                            );
                        }
                        TungsteniteMessage::Binary(data) => {
                            debug!(bytes = data.len(), "Ignoring binary frame");
                        }
                        _ => {}
                    }
                }

                _ = heartbeat.tick() => {
                    if !ctx.config.auto_ping {
                        continue;
                    }
                    if ctx.state.read().awaiting_pong {
                        return SessionEnd::Lost(NetworkError::Timeout {
                            timeout_ms: ctx.config.heartbeat_interval_ms,
                        });
                    }
                    ctx.state.write().record_ping();
                    if let Err(e) = sink.send(TungsteniteMessage::Ping(Vec::new())).await {
                        return SessionEnd::Lost(NetworkError::WebSocket {
                            reason: e.to_string(),
                        });
                    }
                    debug!("Ping sent");
                }
            }
        }
    }

    async fn deliver(ctx: &TaskContext, text: &str) {
        match ctx.codec.decode(text) {
            Ok(envelope) => {
                let span = realtime_event_span(&envelope.event);
                if let Some(cb) = &ctx.callback {
                    cb.on_event(envelope).instrument(span).await;
                }
            }
            Err(e) => warn!(error = %e, "Dropping non-envelope frame"),
        }
    }
}

impl Drop for WebSocketClient {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.get_mut().take() {
            handle.task.abort();
        }
    }
}
