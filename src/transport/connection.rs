//! WebSocket connection and event loop.
//!
//! The connection dials Firefox's BiDi endpoint and spawns a tokio task
//! that owns the socket. That task handles:
//!
//! - Outgoing commands from the Rust API
//! - Incoming responses, matched to their request by id
//! - Incoming events, logged and dropped
//! - Failing every pending request when the socket closes

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::{Value, from_str, to_string};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, error, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::RequestId;
use crate::protocol::{Command, Event, Request, Response};

// ============================================================================
// Constants
// ============================================================================

/// Default timeout for command execution.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum pending requests before rejecting new ones.
const MAX_PENDING_REQUESTS: usize = 100;

/// Timeout for the WebSocket handshake.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// Types
// ============================================================================

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Map of request IDs to response channels.
type CorrelationMap = FxHashMap<RequestId, oneshot::Sender<Result<Response>>>;

// ============================================================================
// ConnectionCommand
// ============================================================================

/// Internal commands for the event loop.
enum ConnectionCommand {
    /// Send a request and wait for response.
    Send {
        request: Request,
        response_tx: oneshot::Sender<Result<Response>>,
    },
    /// Remove a timed-out correlation entry.
    RemoveCorrelation(RequestId),
    /// Close the socket.
    Shutdown,
}

// ============================================================================
// Connection
// ============================================================================

/// WebSocket connection to a BiDi endpoint.
///
/// Cheap to clone; clones share the event loop. `Send + Sync`.
#[derive(Clone)]
pub struct Connection {
    /// Channel for sending commands to the event loop.
    command_tx: mpsc::UnboundedSender<ConnectionCommand>,
    /// Correlation map (shared with event loop).
    correlation: Arc<Mutex<CorrelationMap>>,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("pending", &self.pending_count())
            .finish_non_exhaustive()
    }
}

impl Connection {
    /// Connects to `url` (for example `ws://127.0.0.1:9222/session`).
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionTimeout`] if the handshake does not finish in time
    /// - [`Error::Connection`] if the endpoint refuses the upgrade
    pub async fn connect(url: &str) -> Result<Self> {
        let (socket, _) = timeout(CONNECT_TIMEOUT, connect_async(url))
            .await
            .map_err(|_| Error::connection_timeout(CONNECT_TIMEOUT.as_millis() as u64))?
            .map_err(|e| Error::connection(format!("{url}: {e}")))?;

        debug!(url, "WebSocket connected");
        Ok(Self::new(socket))
    }

    /// Wraps an established socket and spawns the event loop.
    fn new(socket: Socket) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let correlation = Arc::new(Mutex::new(CorrelationMap::default()));

        tokio::spawn(Self::run_event_loop(
            socket,
            command_rx,
            Arc::clone(&correlation),
        ));

        Self {
            command_tx,
            correlation,
        }
    }

    /// Sends `command` and returns its result, waiting up to 30s.
    ///
    /// # Errors
    ///
    /// - [`Error::Remote`] if the browser rejects the command
    /// - [`Error::ConnectionClosed`] if the connection is closed
    /// - [`Error::RequestTimeout`] if no reply arrives in time
    /// - [`Error::Protocol`] if too many requests are pending
    pub async fn send(&self, command: Command) -> Result<Value> {
        self.send_with_timeout(command, DEFAULT_COMMAND_TIMEOUT)
            .await
    }

    /// Sends `command` and returns its result, waiting up to
    /// `request_timeout`.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn send_with_timeout(
        &self,
        command: Command,
        request_timeout: Duration,
    ) -> Result<Value> {
        let method = command.method();
        let request = Request::new(command);
        let request_id = request.id;

        {
            let correlation = self.correlation.lock();
            if correlation.len() >= MAX_PENDING_REQUESTS {
                warn!(
                    pending = correlation.len(),
                    max = MAX_PENDING_REQUESTS,
                    "Too many pending requests"
                );
                return Err(Error::protocol(format!(
                    "Too many pending requests: {}/{}",
                    correlation.len(),
                    MAX_PENDING_REQUESTS
                )));
            }
        }

        let (response_tx, response_rx) = oneshot::channel();

        self.command_tx
            .send(ConnectionCommand::Send {
                request,
                response_tx,
            })
            .map_err(|_| Error::ConnectionClosed)?;

        trace!(%request_id, method, "Command queued");

        match timeout(request_timeout, response_rx).await {
            Ok(Ok(result)) => result?.into_result(),
            Ok(Err(_)) => Err(Error::ConnectionClosed),
            Err(_) => {
                let _ = self
                    .command_tx
                    .send(ConnectionCommand::RemoveCorrelation(request_id));

                warn!(%request_id, method, "Command timed out");
                Err(Error::request_timeout(
                    request_id,
                    request_timeout.as_millis() as u64,
                ))
            }
        }
    }

    /// Returns the number of pending requests.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.correlation.lock().len()
    }

    /// Closes the socket. Pending and later requests fail with
    /// [`Error::ConnectionClosed`].
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(ConnectionCommand::Shutdown);
    }

    /// Event loop that owns the socket.
    async fn run_event_loop(
        socket: Socket,
        mut command_rx: mpsc::UnboundedReceiver<ConnectionCommand>,
        correlation: Arc<Mutex<CorrelationMap>>,
    ) {
        let (mut ws_write, mut ws_read) = socket.split();

        loop {
            tokio::select! {
                message = ws_read.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            Self::handle_incoming_message(&text, &correlation);
                        }

                        Some(Ok(Message::Close(_))) => {
                            debug!("WebSocket closed by remote");
                            break;
                        }

                        Some(Err(e)) => {
                            error!(error = %e, "WebSocket error");
                            break;
                        }

                        None => {
                            debug!("WebSocket stream ended");
                            break;
                        }

                        // Binary, Ping, Pong
                        _ => {}
                    }
                }

                command = command_rx.recv() => {
                    match command {
                        Some(ConnectionCommand::Send { request, response_tx }) => {
                            let request_id = request.id;
                            let json = match to_string(&request) {
                                Ok(json) => json,
                                Err(e) => {
                                    let _ = response_tx.send(Err(Error::Json(e)));
                                    continue;
                                }
                            };

                            correlation.lock().insert(request_id, response_tx);

                            if let Err(e) = ws_write.send(Message::Text(json.into())).await
                                && let Some(tx) = correlation.lock().remove(&request_id)
                            {
                                let _ = tx.send(Err(Error::connection(e.to_string())));
                            }
                        }

                        Some(ConnectionCommand::RemoveCorrelation(request_id)) => {
                            correlation.lock().remove(&request_id);
                            debug!(%request_id, "Removed timed-out correlation");
                        }

                        Some(ConnectionCommand::Shutdown) => {
                            debug!("Shutdown command received");
                            let _ = ws_write.close().await;
                            break;
                        }

                        None => {
                            debug!("Command channel closed");
                            break;
                        }
                    }
                }
            }
        }

        Self::fail_pending_requests(&correlation);
        debug!("Event loop terminated");
    }

    /// Routes one incoming text frame.
    fn handle_incoming_message(text: &str, correlation: &Mutex<CorrelationMap>) {
        if let Ok(response) = from_str::<Response>(text) {
            let tx = correlation.lock().remove(&response.id);

            match tx {
                Some(tx) => {
                    let _ = tx.send(Ok(response));
                }
                None => warn!(id = %response.id, "Response for unknown request"),
            }
            return;
        }

        if let Ok(event) = from_str::<Event>(text) {
            trace!(method = %event.method, "Ignoring event");
            return;
        }

        warn!(
            len = text.len(),
            head = %text.chars().take(120).collect::<String>(),
            "Failed to parse incoming message"
        );
    }

    /// Fails all pending requests with `ConnectionClosed`.
    fn fail_pending_requests(correlation: &Mutex<CorrelationMap>) {
        let pending: Vec<_> = correlation.lock().drain().collect();
        let count = pending.len();

        for (_, tx) in pending {
            let _ = tx.send(Err(Error::ConnectionClosed));
        }

        if count > 0 {
            debug!(count, "Failed pending requests on shutdown");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
