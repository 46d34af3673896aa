//! # Packet Router
//!
//! Request/response multiplexing over one connection. Any number of callers
//! may have requests in flight; one background loop drains every inbound
//! frame and settles each against the exchange table by correlation token,
//! never by temporal adjacency, so responses may arrive in any order
//! relative to send order.
//!
//! ## Failure semantics
//! A read or decode failure inside the loop is connection-fatal: the loop
//! stops (no resynchronization on a malformed frame) and every still-pending
//! exchange fails with `ConnectionClosed`, exactly once. An application
//! error is not a failure here: it arrives as a well-formed response whose
//! status the caller inspects.
//!
//! ## Cancellation
//! Dropping a `send_request` future at any point removes its exchange; a
//! late response for that token is forwarded nowhere and the loop carries
//! on. Timeouts are the caller's business, via [`crate::utils::timeout`] or
//! the [`Router::send_request_timeout`] convenience.

use crate::core::ident::{IdGenerator, Identifier};
use crate::error::{ProtocolError, Result};
use crate::protocol::packet::Packet;
use crate::protocol::request::{Credentials, Request, RequestBody};
use crate::protocol::response::Response;
use crate::transport::connection::{Connection, FrameSource};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tracing::{debug, error, instrument, trace, warn};

/// Buffered capacity of the unsolicited-frame channel.
const UNSOLICITED_BUFFER: usize = 64;

/// One request awaiting its response, keyed by correlation token.
#[derive(Debug)]
struct TableState {
    open: bool,
    pending: HashMap<Identifier, oneshot::Sender<Response>>,
}

/// The exchange table: a single mutex over insert/lookup/remove is enough,
/// correlation lookups are O(1).
#[derive(Debug)]
struct ExchangeTable {
    state: Mutex<TableState>,
}

impl ExchangeTable {
    fn new() -> Self {
        Self {
            state: Mutex::new(TableState {
                open: true,
                pending: HashMap::new(),
            }),
        }
    }

    fn insert(&self, key: Identifier, sender: oneshot::Sender<Response>) -> Result<()> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if !state.open {
            return Err(ProtocolError::ConnectionClosed);
        }
        if state.pending.contains_key(&key) {
            return Err(ProtocolError::Custom(format!(
                "correlation token {key} already in flight"
            )));
        }
        state.pending.insert(key, sender);
        Ok(())
    }

    fn take(&self, key: &Identifier) -> Option<oneshot::Sender<Response>> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.pending.remove(key)
    }

    fn is_open(&self) -> bool {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).open
    }

    /// Mark the connection dead and fail every waiter at once: dropping the
    /// senders resolves each pending receiver with a closed-channel error.
    fn close(&self) {
        let drained = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            state.open = false;
            std::mem::take(&mut state.pending)
        };
        if !drained.is_empty() {
            warn!(pending = drained.len(), "failing pending exchanges: connection closed");
        }
    }
}

/// Removes the exchange on drop. Completion paths have already removed the
/// entry by then, so the removal is a no-op there; every other exit
/// (cancellation, write failure, timeout) cleans up through this guard.
struct ExchangeGuard<'a> {
    table: &'a ExchangeTable,
    key: Identifier,
}

impl Drop for ExchangeGuard<'_> {
    fn drop(&mut self) {
        let _ = self.table.take(&self.key);
    }
}

/// Request/response multiplexer over one connection.
#[derive(Debug)]
pub struct Router<S> {
    connection: Arc<Connection<S>>,
    exchanges: Arc<ExchangeTable>,
    ids: Arc<IdGenerator>,
    receive_task: JoinHandle<()>,
}

impl<S> Router<S>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    /// Wrap a duplex stream, start the receive loop, and return the router
    /// plus the channel of unsolicited frames (broadcasts, peer requests,
    /// and responses nobody was waiting for). The receiving collaborator
    /// decides what to do with them; this crate only delivers.
    pub fn spawn(stream: S, ids: Arc<IdGenerator>) -> (Router<S>, mpsc::Receiver<Packet>) {
        let (connection, frames) = Connection::split(stream);
        let connection = Arc::new(connection);
        let exchanges = Arc::new(ExchangeTable::new());
        let (unsolicited_tx, unsolicited_rx) = mpsc::channel(UNSOLICITED_BUFFER);

        let receive_task = tokio::spawn(receive_loop(frames, exchanges.clone(), unsolicited_tx));

        (
            Router {
                connection,
                exchanges,
                ids,
                receive_task,
            },
            unsolicited_rx,
        )
    }

    /// The underlying guarded connection, for fire-and-forget traffic
    /// (broadcasts, server-side responses) alongside in-flight requests.
    pub fn connection(&self) -> &Arc<Connection<S>> {
        &self.connection
    }

    /// Whether the receive loop is still alive.
    pub fn is_open(&self) -> bool {
        self.exchanges.is_open()
    }

    /// Write one frame as a concurrent operation.
    pub async fn send(&self, packet: Packet) -> Result<()> {
        self.connection.send(packet).await
    }

    /// Send one request and wait for its matching response.
    ///
    /// The exchange is registered before the request is written, under the
    /// exclusive rental; the rental is released as soon as the write
    /// completes so the receive loop (and other senders) can proceed while
    /// this caller waits on its exchange.
    #[instrument(skip(self, credentials, body), fields(op = body.op().name()))]
    pub async fn send_request(
        &self,
        credentials: Credentials,
        body: RequestBody,
    ) -> Result<Response> {
        let correlation = self.ids.next();
        let (sender, receiver) = oneshot::channel();
        self.exchanges.insert(correlation, sender)?;
        let _guard = ExchangeGuard {
            table: &self.exchanges,
            key: correlation,
        };

        {
            let mut rental = self.connection.rent().await;
            rental
                .send(Packet::Request(Request {
                    correlation,
                    credentials,
                    body,
                }))
                .await?;
        }
        trace!(%correlation, "request written, awaiting response");

        receiver.await.map_err(|_| ProtocolError::ConnectionClosed)
    }

    /// [`Router::send_request`] bounded by a deadline. On expiry the request
    /// future is dropped, which removes the pending exchange.
    pub async fn send_request_timeout(
        &self,
        credentials: Credentials,
        body: RequestBody,
        deadline: Duration,
    ) -> Result<Response> {
        crate::utils::timeout::with_timeout_error(
            self.send_request(credentials, body),
            deadline,
        )
        .await
    }
}

impl<S> Drop for Router<S> {
    fn drop(&mut self) {
        self.receive_task.abort();
    }
}

/// One loop per connection: read frames in arrival order, settle responses
/// against the exchange table, forward everything else.
async fn receive_loop<S>(
    mut frames: FrameSource<S>,
    exchanges: Arc<ExchangeTable>,
    unsolicited: mpsc::Sender<Packet>,
) where
    S: AsyncRead + AsyncWrite,
{
    loop {
        match frames.next().await {
            Some(Ok(Packet::Response(response))) => {
                match exchanges.take(&response.correlation) {
                    Some(sender) => {
                        trace!(correlation = %response.correlation, "exchange resolved");
                        // a dropped receiver means the caller cancelled
                        // after the response was already in flight
                        let _ = sender.send(response);
                    }
                    None => {
                        debug!(
                            correlation = %response.correlation,
                            "response without a pending exchange, forwarding"
                        );
                        if unsolicited.send(Packet::Response(response)).await.is_err() {
                            debug!("unsolicited channel closed, frame dropped");
                        }
                    }
                }
            }
            Some(Ok(packet)) => {
                if unsolicited.send(packet).await.is_err() {
                    debug!("unsolicited channel closed, frame dropped");
                }
            }
            Some(Err(e)) => {
                // a malformed frame leaves the stream position unknowable
                error!(error = %e, "receive loop stopping on decode failure");
                break;
            }
            None => {
                debug!("peer closed the stream");
                break;
            }
        }
    }
    exchanges.close();
}
