mod builder;
mod dataset;
mod dataverse;
mod index;
mod link;
mod query;

pub use builder::AnalyticsClientBuilder;
pub use query::AnalyticsQueryOptions;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{oneshot, watch};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::protocol::{ClientError, Command, ManagementOperation, NativeError, OperationArgs};

/// Boundary to the native client core.
///
/// The core owns transport, authentication, retry policy and cluster
/// topology; this layer only hands it fully-validated commands and waits for
/// the single completion.
#[async_trait]
pub trait NativeTransport: Send + Sync {
    async fn execute(&self, command: Command) -> Result<Value, NativeError>;
}

/// Handle to a native connection, shared read-only by every dispatched
/// operation. Lifecycle is owned by the caller; `close` is the only state
/// transition and is idempotent.
pub struct Connection {
    transport: Arc<dyn NativeTransport>,
    closed: watch::Sender<bool>,
}

impl Connection {
    pub fn new(transport: Arc<dyn NativeTransport>) -> Self {
        let (closed, _) = watch::channel(false);
        Self { transport, closed }
    }

    pub fn is_open(&self) -> bool {
        !*self.closed.borrow()
    }

    /// Tears the connection down. Every in-flight operation resolves with
    /// [`ClientError::ConnectionClosed`]; later dispatches are rejected
    /// synchronously.
    pub fn close(&self) {
        self.closed.send_replace(true);
    }

    fn transport(&self) -> Arc<dyn NativeTransport> {
        Arc::clone(&self.transport)
    }

    fn closed_signal(&self) -> watch::Receiver<bool> {
        self.closed.subscribe()
    }
}

/// Per-call dispatch options.
#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchOptions {
    /// Overrides the process-wide default timeout for the operation kind.
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OperationState {
    Created,
    Submitted,
    Completed,
    Failed,
    TimedOut,
}

/// A dispatched operation. Resolves exactly once, with the native payload or
/// a structured error; the exactly-once property is structural (a oneshot
/// channel), not a convention.
pub struct OperationHandle {
    id: Uuid,
    rx: oneshot::Receiver<Result<Value, ClientError>>,
}

impl OperationHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl Future for OperationHandle {
    type Output = Result<Value, ClientError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|resolved| match resolved {
            Ok(outcome) => outcome,
            // The in-flight task only drops the sender when the runtime is
            // shutting down underneath it.
            Err(_) => Err(ClientError::ConnectionClosed),
        })
    }
}

/// Client for the analytics service management and query surface.
pub struct AnalyticsClient {
    connection: Arc<Connection>,
    management_timeout: Duration,
    query_timeout: Duration,
}

impl AnalyticsClient {
    /// Client with default timeouts. Use [`AnalyticsClientBuilder`] to tune
    /// them.
    pub fn new(transport: Arc<dyn NativeTransport>) -> Self {
        AnalyticsClientBuilder::new(transport).build()
    }

    pub(crate) fn from_parts(
        connection: Connection,
        management_timeout: Duration,
        query_timeout: Duration,
    ) -> Self {
        Self {
            connection: Arc::new(connection),
            management_timeout,
            query_timeout,
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Generic dispatch entry point: validates the argument bag against the
    /// operation kind, then submits the typed command.
    ///
    /// Lifecycle and validation failures are returned synchronously, without
    /// contacting the native core. On success the returned handle resolves
    /// exactly once.
    pub fn dispatch(
        &self,
        operation: ManagementOperation,
        args: &OperationArgs,
        options: DispatchOptions,
    ) -> Result<OperationHandle, ClientError> {
        if !self.connection.is_open() {
            return Err(ClientError::ConnectionClosed);
        }
        let command = Command::from_args(operation, args)?;
        self.submit(command, options)
    }

    /// Typed dispatch entry point. Non-blocking: the command is validated,
    /// handed to the native core on a spawned task, and the handle is
    /// returned immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(
        &self,
        command: Command,
        options: DispatchOptions,
    ) -> Result<OperationHandle, ClientError> {
        if !self.connection.is_open() {
            return Err(ClientError::ConnectionClosed);
        }
        command.validate()?;

        let timeout = options.timeout.unwrap_or_else(|| self.default_timeout(&command));
        let transport = self.connection.transport();
        let mut closed = self.connection.closed_signal();
        let id = Uuid::new_v4();
        let name = command.name();

        debug!(
            operation = name,
            id = %id,
            state = ?OperationState::Created,
            timeout_ms = timeout.as_millis() as u64,
            "management operation created"
        );

        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            debug!(operation = name, id = %id, state = ?OperationState::Submitted, "submitted to native core");
            let outcome = tokio::select! {
                result = transport.execute(command) => match result {
                    Ok(payload) => {
                        debug!(operation = name, id = %id, state = ?OperationState::Completed, "operation completed");
                        Ok(payload)
                    }
                    Err(err) => {
                        warn!(operation = name, id = %id, state = ?OperationState::Failed, code = err.code, "native core reported failure");
                        Err(ClientError::Native(err))
                    }
                },
                _ = tokio::time::sleep(timeout) => {
                    warn!(operation = name, id = %id, state = ?OperationState::TimedOut, timeout_ms = timeout.as_millis() as u64, "operation timed out");
                    Err(ClientError::Timeout(timeout))
                }
                _ = connection_closed(&mut closed) => {
                    warn!(operation = name, id = %id, state = ?OperationState::Failed, "connection closed mid-flight");
                    Err(ClientError::ConnectionClosed)
                }
            };
            // The handle may have been dropped; resolution is still complete.
            let _ = tx.send(outcome);
        });

        Ok(OperationHandle { id, rx })
    }

    fn default_timeout(&self, command: &Command) -> Duration {
        if command.is_query() {
            self.query_timeout
        } else {
            self.management_timeout
        }
    }

    pub(crate) async fn execute(&self, command: Command) -> Result<Value, ClientError> {
        self.submit(command, DispatchOptions::default())?.await
    }
}

async fn connection_closed(closed: &mut watch::Receiver<bool>) {
    loop {
        if *closed.borrow_and_update() {
            return;
        }
        // A dropped sender means the connection itself is gone.
        if closed.changed().await.is_err() {
            return;
        }
    }
}

impl std::fmt::Debug for AnalyticsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyticsClient")
            .field("open", &self.connection.is_open())
            .field("management_timeout", &self.management_timeout)
            .field("query_timeout", &self.query_timeout)
            .finish()
    }
}
