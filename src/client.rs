//! Client builder and runtime loop.
//!
//! The [`ClientBuilder`] configures the connection and the standard
//! bring-up sequence; [`Client::builder`] + `connect()` manages the
//! lifecycle:
//! 1. Dial with retry
//! 2. Establish communication
//! 3. Optionally select a program set and command forward rotation
//! 4. Subscribe to curve and result data
//! 5. Spawn the receive loop feeding a bounded channel
//!
//! Setup commands run strictly sequentially before the loop starts; a
//! setup failure aborts `connect()` with the typed error.
//!
//! # Example
//!
//! ```ignore
//! use danikor_client::Client;
//!
//! #[tokio::main]
//! async fn main() -> danikor_client::Result<()> {
//!     let mut client = Client::builder("192.168.2.5:5000")
//!         .pset(2)
//!         .forward_rotation()
//!         .connect()
//!         .await?;
//!
//!     while let Some(message) = client.recv().await {
//!         if let Some(sample) = message.as_curve() {
//!             println!("torque: {:?}", sample.torque);
//!         }
//!     }
//!     client.wait_for_shutdown().await
//! }
//! ```

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::codec::Message;
use crate::connection::{Connection, ConnectionConfig};
use crate::error::Result;

/// Default capacity of the decoded-record channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Builder for configuring and connecting a client.
pub struct ClientBuilder {
    addr: String,
    pset: Option<u8>,
    forward_rotation: bool,
    config: ConnectionConfig,
    channel_capacity: usize,
}

impl ClientBuilder {
    /// Create a builder for the tool at `addr` (e.g. `"192.168.2.5:5000"`).
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            pset: None,
            forward_rotation: false,
            config: ConnectionConfig::default(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    /// Select this program set during setup (1-8).
    pub fn pset(mut self, pset: u8) -> Self {
        self.pset = Some(pset);
        self
    }

    /// Command forward rotation at the end of setup.
    pub fn forward_rotation(mut self) -> Self {
        self.forward_rotation = true;
        self
    }

    /// Delay between connect attempts. Default: 1 second.
    pub fn retry_interval(mut self, interval: Duration) -> Self {
        self.config.retry_interval = interval;
        self
    }

    /// Per-read deadline. Default: none (reads block indefinitely).
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.config.read_timeout = Some(timeout);
        self
    }

    /// Maximum accepted payload size per frame.
    pub fn max_payload(mut self, max_payload: usize) -> Self {
        self.config.max_payload = max_payload;
        self
    }

    /// Capacity of the decoded-record channel. Default: 64.
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Dial, run the setup sequence and start the receive loop.
    pub async fn connect(self) -> Result<Client> {
        Client::start(self).await
    }
}

/// A running client: receive loop spawned, setup complete.
///
/// Use [`recv`](Client::recv) to take decoded records and
/// [`wait_for_shutdown`](Client::wait_for_shutdown) to block until the
/// connection closes. There is no auto-reconnect: once the loop ends the
/// client is spent and a new one must be connected.
#[derive(Debug)]
pub struct Client {
    messages: mpsc::Receiver<Message>,
    shutdown_rx: oneshot::Receiver<Result<()>>,
    _task: JoinHandle<()>,
}

impl Client {
    /// Create a new client builder.
    pub fn builder(addr: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(addr)
    }

    async fn start(builder: ClientBuilder) -> Result<Self> {
        let mut conn = Connection::dial(&builder.addr, builder.config).await;

        conn.establish().await?;
        if let Some(pset) = builder.pset {
            conn.select_pset(pset).await?;
        }
        conn.subscribe_curve_data().await?;
        conn.subscribe_result_data().await?;
        if builder.forward_rotation {
            conn.forward_rotation().await?;
        }

        let (tx, messages) = mpsc::channel(builder.channel_capacity);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task = tokio::spawn(async move {
            let outcome = conn.run(tx).await;
            if let Err(e) = &outcome {
                tracing::error!(error = %e, "receive loop ended");
            }
            let _ = shutdown_tx.send(outcome);
        });

        Ok(Self {
            messages,
            shutdown_rx,
            _task: task,
        })
    }

    /// Receive the next decoded record.
    ///
    /// Returns `None` once the receive loop has terminated and the channel
    /// is drained.
    pub async fn recv(&mut self) -> Option<Message> {
        self.messages.recv().await
    }

    /// Block until the receive loop terminates, discarding any further
    /// records, and return its final result.
    pub async fn wait_for_shutdown(mut self) -> Result<()> {
        while self.messages.recv().await.is_some() {}
        self.shutdown_rx.await.unwrap_or(Ok(()))
    }

    /// Stop the receive loop by dropping the channel and wait for it to
    /// wind down.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.messages);
        self.shutdown_rx.await.unwrap_or(Ok(()))
    }
}
