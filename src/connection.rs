//! TCP connection to the tool controller.
//!
//! [`Connection`] owns the socket and the reassembly buffer. It offers
//! `dial` (connect with unbounded fixed-interval retry), `send_command`
//! (strict request-then-response, used for the one-time setup exchanges)
//! and `run` (the continuous receive loop feeding decoded records into an
//! mpsc channel).
//!
//! The protocol carries no correlation identifier; ordering is the only
//! correlation mechanism. `run` therefore consumes the connection, so the
//! type system rules out a `send_command` racing the receive loop over the
//! same socket.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

use crate::codec::Message;
use crate::commands;
use crate::error::{DriverError, Result};
use crate::protocol::{encode_command, Frame, FrameBuffer, DEFAULT_MAX_PAYLOAD_SIZE};

/// Read buffer size. Device frames are small; the reassembly buffer copes
/// with frames larger than a single read.
const READ_BUF_SIZE: usize = 1024;

/// Connection tuning knobs.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Delay between connect attempts.
    pub retry_interval: Duration,
    /// Optional deadline per socket read. `None` blocks indefinitely.
    pub read_timeout: Option<Duration>,
    /// Maximum accepted payload size per frame.
    pub max_payload: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            retry_interval: Duration::from_secs(1),
            read_timeout: None,
            max_payload: DEFAULT_MAX_PAYLOAD_SIZE,
        }
    }
}

/// An established connection to the tool.
pub struct Connection {
    stream: TcpStream,
    buffer: FrameBuffer,
    /// Frames reassembled beyond the one currently requested. TCP may
    /// coalesce a command response with subsequent data frames.
    pending: VecDeque<Frame>,
    read_buf: Vec<u8>,
    read_timeout: Option<Duration>,
}

impl Connection {
    /// Connect to the tool, retrying at a fixed interval until it succeeds.
    ///
    /// Connect failures are transient by definition here: they are logged
    /// and retried without bound, never surfaced as fatal.
    pub async fn dial(addr: &str, config: ConnectionConfig) -> Self {
        loop {
            match TcpStream::connect(addr).await {
                Ok(stream) => {
                    tracing::debug!(%addr, "connected");
                    return Self {
                        stream,
                        buffer: FrameBuffer::with_max_payload(config.max_payload),
                        pending: VecDeque::new(),
                        read_buf: vec![0u8; READ_BUF_SIZE],
                        read_timeout: config.read_timeout,
                    };
                }
                Err(e) => {
                    tracing::warn!(%addr, error = %e, "failed to dial, retrying");
                    tokio::time::sleep(config.retry_interval).await;
                }
            }
        }
    }

    /// Write a command and block until its response frame arrives.
    ///
    /// Only one command may be outstanding at a time; each call is
    /// strictly request-then-response. Frames are reassembled through the
    /// buffer, so split or coalesced responses decode correctly.
    pub async fn send_command(&mut self, command: &[u8]) -> Result<Message> {
        let wire = encode_command(command);
        self.stream.write_all(&wire).await?;
        self.stream.flush().await?;

        let frame = self.next_frame().await?;
        Ok(Message::decode(frame))
    }

    /// Handshake / establish communication.
    pub async fn establish(&mut self) -> Result<Message> {
        self.send_command(commands::ESTABLISH).await
    }

    /// Subscribe to real-time curve data.
    pub async fn subscribe_curve_data(&mut self) -> Result<Message> {
        self.send_command(commands::SUBSCRIBE_CURVE).await
    }

    /// Subscribe to final result data.
    pub async fn subscribe_result_data(&mut self) -> Result<Message> {
        self.send_command(commands::SUBSCRIBE_RESULT).await
    }

    /// Command forward rotation.
    pub async fn forward_rotation(&mut self) -> Result<Message> {
        self.send_command(commands::FORWARD_ROTATION).await
    }

    /// Select the active program set (1-8).
    ///
    /// Fails with [`DriverError::PsetOutOfRange`] before any I/O when the
    /// number is out of range.
    pub async fn select_pset(&mut self, pset: u8) -> Result<Message> {
        let command = commands::pset_select(pset)?;
        self.send_command(&command).await
    }

    /// Run the continuous receive loop, sending each decoded record into
    /// `tx`.
    ///
    /// Returns `Ok(())` when the peer closes the connection cleanly or the
    /// consumer drops the channel, and an error on I/O or framing
    /// failures. The loop never reconnects by itself; after it returns the
    /// caller must dial and set up afresh.
    pub async fn run(mut self, tx: mpsc::Sender<Message>) -> Result<()> {
        loop {
            let frame = tokio::select! {
                _ = tx.closed() => {
                    tracing::debug!("consumer gone, stopping receive loop");
                    return Ok(());
                }
                frame = self.next_frame() => match frame {
                    Ok(frame) => frame,
                    Err(DriverError::ConnectionClosed) => {
                        tracing::debug!("peer closed connection");
                        return Ok(());
                    }
                    Err(e) => return Err(e),
                },
            };

            let message = Message::decode(frame);
            tracing::debug!(
                message_id = %message.frame.message_id(),
                payload_len = message.frame.payload_len(),
                "frame received"
            );

            if tx.send(message).await.is_err() {
                return Ok(());
            }
        }
    }

    /// Get the next complete frame, reading from the socket as needed.
    async fn next_frame(&mut self) -> Result<Frame> {
        loop {
            if let Some(frame) = self.pending.pop_front() {
                return Ok(frame);
            }

            let n = self.read_some().await?;
            if n == 0 {
                return Err(DriverError::ConnectionClosed);
            }

            let frames = self.buffer.push(&self.read_buf[..n])?;
            self.pending.extend(frames);
        }
    }

    /// One socket read, honoring the configured deadline if any.
    async fn read_some(&mut self) -> Result<usize> {
        match self.read_timeout {
            Some(deadline) => {
                match tokio::time::timeout(deadline, self.stream.read(&mut self.read_buf)).await {
                    Ok(read) => Ok(read?),
                    Err(_) => Err(DriverError::ReadTimeout),
                }
            }
            None => Ok(self.stream.read(&mut self.read_buf).await?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    /// Frame a device-style message for test servers.
    fn device_frame(mode: u8, message_id: &str, payload: &[u8]) -> Vec<u8> {
        let mut body = vec![mode];
        body.extend_from_slice(message_id.as_bytes());
        body.extend_from_slice(payload);
        encode_command(&body)
    }

    async fn connect_pair() -> (Connection, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr = addr.to_string();
        let dial = Connection::dial(&addr, ConnectionConfig::default());
        let accept = async { listener.accept().await.unwrap().0 };
        let (conn, server) = tokio::join!(dial, accept);
        (conn, server)
    }

    #[tokio::test]
    async fn test_send_command_fragmented_response() {
        let (mut conn, mut server) = connect_pair().await;

        let reply = device_frame(b'r', "0001", b"");
        let server_task = tokio::spawn(async move {
            let mut buf = vec![0u8; 64];
            let n = server.read(&mut buf).await.unwrap();
            assert_eq!(&buf[..n], encode_command(commands::ESTABLISH).as_slice());

            // Response split across two writes.
            server.write_all(&reply[..4]).await.unwrap();
            server.flush().await.unwrap();
            tokio::time::sleep(Duration::from_millis(10)).await;
            server.write_all(&reply[4..]).await.unwrap();
        });

        let message = conn.establish().await.unwrap();
        assert_eq!(message.frame.message_id(), "0001");
        server_task.await.unwrap();
    }

    #[tokio::test]
    async fn test_coalesced_frames_are_not_lost() {
        let (mut conn, mut server) = connect_pair().await;

        let mut burst = device_frame(b'r', "0103", b"");
        burst.extend(device_frame(b'r', "0203", b"0102=2;"));

        let server_task = tokio::spawn(async move {
            let mut buf = vec![0u8; 64];
            let _ = server.read(&mut buf).await.unwrap();
            // Reply and a data frame coalesced into one write.
            server.write_all(&burst).await.unwrap();
            // Keep the socket open until the client is done reading.
            tokio::time::sleep(Duration::from_millis(50)).await;
        });

        let reply = conn.select_pset(2).await.unwrap();
        assert_eq!(reply.frame.message_id(), "0103");

        // The coalesced data frame is buffered, not dropped.
        let next = conn.next_frame().await.unwrap();
        assert_eq!(next.message_id(), "0203");
        server_task.await.unwrap();
    }

    #[tokio::test]
    async fn test_select_pset_rejects_range_without_io() {
        let (mut conn, _server) = connect_pair().await;
        let err = conn.select_pset(0).await.unwrap_err();
        assert!(matches!(err, DriverError::PsetOutOfRange(0)));
        let err = conn.select_pset(9).await.unwrap_err();
        assert!(matches!(err, DriverError::PsetOutOfRange(9)));
    }

    #[tokio::test]
    async fn test_read_timeout_is_typed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let config = ConnectionConfig {
            read_timeout: Some(Duration::from_millis(20)),
            ..ConnectionConfig::default()
        };
        let addr = addr.to_string();
        let dial = Connection::dial(&addr, config);
        let accept = async { listener.accept().await.unwrap().0 };
        let (mut conn, _server) = tokio::join!(dial, accept);

        // Server never answers.
        let err = conn.send_command(commands::ESTABLISH).await.unwrap_err();
        assert!(matches!(err, DriverError::ReadTimeout));
    }

    #[tokio::test]
    async fn test_run_sends_decoded_records_and_ends_on_close() {
        let (conn, mut server) = connect_pair().await;

        let curve = device_frame(b'r', "0203", b"0202=1;0301=12.5,13.0;");
        let result = device_frame(b'r', "0202", b"00011=1;00012=00;");
        let server_task = tokio::spawn(async move {
            server.write_all(&curve).await.unwrap();
            server.write_all(&result).await.unwrap();
            // Dropping the socket ends the loop cleanly.
        });

        let (tx, mut rx) = mpsc::channel(8);
        let loop_task = tokio::spawn(conn.run(tx));

        let first = rx.recv().await.unwrap();
        assert!(first.as_curve().unwrap().is_curve_start);
        assert_eq!(first.as_curve().unwrap().torque, [12.5, 13.0]);

        let second = rx.recv().await.unwrap();
        assert_eq!(second.as_result().unwrap().final_status, "1");

        assert!(rx.recv().await.is_none());
        loop_task.await.unwrap().unwrap();
        server_task.await.unwrap();
    }

    #[tokio::test]
    async fn test_run_surfaces_framing_error_mid_session() {
        let (conn, mut server) = connect_pair().await;

        let curve = device_frame(b'r', "0203", b"0202=1;");
        let server_task = tokio::spawn(async move {
            server.write_all(&curve).await.unwrap();
            server.flush().await.unwrap();
            tokio::time::sleep(Duration::from_millis(10)).await;
            // Desynchronized garbage where the next STX should be.
            server.write_all(&[0xFF, 0x00, 0x00, 0x00, 0x05]).await.unwrap();
            tokio::time::sleep(Duration::from_millis(50)).await;
        });

        // Keep the receiver alive so the loop can only end via the error.
        let (tx, mut rx) = mpsc::channel(8);
        let loop_task = tokio::spawn(conn.run(tx));

        // The loop ends with a typed error, not Ok and not a panic.
        let outcome = loop_task.await.unwrap();
        assert!(matches!(outcome, Err(DriverError::InvalidFraming(_))));

        // The frame ahead of the corruption was still delivered.
        let first = rx.recv().await.unwrap();
        assert!(first.as_curve().unwrap().is_curve_start);
        assert!(rx.recv().await.is_none());
        server_task.await.unwrap();
    }

    #[tokio::test]
    async fn test_run_stops_when_consumer_drops() {
        let (conn, _server) = connect_pair().await;
        let (tx, rx) = mpsc::channel(8);
        let loop_task = tokio::spawn(conn.run(tx));

        drop(rx);
        loop_task.await.unwrap().unwrap();
    }
}
