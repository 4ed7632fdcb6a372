//! # danikor-client
//!
//! Client driver for Danikor electromechanical torque-control tools, which
//! speak a proprietary length-prefixed ASCII-over-TCP protocol.
//!
//! ## Architecture
//!
//! - **Framing** ([`protocol`]): STX / big-endian length / mode /
//!   4-character message id / payload / ETX, with a reassembly buffer that
//!   never assumes one socket read equals one frame.
//! - **Payload codec** ([`codec`]): decodes the `;`-delimited `key=value`
//!   bodies of the two known message types into typed records: real-time
//!   curve samples (`"0203"`) and final tightening results (`"0202"`).
//!   Decoding is lenient: malformed segments are dropped, unknown message
//!   ids pass through raw.
//! - **Connection** ([`connection`], [`Client`]): dial with unbounded
//!   1-second retry, a strictly sequential command/response exchange for
//!   setup, then a continuous receive loop pushing decoded records into a
//!   bounded channel.
//!
//! ## Example
//!
//! ```ignore
//! use danikor_client::{Body, Client};
//!
//! #[tokio::main]
//! async fn main() -> danikor_client::Result<()> {
//!     let mut client = Client::builder("192.168.2.5:5000")
//!         .pset(2)
//!         .connect()
//!         .await?;
//!
//!     while let Some(message) = client.recv().await {
//!         match message.body {
//!             Body::Curve(sample) => println!("torque: {:?}", sample.torque),
//!             Body::Result(result) => println!("status: {}", result.final_status),
//!             Body::Unknown => {}
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod commands;
pub mod connection;
pub mod error;
pub mod protocol;

mod client;

pub use client::{Client, ClientBuilder};
pub use codec::{Body, CurveSample, Message, StageResult, TightenResult};
pub use connection::{Connection, ConnectionConfig};
pub use error::{DriverError, Result};
pub use protocol::Frame;
