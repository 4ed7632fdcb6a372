//! Connects to a tool, runs the standard bring-up and prints every decoded
//! record as JSON.
//!
//! ```sh
//! cargo run --example monitor -- 192.168.2.5:5000
//! ```

use danikor_client::{Body, Client};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().init();

    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "192.168.2.5:5000".to_string());

    let mut client = Client::builder(&addr)
        .pset(2)
        .forward_rotation()
        .connect()
        .await?;

    while let Some(message) = client.recv().await {
        match &message.body {
            Body::Curve(sample) => {
                println!("curve  {}", serde_json::to_string(sample)?);
            }
            Body::Result(result) => {
                println!("result {}", serde_json::to_string(result)?);
            }
            Body::Unknown => {
                println!(
                    "mid {} ({} payload bytes)",
                    message.frame.message_id(),
                    message.frame.payload_len()
                );
            }
        }
    }

    client.wait_for_shutdown().await?;
    Ok(())
}
