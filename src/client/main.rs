/**
 * pollcast Watch Entry Point
 *
 * Long-polls one channel and prints every event as a JSON line.
 *
 * Environment:
 * - `POLLCAST_SERVER_URL` (default `http://127.0.0.1:3000`)
 * - `POLLCAST_TOKEN` - bearer token for the poll endpoints
 * - `POLLCAST_CHANNEL` - `feed:global` (default) or `thread:<uuid>`
 * - `POLL_DEADLINE_SECS` - server deadline the request timeout is derived from
 */

use std::sync::Arc;

use pollcast::client::{Config, HttpTransport, PollClient};
use pollcast::shared::ChannelKey;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = Config::from_env()?;
    let channel = match std::env::var("POLLCAST_CHANNEL") {
        Ok(raw) if !raw.trim().is_empty() => ChannelKey::new(raw.trim())?,
        _ => ChannelKey::feed(),
    };
    if config.get_token().is_none() {
        tracing::warn!("[Client] POLLCAST_TOKEN is not set; the server will answer 401");
    }

    let backoff = config.backoff().clone();
    let transport = Arc::new(HttpTransport::new(config)?);
    let client = PollClient::new(transport, channel.clone())
        .with_backoff(backoff)
        .on_event(|envelope| match serde_json::to_string(&envelope) {
            Ok(line) => println!("{}", line),
            Err(e) => tracing::error!("[Client] Failed to encode event: {}", e),
        })
        .on_error(|error| tracing::error!("[Client] {}", error));

    tracing::info!("[Client] Watching {}", channel);
    client.start();

    tokio::signal::ctrl_c().await?;
    client.stop().await;
    tracing::info!("[Client] Stopped");
    Ok(())
}

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .init();
}
