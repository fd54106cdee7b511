//! Emulator of the HAProxy admin unix socket serving sample data.

pub mod conn;
pub mod state;

use tokio::net::UnixListener;
use tracing::{debug, warn};

pub use state::AppState;

/// Accept clients forever, one task per connection.
pub async fn serve(listener: UnixListener, state: AppState) -> std::io::Result<()> {
    loop {
        let (stream, _) = listener.accept().await?;
        debug!("client connected");
        let st = state.clone();
        tokio::spawn(async move {
            if let Err(e) = conn::handle(stream, st).await {
                warn!(error = %e, "connection ended with error");
            }
        });
    }
}
