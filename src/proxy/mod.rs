//! Headline proxy: a small HTTP service that holds the upstream API key and
//! relays category queries to the headline API.

mod error;
mod routes;
mod upstream;

use std::future::Future;

pub use error::{ProxyError, SetupError};
pub use routes::{router, ProxyState};
pub use upstream::{HeadlineParams, UpstreamClient, UpstreamConfig};

/// Serve the proxy on `listener` until `shutdown` resolves.
pub async fn serve(
    listener: tokio::net::TcpListener,
    state: ProxyState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "NewsHub backend listening");
        tracing::info!("API endpoint: http://{addr}/api/news/top-headlines");
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
