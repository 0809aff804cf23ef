//! HTTP surface for cinevision.
//!
//! The binary in `main.rs` parses [`cli::Args`], loads the config and hands a
//! listener to [`serve`]. Tests drive the same router on an ephemeral port.

pub mod cli;
pub mod error;
pub mod routes;
pub mod state;

use std::future::Future;

use tokio::net::TcpListener;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;

/// Serves the API on `listener` until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let app = create_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}
