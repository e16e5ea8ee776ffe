//! Demo HTTP server hosting a couple of pages behind the device view layer.

pub mod error;
pub mod health;
pub mod router;
pub mod shutdown;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::Config;
use crate::detect::DeviceClassifier;
use crate::listener::DeviceViewListener;
use crate::server::router::build_router;
use crate::server::shutdown::shutdown_signal;

pub use error::ServerError;

pub struct DeviceViewServer {
    pub addr: SocketAddr,
    /// The bound listener, populated by bind(), consumed by run().
    listener: TcpListener,
    view_listener: Arc<DeviceViewListener>,
}

impl DeviceViewServer {
    /// Bind the configured address.
    pub async fn bind(
        config: Arc<Config>,
        classifier: Arc<dyn DeviceClassifier>,
    ) -> Result<Self, ServerError> {
        let bind_addr = config.server.bind_addr.clone();
        let addr: SocketAddr = bind_addr
            .parse()
            .map_err(|e| ServerError::InvalidBindAddress {
                addr: bind_addr.clone(),
                source: e,
            })?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind { addr, source: e })?;
        let addr = listener.local_addr()?;
        tracing::info!("Device view server bound to {}", addr);

        Ok(Self {
            addr,
            listener,
            view_listener: Arc::new(DeviceViewListener::new(config, classifier)),
        })
    }

    /// Serve until Ctrl-C / SIGTERM.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("Starting device view server on {}", self.addr);

        let app = build_router(self.view_listener);
        axum::serve(self.listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server stopped");
        Ok(())
    }
}
