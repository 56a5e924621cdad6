// Content server lifecycle: probe, build routes, bind, serve, stop.

use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::api;
use crate::assets::StaticAssets;
use crate::error::{Result, ServerError};
use crate::metrics;

/// What a server instance needs to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Port to listen on. `0` asks the OS for a free one.
    pub port: u16,
    /// Build output directory to serve, if it exists at start.
    pub static_dir: PathBuf,
}

/// A content server that has not started yet.
#[derive(Debug)]
pub struct Server {
    config: ServerConfig,
}

impl Server {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Probe for a build, bind the listener and start serving in the background.
    ///
    /// The probe runs to completion before the socket is bound, so the first
    /// request already sees the final route table.
    pub async fn start(self) -> Result<ServerHandle> {
        metrics::register_metrics();

        let assets = StaticAssets::probe(&self.config.static_dir).await;
        let serves_static = assets.is_some();
        metrics::STATIC_ENABLED.set(i64::from(serves_static));

        let app = api::router(assets);

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Server listening on http://localhost:{}", local_addr.port());
        tracing::info!("API endpoint: GET /api/health");

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    // Resolves on an explicit stop or when the handle is dropped.
                    let _ = shutdown_rx.await;
                })
                .await
        });

        Ok(ServerHandle {
            local_addr,
            serves_static,
            shutdown: shutdown_tx,
            task,
        })
    }
}

/// A running server. Dropping the handle shuts the server down.
#[derive(Debug)]
pub struct ServerHandle {
    local_addr: SocketAddr,
    serves_static: bool,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<std::io::Result<()>>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Whether the startup probe found a build to serve.
    pub fn serves_static(&self) -> bool {
        self.serves_static
    }

    /// Loopback base URL for this instance, e.g. `http://127.0.0.1:5000`.
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.local_addr.port())
    }

    /// Stop accepting connections, let in-flight requests finish, and wait.
    pub async fn stop(self) -> Result<()> {
        let _ = self.shutdown.send(());
        self.task.await??;
        tracing::info!("Server on port {} stopped", self.local_addr.port());
        Ok(())
    }

    /// Serve until `signal` resolves, then stop gracefully. Returns early with
    /// the error if the serve loop dies on its own.
    pub async fn run_until<F>(self, signal: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let ServerHandle {
            local_addr,
            shutdown,
            mut task,
            ..
        } = self;

        let finished = tokio::select! {
            _ = signal => None,
            res = &mut task => Some(res),
        };

        let res = match finished {
            Some(res) => res,
            None => {
                tracing::info!("Shutdown signal received");
                let _ = shutdown.send(());
                task.await
            }
        };
        res?.map_err(ServerError::Serve)?;

        tracing::info!("Server on port {} stopped", local_addr.port());
        Ok(())
    }
}
