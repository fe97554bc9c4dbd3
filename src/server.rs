use crate::config::StoreConfig;
use crate::errors::{Result, StorageError, StorageErrorType};
use crate::locations::get_socket_path;
use crate::notify::NotificationLog;
use crate::routes;
use crate::store::FileStore;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tokio_stream::wrappers::UnixListenerStream;

/// Everything a request handler can reach.
#[derive(Clone)]
pub struct AppState {
    pub store: FileStore,
    pub notifications: Arc<NotificationLog>,
}

impl AppState {
    pub fn new(config: StoreConfig) -> AppState {
        let notifications = Arc::new(NotificationLog::new(config.notification_capacity));
        let store = FileStore::builder(config)
            .notifier(notifications.clone())
            .build();
        AppState {
            store,
            notifications,
        }
    }
}

enum Listen {
    Tcp(SocketAddr),
    Unix(PathBuf),
}

pub struct Server {
    state: AppState,
    listen: Listen,
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!("Could not listen for shutdown signal: {}", e);
    }
}

impl Server {
    pub async fn start(&self) -> Result<()> {
        let routes = routes::routes(self.state.clone());
        match &self.listen {
            Listen::Unix(path) => {
                if path.exists() {
                    std::fs::remove_file(path)?;
                }
                let listener = tokio::net::UnixListener::bind(path)?;
                let incoming = UnixListenerStream::new(listener);
                tracing::info!("Listening on {}", path.display());
                warp::serve(routes)
                    .serve_incoming_with_graceful_shutdown(incoming, shutdown_signal())
                    .await;
            }
            Listen::Tcp(address) => {
                let (address, server) = warp::serve(routes)
                    .try_bind_with_graceful_shutdown(*address, shutdown_signal())
                    .map_err(|e| StorageError::new(StorageErrorType::IOError, e.to_string()))?;
                tracing::info!("Listening on {}", address);
                server.await;
            }
        }
        Ok(())
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        tracing::info!("Shutting down server...");
        if let Listen::Unix(path) = &self.listen {
            if let Err(e) = std::fs::remove_file(path) {
                tracing::warn!("Could not remove socket {}: {}", path.display(), e);
            }
        }
    }
}

pub fn get_server(port: Option<u16>, config: StoreConfig) -> Result<Server> {
    let listen = match port {
        Some(port) => Listen::Tcp(SocketAddr::from(([127, 0, 0, 1], port))),
        None => Listen::Unix(get_socket_path()?),
    };
    Ok(Server {
        state: AppState::new(config),
        listen,
    })
}
