//! Bound listeners and forced-destroy shutdown
//!
//! A [`Listener`] owns one bound socket: TCP (plain or TLS) or a Unix
//! domain socket. Shutdown is always a forced destroy; in-flight
//! connections are dropped, never drained.

use crate::server::state::{dispatch_request, AppState};
use crate::utils::error::{Result, ServerError};
use crate::utils::net::display_host;
use actix_web::dev::ServerHandle;
use actix_web::{web, App, HttpServer};
use std::fs::File;
use std::io::{self, BufReader};
use std::sync::atomic::{AtomicU8, Ordering};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

const LISTENING: u8 = 0;
const DESTROYED: u8 = 1;

/// What a listener ended up bound to.
#[derive(Debug, Clone)]
pub enum BoundAddress {
    Network {
        /// Host as configured, before display mapping
        host: String,
        /// Resolved port (meaningful when the configured port was 0)
        port: u16,
        secure: bool,
    },
    Socket {
        path: String,
    },
}

/// Everything needed to bind one listener.
pub struct ListenOptions {
    pub host: String,
    pub port: u16,
    /// Unix socket path; takes precedence over host/port when set
    pub socket: Option<String>,
    pub workers: usize,
    /// TLS configuration; ignored for Unix sockets
    pub tls: Option<rustls::ServerConfig>,
}

/// One live listener.
#[derive(Debug)]
pub struct Listener {
    address: BoundAddress,
    handle: ServerHandle,
    state: AtomicU8,
    task: Mutex<Option<JoinHandle<io::Result<()>>>>,
}

impl Listener {
    /// Bind a socket and start serving on it.
    pub fn bind(options: ListenOptions, state: AppState) -> Result<Self> {
        let data = web::Data::new(state);
        let mut server = HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .default_service(web::route().to(dispatch_request))
        })
        .workers(options.workers)
        .shutdown_timeout(0)
        .disable_signals();

        let address = if let Some(path) = options.socket {
            server = server.bind_uds(&path).map_err(|source| ServerError::Bind {
                addr: path.clone(),
                source,
            })?;
            BoundAddress::Socket { path }
        } else {
            let target = format!("{}:{}", options.host, options.port);
            let secure = options.tls.is_some();
            server = match options.tls {
                Some(tls) => server
                    .bind_rustls_0_23(target.as_str(), tls)
                    .map_err(|source| ServerError::Bind {
                        addr: target.clone(),
                        source,
                    })?,
                None => server
                    .bind(target.as_str())
                    .map_err(|source| ServerError::Bind {
                        addr: target.clone(),
                        source,
                    })?,
            };
            let resolved = server.addrs().into_iter().next().ok_or_else(|| {
                ServerError::Bind {
                    addr: target.clone(),
                    source: io::Error::new(io::ErrorKind::AddrNotAvailable, "no bound address"),
                }
            })?;
            BoundAddress::Network {
                host: options.host,
                port: resolved.port(),
                secure,
            }
        };

        let server = server.run();
        let handle = server.handle();
        let task = tokio::spawn(server);

        debug!(address = ?address, "listener bound");
        Ok(Self {
            address,
            handle,
            state: AtomicU8::new(LISTENING),
            task: Mutex::new(Some(task)),
        })
    }

    pub fn address(&self) -> &BoundAddress {
        &self.address
    }

    /// Resolved port, for network listeners.
    pub fn port(&self) -> Option<u16> {
        match &self.address {
            BoundAddress::Network { port, .. } => Some(*port),
            BoundAddress::Socket { .. } => None,
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.state.load(Ordering::SeqCst) == DESTROYED
    }

    /// The URL operators should see, after display mapping.
    pub fn display_url(&self) -> String {
        match &self.address {
            BoundAddress::Network { host, port, secure } => {
                let scheme = if *secure { "https" } else { "http" };
                format!("{scheme}://{}:{port}", display_host(host))
            }
            BoundAddress::Socket { path } => format!("unix+http://{path}"),
        }
    }

    /// Tear the listener down, dropping in-flight connections.
    ///
    /// Idempotent; the second and later calls resolve immediately.
    pub async fn destroy(&self) -> Result<()> {
        if self.state.swap(DESTROYED, Ordering::SeqCst) == DESTROYED {
            return Ok(());
        }
        info!(url = %self.display_url(), "destroying listener");

        // stop(false) skips the graceful drain entirely.
        self.handle.stop(false).await;

        if let Some(task) = self.task.lock().await.take() {
            match task.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => return Err(ServerError::Shutdown(e.to_string())),
                Err(e) => {
                    return Err(ServerError::Shutdown(format!("listener task failed: {e}")))
                }
            }
        }

        if let BoundAddress::Socket { path } = &self.address {
            let _ = std::fs::remove_file(path);
        }
        Ok(())
    }
}

/// Load a rustls server configuration from PEM files on disk.
pub fn load_tls_config(cert_file: &str, key_file: &str) -> Result<rustls::ServerConfig> {
    let certs = rustls_pemfile::certs(&mut BufReader::new(File::open(cert_file)?))
        .collect::<io::Result<Vec<_>>>()
        .map_err(|e| ServerError::Config(format!("invalid certificate {cert_file}: {e}")))?;

    let key = rustls_pemfile::private_key(&mut BufReader::new(File::open(key_file)?))
        .map_err(|e| ServerError::Config(format!("invalid private key {key_file}: {e}")))?
        .ok_or_else(|| ServerError::Config(format!("no private key found in {key_file}")))?;

    rustls::ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|e| ServerError::Config(format!("TLS configuration rejected: {e}")))
}
