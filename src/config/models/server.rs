//! Listener configuration

use serde::Deserialize;

/// Where and how the server listens.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
    /// Unix socket path. Takes precedence over host/port when set.
    pub socket: Option<String>,
    /// TLS configuration. Absent means plain HTTP.
    pub https: Option<HttpsConfig>,
    /// Actix worker threads per listener
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            socket: None,
            https: None,
            workers: 1,
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.host.is_empty() && self.socket.is_none() {
            return Err("host must not be empty".to_string());
        }
        if self.workers == 0 {
            return Err("workers must be at least 1".to_string());
        }
        if let Some(socket) = &self.socket {
            if socket.is_empty() {
                return Err("socket path must not be empty".to_string());
            }
        }
        Ok(())
    }

    /// Whether TLS is requested at all.
    pub fn https_enabled(&self) -> bool {
        match &self.https {
            None => false,
            Some(HttpsConfig::Enabled(enabled)) => *enabled,
            Some(HttpsConfig::Files(_)) => true,
        }
    }

    /// Certificate and key paths, when configured as files.
    pub fn tls_files(&self) -> Option<&TlsFiles> {
        match &self.https {
            Some(HttpsConfig::Files(files)) => Some(files),
            _ => None,
        }
    }

    pub fn merge(mut self, other: ServerConfig) -> Self {
        self.host = other.host;
        self.port = other.port;
        if other.socket.is_some() {
            self.socket = other.socket;
        }
        if other.https.is_some() {
            self.https = other.https;
        }
        self.workers = other.workers;
        self
    }
}

/// TLS switch: either a bare boolean or certificate/key paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum HttpsConfig {
    Enabled(bool),
    Files(TlsFiles),
}

/// PEM-encoded certificate chain and private key on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct TlsFiles {
    pub cert_file: String,
    pub key_file: String,
}
