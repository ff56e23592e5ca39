//! Shared test infrastructure

use renderd::server::Listener;
use renderd::{Config, Server, ServerBuilder};
use std::sync::Arc;

/// A config bound to an ephemeral loopback port.
pub fn loopback_config() -> Config {
    let mut config = Config::default();
    config.server.host = "127.0.0.1".to_string();
    config.server.port = 0;
    config
}

/// Build a server, assemble its pipeline, and bind it.
pub async fn start(config: Config) -> (Server, Arc<Listener>) {
    let server = ServerBuilder::new().with_config(config).build();
    server.ready().await.expect("pipeline assembly failed");
    let listener = server.listen().await.expect("bind failed");
    (server, listener)
}

/// Client-facing base URL of a network listener.
pub fn base_url(listener: &Listener) -> String {
    format!("http://127.0.0.1:{}", listener.port().expect("network listener"))
}
