//! Binding, address display, and shutdown behavior

use crate::common::{loopback_config, start};
use renderd::{Config, ServerBuilder, ServerError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;

#[tokio::test]
async fn test_loopback_listener_displays_as_localhost() {
    let (server, listener) = start(loopback_config()).await;

    let url = listener.display_url();
    assert!(url.starts_with("http://localhost:"), "got {url}");
    assert!(!url.contains("127.0.0.1"));

    server.close().await.unwrap();
}

#[tokio::test]
async fn test_wildcard_listener_never_displays_the_wildcard() {
    let mut config = loopback_config();
    config.server.host = "0.0.0.0".to_string();
    let (server, listener) = start(config).await;

    assert!(!listener.display_url().contains("0.0.0.0"));

    server.close().await.unwrap();
}

#[tokio::test]
async fn test_unix_socket_takes_precedence_and_serves_requests() {
    let dir = tempfile::tempdir().unwrap();
    let socket_path = dir.path().join("renderd.sock");

    let mut config = Config::default();
    // host/port must be ignored entirely when a socket path is set
    config.server.host = "host.invalid".to_string();
    config.server.port = 1;
    config.server.socket = Some(socket_path.to_string_lossy().into_owned());

    let (server, listener) = start(config).await;
    assert_eq!(
        listener.display_url(),
        format!("unix+http://{}", socket_path.display())
    );

    let mut stream = UnixStream::connect(&socket_path).await.unwrap();
    stream
        .write_all(b"GET /about HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    assert!(response.starts_with("HTTP/1.1 200"), "got {response}");
    assert!(response.contains("/about"));

    server.close().await.unwrap();
    assert!(!socket_path.exists(), "socket file not cleaned up");
}

#[tokio::test]
async fn test_close_is_idempotent_and_destroys_listeners() {
    let (server, listener) = start(loopback_config()).await;
    let port = listener.port().unwrap();

    server.close().await.unwrap();
    assert!(listener.is_destroyed());
    // Closing again is a no-op, not an error.
    server.close().await.unwrap();

    let refused = tokio::net::TcpStream::connect(("127.0.0.1", port)).await;
    assert!(refused.is_err(), "socket still accepting after close");
}

#[tokio::test]
async fn test_unresolved_middleware_fails_before_any_bind() {
    let mut config = loopback_config();
    config.server_middleware = vec![renderd::config::ServerMiddlewareConfig::Named(
        "no-such-module".to_string(),
    )];

    let server = ServerBuilder::new().with_config(config).build();
    let err = server.ready().await.unwrap_err();
    assert!(matches!(err, ServerError::Resolution(name) if name == "no-such-module"));
    assert!(server.listeners().is_empty());
}

#[tokio::test]
async fn test_injected_tls_config_serves_every_https_listener() {
    let tls = renderd::server::listener::load_tls_config(
        concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/cert.pem"),
        concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/key.pem"),
    )
    .unwrap();

    let mut config = loopback_config();
    config.server.https = Some(renderd::config::HttpsConfig::Enabled(true));

    let server = ServerBuilder::new()
        .with_config(config)
        .with_tls(tls)
        .build();
    server.ready().await.unwrap();

    // The override is shared, not consumed: a second bind works too.
    let first = server.listen().await.unwrap();
    let second = server.listen().await.unwrap();
    assert!(first.display_url().starts_with("https://localhost:"));
    assert!(second.display_url().starts_with("https://localhost:"));
    assert_ne!(first.port(), second.port());

    server.close().await.unwrap();
}

#[tokio::test]
async fn test_listen_hook_sees_the_live_listener() {
    use renderd::hooks::{events, HookBus};
    use std::sync::{Arc, Mutex};

    let seen: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
    let hooks = HookBus::new();
    {
        let seen = seen.clone();
        hooks.hook(events::LISTEN, move |payload| {
            let seen = seen.clone();
            async move {
                if let Some(listener) = payload.listener() {
                    *seen.lock().unwrap() = Some(listener.display_url());
                }
                Ok(())
            }
        });
    }

    let server = ServerBuilder::new()
        .with_config(loopback_config())
        .with_hooks(hooks)
        .build();
    server.ready().await.unwrap();
    let listener = server.listen().await.unwrap();

    assert_eq!(seen.lock().unwrap().as_deref(), Some(listener.display_url().as_str()));
    server.close().await.unwrap();
}
