//! Full round trips through a bound listener

use crate::common::{base_url, loopback_config, start};
use async_trait::async_trait;
use renderd::{
    RenderContext, RenderedRoute, Renderer, ResourceRegistry, Result, ServerBuilder, ServerError,
};
use std::sync::Arc;

#[tokio::test]
async fn test_routes_render_through_the_pipeline() {
    let (server, listener) = start(loopback_config()).await;
    let url = format!("{}/company/about?tab=team", base_url(&listener));

    let response = reqwest::get(&url).await.unwrap();
    assert_eq!(response.status(), 200);
    assert!(response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/html"));
    let body = response.text().await.unwrap();
    assert!(body.contains("/company/about?tab=team"));

    server.close().await.unwrap();
}

#[tokio::test]
async fn test_large_responses_are_gzipped_for_gzip_clients() {
    let mut config = loopback_config();
    config.render.compressor = serde_json::json!({ "threshold": 1 });
    let (server, listener) = start(config).await;

    let client = reqwest::Client::new();
    let response = client
        .get(base_url(&listener))
        .header("accept-encoding", "gzip")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers().get("content-encoding").unwrap(),
        "gzip"
    );

    // A client without gzip support gets an identity response.
    let response = client.get(base_url(&listener)).send().await.unwrap();
    assert!(response.headers().get("content-encoding").is_none());

    server.close().await.unwrap();
}

#[tokio::test]
async fn test_development_mode_serves_identity_to_gzip_clients() {
    let mut config = loopback_config();
    config.dev = true;
    config.render.compressor = serde_json::json!({ "threshold": 1 });
    let (server, listener) = start(config).await;

    let response = reqwest::Client::new()
        .get(base_url(&listener))
        .header("accept-encoding", "gzip")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert!(response.headers().get("content-encoding").is_none());
    assert!(response.text().await.unwrap().contains("<html>"));

    server.close().await.unwrap();
}

struct FailingRenderer;

#[async_trait]
impl Renderer for FailingRenderer {
    async fn ready(&self, _registry: &ResourceRegistry) -> Result<()> {
        Ok(())
    }
    async fn load_resources(&self, _registry: &ResourceRegistry) -> Result<()> {
        Ok(())
    }
    async fn render_route(&self, _url: &str, _cx: RenderContext) -> Result<RenderedRoute> {
        Err(ServerError::Render("backend unavailable".into()))
    }
}

#[tokio::test]
async fn test_render_failures_reach_clients_as_error_responses() {
    let server = ServerBuilder::new()
        .with_config(loopback_config())
        .with_renderer(Arc::new(FailingRenderer))
        .build();
    server.ready().await.unwrap();
    let listener = server.listen().await.unwrap();

    let client = reqwest::Client::new();
    let response = client
        .get(base_url(&listener))
        .header("accept", "application/json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 500);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "RENDER_ERROR");
    // Production mode never leaks renderer detail.
    assert_eq!(body["message"], "internal server error");

    server.close().await.unwrap();
}

#[tokio::test]
async fn test_static_middleware_serves_before_the_renderer() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("static")).unwrap();
    std::fs::write(dir.path().join("static/robots.txt"), "User-agent: *\n").unwrap();

    let mut config = loopback_config();
    config.dirs.src_dir = dir.path().to_string_lossy().into_owned();
    let (server, listener) = start(config).await;

    let base = base_url(&listener);
    let robots = reqwest::get(format!("{base}/robots.txt")).await.unwrap();
    assert_eq!(robots.status(), 200);
    assert_eq!(robots.text().await.unwrap(), "User-agent: *\n");

    // Anything the static stage does not claim still renders.
    let page = reqwest::get(format!("{base}/page")).await.unwrap();
    assert_eq!(page.status(), 200);
    assert!(page.text().await.unwrap().contains("/page"));

    server.close().await.unwrap();
}
