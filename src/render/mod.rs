//! Rendering collaborator boundary
//!
//! The server core does not render pages itself; it drives a [`Renderer`]
//! that populates the resource registry and produces HTML for a route.
//! [`HtmlRenderer`] is the minimal built-in implementation used by the
//! binary and by tests; real deployments inject their own.

use crate::resources::{Resource, ResourceRegistry};
use crate::utils::error::{Result, ServerError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

/// Request-derived context handed to the renderer for one route.
#[derive(Clone)]
pub struct RenderContext {
    pub method: String,
    /// Whether the client was negotiated onto the modern bundle
    pub modern: bool,
    /// The shared registry of compiled artifacts
    pub resources: ResourceRegistry,
}

/// Output of rendering one route.
#[derive(Debug, Clone)]
pub struct RenderedRoute {
    pub html: String,
    pub status: u16,
}

impl RenderedRoute {
    pub fn ok(html: String) -> Self {
        Self { html, status: 200 }
    }
}

/// The rendering collaborator.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Initialize the renderer and populate the registry for the first time.
    async fn ready(&self, registry: &ResourceRegistry) -> Result<()>;

    /// (Re)populate the registry after a build cycle.
    async fn load_resources(&self, registry: &ResourceRegistry) -> Result<()>;

    /// Render one route.
    async fn render_route(&self, url: &str, cx: RenderContext) -> Result<RenderedRoute>;
}

/// Registry key of the app template.
pub const TEMPLATE_RESOURCE: &str = "spa.template";

const DEFAULT_TEMPLATE: &str = "<!DOCTYPE html>\n<html>\n<head><title>renderd</title></head>\n<body><div id=\"app\" data-route=\"{{ route }}\"></div></body>\n</html>\n";

/// Template-substituting renderer.
///
/// Loads a single HTML template (from disk when configured, otherwise a
/// built-in shell) into the registry and substitutes the requested route
/// into the `{{ route }}` placeholder.
#[derive(Default)]
pub struct HtmlRenderer {
    template_path: Option<PathBuf>,
}

impl HtmlRenderer {
    pub fn new(template_path: Option<PathBuf>) -> Self {
        Self { template_path }
    }
}

#[async_trait]
impl Renderer for HtmlRenderer {
    async fn ready(&self, registry: &ResourceRegistry) -> Result<()> {
        self.load_resources(registry).await
    }

    async fn load_resources(&self, registry: &ResourceRegistry) -> Result<()> {
        let template = match &self.template_path {
            Some(path) => tokio::fs::read_to_string(path).await.map_err(|e| {
                ServerError::Render(format!("failed to read template {}: {e}", path.display()))
            })?,
            None => DEFAULT_TEMPLATE.to_string(),
        };

        let mut resources = HashMap::new();
        resources.insert(TEMPLATE_RESOURCE.to_string(), Resource::Template(template));
        registry.swap(resources);
        debug!("renderer resources loaded");
        Ok(())
    }

    async fn render_route(&self, url: &str, cx: RenderContext) -> Result<RenderedRoute> {
        let template = match cx.resources.get(TEMPLATE_RESOURCE) {
            Some(Resource::Template(template)) => template,
            _ => {
                return Err(ServerError::Render(
                    "renderer resources not loaded".to_string(),
                ))
            }
        };
        Ok(RenderedRoute::ok(template.replace("{{ route }}", url)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(resources: ResourceRegistry) -> RenderContext {
        RenderContext {
            method: "GET".to_string(),
            modern: false,
            resources,
        }
    }

    #[tokio::test]
    async fn test_ready_populates_the_registry() {
        let renderer = HtmlRenderer::default();
        let registry = ResourceRegistry::new();
        renderer.ready(&registry).await.unwrap();
        assert!(matches!(
            registry.get(TEMPLATE_RESOURCE),
            Some(Resource::Template(_))
        ));
    }

    #[tokio::test]
    async fn test_render_route_substitutes_the_route() {
        let renderer = HtmlRenderer::default();
        let registry = ResourceRegistry::new();
        renderer.ready(&registry).await.unwrap();

        let page = renderer
            .render_route("/about", context(registry))
            .await
            .unwrap();
        assert_eq!(page.status, 200);
        assert!(page.html.contains("data-route=\"/about\""));
    }

    #[tokio::test]
    async fn test_render_without_resources_fails() {
        let renderer = HtmlRenderer::default();
        let err = renderer
            .render_route("/", context(ResourceRegistry::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::Render(_)));
    }

    #[tokio::test]
    async fn test_missing_template_file_is_a_render_error() {
        let renderer = HtmlRenderer::new(Some(PathBuf::from("/nonexistent/app.html")));
        let registry = ResourceRegistry::new();
        let err = renderer.ready(&registry).await.unwrap_err();
        assert!(matches!(err, ServerError::Render(_)));
    }
}
