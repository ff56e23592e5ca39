//! The rendering middleware
//!
//! Terminal request stage: everything no earlier middleware claimed is
//! handed to the rendering collaborator. Render failures propagate to the
//! error middleware at the end of the pipeline.

use crate::pipeline::{Handler, Outcome, RequestCx};
use crate::render::{RenderContext, Renderer};
use crate::resources::ResourceRegistry;
use crate::utils::error::Result;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use async_trait::async_trait;
use std::sync::Arc;

/// Renders all otherwise-unmatched requests.
pub struct RenderMiddleware {
    renderer: Arc<dyn Renderer>,
    resources: ResourceRegistry,
}

impl RenderMiddleware {
    pub fn new(renderer: Arc<dyn Renderer>, resources: ResourceRegistry) -> Self {
        Self { renderer, resources }
    }
}

#[async_trait(?Send)]
impl Handler for RenderMiddleware {
    async fn handle(&self, cx: &mut RequestCx) -> Result<Outcome> {
        let url = if cx.query_string().is_empty() {
            cx.path().to_string()
        } else {
            format!("{}?{}", cx.path(), cx.query_string())
        };

        let context = RenderContext {
            method: cx.method().to_string(),
            modern: cx.is_modern(),
            resources: self.resources.clone(),
        };

        let page = self.renderer.render_route(&url, context).await?;
        let status =
            StatusCode::from_u16(page.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        Ok(Outcome::Done(
            HttpResponse::build(status)
                .content_type("text/html; charset=utf-8")
                .body(page.html),
        ))
    }
}
