//! The framework's terminal error middleware
//!
//! Installed last so it observes failures raised by any earlier stage. It
//! always produces a response: a hung connection is never an acceptable
//! outcome of a middleware failure.

use crate::pipeline::{ErrorHandler, RequestCx};
use crate::utils::error::ServerError;
use actix_web::HttpResponse;
use async_trait::async_trait;
use serde_json::json;
use tracing::error;

/// Renders an error response for any failure reaching the end of the pipeline.
pub struct ErrorMiddleware {
    dev: bool,
}

impl ErrorMiddleware {
    pub fn new(dev: bool) -> Self {
        Self { dev }
    }

    fn message_for(&self, err: &ServerError) -> String {
        if self.dev {
            err.to_string()
        } else if err.status_code().is_server_error() {
            // Internal detail stays out of production responses.
            "internal server error".to_string()
        } else {
            err.to_string()
        }
    }
}

#[async_trait(?Send)]
impl ErrorHandler for ErrorMiddleware {
    async fn handle_error(&self, cx: &mut RequestCx, err: &ServerError) -> Option<HttpResponse> {
        error!(path = %cx.path(), error = %err, "request failed");

        let status = err.status_code();
        let message = self.message_for(err);

        let wants_json = cx
            .header("accept")
            .map(|accept| accept.contains("application/json"))
            .unwrap_or(false);

        let response = if wants_json {
            HttpResponse::build(status).json(json!({
                "status": status.as_u16(),
                "code": err.code(),
                "message": message,
            }))
        } else {
            HttpResponse::build(status)
                .content_type("text/html; charset=utf-8")
                .body(format!(
                    "<!DOCTYPE html>\n<html>\n<head><title>{status}</title></head>\n\
                     <body><h1>{status}</h1><p>{message}</p></body>\n</html>\n",
                ))
        };
        Some(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;
    use bytes::Bytes;

    fn cx_with_accept(accept: Option<&str>) -> RequestCx {
        let mut request = TestRequest::with_uri("/failing");
        if let Some(accept) = accept {
            request = request.insert_header(("accept", accept));
        }
        RequestCx::new(request.to_http_request(), Bytes::new())
    }

    #[tokio::test]
    async fn test_always_produces_a_non_2xx_response() {
        let middleware = ErrorMiddleware::new(false);
        let mut cx = cx_with_accept(None);
        let response = middleware
            .handle_error(&mut cx, &ServerError::Render("boom".into()))
            .await
            .expect("error middleware must respond");
        assert!(!response.status().is_success());
    }

    #[tokio::test]
    async fn test_json_clients_get_a_structured_body() {
        let middleware = ErrorMiddleware::new(true);
        let mut cx = cx_with_accept(Some("application/json"));
        let response = middleware
            .handle_error(&mut cx, &ServerError::Render("boom".into()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = actix_web::body::to_bytes(response.into_body()).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["status"], 500);
        assert_eq!(parsed["code"], "RENDER_ERROR");
        assert!(parsed["message"].as_str().unwrap().contains("boom"));
    }

    #[tokio::test]
    async fn test_production_hides_internal_detail() {
        let middleware = ErrorMiddleware::new(false);
        let mut cx = cx_with_accept(Some("application/json"));
        let response = middleware
            .handle_error(
                &mut cx,
                &ServerError::Render("secret template path".into()),
            )
            .await
            .unwrap();

        let body = actix_web::body::to_bytes(response.into_body()).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["message"], "internal server error");
    }

    #[tokio::test]
    async fn test_not_found_keeps_its_status_and_message() {
        let middleware = ErrorMiddleware::new(false);
        let mut cx = cx_with_accept(None);
        let response = middleware
            .handle_error(&mut cx, &ServerError::NotFound("/missing".into()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
