//! Response compression
//!
//! The stage itself is cheap: it inspects `Accept-Encoding` and queues a
//! gzip transform that the pipeline applies to whatever response the
//! request ends up with, error responses included.

use crate::pipeline::{Handler, Outcome, RequestCx, ResponseTransform};
use crate::utils::error::Result;
use actix_web::http::header;
use actix_web::HttpResponse;
use async_trait::async_trait;
use bytes::Bytes;
use flate2::write::GzEncoder;
use std::io::Write;
use std::sync::Arc;
use tracing::warn;

const DEFAULT_THRESHOLD: usize = 1024;
const DEFAULT_LEVEL: u32 = 6;

/// Gzip compression stage.
pub struct Compression {
    threshold: usize,
    level: u32,
}

impl Compression {
    pub fn new(threshold: usize, level: u32) -> Self {
        Self { threshold, level }
    }

    /// Build from a settings object: `{ "threshold": bytes, "level": 0-9 }`.
    pub fn from_settings(settings: &serde_json::Value) -> Self {
        let threshold = settings
            .get("threshold")
            .and_then(serde_json::Value::as_u64)
            .map(|v| v as usize)
            .unwrap_or(DEFAULT_THRESHOLD);
        let level = settings
            .get("level")
            .and_then(serde_json::Value::as_u64)
            .map(|v| (v as u32).min(9))
            .unwrap_or(DEFAULT_LEVEL);
        Self::new(threshold, level)
    }
}

impl Default for Compression {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD, DEFAULT_LEVEL)
    }
}

#[async_trait(?Send)]
impl Handler for Compression {
    async fn handle(&self, cx: &mut RequestCx) -> Result<Outcome> {
        let accepts_gzip = cx
            .header(header::ACCEPT_ENCODING.as_str())
            .map(|value| value.contains("gzip"))
            .unwrap_or(false);

        if accepts_gzip {
            cx.add_transform(Arc::new(GzipTransform {
                threshold: self.threshold,
                level: self.level,
            }));
        }
        Ok(Outcome::Continue)
    }
}

struct GzipTransform {
    threshold: usize,
    level: u32,
}

#[async_trait(?Send)]
impl ResponseTransform for GzipTransform {
    async fn transform(&self, _cx: &RequestCx, response: HttpResponse) -> HttpResponse {
        let status = response.status();

        // Bodyless statuses and already-encoded responses pass through.
        if status.is_informational()
            || status == actix_web::http::StatusCode::NO_CONTENT
            || status == actix_web::http::StatusCode::NOT_MODIFIED
            || response.headers().contains_key(header::CONTENT_ENCODING)
        {
            return response;
        }

        let headers = response.headers().clone();
        let body = match actix_web::body::to_bytes(response.into_body()).await {
            Ok(body) => body,
            Err(err) => {
                warn!(error = %err, "failed to collect response body for compression");
                return HttpResponse::InternalServerError()
                    .content_type("text/plain; charset=utf-8")
                    .body("internal server error");
            }
        };

        let compressed = if body.len() >= self.threshold {
            let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::new(self.level));
            match encoder.write_all(&body).and_then(|_| encoder.finish()) {
                Ok(compressed) => Some(Bytes::from(compressed)),
                Err(err) => {
                    warn!(error = %err, "gzip encoding failed, sending identity body");
                    None
                }
            }
        } else {
            None
        };

        let mut builder = HttpResponse::build(status);
        for (name, value) in headers.iter() {
            if name != header::CONTENT_LENGTH {
                builder.append_header((name.clone(), value.clone()));
            }
        }
        builder.append_header((header::VARY, "Accept-Encoding"));

        match compressed {
            Some(compressed) => builder
                .insert_header((header::CONTENT_ENCODING, "gzip"))
                .body(compressed),
            None => builder.body(body),
        }
    }
}
