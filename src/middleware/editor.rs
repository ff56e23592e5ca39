//! Open-in-editor diagnostic endpoint
//!
//! Mounted at `__open-in-editor` in development+debug mode only. Launches
//! the configured editor command with the file named in the `file` query
//! parameter.

use crate::pipeline::{Handler, Outcome, RequestCx};
use crate::utils::error::{Result, ServerError};
use actix_web::HttpResponse;
use async_trait::async_trait;
use tracing::debug;

/// The `__open-in-editor` endpoint handler.
pub struct OpenInEditor {
    command: Option<String>,
}

impl OpenInEditor {
    pub fn new(command: Option<String>) -> Self {
        Self { command }
    }
}

fn file_param(query: &str) -> Option<String> {
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        if key == "file" && !value.is_empty() {
            Some(value.replace("%2F", "/").replace("%2f", "/"))
        } else {
            None
        }
    })
}

#[async_trait(?Send)]
impl Handler for OpenInEditor {
    async fn handle(&self, cx: &mut RequestCx) -> Result<Outcome> {
        let Some(file) = file_param(cx.query_string()) else {
            return Ok(Outcome::Done(
                HttpResponse::BadRequest()
                    .content_type("text/plain; charset=utf-8")
                    .body("missing `file` query parameter"),
            ));
        };

        let Some(command) = &self.command else {
            return Ok(Outcome::Done(
                HttpResponse::InternalServerError()
                    .content_type("text/plain; charset=utf-8")
                    .body("no editor configured"),
            ));
        };

        debug!(file = %file, editor = %command, "opening file in editor");
        tokio::process::Command::new(command)
            .arg(&file)
            .spawn()
            .map_err(|e| ServerError::Request(format!("failed to launch editor: {e}")))?;

        Ok(Outcome::Done(
            HttpResponse::Ok()
                .content_type("text/plain; charset=utf-8")
                .body(format!("opened {file}")),
        ))
    }
}
