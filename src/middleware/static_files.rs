//! Static asset serving
//!
//! Serves files under a root directory and passes everything else on.
//! Conditional GET (ETag / If-Modified-Since) is delegated to `actix-files`.

use crate::pipeline::{Handler, Outcome, RequestCx};
use crate::utils::error::Result;
use actix_files::NamedFile;
use actix_web::http::Method;
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

/// Static file handler rooted at a directory.
pub struct ServeStatic {
    root: PathBuf,
}

impl ServeStatic {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

fn sanitized(rest_path: &str) -> Option<PathBuf> {
    let relative = rest_path.trim_start_matches('/');
    let path = Path::new(relative);
    // Reject anything that could escape the root.
    for component in path.components() {
        match component {
            Component::Normal(_) => {}
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(path.to_path_buf())
}

#[async_trait(?Send)]
impl Handler for ServeStatic {
    async fn handle(&self, cx: &mut RequestCx) -> Result<Outcome> {
        if cx.method() != Method::GET && cx.method() != Method::HEAD {
            return Ok(Outcome::Continue);
        }

        let Some(relative) = sanitized(&cx.rest_path()) else {
            return Ok(Outcome::Continue);
        };

        let mut path = self.root.join(relative);
        if path.is_dir() {
            path.push("index.html");
        }

        match NamedFile::open_async(&path).await {
            Ok(file) => Ok(Outcome::Done(file.into_response(cx.request()))),
            Err(_) => Ok(Outcome::Continue),
        }
    }
}
