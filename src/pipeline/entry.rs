//! Middleware registration values and path normalization

use crate::pipeline::handler::Handler;
use std::sync::Arc;

/// A handler reference as supplied at registration time.
///
/// String identifiers are resolved through the module-resolution
/// collaborator before installation; resolution failure is fatal at startup.
#[derive(Clone)]
pub enum MiddlewareSource {
    /// A ready-made handler
    Handler(Arc<dyn Handler>),
    /// A module name to resolve
    Named(String),
}

/// A middleware registration value: direct, named, or path-scoped.
#[derive(Clone)]
pub enum Middleware {
    /// A ready-made handler mounted at the router base
    Handler(Arc<dyn Handler>),
    /// A named module mounted at the router base
    Named(String),
    /// A handler scoped to a path, optionally opting out of the base prefix
    Scoped {
        /// Declared path, relative to the router base when `prefix` is set
        path: Option<String>,
        /// Prepend the router base path (static-asset middleware opts out)
        prefix: bool,
        /// The handler, possibly still a name
        handler: MiddlewareSource,
    },
}

impl Middleware {
    pub fn handler(handler: Arc<dyn Handler>) -> Self {
        Middleware::Handler(handler)
    }

    pub fn named(name: impl Into<String>) -> Self {
        Middleware::Named(name.into())
    }

    pub fn scoped(path: impl Into<String>, prefix: bool, handler: Arc<dyn Handler>) -> Self {
        Middleware::Scoped {
            path: Some(path.into()),
            prefix,
            handler: MiddlewareSource::Handler(handler),
        }
    }
}

/// One installed pipeline entry. Never reordered after registration.
#[derive(Clone)]
pub struct MiddlewareEntry {
    /// Normalized effective mount path
    pub path: String,
    pub handler: Arc<dyn Handler>,
}

/// Compute the effective mount path for a middleware registration.
///
/// Effective path is `base + declared`, with every run of repeated `/`
/// collapsed to a single separator. The result always starts with `/`, and
/// the function is idempotent.
pub fn normalize_path(base: &str, declared: &str) -> String {
    let joined = format!("{base}{declared}");
    let mut normalized = String::with_capacity(joined.len() + 1);
    let mut previous_was_slash = false;

    for c in joined.chars() {
        if c == '/' {
            if !previous_was_slash {
                normalized.push(c);
            }
            previous_was_slash = true;
        } else {
            normalized.push(c);
            previous_was_slash = false;
        }
    }

    if normalized.is_empty() {
        normalized.push('/');
    } else if !normalized.starts_with('/') {
        normalized.insert(0, '/');
    }
    normalized
}

/// Whether a request path falls under a mount path.
///
/// Prefix matching on segment boundaries: `/app` matches `/app` and
/// `/app/page` but not `/application`.
pub fn path_matches(mount: &str, path: &str) -> bool {
    if mount == "/" {
        return true;
    }
    let mount = mount.trim_end_matches('/');
    match path.strip_prefix(mount) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_and_declared_compose_without_doubled_slash() {
        assert_eq!(normalize_path("/app/", "/static"), "/app/static");
        assert_eq!(normalize_path("/app", "/static"), "/app/static");
        assert_eq!(normalize_path("/", "/static"), "/static");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let once = normalize_path("/app/", "/static");
        let twice = normalize_path(&once, "");
        assert_eq!(once, twice);

        let collapsed = normalize_path("///a//b///", "");
        assert_eq!(collapsed, "/a/b/");
        assert_eq!(normalize_path(&collapsed, ""), collapsed);
    }

    #[test]
    fn test_empty_inputs_normalize_to_root() {
        assert_eq!(normalize_path("", ""), "/");
        assert_eq!(normalize_path("/", ""), "/");
    }

    #[test]
    fn test_prefix_opt_out_uses_declared_path_only() {
        // prefix = false passes an empty base regardless of router base
        assert_eq!(normalize_path("", "/static"), "/static");
        assert_eq!(normalize_path("", ""), "/");
    }

    #[test]
    fn test_relative_declared_path_gains_leading_slash() {
        assert_eq!(normalize_path("/", "__open-in-editor"), "/__open-in-editor");
    }

    #[test]
    fn test_root_mount_matches_everything() {
        assert!(path_matches("/", "/"));
        assert!(path_matches("/", "/anything/at/all"));
    }

    #[test]
    fn test_mount_matches_on_segment_boundaries() {
        assert!(path_matches("/app", "/app"));
        assert!(path_matches("/app", "/app/page"));
        assert!(path_matches("/app/", "/app/page"));
        assert!(!path_matches("/app", "/application"));
        assert!(!path_matches("/app", "/ap"));
    }
}
