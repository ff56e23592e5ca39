//! Application layout configuration

use serde::Deserialize;

/// Router options relevant to the server.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Base path the application is mounted under
    pub base: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            base: "/".to_string(),
        }
    }
}

/// Build output options relevant to the server.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Public URL (or path) the built client assets are served from
    pub public_path: String,
    /// Directory the build writes its output to
    pub build_dir: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            public_path: "/_assets/".to_string(),
            build_dir: ".renderd".to_string(),
        }
    }
}

/// Project directory layout.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DirsConfig {
    /// Project source directory
    pub src_dir: String,
    /// Static asset directory, relative to `src_dir`
    pub static_dir: String,
}

impl Default for DirsConfig {
    fn default() -> Self {
        Self {
            src_dir: ".".to_string(),
            static_dir: "static".to_string(),
        }
    }
}

impl DirsConfig {
    pub fn static_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.src_dir).join(&self.static_dir)
    }
}
