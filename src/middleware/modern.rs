//! Server-side modern-bundle negotiation
//!
//! Installed only when the framework is configured to pick the modern or
//! legacy client bundle per request. Classifies the client from its
//! `User-Agent` and flags the request context; later stages (dev dispatch,
//! rendering) honor the flag.

use crate::pipeline::{Handler, Outcome, RequestCx};
use crate::utils::error::Result;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

// Browsers with native ES module support.
static MODERN_UA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
        Edge?/(1[6-9]|[2-9]\d|\d{3})
        | Firefox/(6\d|[7-9]\d|\d{3})
        | Chrom(e|ium)/(6[1-9]|[7-9]\d|\d{3})
        | Version/(1[1-9]|[2-9]\d)[\d.]*\ Safari
        ",
    )
    .expect("modern user-agent pattern is valid")
});

/// Flags requests from browsers that can run the modern bundle.
#[derive(Default)]
pub struct ModernNegotiation;

/// Whether a user agent supports the modern bundle.
pub fn is_modern_browser(user_agent: &str) -> bool {
    MODERN_UA.is_match(user_agent)
}

#[async_trait(?Send)]
impl Handler for ModernNegotiation {
    async fn handle(&self, cx: &mut RequestCx) -> Result<Outcome> {
        let modern = cx
            .header("user-agent")
            .map(is_modern_browser)
            .unwrap_or(false);
        cx.set_modern(modern);
        Ok(Outcome::Continue)
    }
}
