//! Cloudinary transform-URL derivation for page images and region crops.
//!
//! The site historically re-implemented this rewrite at every call site
//! (thumbnail metadata, detail metadata, section views, share flows, the
//! page viewers), each with a slightly different "directives already
//! present" regex. This module is the single consolidated implementation;
//! a [`CdnRewriter`] is constructed once and injected everywhere a
//! transform URL is needed.
//!
//! # URL shape
//!
//! ```text
//! {scheme}://res.cloudinary.com/{cloudName}/image/upload/{directives}/{version?}/{publicId}
//! ```
//!
//! When rewriting, only the final path segment (`publicId`) and, if the
//! second-to-last segment matches `^v\d+$`, the version segment are kept.
//! Any existing directive segment is replaced wholesale, which is what
//! makes the rewrite idempotent. The output scheme is always `https`;
//! social-share crawlers reject non-HTTPS images.
//!
//! # Fallback policy
//!
//! CDN optimization is best effort. An empty source URL becomes the
//! configured placeholder; anything that does not look like a Cloudinary
//! upload URL passes through unchanged. Nothing here can fail in a way
//! that breaks image rendering.

use crate::geometry::round_half_up;
use crate::models::Region;
use once_cell::sync::Lazy;
use regex::Regex;

/// Matches a Cloudinary upload URL and captures the cloud name and the
/// remainder of the path after `/image/upload/`.
static UPLOAD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://res\.cloudinary\.com/([^/]+)/image/upload/(.+)$").unwrap()
});

/// Matches a version path segment such as `v1690000000`.
static VERSION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^v\d+$").unwrap());

/// Rewrites Cloudinary URLs with fresh transform directives.
#[derive(Debug, Clone)]
pub struct CdnRewriter {
    /// Returned in place of an empty source URL.
    placeholder: String,
}

impl CdnRewriter {
    /// Create a rewriter with the configured placeholder image URL.
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
        }
    }

    /// Rewrite `source_url` to carry exactly the given directive segment.
    ///
    /// - Empty source: returns the placeholder.
    /// - Non-Cloudinary source: returned unchanged.
    /// - Cloudinary source: rebuilt as
    ///   `https://res.cloudinary.com/{cloud}/image/upload/{directives}/{version?}/{publicId}`,
    ///   preserving the version segment verbatim when present and never
    ///   altering the public id. Existing directives are discarded, so
    ///   rewriting an already-rewritten URL yields the same result.
    pub fn transform_url(&self, source_url: &str, directives: &str) -> String {
        if source_url.is_empty() {
            return self.placeholder.clone();
        }
        let Some(caps) = UPLOAD_RE.captures(source_url) else {
            return source_url.to_string();
        };
        let cloud_name = &caps[1];
        let rest = &caps[2];

        let segments: Vec<&str> = rest.split('/').collect();
        let public_id = segments[segments.len() - 1];
        let version = segments
            .len()
            .checked_sub(2)
            .map(|i| segments[i])
            .filter(|s| VERSION_RE.is_match(s));

        match version {
            Some(v) => format!(
                "https://res.cloudinary.com/{cloud_name}/image/upload/{directives}/{v}/{public_id}"
            ),
            None => format!(
                "https://res.cloudinary.com/{cloud_name}/image/upload/{directives}/{public_id}"
            ),
        }
    }

    /// Rewrite `source_url` to crop out a region's bounding box.
    ///
    /// The directive values are rounded half-up to integers; the CDN
    /// rejects fractional crop parameters.
    pub fn crop_url(&self, source_url: &str, region: &Region) -> String {
        self.transform_url(source_url, &crop_directives(region))
    }
}

/// Crop directive segment for a region's bounding box.
pub fn crop_directives(region: &Region) -> String {
    format!(
        "c_crop,w_{},h_{},x_{},y_{},q_auto:best,f_auto",
        round_half_up(region.width),
        round_half_up(region.height),
        round_half_up(region.x),
        round_half_up(region.y),
    )
}

/// Fill-to-size directive segment used for share previews and thumbnails.
pub fn fill_directives(width: u32, height: u32) -> String {
    format!("w_{width},h_{height},c_fill,q_auto:best,f_auto")
}
