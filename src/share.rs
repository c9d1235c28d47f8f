//! Social-share metadata for clipped regions.
//!
//! Open Graph and Twitter Card crawlers need an absolute HTTPS image URL
//! with declared pixel dimensions. The declared `og:image:width`/`height`
//! must match the dimensions baked into the transform URL; a mismatch does
//! not error but degrades preview quality on some platforms, so both come
//! from the same rounded values here.

use crate::cdn::CdnRewriter;
use crate::geometry::round_half_up;
use crate::models::{Page, Region};
use crate::resolver::build_region_url;
use serde::Serialize;
use url::Url;

/// A share-preview image with the dimensions declared to crawlers.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ShareImage {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// Everything a share card needs for one region.
#[derive(Debug, Clone, Serialize)]
pub struct ShareMetadata {
    pub title: String,
    pub page_url: String,
    pub image: ShareImage,
}

/// Upgrade `http://` to `https://`, leaving anything else untouched.
///
/// Crawlers reject non-HTTPS images, so every URL handed to a share
/// context passes through here.
pub fn ensure_https(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) if parsed.scheme() == "http" => {
            let _ = parsed.set_scheme("https");
            parsed.to_string()
        }
        _ => url.to_string(),
    }
}

/// Build the share-preview image for a region.
///
/// A pre-cropped image supplied by the backend is preferred; otherwise a
/// crop URL is derived from the page image. Declared dimensions are the
/// same rounded values the crop directives carry.
pub fn region_share_image(rewriter: &CdnRewriter, page: &Page, region: &Region) -> ShareImage {
    let url = match region.precropped_image() {
        Some(precropped) => ensure_https(precropped),
        None => rewriter.crop_url(&page.image, region),
    };
    ShareImage {
        url,
        width: round_half_up(region.width).max(0) as u32,
        height: round_half_up(region.height).max(0) as u32,
    }
}

/// Build the full share card for a region on a page.
pub fn region_share_metadata(
    rewriter: &CdnRewriter,
    epaper_ident: &str,
    page: &Page,
    region: &Region,
) -> ShareMetadata {
    ShareMetadata {
        title: region.display_title().to_string(),
        page_url: build_region_url(epaper_ident, page.page_no, region),
        image: region_share_image(rewriter, page, region),
    }
}
