//! Region identifier resolution and outbound region-URL construction.
//!
//! Deep links address a region by whatever identifier the link was built
//! with: numeric `id`, opaque `_id`, or slug. Resolution tries the three
//! in that fixed priority for each region, in page order, and returns the
//! first match. An unresolved identifier is not an error; it means a
//! stale deep link, and the caller navigates back to the parent page view.
//!
//! URL construction uses one canonical identifier preference everywhere:
//! numeric `id`, then usable slug, then `_id`. The site's desktop and
//! mobile viewers historically disagreed on this order; links built here
//! are uniform.

use crate::models::{Page, Region};

/// Resolve a candidate identifier against a page's regions.
///
/// For each region, in order, the candidate is compared against the
/// stringified numeric `id`, then `_id`, then the slug (only when the
/// slug is usable per [`Region::usable_slug`]). The first matching region
/// wins.
///
/// Returns `None` when nothing matches; callers treat that as a stale or
/// invalid deep link, not a user-facing error.
pub fn resolve_region<'a>(page: &'a Page, candidate: &str) -> Option<&'a Region> {
    page.regions.iter().find(|r| region_matches(r, candidate))
}

fn region_matches(region: &Region, candidate: &str) -> bool {
    if let Some(id) = region.id {
        if id.to_string() == candidate {
            return true;
        }
    }
    if let Some(raw_id) = region.raw_id.as_deref() {
        if raw_id == candidate {
            return true;
        }
    }
    if let Some(slug) = region.usable_slug() {
        if slug == candidate {
            return true;
        }
    }
    false
}

/// Build the site-relative URL for a region on an e-paper page.
///
/// Identifier preference is numeric `id`, then usable slug, then `_id`.
/// Slugs are percent-encoded. A region with no usable identifier links to
/// the parent page instead, which the viewer renders without a selected
/// region.
pub fn build_region_url(epaper_ident: &str, page_no: u32, region: &Region) -> String {
    let ident = region
        .id
        .map(|id| id.to_string())
        .or_else(|| region.usable_slug().map(|s| urlencoding::encode(s).into_owned()))
        .or_else(|| region.raw_id.clone());

    match ident {
        Some(ident) => format!("/epaper/{epaper_ident}/page/{page_no}/news/{ident}"),
        None => format!("/epaper/{epaper_ident}/page/{page_no}"),
    }
}
