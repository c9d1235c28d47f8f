//! Data models for e-papers, scanned pages, and clipped news regions.
//!
//! This module defines the entities fetched from the backend API:
//! - [`Epaper`]: one published edition with its scanned pages
//! - [`Page`]: a single scanned newspaper page and its region list
//! - [`Region`]: a clipped rectangular news item within a page
//! - [`DisplayBox`]: a region's bounding box mapped into displayed pixels
//!
//! All entities are read-only from this crate's perspective: they are
//! fetched per run and never mutated or persisted beyond the short-TTL
//! response cache in [`crate::api`].
//!
//! # Identity
//!
//! The backend identifies e-papers and regions by up to three fields: a
//! numeric `id`, an opaque string `_id`, and an optional `slug`. A slug
//! that is empty or the literal `"untitled"` (case-insensitive) is not
//! usable for navigation; see [`Region::usable_slug`].

use serde::{Deserialize, Serialize};

/// Placeholder shown in place of an empty or "untitled" region title.
pub const UNTITLED_TITLE: &str = "शीर्षक नसलेली बातमी";

/// One published e-paper edition as returned by `GET /epapers/{id}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Epaper {
    /// Numeric identifier, preferred when present.
    #[serde(default)]
    pub id: Option<i64>,
    /// Opaque string identifier assigned by the backend.
    #[serde(rename = "_id", default)]
    pub raw_id: Option<String>,
    /// URL slug, when the edition has one.
    #[serde(default)]
    pub slug: Option<String>,
    /// Edition title.
    pub title: String,
    /// Publication date in `YYYY-MM-DD` format.
    pub date: String,
    /// Optional thumbnail image URL for listing views.
    #[serde(default)]
    pub thumbnail: Option<String>,
    /// Scanned pages in this edition. `pageNo` values are unique but not
    /// necessarily contiguous.
    #[serde(default)]
    pub pages: Vec<Page>,
}

impl Epaper {
    /// The identifier used in outbound URLs and output filenames:
    /// numeric `id` first, then slug, then `_id`.
    pub fn ident(&self) -> Option<String> {
        self.id
            .map(|id| id.to_string())
            .or_else(|| self.slug.clone().filter(|s| !s.is_empty()))
            .or_else(|| self.raw_id.clone())
    }
}

/// A single scanned newspaper page.
///
/// `width` and `height` define the source coordinate space that all region
/// bounding boxes on this page are expressed in. They are the pixel
/// dimensions of the stored scan, not of any particular rendering.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Page {
    /// Page number within the edition, positive and unique.
    #[serde(rename = "pageNo")]
    pub page_no: u32,
    /// Absolute URL of the full-page raster image.
    pub image: String,
    /// Width of the source coordinate space, in pixels.
    pub width: f64,
    /// Height of the source coordinate space, in pixels.
    pub height: f64,
    /// Clipped news regions on this page, in backend order. The backend
    /// serializes this field as `news` or `newsItems` depending on the
    /// endpoint.
    #[serde(default, alias = "news", alias = "newsItems")]
    pub regions: Vec<Region>,
}

/// A clipped rectangular news item within a [`Page`].
///
/// The bounding box is expressed in the page's source coordinate space.
/// Coordinates may be fractional; the admin cropping tool emits sub-pixel
/// values.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Region {
    /// Numeric identifier, preferred when present.
    #[serde(default)]
    pub id: Option<i64>,
    /// Opaque string identifier assigned by the backend.
    #[serde(rename = "_id", default)]
    pub raw_id: Option<String>,
    /// URL slug; empty or "untitled" means no usable slug.
    #[serde(default)]
    pub slug: Option<String>,
    /// Display title; empty or "untitled" is replaced at render time.
    #[serde(default)]
    pub title: Option<String>,
    /// Left edge in source pixels.
    pub x: f64,
    /// Top edge in source pixels.
    pub y: f64,
    /// Box width in source pixels.
    pub width: f64,
    /// Box height in source pixels.
    pub height: f64,
    /// Pre-cropped image URL, preferred over deriving a crop when present.
    #[serde(rename = "croppedImage", default)]
    pub cropped_image: Option<String>,
    /// Alternate image URL some endpoints return instead of `croppedImage`.
    #[serde(default)]
    pub image: Option<String>,
}

impl Region {
    /// The slug, if it is usable for navigation.
    ///
    /// A slug is usable when it is non-empty and not the literal
    /// `"untitled"` (case-insensitive), which the admin tool writes for
    /// regions clipped without a headline.
    pub fn usable_slug(&self) -> Option<&str> {
        self.slug
            .as_deref()
            .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("untitled"))
    }

    /// The title to render, substituting the localized placeholder for
    /// empty or "untitled" titles.
    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(t) if !t.is_empty() && !t.eq_ignore_ascii_case("untitled") => t,
            _ => UNTITLED_TITLE,
        }
    }

    /// Pre-cropped image URL if the backend supplied one, trying
    /// `croppedImage` before `image`.
    pub fn precropped_image(&self) -> Option<&str> {
        self.cropped_image
            .as_deref()
            .filter(|u| !u.is_empty())
            .or_else(|| self.image.as_deref().filter(|u| !u.is_empty()))
    }

    /// Key used to deduplicate regions that the backend occasionally
    /// repeats across page payloads.
    pub fn identity_key(&self) -> (Option<i64>, Option<String>, Option<String>) {
        (self.id, self.raw_id.clone(), self.slug.clone())
    }
}

/// A region's bounding box mapped into displayed pixel space.
///
/// Produced by [`crate::geometry::map_region_to_display`]. Values are
/// intentionally unrounded; sub-pixel placement is desirable when the box
/// is used for an on-screen overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DisplayBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(slug: Option<&str>, title: Option<&str>) -> Region {
        Region {
            id: Some(1),
            raw_id: None,
            slug: slug.map(String::from),
            title: title.map(String::from),
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
            cropped_image: None,
            image: None,
        }
    }

    #[test]
    fn test_page_regions_field_aliases() {
        for field in ["regions", "news", "newsItems"] {
            let json = format!(
                r#"{{"pageNo": 3, "image": "https://cdn.example/p3.jpg",
                    "width": 800.0, "height": 1600.0,
                    "{field}": [{{"id": 9, "x": 1.0, "y": 2.0, "width": 3.0, "height": 4.0}}]}}"#
            );
            let page: Page = serde_json::from_str(&json).unwrap();
            assert_eq!(page.page_no, 3);
            assert_eq!(page.regions.len(), 1, "field name {field}");
            assert_eq!(page.regions[0].id, Some(9));
        }
    }

    #[test]
    fn test_region_identity_trio_deserialization() {
        let json = r#"{"id": 5, "_id": "abc123", "slug": "big-story",
                       "x": 0, "y": 0, "width": 1, "height": 1}"#;
        let region: Region = serde_json::from_str(json).unwrap();
        assert_eq!(region.id, Some(5));
        assert_eq!(region.raw_id.as_deref(), Some("abc123"));
        assert_eq!(region.usable_slug(), Some("big-story"));
    }

    #[test]
    fn test_usable_slug_rejects_untitled_and_empty() {
        assert_eq!(region(Some("untitled"), None).usable_slug(), None);
        assert_eq!(region(Some("Untitled"), None).usable_slug(), None);
        assert_eq!(region(Some("UNTITLED"), None).usable_slug(), None);
        assert_eq!(region(Some(""), None).usable_slug(), None);
        assert_eq!(region(None, None).usable_slug(), None);
        assert_eq!(
            region(Some("lead-story"), None).usable_slug(),
            Some("lead-story")
        );
    }

    #[test]
    fn test_display_title_placeholder() {
        assert_eq!(region(None, None).display_title(), UNTITLED_TITLE);
        assert_eq!(region(None, Some("")).display_title(), UNTITLED_TITLE);
        assert_eq!(region(None, Some("Untitled")).display_title(), UNTITLED_TITLE);
        assert_eq!(region(None, Some("मोठी बातमी")).display_title(), "मोठी बातमी");
    }

    #[test]
    fn test_precropped_image_prefers_cropped_image() {
        let mut r = region(None, None);
        r.cropped_image = Some("https://cdn.example/crop.jpg".into());
        r.image = Some("https://cdn.example/alt.jpg".into());
        assert_eq!(r.precropped_image(), Some("https://cdn.example/crop.jpg"));

        r.cropped_image = Some(String::new());
        assert_eq!(r.precropped_image(), Some("https://cdn.example/alt.jpg"));

        r.image = None;
        assert_eq!(r.precropped_image(), None);
    }

    #[test]
    fn test_epaper_ident_preference_order() {
        let mut epaper: Epaper = serde_json::from_str(
            r#"{"id": 12, "_id": "deadbeef", "slug": "mumbai-15-aug",
                "title": "Mumbai", "date": "2025-08-15"}"#,
        )
        .unwrap();
        assert_eq!(epaper.ident(), Some("12".to_string()));

        epaper.id = None;
        assert_eq!(epaper.ident(), Some("mumbai-15-aug".to_string()));

        epaper.slug = None;
        assert_eq!(epaper.ident(), Some("deadbeef".to_string()));

        epaper.raw_id = None;
        assert_eq!(epaper.ident(), None);
    }
}
