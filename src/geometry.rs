//! Coordinate mapping between a page's source pixel space and a rendered
//! image's displayed pixel space.
//!
//! Region bounding boxes are stored against the scanned page's pixel
//! dimensions. A viewer renders the page image at whatever size fits the
//! viewport, so overlays must be rescaled for every rendered size. The
//! mapping here is recomputed per render rather than cached: the displayed
//! size changes continuously during resize and pinch-zoom interactions.
//!
//! The rounding rule for CDN crop directives also lives here so that every
//! caller rounds fractional coordinates the same way.

use crate::models::{DisplayBox, Page, Region};

/// Map a region's bounding box from source pixels to displayed pixels.
///
/// Returns `None` when `displayed_width` or either page dimension is zero
/// or negative, which happens while the image element has not been
/// measured yet or the page metadata has not loaded. Callers skip the
/// overlay for that frame and try again on the next render.
///
/// No rounding is applied; sub-pixel placement is intentional.
///
/// # Examples
///
/// ```ignore
/// // A 1000x2000 page rendered at half size scales every box by 0.5.
/// let displayed = map_region_to_display(&region, &page, 500.0, 1000.0);
/// ```
pub fn map_region_to_display(
    region: &Region,
    page: &Page,
    displayed_width: f64,
    displayed_height: f64,
) -> Option<DisplayBox> {
    if !(displayed_width > 0.0) || !(page.width > 0.0) || !(page.height > 0.0) {
        return None;
    }

    let scale_x = displayed_width / page.width;
    let scale_y = displayed_height / page.height;

    Some(DisplayBox {
        left: region.x * scale_x,
        top: region.y * scale_y,
        width: region.width * scale_x,
        height: region.height * scale_y,
    })
}

/// Round half-up to the nearest integer.
///
/// The CDN rejects fractional crop directives, so every coordinate that
/// ends up in a directive token goes through this function. Half-up is
/// fixed here once: `10.5 -> 11`, `-0.5 -> 0`.
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Clamp a region's bounding box to lie within its page's bounds.
///
/// The backend does not validate region geometry, and admin cropping
/// errors occasionally produce boxes that overhang the page. A crop
/// directive built from such a box is silently mishandled by the CDN, so
/// the pipeline clamps before deriving crops. Overlay mapping is left
/// unclamped; an overhanging overlay is harmless.
pub fn clamp_region_to_page(region: &Region, page: &Page) -> Region {
    let mut clamped = region.clone();
    clamped.width = clamped.width.max(0.0).min(page.width.max(0.0));
    clamped.height = clamped.height.max(0.0).min(page.height.max(0.0));
    clamped.x = clamped.x.clamp(0.0, (page.width - clamped.width).max(0.0));
    clamped.y = clamped.y.clamp(0.0, (page.height - clamped.height).max(0.0));
    clamped
}
