//! # E-paper Clips
//!
//! A pipeline that turns a publisher's e-paper metadata into front-end
//! ready "clip sheets": for every scanned page, the clickable-overlay
//! geometry at a configured display width plus a navigation URL and a
//! social-share card (CDN crop URL with matching declared dimensions)
//! for every clipped news region.
//!
//! ## Usage
//!
//! ```sh
//! epaper_clips -j ./json
//! epaper_clips -j ./json -e pune-main --fallback-file ./snapshot.json
//! ```
//!
//! ## Architecture
//!
//! The pipeline has three stages:
//! 1. **Fetching**: load e-papers from the backend API (TTL-cached, with
//!    an optional offline fallback snapshot)
//! 2. **Derivation**: per region, clamp geometry to the page, map the
//!    overlay box to displayed pixels, and build crop/share URLs
//! 3. **Output**: write one clip-sheet JSON per e-paper, grouped by date

use clap::Parser;
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use std::error::Error;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod api;
mod cdn;
mod cli;
mod config;
mod geometry;
mod models;
mod outputs;
mod resolver;
mod share;
mod utils;

use api::{EpaperClient, FallbackSource, JsonFallback};
use cdn::{fill_directives, CdnRewriter};
use cli::Cli;
use config::load_or_default;
use geometry::{clamp_region_to_page, map_region_to_display, round_half_up};
use models::Epaper;
use outputs::json::{write_clip_sheet, Clip, ClipSheet, PageClips};
use resolver::resolve_region;
use share::region_share_metadata;
use utils::ensure_writable_dir;

/// How many detail refetches run concurrently when processing a listing.
const PARALLEL_FETCHES: usize = 4;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("epaper_clips starting up");

    let args = Cli::parse();
    debug!(?args.json_output_dir, ?args.epaper, "Parsed CLI arguments");

    let mut config = load_or_default(args.config.as_deref())?;
    if let Some(base_url) = args.api_base_url {
        config.api_base_url = base_url;
    }
    if let Some(display_width) = args.display_width {
        config.display_width = display_width;
    }

    // Early check: ensure the output dir is writable before any fetching
    if let Err(e) = ensure_writable_dir(&args.json_output_dir).await {
        error!(
            path = %args.json_output_dir,
            error = %e,
            "JSON output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let fallback = match args.fallback_file.as_deref() {
        Some(path) => Some(JsonFallback::from_path(path)?),
        None => None,
    };
    let client = EpaperClient::new(&config, fallback)?;
    let rewriter = CdnRewriter::new(config.placeholder_image.clone());

    // ---- Fetch e-papers ----
    let epapers = match args.epaper.as_deref() {
        Some(candidate) => vec![fetch_one(&client, candidate).await?],
        None => {
            let summaries = client.list_epapers().await?;
            info!(count = summaries.len(), "Indexed e-paper listing");
            stream::iter(summaries)
                .map(|summary| fetch_full(&client, summary))
                .buffer_unordered(PARALLEL_FETCHES)
                .collect::<Vec<_>>()
                .await
        }
    };
    info!(count = epapers.len(), "E-papers to process");

    // ---- Share flow: resolve one region deep link and print its card ----
    if let (Some(candidate), Some(page_no)) = (args.region.as_deref(), args.page) {
        let Some(epaper) = epapers.first() else {
            error!("Share flow requested but no e-paper was fetched");
            return Err("no e-paper to resolve against".into());
        };
        println!("{}", render_share_flow(epaper, page_no, candidate, &rewriter)?);
        return Ok(());
    }

    // ---- Derive and write clip sheets ----
    let mut sheets_written = 0usize;
    let mut total_clips = 0usize;
    for epaper in &epapers {
        let Some(sheet) = build_clip_sheet(epaper, &rewriter, config.display_width) else {
            warn!(title = %epaper.title, "E-paper has no usable identifier; skipping");
            continue;
        };
        let clip_count: usize = sheet.pages.iter().map(|p| p.clips.len()).sum();
        info!(
            ident = %sheet.ident,
            pages = sheet.pages.len(),
            clips = clip_count,
            "Derived clip sheet"
        );

        if let Err(e) = write_clip_sheet(&sheet, &args.json_output_dir).await {
            error!(ident = %sheet.ident, error = %e, "Failed to write clip sheet");
            continue;
        }
        sheets_written += 1;
        total_clips += clip_count;
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        sheets = sheets_written,
        clips = total_clips,
        "Execution complete"
    );

    Ok(())
}

/// Resolve one region deep link and render its share card as JSON.
///
/// An unresolved candidate is a stale deep link, not an error: the output
/// is the parent page URL instead. An e-paper with no usable identifier
/// is an error, since neither the card's region URL nor the parent URL
/// could be built from it.
fn render_share_flow(
    epaper: &Epaper,
    page_no: u32,
    candidate: &str,
    rewriter: &CdnRewriter,
) -> Result<String, Box<dyn Error>> {
    let Some(ident) = epaper.ident() else {
        error!(title = %epaper.title, "E-paper has no usable identifier");
        return Err("e-paper has no usable identifier".into());
    };
    let Some(page) = epaper.pages.iter().find(|p| p.page_no == page_no) else {
        error!(page_no, "No such page in this e-paper");
        return Err(format!("page {page_no} not found").into());
    };
    match resolve_region(page, candidate) {
        Some(region) => {
            let clamped = clamp_region_to_page(region, page);
            let card = region_share_metadata(rewriter, &ident, page, &clamped);
            Ok(serde_json::to_string_pretty(&card)?)
        }
        None => {
            // Stale deep link: point back at the parent page view.
            warn!(candidate, page_no, "Region did not resolve; emitting parent page URL");
            Ok(format!("/epaper/{ident}/page/{page_no}"))
        }
    }
}

/// Upgrade a listing summary to the full detail payload when the listing
/// endpoint omitted the page data. A failed refetch keeps the summary.
async fn fetch_full<F: FallbackSource>(client: &EpaperClient<F>, summary: Epaper) -> Epaper {
    if !summary.pages.is_empty() {
        return summary;
    }
    let Some(ident) = summary.ident() else {
        return summary;
    };
    match client.epaper(&ident).await {
        Ok(full) => full,
        Err(e) => {
            warn!(%ident, error = %e, "Detail refetch failed; using summary");
            summary
        }
    }
}

/// Fetch a single e-paper by whichever identifier the caller supplied.
///
/// An all-digit candidate goes to the id endpoint; anything else tries
/// the slug endpoint first and falls back to the id endpoint, which also
/// accepts `_id` values.
async fn fetch_one<F: FallbackSource>(
    client: &EpaperClient<F>,
    candidate: &str,
) -> Result<Epaper, Box<dyn Error>> {
    if !candidate.is_empty() && candidate.chars().all(|c| c.is_ascii_digit()) {
        return client.epaper(candidate).await;
    }
    match client.epaper_by_slug(candidate).await {
        Ok(epaper) => Ok(epaper),
        Err(e) => {
            debug!(candidate, error = %e, "Slug lookup failed; trying id endpoint");
            client.epaper(candidate).await
        }
    }
}

/// Derive the full clip sheet for one e-paper.
///
/// Returns `None` when the e-paper has no usable identifier, since the
/// output filename and every region URL need one. Regions the backend
/// repeats within a page are deduplicated by identity. Overlay boxes are
/// mapped from the raw geometry; crop URLs use geometry clamped to the
/// page bounds.
fn build_clip_sheet(epaper: &Epaper, rewriter: &CdnRewriter, display_width: f64) -> Option<ClipSheet> {
    let ident = epaper.ident()?;

    let pages = epaper
        .pages
        .iter()
        .map(|page| {
            let displayed_height = if page.width > 0.0 {
                display_width * page.height / page.width
            } else {
                0.0
            };
            let image = rewriter.transform_url(
                &page.image,
                &fill_directives(
                    round_half_up(display_width).max(0) as u32,
                    round_half_up(displayed_height).max(0) as u32,
                ),
            );

            let clips = page
                .regions
                .iter()
                .unique_by(|r| r.identity_key())
                .map(|region| {
                    let clamped = clamp_region_to_page(region, page);
                    Clip {
                        overlay: map_region_to_display(region, page, display_width, displayed_height),
                        share: region_share_metadata(rewriter, &ident, page, &clamped),
                    }
                })
                .collect();

            PageClips {
                page_no: page.page_no,
                image,
                displayed_width: display_width,
                displayed_height,
                clips,
            }
        })
        .collect();

    Some(ClipSheet {
        ident,
        title: epaper.title.clone(),
        date: epaper.date.clone(),
        pages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Page, Region};

    fn epaper() -> Epaper {
        Epaper {
            id: Some(12),
            raw_id: None,
            slug: Some("pune-main".to_string()),
            title: "Pune Main".to_string(),
            date: "2025-08-15".to_string(),
            thumbnail: None,
            pages: vec![Page {
                page_no: 1,
                image: "https://res.cloudinary.com/demo/image/upload/v1690000000/p1.jpg"
                    .to_string(),
                width: 800.0,
                height: 1600.0,
                regions: vec![
                    Region {
                        id: Some(9),
                        raw_id: None,
                        slug: None,
                        title: Some("मुख्य बातमी".to_string()),
                        x: 0.0,
                        y: 0.0,
                        width: 200.0,
                        height: 100.0,
                        cropped_image: None,
                        image: None,
                    },
                    // Backend duplicate of the region above.
                    Region {
                        id: Some(9),
                        raw_id: None,
                        slug: None,
                        title: Some("मुख्य बातमी".to_string()),
                        x: 0.0,
                        y: 0.0,
                        width: 200.0,
                        height: 100.0,
                        cropped_image: None,
                        image: None,
                    },
                ],
            }],
        }
    }

    #[test]
    fn test_clip_sheet_overlay_matches_half_scale_render() {
        let rewriter = CdnRewriter::new("https://static.example/logo.png");
        let sheet = build_clip_sheet(&epaper(), &rewriter, 400.0).unwrap();

        assert_eq!(sheet.ident, "12");
        let page = &sheet.pages[0];
        assert_eq!(page.displayed_height, 800.0);
        assert_eq!(page.clips.len(), 1, "duplicate region must be dropped");

        let overlay = page.clips[0].overlay.unwrap();
        assert_eq!(overlay.left, 0.0);
        assert_eq!(overlay.top, 0.0);
        assert_eq!(overlay.width, 100.0);
        assert_eq!(overlay.height, 50.0);
    }

    #[test]
    fn test_clip_sheet_page_image_is_rewritten_for_display() {
        let rewriter = CdnRewriter::new("https://static.example/logo.png");
        let sheet = build_clip_sheet(&epaper(), &rewriter, 400.0).unwrap();
        assert_eq!(
            sheet.pages[0].image,
            "https://res.cloudinary.com/demo/image/upload/w_400,h_800,c_fill,q_auto:best,f_auto/v1690000000/p1.jpg"
        );
    }

    #[test]
    fn test_clip_sheet_share_card() {
        let rewriter = CdnRewriter::new("https://static.example/logo.png");
        let sheet = build_clip_sheet(&epaper(), &rewriter, 400.0).unwrap();
        let share = &sheet.pages[0].clips[0].share;
        assert_eq!(share.page_url, "/epaper/12/page/1/news/9");
        assert_eq!(share.image.width, 200);
        assert_eq!(share.image.height, 100);
        assert!(share.image.url.contains("c_crop,w_200,h_100,x_0,y_0"));
    }

    #[test]
    fn test_share_flow_resolves_region_to_card() {
        let rewriter = CdnRewriter::new("https://static.example/logo.png");
        let out = render_share_flow(&epaper(), 1, "9", &rewriter).unwrap();
        assert!(out.contains("\"page_url\": \"/epaper/12/page/1/news/9\""));
        assert!(out.contains("c_crop,w_200,h_100,x_0,y_0"));
    }

    #[test]
    fn test_share_flow_stale_link_emits_parent_url() {
        let rewriter = CdnRewriter::new("https://static.example/logo.png");
        let out = render_share_flow(&epaper(), 1, "no-such-region", &rewriter).unwrap();
        assert_eq!(out, "/epaper/12/page/1");
    }

    #[test]
    fn test_share_flow_errors_without_identifier() {
        // A missing identifier must not degrade to "/epaper//page/1".
        let mut anonymous = epaper();
        anonymous.id = None;
        anonymous.slug = None;
        anonymous.raw_id = None;
        let rewriter = CdnRewriter::new("https://static.example/logo.png");
        assert!(render_share_flow(&anonymous, 1, "9", &rewriter).is_err());
    }

    #[test]
    fn test_share_flow_errors_on_unknown_page() {
        let rewriter = CdnRewriter::new("https://static.example/logo.png");
        assert!(render_share_flow(&epaper(), 99, "9", &rewriter).is_err());
    }

    #[test]
    fn test_clip_sheet_requires_identifier() {
        let mut anonymous = epaper();
        anonymous.id = None;
        anonymous.slug = None;
        anonymous.raw_id = None;
        let rewriter = CdnRewriter::new("https://static.example/logo.png");
        assert!(build_clip_sheet(&anonymous, &rewriter, 400.0).is_none());
    }
}
