//! Clip-sheet JSON output.
//!
//! A clip sheet is the fully derived, front-end-ready view of one
//! e-paper: for every page, the overlay geometry at the configured
//! display width plus the navigation URL and share card for every region.

use crate::models::DisplayBox;
use crate::share::ShareMetadata;
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::error::Error;
use tokio::fs;
use tracing::{error, info, instrument};

/// Derived output for one e-paper edition.
#[derive(Debug, Serialize)]
pub struct ClipSheet {
    /// Identifier used for the output filename and region URLs.
    pub ident: String,
    pub title: String,
    /// Publication date, `YYYY-MM-DD`.
    pub date: String,
    pub pages: Vec<PageClips>,
}

/// Derived output for one scanned page.
#[derive(Debug, Serialize)]
pub struct PageClips {
    pub page_no: u32,
    /// Full-page image URL, transform-rewritten for display.
    pub image: String,
    /// Rendered size the overlay boxes were computed at.
    pub displayed_width: f64,
    pub displayed_height: f64,
    pub clips: Vec<Clip>,
}

/// One clickable region, ready for rendering and sharing.
#[derive(Debug, Serialize)]
pub struct Clip {
    /// Overlay box in displayed pixels; absent when the page metadata
    /// could not be measured.
    pub overlay: Option<DisplayBox>,
    pub share: ShareMetadata,
}

/// Write a clip sheet to `{json_output_dir}/{date}/{ident}.json`.
///
/// An unparseable publication date falls back to today so a malformed
/// backend record still lands somewhere findable.
#[instrument(level = "info", skip_all, fields(ident = %sheet.ident, json_output_dir = %json_output_dir))]
pub async fn write_clip_sheet(
    sheet: &ClipSheet,
    json_output_dir: &str,
) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string(sheet)?;

    let date = NaiveDate::parse_from_str(&sheet.date, "%Y-%m-%d")
        .unwrap_or_else(|_| Local::now().date_naive());
    let full_json_dir = format!("{}/{}", json_output_dir, date);

    info!(%full_json_dir, "Ensuring JSON directory exists");
    if let Err(e) = fs::create_dir_all(&full_json_dir).await {
        error!(%full_json_dir, error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let output_json_filename = format!("{}/{}.json", full_json_dir, sheet.ident);
    info!(path = %output_json_filename, "Writing clip sheet");
    fs::write(&output_json_filename, json).await?;
    info!(path = %output_json_filename, pages = sheet.pages.len(), "Wrote clip sheet");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::share::ShareImage;

    fn sheet(date: &str) -> ClipSheet {
        ClipSheet {
            ident: "12".to_string(),
            title: "Pune Main".to_string(),
            date: date.to_string(),
            pages: vec![PageClips {
                page_no: 1,
                image: "https://res.cloudinary.com/demo/image/upload/v1/p1.jpg".to_string(),
                displayed_width: 1280.0,
                displayed_height: 2560.0,
                clips: vec![Clip {
                    overlay: Some(DisplayBox {
                        left: 0.0,
                        top: 0.0,
                        width: 100.0,
                        height: 50.0,
                    }),
                    share: ShareMetadata {
                        title: "मुख्य बातमी".to_string(),
                        page_url: "/epaper/12/page/1/news/9".to_string(),
                        image: ShareImage {
                            url: "https://res.cloudinary.com/demo/image/upload/c_crop,w_100,h_50,x_0,y_0,q_auto:best,f_auto/v1/p1.jpg".to_string(),
                            width: 100,
                            height: 50,
                        },
                    },
                }],
            }],
        }
    }

    #[tokio::test]
    async fn test_write_clip_sheet_creates_date_directory() {
        let dir = std::env::temp_dir().join("epaper_clips_test_out");
        let dir = dir.to_str().unwrap().to_string();
        let _ = tokio::fs::remove_dir_all(&dir).await;

        write_clip_sheet(&sheet("2025-08-15"), &dir).await.unwrap();

        let written = tokio::fs::read_to_string(format!("{dir}/2025-08-15/12.json"))
            .await
            .unwrap();
        assert!(written.contains("\"page_no\":1"));
        assert!(written.contains("c_crop,w_100,h_50"));

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[test]
    fn test_clip_sheet_serializes_overlay_and_share() {
        let json = serde_json::to_string(&sheet("2025-08-15")).unwrap();
        assert!(json.contains("\"overlay\":{\"left\":0.0"));
        assert!(json.contains("\"page_url\":\"/epaper/12/page/1/news/9\""));
        assert!(json.contains("\"width\":100"));
    }
}
