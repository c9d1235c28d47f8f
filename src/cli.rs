//! Command-line interface definitions for the clip-sheet pipeline.
//!
//! All options can be provided via command-line flags; the backend URL
//! and fallback dataset also accept environment variables.

use clap::Parser;

/// Command-line arguments for the e-paper clip-sheet pipeline.
///
/// # Examples
///
/// ```sh
/// # Process every published e-paper
/// epaper_clips -j ./json
///
/// # One edition, with a local fallback snapshot for offline runs
/// epaper_clips -j ./json -e pune-main --fallback-file ./snapshot.json
///
/// # Share flow: print the share card for one region deep link
/// epaper_clips -j ./json -e pune-main -p 3 -r lead-story
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Output directory for clip-sheet JSON files
    #[arg(short, long)]
    pub json_output_dir: String,

    /// Optional path to config.yaml
    #[arg(short, long)]
    pub config: Option<String>,

    /// Process a single e-paper addressed by id, _id, or slug
    #[arg(short, long)]
    pub epaper: Option<String>,

    /// Page number for the share flow
    #[arg(short, long, requires = "epaper", requires = "region")]
    pub page: Option<u32>,

    /// Resolve one region by id, _id, or slug and print its share card
    /// instead of writing clip sheets
    #[arg(short, long, requires = "epaper", requires = "page")]
    pub region: Option<String>,

    /// JSON snapshot consulted when the backend is unreachable
    #[arg(long, env = "EPAPER_FALLBACK_FILE")]
    pub fallback_file: Option<String>,

    /// Override the configured backend base URL
    #[arg(long, env = "EPAPER_API_BASE_URL")]
    pub api_base_url: Option<String>,

    /// Override the configured display width for overlay geometry
    #[arg(long)]
    pub display_width: Option<f64>,
}
