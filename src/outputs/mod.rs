//! Output generation for computed clip sheets.
//!
//! One clip sheet is written per e-paper, grouped by publication date:
//!
//! ```text
//! json_output_dir/
//! └── 2025-08-15/
//!     ├── 12.json
//!     └── pune-late-city.json
//! ```

pub mod json;
