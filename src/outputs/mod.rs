//! Result emission.
//!
//! Every subcommand produces one serializable value. It is printed as JSON on
//! stdout, or written under the output directory when one is given:
//!
//! ```text
//! output_dir/
//! └── 2025-05-28/
//!     ├── papers.json
//!     ├── search.json
//!     └── stock_news.json
//! ```

pub mod json;
