//! Source loading for the warehouse load units.
//!
//! - **XPT shards**: every `.xpt` file of a directory, unioned into one
//!   frame after a schema check
//! - **Delimited text**: header-aware reader with an explicit delimiter that
//!   rejects rows with the wrong field count
//! - **Reference labels**: the label file read once as lines, then sliced
//!   into code tables by configured windows
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use warehouse_ingest::{load_xpt_shards, read_delimited_table, read_reference_lines};
//!
//! let raw = load_xpt_shards(Path::new("data/immigration/18-83510-I94-Data-2016"))?;
//! let demo = read_delimited_table(Path::new("data/us-cities-demographics.csv"), b';')?;
//! let lines = read_reference_lines(Path::new("data/I94_SAS_Labels_Descriptions.SAS"))?;
//! ```

mod delimited;
mod discovery;
mod error;
mod reference;
mod shards;

// === Error Types ===
pub use error::{IngestError, Result};

// === File Discovery ===
pub use discovery::list_source_files;

// === Loaders ===
pub use delimited::read_delimited_table;
pub use reference::{CodeTable, parse_code_table, read_reference_lines};
pub use shards::load_xpt_shards;
