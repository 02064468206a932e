//! Relation-to-relation transforms shared by the load units.
//!
//! - **projector**: column subset, full-row deduplication, positional rename
//! - **keys**: surrogate id columns (run-scoped counter or content hash)
//! - **dates**: SAS day offsets to calendar dates
//! - **integrity**: optional orphan-code counts between fact and lookup tables
//! - **frame**: named frame passed from units to the sink

pub mod dates;
pub mod error;
pub mod frame;
pub mod integrity;
pub mod keys;
pub mod projector;
mod row_key;

pub use dates::{SAS_EPOCH, normalize_date_column, sas_offset_to_date};
pub use error::{Result, TransformError};
pub use frame::TableFrame;
pub use integrity::{OrphanReport, count_orphans};
pub use keys::SurrogateKeyAssigner;
pub use projector::{ColumnProjector, dedupe_rows};
