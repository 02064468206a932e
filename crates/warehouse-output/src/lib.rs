//! Parquet output for warehouse tables.
//!
//! Each table lands in its own directory under the destination root. A write
//! replaces whatever the directory held before. Partitioned tables get one
//! `column=value` subdirectory per distinct value, with the partition column
//! left out of the files themselves.

mod error;
mod hive;
mod sink;

pub use error::{OutputError, Result};
pub use hive::{HIVE_DEFAULT_PARTITION, escape_partition_value, partition_dir_name};
pub use sink::{PART_FILE_NAME, ParquetSink, WriteReport};
