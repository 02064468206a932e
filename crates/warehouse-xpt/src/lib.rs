//! SAS Transport (XPT) file format reader and writer.
//!
//! The raw travel records arrive as SAS datasets. This crate reads (and, for
//! fixtures, writes) the SAS Transport V5 layout:
//!
//! - 80-byte header records (library, member, descriptor, NAMESTR, OBS)
//! - IBM mainframe floating-point numerics with the 28 SAS missing codes
//! - fixed-width, blank-padded character variables
//!
//! With the `polars` feature a dataset converts directly to a Polars
//! [`DataFrame`](polars::prelude::DataFrame): numeric variables become
//! nullable `Float64` columns and character variables become nullable
//! `String` columns (blank values map to null).
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use warehouse_xpt::{XptColumn, XptDataset, XptValue, read_xpt, write_xpt};
//!
//! let mut ds = XptDataset::with_columns(
//!     "I94",
//!     vec![
//!         XptColumn::numeric("CICID").with_label("Record id"),
//!         XptColumn::character("I94ADDR", 2).with_label("State code"),
//!     ],
//! );
//! ds.add_row(vec![XptValue::numeric(6.0), XptValue::character("CA")])
//!     .unwrap();
//! write_xpt(Path::new("i94.xpt"), &ds).unwrap();
//!
//! let back = read_xpt(Path::new("i94.xpt")).unwrap();
//! assert_eq!(back.num_rows(), 1);
//! ```

mod error;
pub mod float;
pub mod header;
mod reader;
mod types;
mod writer;

#[cfg(feature = "polars")]
mod polars_ext;

pub use error::{Result, XptError};

pub use types::{
    MissingValue, NumericValue, RowLengthError, XptColumn, XptDataset, XptType, XptValue,
    XptWriterOptions,
};

pub use reader::{XptReader, read_xpt};

pub use writer::{XptWriter, write_xpt};

#[cfg(feature = "polars")]
pub use polars_ext::{dataset_to_dataframe, read_xpt_to_dataframe};
