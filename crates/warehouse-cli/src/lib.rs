//! Library side of the `warehouse-etl` binary: configuration, logging, the
//! three load units and the driver that runs them.

pub mod config;
pub mod logging;
pub mod pipeline;
pub mod types;
pub mod units;
