pub mod catalog;
pub mod error;
pub mod keys;
pub mod layout;

pub use catalog::{
    OutputTable, Projection, TableSpec, Unit, airline_dimension, city_demographics,
    fact_immigration, output_tables, person_dimension,
};
pub use error::{ModelError, Result};
pub use keys::KeyStrategy;
pub use layout::{CodeTableSpec, LAYOUT_VERSION, ReferenceLayout};
