//! Output table catalog.
//!
//! Every projected table is described by a [`TableSpec`]: which unit builds
//! it, the positional source-to-target column mapping, the surrogate key it
//! receives, and how it is laid out on disk.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::layout::ReferenceLayout;

/// One of the three independent load units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Statistical dataset to fact, person and airline tables.
    Immigration,
    /// Delimited city demographics.
    Demographics,
    /// Code tables from the label-description file.
    Reference,
}

impl Unit {
    pub const ALL: [Unit; 3] = [Unit::Immigration, Unit::Demographics, Unit::Reference];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Immigration => "immigration",
            Self::Demographics => "demographics",
            Self::Reference => "reference",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered source columns and the names they take in the output.
///
/// Position `i` of `sources` is renamed to position `i` of `targets`. The
/// lists are checked for equal length on construction so a bad mapping is
/// rejected before any data is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    sources: Vec<String>,
    targets: Vec<String>,
}

impl Projection {
    pub fn new<S: AsRef<str>, T: AsRef<str>>(
        table: &str,
        sources: &[S],
        targets: &[T],
    ) -> Result<Self> {
        if sources.len() != targets.len() {
            return Err(ModelError::ProjectionLength {
                table: table.to_string(),
                sources: sources.len(),
                targets: targets.len(),
            });
        }
        Ok(Self {
            sources: sources.iter().map(|s| s.as_ref().to_string()).collect(),
            targets: targets.iter().map(|s| s.as_ref().to_string()).collect(),
        })
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }
}

/// A projected warehouse table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSpec {
    pub name: String,
    pub unit: Unit,
    pub projection: Projection,
    /// Surrogate id column appended after the projected columns.
    pub key_column: String,
    /// Hive partition column (a target name).
    pub partition_by: Option<String>,
    /// Target columns holding SAS day offsets to convert to dates.
    pub date_columns: Vec<String>,
}

impl TableSpec {
    /// Final column order written to the sink.
    pub fn columns(&self) -> Vec<String> {
        let mut columns = self.projection.targets().to_vec();
        columns.push(self.key_column.clone());
        columns
    }

    pub fn output(&self) -> OutputTable {
        OutputTable {
            name: self.name.clone(),
            unit: self.unit,
            columns: self.columns(),
            partition_by: self.partition_by.clone(),
        }
    }
}

/// Name and schema of one table as it lands in the destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputTable {
    pub name: String,
    pub unit: Unit,
    pub columns: Vec<String>,
    pub partition_by: Option<String>,
}

pub fn fact_immigration() -> Result<TableSpec> {
    const NAME: &str = "fact_immigration";
    Ok(TableSpec {
        name: NAME.to_string(),
        unit: Unit::Immigration,
        projection: Projection::new(
            NAME,
            &[
                "cicid", "i94yr", "i94mon", "i94port", "i94mode", "i94addr", "i94visa", "arrdate",
                "depdate",
            ],
            &[
                "cic_id",
                "year",
                "month",
                "city_code",
                "transportation",
                "state_code",
                "visa",
                "arrival_date",
                "departure_date",
            ],
        )?,
        key_column: "immigration_id".to_string(),
        partition_by: Some("state_code".to_string()),
        date_columns: vec!["arrival_date".to_string(), "departure_date".to_string()],
    })
}

pub fn person_dimension() -> Result<TableSpec> {
    const NAME: &str = "dim_person";
    Ok(TableSpec {
        name: NAME.to_string(),
        unit: Unit::Immigration,
        projection: Projection::new(
            NAME,
            &["cicid", "i94cit", "i94res", "biryear", "gender"],
            &[
                "cic_id",
                "citizen_country",
                "residence_country",
                "birth_year",
                "gender",
            ],
        )?,
        key_column: "person_id".to_string(),
        partition_by: None,
        date_columns: Vec::new(),
    })
}

pub fn airline_dimension() -> Result<TableSpec> {
    const NAME: &str = "dim_airline";
    Ok(TableSpec {
        name: NAME.to_string(),
        unit: Unit::Immigration,
        projection: Projection::new(
            NAME,
            &["cicid", "airline", "fltno", "visatype"],
            &["cic_id", "airline", "flight_no", "visa_type"],
        )?,
        key_column: "airflight_id".to_string(),
        partition_by: None,
        date_columns: Vec::new(),
    })
}

pub fn city_demographics() -> Result<TableSpec> {
    const NAME: &str = "dim_city_demo";
    Ok(TableSpec {
        name: NAME.to_string(),
        unit: Unit::Demographics,
        projection: Projection::new(
            NAME,
            &[
                "City",
                "State Code",
                "Median Age",
                "Male Population",
                "Female Population",
                "Foreign-born",
                "Average Household Size",
            ],
            &[
                "City",
                "Code",
                "Median Age",
                "Males",
                "Females",
                "Foreign-born",
                "Avg. Household Size",
            ],
        )?,
        key_column: "demo_id".to_string(),
        partition_by: None,
        date_columns: Vec::new(),
    })
}

/// Every table a full run writes, in unit order.
pub fn output_tables(layout: &ReferenceLayout) -> Result<Vec<OutputTable>> {
    let mut tables: Vec<OutputTable> = [
        fact_immigration()?,
        person_dimension()?,
        airline_dimension()?,
        city_demographics()?,
    ]
    .iter()
    .map(TableSpec::output)
    .collect();
    tables.extend(layout.tables.iter().map(|spec| OutputTable {
        name: spec.table_name.clone(),
        unit: Unit::Reference,
        columns: vec!["code".to_string(), spec.label_column.clone()],
        partition_by: None,
    }));
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_rejects_length_mismatch() {
        let err = Projection::new("t", &["a", "b"], &["x"]).unwrap_err();
        assert!(matches!(
            err,
            ModelError::ProjectionLength {
                sources: 2,
                targets: 1,
                ..
            }
        ));
    }

    #[test]
    fn fact_schema_order() {
        let fact = fact_immigration().unwrap();
        assert_eq!(
            fact.columns(),
            [
                "cic_id",
                "year",
                "month",
                "city_code",
                "transportation",
                "state_code",
                "visa",
                "arrival_date",
                "departure_date",
                "immigration_id",
            ]
        );
        assert_eq!(fact.partition_by.as_deref(), Some("state_code"));
        assert!(
            fact.date_columns
                .iter()
                .all(|c| fact.projection.targets().contains(c))
        );
    }

    #[test]
    fn pairs_are_positional() {
        let airline = airline_dimension().unwrap();
        assert_eq!(airline.projection.sources()[2], "fltno");
        assert_eq!(airline.projection.targets()[2], "flight_no");
    }

    #[test]
    fn output_tables_cover_all_units() {
        let tables = output_tables(&ReferenceLayout::default()).unwrap();
        let names: Vec<&str> = tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "fact_immigration",
                "dim_person",
                "dim_airline",
                "dim_city_demo",
                "dim_country_code",
                "dim_city_code",
                "dim_state_code",
                "dim_transport",
            ]
        );
        assert_eq!(tables[7].columns, ["code", "transport"]);
    }
}
