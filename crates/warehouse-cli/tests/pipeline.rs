//! Full runs against a small source tree built in a temp dir.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use polars::prelude::*;
use tempfile::TempDir;
use warehouse_cli::config::RunConfig;
use warehouse_cli::pipeline::run_pipeline;
use warehouse_cli::types::RunResult;
use warehouse_cli::units::{DEMOGRAPHICS_FILE, IMMIGRATION_DIR, LABELS_FILE};
use warehouse_model::{CodeTableSpec, KeyStrategy, LAYOUT_VERSION, ReferenceLayout, Unit};
use warehouse_xpt::{XptColumn, XptDataset, XptValue, write_xpt};

const LABELS: &str = "\
/* I94CIT & I94RES */
   101 =  'AFGHANISTAN'
   102 =  'ALBANIA'
   101 =  'AFGHANISTAN (NEW)'
/* I94PORT */
   'NYC'\t=\t'NEW YORK, NY       '
   'LOS'\t=\t'LOS ANGELES, CA'
/* I94MODE */
\t1 = 'Air'
\t2 = 'Sea'
/* I94ADDR */
\t'CA'='CALIFORNIA'
\t'NY'='NEW YORK'
";

const DEMOGRAPHICS: &str = "\
City;State;Median Age;Male Population;Female Population;Total Population;Foreign-born;Average Household Size;State Code;Race;Count
Silver Spring;Maryland;33.8;40601;41862;82463;30908;2.6;MD;Hispanic or Latino;25924
Silver Spring;Maryland;33.8;40601;41862;82463;30908;2.6;MD;White;37756
Quincy;Massachusetts;41.0;44129;49500;93629;32935;2.39;MA;Asian;30473
";

struct Row {
    cicid: f64,
    port: &'static str,
    mode: f64,
    addr: &'static str,
    arrdate: f64,
    depdate: Option<f64>,
    cit: f64,
    gender: &'static str,
    airline: &'static str,
}

const NY_VISITOR: Row = Row {
    cicid: 1.0,
    port: "NYC",
    mode: 1.0,
    addr: "NY",
    arrdate: 20545.0,
    depdate: Some(20550.0),
    cit: 101.0,
    gender: "M",
    airline: "AA",
};

const CA_VISITOR: Row = Row {
    cicid: 2.0,
    port: "LOS",
    mode: 1.0,
    addr: "CA",
    arrdate: 20546.0,
    depdate: None,
    cit: 102.0,
    gender: "F",
    airline: "UA",
};

const NO_STATE_VISITOR: Row = Row {
    cicid: 3.0,
    port: "NYC",
    mode: 9.0,
    addr: "",
    arrdate: 20547.0,
    depdate: Some(20560.0),
    cit: 101.0,
    gender: "",
    airline: "DL",
};

fn shard(rows: &[&Row]) -> XptDataset {
    let mut ds = XptDataset::with_columns(
        "I94",
        vec![
            XptColumn::numeric("CICID"),
            XptColumn::numeric("I94YR"),
            XptColumn::numeric("I94MON"),
            XptColumn::character("I94PORT", 3),
            XptColumn::numeric("I94MODE"),
            XptColumn::character("I94ADDR", 2),
            XptColumn::numeric("I94VISA"),
            XptColumn::numeric("ARRDATE"),
            XptColumn::numeric("DEPDATE"),
            XptColumn::numeric("I94CIT"),
            XptColumn::numeric("I94RES"),
            XptColumn::numeric("BIRYEAR"),
            XptColumn::character("GENDER", 1),
            XptColumn::character("AIRLINE", 3),
            XptColumn::character("FLTNO", 5),
            XptColumn::character("VISATYPE", 2),
        ],
    );
    for row in rows {
        ds.add_row(vec![
            XptValue::numeric(row.cicid),
            XptValue::numeric(2016.0),
            XptValue::numeric(4.0),
            XptValue::character(row.port),
            XptValue::numeric(row.mode),
            XptValue::character(row.addr),
            XptValue::numeric(2.0),
            XptValue::numeric(row.arrdate),
            row.depdate
                .map_or_else(XptValue::numeric_missing, XptValue::numeric),
            XptValue::numeric(row.cit),
            XptValue::numeric(row.cit),
            XptValue::numeric(1980.0),
            XptValue::character(row.gender),
            XptValue::character(row.airline),
            XptValue::character("00123"),
            XptValue::character("B2"),
        ])
        .unwrap();
    }
    ds
}

fn layout() -> ReferenceLayout {
    ReferenceLayout {
        version: LAYOUT_VERSION,
        tables: vec![
            CodeTableSpec::new("dim_country_code", "country", 1, 4).strip_label("'"),
            CodeTableSpec::new("dim_city_code", "city", 5, 7)
                .strip_code("'")
                .strip_label("' "),
            CodeTableSpec::new("dim_state_code", "state", 11, 13)
                .strip_code("'")
                .strip_label("'"),
            CodeTableSpec::new("dim_transport", "transport", 8, 10),
        ],
    }
}

fn source_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    let shards = dir.path().join(IMMIGRATION_DIR);
    fs::create_dir_all(&shards).unwrap();
    write_xpt(&shards.join("i94_apr16_a.xpt"), &shard(&[&NY_VISITOR, &CA_VISITOR])).unwrap();
    // A full duplicate across shards collapses in every table.
    write_xpt(&shards.join("i94_apr16_b.xpt"), &shard(&[&NY_VISITOR, &NO_STATE_VISITOR])).unwrap();
    fs::write(dir.path().join(DEMOGRAPHICS_FILE), DEMOGRAPHICS).unwrap();
    fs::write(dir.path().join(LABELS_FILE), LABELS).unwrap();
    dir
}

fn config(source: &Path, destination: &Path) -> RunConfig {
    RunConfig {
        source: source.to_path_buf(),
        destination: destination.to_path_buf(),
        credentials: None,
        key_strategy: KeyStrategy::Monotonic,
        layout: layout(),
        units: Unit::ALL.to_vec(),
        dry_run: false,
        check_integrity: false,
    }
}

fn read_parquet(path: &Path) -> DataFrame {
    ParquetReader::new(File::open(path).unwrap()).finish().unwrap()
}

fn strings(df: &DataFrame, column: &str) -> Vec<Option<String>> {
    df.column(column)
        .unwrap()
        .cast(&DataType::String)
        .unwrap()
        .str()
        .unwrap()
        .iter()
        .map(|v| v.map(str::to_string))
        .collect()
}

fn table_files(result: &RunResult, name: &str) -> Vec<PathBuf> {
    result
        .tables()
        .find(|(_, table)| table.name == name)
        .map(|(_, table)| table.files.clone())
        .unwrap_or_default()
}

/// Every fact partition read back with `state_code` restored from the
/// directory name, keyed by `cic_id`.
fn fact_rows(result: &RunResult) -> BTreeMap<i64, (Option<String>, Option<String>, Option<String>)> {
    let mut rows = BTreeMap::new();
    for file in table_files(result, "fact_immigration") {
        let dir = file.parent().unwrap().file_name().unwrap().to_str().unwrap();
        let state = dir
            .strip_prefix("state_code=")
            .filter(|v| *v != "__HIVE_DEFAULT_PARTITION__")
            .map(str::to_string);
        let part = read_parquet(&file);
        let ids = part.column("cic_id").unwrap().cast(&DataType::Int64).unwrap();
        let arrivals = strings(&part, "arrival_date");
        let departures = strings(&part, "departure_date");
        for (idx, id) in ids.i64().unwrap().iter().enumerate() {
            let previous = rows.insert(
                id.unwrap(),
                (state.clone(), arrivals[idx].clone(), departures[idx].clone()),
            );
            assert!(previous.is_none(), "cic_id {id:?} written twice");
        }
    }
    rows
}

#[test]
fn full_run_writes_every_table() {
    let source = source_tree();
    let out = TempDir::new().unwrap();

    let result = run_pipeline(&config(source.path(), out.path()));

    assert!(!result.has_errors(), "{:?}", result.units);
    let names: Vec<&str> = result.tables().map(|(_, t)| t.name.as_str()).collect();
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

    let fact = fact_rows(&result);
    assert_eq!(
        fact,
        BTreeMap::from([
            (
                1,
                (
                    Some("NY".to_string()),
                    Some("2016-04-01".to_string()),
                    Some("2016-04-06".to_string())
                )
            ),
            (2, (Some("CA".to_string()), Some("2016-04-02".to_string()), None)),
            (3, (None, Some("2016-04-03".to_string()), Some("2016-04-16".to_string()))),
        ])
    );

    let first_part = read_parquet(&table_files(&result, "fact_immigration")[0]);
    let columns: Vec<&str> = first_part.get_column_names().iter().map(|n| n.as_str()).collect();
    assert_eq!(
        columns,
        [
            "cic_id",
            "year",
            "month",
            "city_code",
            "transportation",
            "visa",
            "arrival_date",
            "departure_date",
            "immigration_id",
        ]
    );
    assert_eq!(first_part.column("arrival_date").unwrap().dtype(), &DataType::Date);
}

#[test]
fn dimensions_are_deduplicated_and_keyed() {
    let source = source_tree();
    let out = TempDir::new().unwrap();

    let result = run_pipeline(&config(source.path(), out.path()));

    let person = read_parquet(&out.path().join("dim_person").join("part-00000.parquet"));
    assert_eq!(person.height(), 3);
    let ids = person.column("person_id").unwrap().i64().unwrap();
    assert_eq!(ids.n_unique().unwrap(), 3);

    let demo = read_parquet(&table_files(&result, "dim_city_demo")[0]);
    assert_eq!(strings(&demo, "City"), [Some("Silver Spring".to_string()), Some("Quincy".to_string())]);
    assert_eq!(strings(&demo, "Code"), [Some("MD".to_string()), Some("MA".to_string())]);
    assert_eq!(demo.column("Median Age").unwrap().dtype(), &DataType::String);
    assert!(demo.column("demo_id").is_ok());
}

#[test]
fn code_tables_follow_the_layout() {
    let source = source_tree();
    let out = TempDir::new().unwrap();

    run_pipeline(&config(source.path(), out.path()));

    let read = |table: &str| read_parquet(&out.path().join(table).join("part-00000.parquet"));
    let country = read("dim_country_code");
    assert_eq!(strings(&country, "code"), [Some("101".to_string()), Some("102".to_string())]);
    assert_eq!(
        strings(&country, "country"),
        [Some("AFGHANISTAN (NEW)".to_string()), Some("ALBANIA".to_string())]
    );
    let city = read("dim_city_code");
    assert_eq!(strings(&city, "code"), [Some("NYC".to_string()), Some("LOS".to_string())]);
    assert_eq!(strings(&city, "city")[0].as_deref(), Some("NEW YORK, NY"));
    let transport = read("dim_transport");
    assert_eq!(strings(&transport, "transport")[0].as_deref(), Some("'Air'"));
    let state = read("dim_state_code");
    assert_eq!(strings(&state, "state")[1].as_deref(), Some("NEW YORK"));
}

#[test]
fn rerun_replaces_output_with_same_content() {
    let source = source_tree();
    let out = TempDir::new().unwrap();
    let config = config(source.path(), out.path());

    let first = run_pipeline(&config);
    let first_rows = fact_rows(&first);
    let second = run_pipeline(&config);

    assert_eq!(fact_rows(&second), first_rows);
    assert_eq!(
        table_files(&first, "fact_immigration"),
        table_files(&second, "fact_immigration")
    );
}

#[test]
fn failed_unit_does_not_stop_the_others() {
    let source = source_tree();
    fs::remove_file(source.path().join(DEMOGRAPHICS_FILE)).unwrap();
    let out = TempDir::new().unwrap();

    let result = run_pipeline(&config(source.path(), out.path()));

    assert!(result.has_errors());
    let demographics = &result.units[1];
    assert_eq!(demographics.unit, Unit::Demographics);
    assert!(demographics.tables.is_empty());
    assert!(
        demographics
            .error
            .as_deref()
            .is_some_and(|e| e.contains(DEMOGRAPHICS_FILE))
    );
    assert!(out.path().join("dim_transport").join("part-00000.parquet").exists());
    assert!(out.path().join("dim_person").exists());
}

#[test]
fn short_label_file_writes_no_code_table() {
    let source = source_tree();
    let truncated: String = LABELS.lines().take(12).map(|line| format!("{line}\n")).collect();
    fs::write(source.path().join(LABELS_FILE), truncated).unwrap();
    let out = TempDir::new().unwrap();

    let result = run_pipeline(&config(source.path(), out.path()));

    let reference = &result.units[2];
    assert_eq!(reference.unit, Unit::Reference);
    assert!(reference.tables.is_empty());
    assert!(
        reference
            .error
            .as_deref()
            .is_some_and(|e| e.contains("12 lines") && e.contains("line 13")),
        "{:?}",
        reference.error
    );
    // The country window is covered but nothing is written before the check.
    assert!(!out.path().join("dim_country_code").exists());
    assert!(out.path().join("fact_immigration").exists());
}

#[test]
fn dry_run_builds_but_writes_nothing() {
    let source = source_tree();
    let out = TempDir::new().unwrap();
    let mut config = config(source.path(), out.path());
    config.dry_run = true;

    let result = run_pipeline(&config);

    assert!(!result.has_errors());
    assert_eq!(result.tables().map(|(_, t)| t.rows).sum::<usize>(), 3 + 3 + 3 + 2 + 2 + 2 + 2 + 2);
    assert!(fs::read_dir(out.path()).unwrap().next().is_none());
}

#[test]
fn integrity_check_reports_unknown_transport_codes() {
    let source = source_tree();
    let out = TempDir::new().unwrap();
    let mut config = config(source.path(), out.path());
    config.check_integrity = true;

    let result = run_pipeline(&config);

    assert!(!result.has_errors());
    assert_eq!(result.integrity.len(), 3);
    let transport = result
        .integrity
        .iter()
        .find(|r| r.dimension == "dim_transport")
        .unwrap();
    assert_eq!(transport.orphan_rows, 1);
    assert_eq!(transport.sample, ["9"]);
    assert!(
        result
            .integrity
            .iter()
            .filter(|r| r.dimension != "dim_transport")
            .all(|r| r.is_clean())
    );
}

#[test]
fn content_hash_ids_repeat_across_runs() {
    let source = source_tree();
    let first_out = TempDir::new().unwrap();
    let second_out = TempDir::new().unwrap();
    let mut first_config = config(source.path(), first_out.path());
    first_config.key_strategy = KeyStrategy::ContentHash;
    let mut second_config = config(source.path(), second_out.path());
    second_config.key_strategy = KeyStrategy::ContentHash;
    second_config.units = vec![Unit::Immigration];

    run_pipeline(&first_config);
    run_pipeline(&second_config);

    let ids = |root: &Path| {
        let airline = read_parquet(&root.join("dim_airline").join("part-00000.parquet"));
        let mut ids: Vec<i64> = airline
            .column("airflight_id")
            .unwrap()
            .i64()
            .unwrap()
            .into_no_null_iter()
            .collect();
        ids.sort_unstable();
        ids
    };
    let first = ids(first_out.path());
    assert_eq!(first.len(), 3);
    assert!(first.iter().all(|id| *id >= 0));
    assert_eq!(first, ids(second_out.path()));
}
