use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use warehouse_cli::types::RunResult;
use warehouse_transform::OrphanReport;

pub fn print_summary(result: &RunResult) {
    println!("Destination: {}", result.destination.display());
    if result.dry_run {
        println!("Dry run: no files written");
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("Unit"),
        header_cell("Rows"),
        header_cell("Partitions"),
        header_cell("Files"),
        header_cell("Status"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    align_column(&mut table, 5, CellAlignment::Center);

    let mut total_rows = 0usize;
    let mut total_files = 0usize;
    for unit in &result.units {
        for summary in &unit.tables {
            total_rows += summary.rows;
            total_files += summary.files.len();
            table.add_row(vec![
                Cell::new(&summary.name)
                    .fg(Color::Blue)
                    .add_attribute(Attribute::Bold),
                Cell::new(unit.unit),
                Cell::new(summary.rows),
                count_cell(summary.partitions),
                count_cell(summary.files.len()),
                status_cell(result.dry_run),
            ]);
        }
        if unit.error.is_some() {
            table.add_row(vec![
                dim_cell("-"),
                Cell::new(unit.unit),
                dim_cell("-"),
                dim_cell("-"),
                dim_cell("-"),
                Cell::new("FAILED")
                    .fg(Color::Red)
                    .add_attribute(Attribute::Bold),
            ]);
        }
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(total_rows).add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(total_files).add_attribute(Attribute::Bold),
        dim_cell("-"),
    ]);
    println!("{table}");

    print_integrity_table(&result.integrity);

    let failures: Vec<_> = result
        .units
        .iter()
        .filter_map(|unit| unit.error.as_ref().map(|error| (unit.unit, error)))
        .collect();
    if !failures.is_empty() {
        eprintln!("Errors:");
        for (unit, error) in failures {
            eprintln!("- {unit}: {error}");
        }
    }
}

fn print_integrity_table(reports: &[OrphanReport]) {
    if reports.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Fact column"),
        header_cell("Lookup"),
        header_cell("Checked"),
        header_cell("Orphans"),
        header_cell("Examples"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for report in reports {
        let orphans = if report.is_clean() {
            dim_cell(0)
        } else {
            Cell::new(report.orphan_rows).fg(Color::Yellow)
        };
        let examples = if report.sample.is_empty() {
            dim_cell("-")
        } else {
            Cell::new(report.sample.join(", "))
        };
        table.add_row(vec![
            Cell::new(&report.fact_column),
            Cell::new(&report.dimension),
            Cell::new(report.checked_rows),
            orphans,
            examples,
        ]);
    }
    println!();
    println!("Integrity:");
    println!("{table}");
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn status_cell(dry_run: bool) -> Cell {
    if dry_run {
        Cell::new("planned").fg(Color::Yellow)
    } else {
        Cell::new("✓").fg(Color::Green).add_attribute(Attribute::Bold)
    }
}

fn count_cell(count: usize) -> Cell {
    if count == 0 {
        dim_cell(count)
    } else {
        Cell::new(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
