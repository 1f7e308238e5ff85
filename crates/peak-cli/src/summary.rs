use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use peak_match::PassReport;

use crate::types::MergeResult;

pub fn print_summary(result: &MergeResult) {
    println!("Municipality: {}", result.municipality);
    println!(
        "Loaded: {} SSR names, {} N50 peaks, {} OSM peaks",
        result.sources.authority, result.sources.topo, result.sources.existing
    );
    println!("{}", pass_table(&result.reports));
    println!(
        "Output: {} ({} nodes modified, {} added)",
        result.output.display(),
        result.modified,
        result.added
    );
    if let Some(path) = &result.review_csv {
        println!("Review list: {} ({} records)", path.display(), result.review_rows);
    } else if result.review_rows > 0 {
        println!("{} records carry CHECK, DUPLICATE or CLOSE tags", result.review_rows);
    }
}

/// One row per pass plus a total row.
pub fn pass_table(reports: &[PassReport]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Pass"),
        header_cell("Description"),
        header_cell("Committed"),
        header_cell("Checks"),
        header_cell("Duplicates"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);

    let mut total_committed = 0usize;
    let mut total_checks = 0usize;
    let mut total_duplicates = 0usize;
    for report in reports {
        total_committed += report.committed;
        total_checks += report.checks;
        total_duplicates += report.duplicates;
        table.add_row(vec![
            Cell::new(report.pass.number()),
            Cell::new(report.pass.description()),
            Cell::new(report.committed),
            count_cell(report.checks, Color::Yellow),
            count_cell(report.duplicates, Color::Magenta),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(total_committed).add_attribute(Attribute::Bold),
        count_cell(total_checks, Color::Yellow).add_attribute(Attribute::Bold),
        count_cell(total_duplicates, Color::Magenta).add_attribute(Attribute::Bold),
    ]);
    table
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
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
