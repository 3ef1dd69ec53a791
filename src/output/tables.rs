use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

/// Table and cell creation helpers
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn create_cyan_header<S: AsRef<str>>(labels: &[S]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(label.as_ref()).fg(TableColor::Cyan))
        .collect()
}

/// Fetched issue count, yellow when pagination stopped short of the server total.
pub fn fetched_cell(fetched: usize, total: usize) -> Cell {
    let cell = Cell::new(fetched);
    if fetched < total {
        cell.fg(TableColor::Yellow)
    } else {
        cell.fg(TableColor::Green)
    }
}

/// Label count, dimmed when zero so the populated cells stand out.
pub fn count_cell(count: usize) -> Cell {
    if count == 0 {
        Cell::new(count).fg(TableColor::DarkGrey)
    } else {
        Cell::new(count)
    }
}
