//! Summary tables for model and animation listings

use prettytable::format::{Alignment, consts::FORMAT_NO_LINESEP_WITH_TITLE};
use prettytable::{Cell, Row, Table};

/// An empty table with bold column titles.
pub fn create_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_format(*FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(Row::new(
        headers
            .iter()
            .map(|h| Cell::new(h).style_spec("b"))
            .collect(),
    ));
    table
}

/// Appends a row. Counts, indices and `1.500s` durations are right-aligned
/// so columns of numbers line up.
pub fn add_table_row(table: &mut Table, cells: Vec<String>) {
    table.add_row(Row::new(
        cells
            .iter()
            .map(|s| {
                let align = if is_quantity(s) {
                    Alignment::RIGHT
                } else {
                    Alignment::LEFT
                };
                Cell::new_align(s, align)
            })
            .collect(),
    ));
}

fn is_quantity(cell: &str) -> bool {
    let digits = cell.strip_suffix('s').unwrap_or(cell);
    !digits.is_empty() && digits.parse::<f64>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantities() {
        assert!(is_quantity("42"));
        assert!(is_quantity("0.250s"));
        assert!(!is_quantity("hip"));
        assert!(!is_quantity("s"));
        assert!(!is_quantity("-"));
        assert!(!is_quantity(""));
    }

    #[test]
    fn test_rows_keep_their_cells() {
        let mut table = create_table(&["Bone", "Keyframes"]);
        add_table_row(&mut table, vec!["hip".to_string(), "12".to_string()]);
        add_table_row(&mut table, vec!["spine".to_string(), "3".to_string()]);

        assert_eq!(table.len(), 2);
        let row = table.get_row(1).unwrap();
        assert_eq!(row.get_cell(0).unwrap().get_content(), "spine");
        assert_eq!(row.get_cell(1).unwrap().get_content(), "3");

        let rendered = table.to_string();
        assert!(rendered.contains("Keyframes"));
        assert!(rendered.contains("        12 "));
    }
}
