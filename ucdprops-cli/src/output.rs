use comfy_table::{presets, CellAlignment, ContentArrangement, Table};
use serde::Serialize;

use crate::app::GlobalOptions;

/// Print `data` as JSON (if `--json`) or call `display_fn` for human-readable output.
pub fn print_output<T: Serialize>(
    data: &T,
    opts: &GlobalOptions,
    display_fn: impl FnOnce(&T),
) -> anyhow::Result<()> {
    if opts.json {
        let json = serde_json::to_string_pretty(data)?;
        println!("{json}");
    } else {
        display_fn(data);
    }
    Ok(())
}

/// Tabular writer backed by `comfy-table` for clean, aligned CLI output.
///
/// Columns are left aligned and sized to the widest entry. No borders, no header row, one
/// space between columns. Rows are never wrapped to the terminal width.
pub struct TabWriter {
    table: Table,
    columns: usize,
    styled: bool,
}

impl TabWriter {
    /// Create a new `TabWriter` with the given number of columns.
    pub fn new(columns: usize) -> Self {
        let mut table = Table::new();
        table
            .load_preset(presets::NOTHING)
            .set_content_arrangement(ContentArrangement::Disabled);

        Self {
            table,
            columns,
            styled: false,
        }
    }

    /// Add a row. Values are given in column order.
    pub fn row(&mut self, values: Vec<String>) {
        self.table.add_row(values);
        if !self.styled {
            self.apply_style();
        }
    }

    // comfy-table creates its columns with the first row, so styling waits until then.
    fn apply_style(&mut self) {
        let last = self.columns.saturating_sub(1);
        for i in 0..self.columns {
            if let Some(col) = self.table.column_mut(i) {
                col.set_cell_alignment(CellAlignment::Left);
                col.set_padding((0, u16::from(i != last)));
            }
        }
        self.styled = true;
    }

    /// Render the table, one line per row, without trailing whitespace.
    pub fn render(&self) -> String {
        self.table
            .lines()
            .map(|line| line.trim_end().to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Print the table to stdout.
    pub fn print(&self) {
        let rendered = self.render();
        if !rendered.is_empty() {
            println!("{rendered}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_values_stay_on_one_line() {
        let value = "LATIN SMALL LETTER ".repeat(20);
        let mut table = TabWriter::new(2);
        table.row(vec![format!("{:40}", "Name"), value.clone()]);
        table.row(vec![format!("{:40}", "Script"), "Latin".to_string()]);

        let rendered = table.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], format!("{:40} {}", "Name", value.trim_end()));
        assert_eq!(lines[1], format!("{:40} Latin", "Script"));
    }

    #[test]
    fn key_column_grows_with_longest_label() {
        let label = "Canonical Combining Class Long Label Text Here";
        let mut table = TabWriter::new(2);
        table.row(vec![label.to_string(), "0".to_string()]);
        table.row(vec!["Age".to_string(), "1.1".to_string()]);

        let rendered = table.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], format!("{label} 0"));
        assert_eq!(lines[1], format!("{:width$} 1.1", "Age", width = label.len()));
    }
}
