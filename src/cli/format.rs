//! Output formatting utilities for CLI commands.
//!
//! Provides a unified `OutputFormat` enum and plain-text / markdown table
//! rendering shared by the commands that print rows.

use clap::ValueEnum;

/// Output format options for CLI commands.
///
/// - `Text` for human-readable terminal output (default)
/// - `Json` for machine-readable output and scripting
/// - `Markdown` for pasting into documents
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output (default).
    #[default]
    Text,
    /// Machine-readable JSON output.
    Json,
    /// Markdown table output.
    Markdown,
}

/// Renders rows as an aligned plain-text table with a header rule.
pub fn text_table(columns: &[String], rows: &[Vec<String>]) -> String {
    let widths = column_widths(columns, rows);
    let mut out = String::new();

    out.push_str(&join_padded(columns, &widths));
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in rows {
        out.push('\n');
        out.push_str(&join_padded(row, &widths));
    }
    out
}

/// Renders rows as a GitHub-flavored markdown table.
pub fn markdown_table(columns: &[String], rows: &[Vec<String>]) -> String {
    let escape = |cell: &String| cell.replace('|', "\\|");
    let mut lines = Vec::with_capacity(rows.len() + 2);

    lines.push(format!(
        "| {} |",
        columns.iter().map(escape).collect::<Vec<_>>().join(" | ")
    ));
    lines.push(format!(
        "|{}|",
        columns.iter().map(|_| "---").collect::<Vec<_>>().join("|")
    ));
    for row in rows {
        lines.push(format!(
            "| {} |",
            row.iter().map(escape).collect::<Vec<_>>().join(" | ")
        ));
    }
    lines.join("\n")
}

fn column_widths(columns: &[String], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(idx) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }
    widths
}

fn join_padded(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Text);
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(
            OutputFormat::from_str("text", false).unwrap(),
            OutputFormat::Text
        );
        assert_eq!(
            OutputFormat::from_str("json", false).unwrap(),
            OutputFormat::Json
        );
        assert_eq!(
            OutputFormat::from_str("markdown", false).unwrap(),
            OutputFormat::Markdown
        );
    }

    #[test]
    fn test_text_table_aligns_columns() {
        let table = text_table(
            &strings(&["ID", "NAME"]),
            &[strings(&["S1", "Alice"]), strings(&["S100", "Bo"])],
        );
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "ID    NAME");
        assert_eq!(lines[1], "----  -----");
        assert_eq!(lines[2], "S1    Alice");
        assert_eq!(lines[3], "S100  Bo");
    }

    #[test]
    fn test_text_table_header_only() {
        let table = text_table(&strings(&["COUNT(*)"]), &[]);
        assert_eq!(table, "COUNT(*)\n--------");
    }

    #[test]
    fn test_markdown_table_escapes_pipes() {
        let table = markdown_table(&strings(&["A", "B"]), &[strings(&["x|y", "z"])]);
        assert_eq!(table, "| A | B |\n|---|---|\n| x\\|y | z |");
    }
}
