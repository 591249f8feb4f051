//! Plain-text summary tables.
//!
//! Every analysis projects its cached result into a [`Table`]: a header row
//! plus rows of preformatted cells. Rendering is a simple grid via
//! [`Display`](std::fmt::Display); richer output (HTML, plots) is left to
//! callers, who can read the cells directly.

use std::fmt;

use crate::tensor::MeasurementTensor;

/// Format a value with a fixed number of decimals.
#[must_use]
pub fn format_value(value: f64, precision: usize) -> String {
    format!("{value:.precision$}")
}

/// Headers and rows of a summary, all cells already formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Table {
    title: Option<String>,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Create an untitled table.
    #[must_use]
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            title: None,
            headers,
            rows,
        }
    }

    /// Attach a title printed above the grid.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Title, if any.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Column headers.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Data rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Cell at `(row, column)`, if present.
    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column).map(String::as_str)
    }

    fn column_widths(&self) -> Vec<usize> {
        let columns = self
            .rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0);

        (0..columns)
            .map(|c| {
                self.rows
                    .iter()
                    .chain(std::iter::once(&self.headers))
                    .filter_map(|row| row.get(c))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }
}

/// Rows for a per-stratum summary: the total, then one row per operator and
/// one per part, labelled with the tensor's labels.
pub(crate) fn stratum_rows(
    tensor: &MeasurementTensor,
    total: Vec<String>,
    operators: Vec<Vec<String>>,
    parts: Vec<Vec<String>>,
) -> Vec<Vec<String>> {
    let labelled = |label: &str, cells: Vec<String>| {
        let mut row = vec![label.to_string()];
        row.extend(cells);
        row
    };

    std::iter::once(labelled("Total", total))
        .chain(
            tensor
                .operator_labels()
                .iter()
                .zip(operators)
                .map(|(label, cells)| labelled(label, cells)),
        )
        .chain(
            tensor
                .part_labels()
                .iter()
                .zip(parts)
                .map(|(label, cells)| labelled(label, cells)),
        )
        .collect()
}

fn write_rule(f: &mut fmt::Formatter<'_>, widths: &[usize], fill: char) -> fmt::Result {
    write!(f, "+")?;
    for &w in widths {
        write!(f, "{}+", fill.to_string().repeat(w + 2))?;
    }
    writeln!(f)
}

fn write_row(f: &mut fmt::Formatter<'_>, widths: &[usize], row: &[String]) -> fmt::Result {
    write!(f, "|")?;
    for (c, &w) in widths.iter().enumerate() {
        let cell = row.get(c).map_or("", String::as_str);
        write!(f, " {cell:<w$} |")?;
    }
    writeln!(f)
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(title) = &self.title {
            writeln!(f, "{title}")?;
        }
        let widths = self.column_widths();

        write_rule(f, &widths, '-')?;
        write_row(f, &widths, &self.headers)?;
        write_rule(f, &widths, '=')?;
        for row in &self.rows {
            write_row(f, &widths, row)?;
            write_rule(f, &widths, '-')?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(889.458_21, 3), "889.458");
        assert_eq!(format_value(2.0, 0), "2");
        assert_eq!(format_value(f64::NAN, 2), "NaN");
    }

    #[test]
    fn test_render_grid() {
        let table = Table::new(
            vec!["Source".to_string(), "DF".to_string()],
            vec![
                vec!["Operator".to_string(), "2".to_string()],
                vec!["Total".to_string(), String::new()],
            ],
        )
        .with_title("ANOVA");

        let expected = "\
ANOVA
+----------+----+
| Source   | DF |
+==========+====+
| Operator | 2  |
+----------+----+
| Total    |    |
+----------+----+
";
        assert_eq!(table.to_string(), expected);
    }

    #[test]
    fn test_accessors() {
        let table = Table::new(
            vec!["a".to_string()],
            vec![vec!["1".to_string()], vec!["2".to_string()]],
        );
        assert_eq!(table.title(), None);
        assert_eq!(table.cell(1, 0), Some("2"));
        assert_eq!(table.cell(2, 0), None);
        assert_eq!(table.cell(0, 3), None);
    }
}
