// Copyright Sebastian Wiesner <sebastian@swsnr.de>

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Table layout.

use pulldown_cmark::Alignment;
use textwrap::core::display_width;

use crate::style::StyleTable;

/// Collects table cells during the walk and lays the table out on exit.
///
/// Cells are buffered as plain text; the bordered table is emitted when the
/// table ends, with the separator glyphs of the table style and no outer
/// border.
#[derive(Debug)]
pub(crate) struct TableBuilder {
    alignments: Vec<Alignment>,
    head: Vec<String>,
    rows: Vec<Vec<String>>,
    current_row: Vec<String>,
    in_head: bool,
}

impl TableBuilder {
    pub(crate) fn new(alignments: Vec<Alignment>) -> Self {
        Self {
            alignments,
            head: Vec::new(),
            rows: Vec::new(),
            current_row: Vec::new(),
            in_head: false,
        }
    }

    pub(crate) fn start_head(&mut self) {
        self.in_head = true;
    }

    pub(crate) fn end_head(&mut self) {
        self.head = std::mem::take(&mut self.current_row);
        self.in_head = false;
    }

    pub(crate) fn push_cell(&mut self, text: String) {
        self.current_row.push(text);
    }

    pub(crate) fn end_row(&mut self) {
        self.rows.push(std::mem::take(&mut self.current_row));
    }

    fn columns(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.head.len()))
            .max()
            .unwrap_or(0)
    }

    fn widths(&self, columns: usize) -> Vec<usize> {
        let mut widths = vec![0; columns];
        for row in std::iter::once(&self.head).chain(self.rows.iter()) {
            for (column, cell) in row.iter().enumerate() {
                widths[column] = widths[column].max(display_width(cell));
            }
        }
        widths
    }

    fn aligned(&self, column: usize, cell: &str, width: usize) -> String {
        let fill = width.saturating_sub(display_width(cell));
        match self.alignments.get(column).copied().unwrap_or(Alignment::None) {
            Alignment::Right => format!("{}{}", " ".repeat(fill), cell),
            Alignment::Center => {
                let left = fill / 2;
                format!("{}{}{}", " ".repeat(left), cell, " ".repeat(fill - left))
            }
            Alignment::None | Alignment::Left => format!("{}{}", cell, " ".repeat(fill)),
        }
    }

    fn layout_row(&self, row: &[String], widths: &[usize], column_separator: &str) -> String {
        let cells: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(column, width)| {
                let empty = String::new();
                let cell = row.get(column).unwrap_or(&empty);
                format!(" {} ", self.aligned(column, cell, *width))
            })
            .collect();
        cells.join(column_separator)
    }

    /// Lay the collected table out as unstyled lines.
    pub(crate) fn layout(&self, style: &StyleTable) -> Vec<String> {
        let columns = self.columns();
        if columns == 0 {
            return Vec::new();
        }
        let widths = self.widths(columns);

        let column_separator = style.column_separator.as_deref().unwrap_or("│");
        let row_separator = style.row_separator.as_deref().unwrap_or("─");
        let center_separator = style.center_separator.as_deref().unwrap_or("┼");

        let mut lines = Vec::with_capacity(self.rows.len() + 2);
        if !self.head.is_empty() {
            lines.push(self.layout_row(&self.head, &widths, column_separator));
            let rule: Vec<String> = widths
                .iter()
                .map(|width| row_separator.repeat(width + 2))
                .collect();
            lines.push(rule.join(center_separator));
        }
        for row in &self.rows {
            lines.push(self.layout_row(row, &widths, column_separator));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    fn style() -> StyleTable {
        serde_json::from_str(
            r#"{"center_separator": "┼", "column_separator": "│", "row_separator": "─"}"#,
        )
        .unwrap()
    }

    fn table(alignments: Vec<Alignment>) -> TableBuilder {
        let mut builder = TableBuilder::new(alignments);
        builder.start_head();
        builder.push_cell("name".into());
        builder.push_cell("qty".into());
        builder.end_head();
        builder.push_cell("apples".into());
        builder.push_cell("3".into());
        builder.end_row();
        builder.push_cell("pears".into());
        builder.push_cell("12".into());
        builder.end_row();
        builder
    }

    #[test]
    fn lays_out_header_and_rows() {
        let lines = table(vec![Alignment::None, Alignment::None]).layout(&style());
        assert_eq!(
            lines,
            vec![
                " name   │ qty ",
                "────────┼─────",
                " apples │ 3   ",
                " pears  │ 12  ",
            ]
        );
    }

    #[test]
    fn aligns_columns() {
        let lines = table(vec![Alignment::Center, Alignment::Right]).layout(&style());
        assert_eq!(
            lines,
            vec![
                "  name  │ qty ",
                "────────┼─────",
                " apples │   3 ",
                " pears  │  12 ",
            ]
        );
    }

    #[test]
    fn rows_share_a_common_width() {
        let lines = table(vec![]).layout(&style());
        let width = display_width(&lines[0]);
        for line in &lines {
            assert_eq!(display_width(line), width);
        }
    }

    #[test]
    fn empty_table_emits_nothing() {
        let builder = TableBuilder::new(Vec::new());
        assert!(builder.layout(&style()).is_empty());
    }

    #[test]
    fn short_rows_are_padded_with_empty_cells() {
        let mut builder = TableBuilder::new(Vec::new());
        builder.start_head();
        builder.push_cell("a".into());
        builder.push_cell("b".into());
        builder.end_head();
        builder.push_cell("only".into());
        builder.end_row();
        let lines = builder.layout(&style());
        assert_eq!(lines[2], " only │   ");
    }
}
