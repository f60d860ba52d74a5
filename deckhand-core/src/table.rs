//! Bordered text tables.
//!
//! ```text
//! +--------+---------+
//! | Unit   | State   |
//! +--------+---------+
//! | app1/0 | started |
//! +--------+---------+
//! ```
//!
//! Cells may contain newlines; each line becomes a physical row inside the
//! same logical row, with the other columns left blank.

use std::fmt;
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    /// Draw a border line after every row instead of only after the last
    pub line_separator: bool,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_headers<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn line_separated(mut self) -> Self {
        self.line_separator = true;
        self
    }

    pub fn add_row<I, S>(&mut self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }

    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sort rows lexicographically, first column first
    pub fn sort(&mut self) {
        self.rows.sort();
    }

    fn columns(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0)
    }

    /// Display width of every column: the widest line of any cell,
    /// header included
    pub fn column_widths(&self) -> Vec<usize> {
        let mut widths = vec![0; self.columns()];
        for row in std::iter::once(&self.headers).chain(self.rows.iter()) {
            for (i, cell) in row.iter().enumerate() {
                let widest = cell.lines().map(UnicodeWidthStr::width).max().unwrap_or(0);
                widths[i] = widths[i].max(widest);
            }
        }
        widths
    }

    pub fn render(&self) -> String {
        if self.headers.is_empty() && self.rows.is_empty() {
            return String::new();
        }

        let widths = self.column_widths();
        let border = border_line(&widths);

        let mut out = border.clone();
        if !self.headers.is_empty() {
            push_row(&mut out, &self.headers, &widths);
            out.push_str(&border);
        }
        for row in &self.rows {
            push_row(&mut out, row, &widths);
            if self.line_separator {
                out.push_str(&border);
            }
        }
        if !self.line_separator {
            out.push_str(&border);
        }
        out
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn border_line(widths: &[usize]) -> String {
    let mut line = String::from("+");
    for width in widths {
        line.push_str(&"-".repeat(width + 2));
        line.push('+');
    }
    line.push('\n');
    line
}

fn push_row(out: &mut String, row: &[String], widths: &[usize]) {
    let cells: Vec<Vec<&str>> = widths
        .iter()
        .enumerate()
        .map(|(i, _)| row.get(i).map(|c| c.lines().collect()).unwrap_or_default())
        .collect();
    let height = cells.iter().map(Vec::len).max().unwrap_or(0).max(1);

    for line in 0..height {
        out.push('|');
        for (cell, width) in cells.iter().zip(widths) {
            let text = cell.get(line).copied().unwrap_or("");
            out.push(' ');
            out.push_str(text);
            out.push_str(&" ".repeat(width - text.width()));
            out.push_str(" |");
        }
        out.push('\n');
    }
}
