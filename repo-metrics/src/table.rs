//! GitHub-flavoured pipe tables
//!
//! Layout matches the `github` table style used by the earlier report
//! generator: one space of padding around every cell, a dashes-only separator
//! row, integer columns right-aligned and everything else left-aligned.

/// Extra width reserved beside every header
const HEADER_MIN_PADDING: usize = 2;

/// Column alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Right,
}

/// Render a table. The result has no trailing newline.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let headers: Vec<String> = headers.iter().map(|h| escape_cell(h)).collect();
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(|cell| escape_cell(cell)).collect())
        .collect();

    let alignments: Vec<Alignment> = (0..headers.len())
        .map(|col| column_alignment(&rows, col))
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(col, header)| {
            rows.iter()
                .filter_map(|row| row.get(col))
                .map(|cell| display_width(cell))
                .chain(std::iter::once(display_width(header) + HEADER_MIN_PADDING))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format_row(&headers, &widths, &alignments));
    lines.push(format!(
        "|{}|",
        widths
            .iter()
            .map(|w| "-".repeat(w + 2))
            .collect::<Vec<_>>()
            .join("|")
    ));
    for row in &rows {
        lines.push(format_row(row, &widths, &alignments));
    }

    lines.join("\n")
}

fn format_row(cells: &[String], widths: &[usize], alignments: &[Alignment]) -> String {
    let padded: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(col, width)| {
            let cell = cells.get(col).map(String::as_str).unwrap_or("");
            let fill = " ".repeat(width.saturating_sub(display_width(cell)));
            match alignments[col] {
                Alignment::Left => format!(" {}{} ", cell, fill),
                Alignment::Right => format!(" {}{} ", fill, cell),
            }
        })
        .collect();
    format!("|{}|", padded.join("|"))
}

/// Integer-only columns are right-aligned
fn column_alignment(rows: &[Vec<String>], col: usize) -> Alignment {
    let numeric = !rows.is_empty()
        && rows
            .iter()
            .all(|row| row.get(col).is_some_and(|cell| cell.parse::<u64>().is_ok()));
    if numeric {
        Alignment::Right
    } else {
        Alignment::Left
    }
}

fn display_width(cell: &str) -> usize {
    cell.chars().count()
}

/// Escape characters that would break the table structure
pub fn escape_cell(cell: &str) -> String {
    cell.replace('\n', " ").replace('|', "\\|")
}

/// Split a table line into trimmed, unescaped cells
pub fn split_row(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let inner = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let inner = if inner.ends_with('|') && !inner.ends_with("\\|") {
        &inner[..inner.len() - 1]
    } else {
        inner
    };

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'|') => {
                current.push('|');
                chars.next();
            }
            '|' => cells.push(std::mem::take(&mut current).trim().to_string()),
            _ => current.push(c),
        }
    }
    cells.push(current.trim().to_string());
    cells
}

/// True for a header separator line such as `|-----|:---:|`
pub fn is_separator_row(line: &str) -> bool {
    let cells = split_row(line);
    !cells.is_empty()
        && cells
            .iter()
            .all(|cell| !cell.is_empty() && cell.chars().all(|c| c == '-' || c == ':'))
}

/// True for any line that belongs to a pipe table
pub fn is_table_line(line: &str) -> bool {
    line.trim_start().starts_with('|')
}
