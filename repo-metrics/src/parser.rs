//! Markdown report parser
//!
//! Reads a rendered report back into its table and labelled summary lines so
//! that an existing report can be checked without the data it was built from.

use crate::report::{GENERATED_ON_LABEL, TITLE};
use crate::table::{is_separator_row, is_table_line, split_row};
use crate::types::{parse_timestamp, MetricsError, Result, Timestamp};

/// A report read back from Markdown
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReport {
    pub generated_on: Timestamp,
    pub headers: Vec<String>,
    /// Table body with hyperlinks reduced to their text
    pub rows: Vec<Vec<String>>,
    /// `##` sections in document order
    pub sections: Vec<ParsedSection>,
}

/// A `##` section and its `label: value` lines
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSection {
    pub heading: String,
    pub entries: Vec<(String, String)>,
}

impl ParsedReport {
    /// Index of a table column by header text
    pub fn column(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// All body cells of a column
    pub fn column_values(&self, header: &str) -> Option<Vec<&str>> {
        let index = self.column(header)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(index).map(String::as_str).unwrap_or(""))
                .collect(),
        )
    }

    pub fn section(&self, heading: &str) -> Option<&ParsedSection> {
        self.sections.iter().find(|s| s.heading == heading)
    }

    /// Position of a section in the document, if present
    pub fn section_position(&self, heading: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.heading == heading)
    }
}

impl ParsedSection {
    pub fn value(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }
}

/// Parse a rendered report
pub fn parse_report(content: &str) -> Result<ParsedReport> {
    let mut lines = content.lines().map(str::trim_end).peekable();

    match lines.by_ref().find(|l| !l.trim().is_empty()) {
        Some(line) if line.trim() == TITLE => {}
        Some(line) => {
            return Err(MetricsError::ReportParseError(format!(
                "expected title '{}', found '{}'",
                TITLE, line
            )))
        }
        None => return Err(MetricsError::ReportParseError("empty report".to_string())),
    }

    let mut generated_on = None;
    let mut headers: Option<Vec<String>> = None;
    let mut rows = Vec::new();
    let mut sections: Vec<ParsedSection> = Vec::new();

    while let Some(line) = lines.next() {
        let trimmed = line.trim();

        if let Some(heading) = trimmed.strip_prefix("## ") {
            sections.push(ParsedSection {
                heading: format!("## {}", heading.trim()),
                entries: Vec::new(),
            });
            continue;
        }

        if is_table_line(trimmed) {
            if headers.is_some() {
                return Err(MetricsError::ReportParseError(
                    "report contains more than one table".to_string(),
                ));
            }
            headers = Some(split_row(trimmed));
            match lines.next() {
                Some(sep) if is_separator_row(sep) => {}
                _ => {
                    return Err(MetricsError::ReportParseError(
                        "table header is not followed by a separator row".to_string(),
                    ))
                }
            }
            while let Some(row) = lines.next_if(|l| is_table_line(l)) {
                rows.push(split_row(row).iter().map(|c| strip_links(c)).collect());
            }
            continue;
        }

        let Some((label, value)) = trimmed.split_once(": ") else {
            continue;
        };

        if let Some(section) = sections.last_mut() {
            section
                .entries
                .push((label.trim().to_string(), value.trim().to_string()));
        } else if label == GENERATED_ON_LABEL {
            generated_on = Some(parse_timestamp(value)?);
        }
    }

    let generated_on = generated_on.ok_or_else(|| {
        MetricsError::ReportParseError(format!("missing '{}' line", GENERATED_ON_LABEL))
    })?;
    let headers =
        headers.ok_or_else(|| MetricsError::ReportParseError("missing metrics table".to_string()))?;

    log::debug!(
        "Parsed report: {} columns, {} rows, {} sections",
        headers.len(),
        rows.len(),
        sections.len()
    );

    Ok(ParsedReport {
        generated_on,
        headers,
        rows,
        sections,
    })
}

/// Replace every `[text](url)` with `text`
pub fn strip_links(cell: &str) -> String {
    let mut out = String::with_capacity(cell.len());
    let mut rest = cell;

    while let Some(open) = rest.find('[') {
        let after_open = &rest[open + 1..];
        let link = after_open.find("](").and_then(|close| {
            let after_text = &after_open[close + 2..];
            after_text
                .find(')')
                .map(|end| (&after_open[..close], &after_text[end + 1..]))
        });

        match link {
            Some((text, remainder)) => {
                out.push_str(&rest[..open]);
                out.push_str(text);
                rest = remainder;
            }
            None => {
                out.push_str(&rest[..=open]);
                rest = after_open;
            }
        }
    }

    out.push_str(rest);
    out
}
