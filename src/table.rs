use std::borrow::Cow;
use std::fmt::Write as _;

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TextTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TextTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render_html(&self) -> String {
        let numeric = numeric_columns(&self.headers, &self.rows);
        let mut html = String::from("<table>\n  <thead><tr>");
        for header in &self.headers {
            let _ = write!(html, "<th>{}</th>", escape_html(header));
        }
        html.push_str("</tr></thead>\n  <tbody>\n");
        for row in &self.rows {
            html.push_str("    <tr>");
            for (idx, cell) in row.iter().enumerate().take(self.headers.len()) {
                if numeric.get(idx).copied().unwrap_or(false) {
                    let _ = write!(html, "<td class='num'>{}</td>", escape_html(cell));
                } else {
                    let _ = write!(html, "<td>{}</td>", escape_html(cell));
                }
            }
            html.push_str("</tr>\n");
        }
        html.push_str("  </tbody>\n</table>\n");
        html
    }
}

/// Aligns columns with two spaces between them; numeric columns are right-aligned.
pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let column_count = headers.len();
    let mut widths = headers.iter().map(|h| display_width(h)).collect::<Vec<_>>();
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(column_count) {
            widths[idx] = widths[idx].max(display_width(&sanitize_cell(cell)));
        }
    }
    for width in &mut widths {
        *width = (*width).max(3);
    }
    let numeric = numeric_columns(headers, rows);

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(headers, &widths, &numeric));
    let separator = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&separator, &widths, &numeric));
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths, &numeric));
    }
    output
}

pub fn print_table(headers: &[String], rows: &[Vec<String>]) {
    print!("{}", render_table(headers, rows));
}

fn numeric_columns(headers: &[String], rows: &[Vec<String>]) -> Vec<bool> {
    (0..headers.len())
        .map(|idx| {
            let mut cells = rows
                .iter()
                .filter_map(|row| row.get(idx))
                .filter(|cell| !cell.is_empty())
                .peekable();
            cells.peek().is_some() && cells.all(|cell| looks_numeric(cell))
        })
        .collect()
}

fn looks_numeric(cell: &str) -> bool {
    cell.trim_end_matches('%').parse::<f64>().is_ok()
}

fn format_row(values: &[String], widths: &[usize], numeric: &[bool]) -> String {
    let mut cells = Vec::with_capacity(widths.len());
    for (idx, width) in widths.iter().enumerate() {
        let value = values.get(idx).map(String::as_str).unwrap_or("");
        let sanitized = sanitize_cell(value);
        let padding = " ".repeat(width.saturating_sub(display_width(&sanitized)));
        if numeric.get(idx).copied().unwrap_or(false) {
            cells.push(format!("{padding}{sanitized}"));
        } else {
            cells.push(format!("{sanitized}{padding}"));
        }
    }
    cells.join("  ").trim_end().to_string()
}

fn display_width(value: &str) -> usize {
    let mut width = 0usize;
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' {
            // ANSI escape sequence (e.g. \x1b[31m)
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
        } else {
            width += 1;
        }
    }
    width
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn numeric_columns_are_right_aligned() {
        let headers = strings(&["artist", "count"]);
        let rows = vec![strings(&["xi", "7"]), strings(&["Camellia", "12"])];
        let rendered = render_table(&headers, &rows);
        let lines = rendered.lines().collect::<Vec<_>>();
        assert_eq!(
            lines,
            vec![
                "artist    count",
                "--------  -----",
                "xi            7",
                "Camellia     12",
            ]
        );
    }

    #[test]
    fn html_escapes_markup() {
        let table = TextTable::new(strings(&["title"]), vec![strings(&["<Tom & Jerry>"])]);
        let html = table.render_html();
        assert!(html.contains("<td>&lt;Tom &amp; Jerry&gt;</td>"));
        assert!(html.contains("<th>title</th>"));
    }

    #[test]
    fn control_characters_are_flattened() {
        let rendered = render_table(&strings(&["tags"]), &[strings(&["a\tb\nc"])]);
        assert_eq!(rendered.lines().nth(2), Some("a b c"));
    }
}
