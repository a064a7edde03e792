// Rewrites space-aligned plain-text tables as Markdown pipe tables

use std::panic;
use std::sync::LazyLock;

use regex::Regex;

static COLUMN_GAP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\t+| {2,}").expect("valid column gap"));

/// Amounts, counts, percentages and dates such as `$ 1.500.000`, `30%`, `2024-01-10`, `15/03/2021`
static NUMERIC_CELL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[-+(]?\s*(?:[$€£]|cop|usd|eur)?\s*[-+]?\d[\d.,:/\-]*\s*(?:%|[$€£]|cop|usd|eur)?\)?$")
        .expect("valid numeric cell")
});

const MIN_COLUMNS: usize = 3;
const MIN_ROWS: usize = 2;
/// Longer cells read as sentences, not table labels
const MAX_LABEL_WORDS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowKind {
    /// Short labels only
    Header,
    /// At least one numeric or date cell
    Data,
    /// Mostly sentences split by double spaces
    Prose,
}

struct Row<'a> {
    cells: Vec<String>,
    kind: RowKind,
    /// Source line including its terminator
    raw: &'a str,
    eol: &'a str,
}

#[derive(Default)]
struct Run<'a> {
    rows: Vec<Row<'a>>,
}

/// Reflow plain-text tables; on any failure the input comes back unchanged
pub fn reflow(text: &str) -> String {
    match panic::catch_unwind(|| reflow_tables(text)) {
        Ok(out) => out,
        Err(_) => {
            tracing::debug!("Table reflow failed, keeping original text");
            text.to_string()
        }
    }
}

fn split_columns(line: &str) -> Vec<String> {
    COLUMN_GAP
        .split(line.trim())
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect()
}

fn is_numeric_cell(cell: &str) -> bool {
    NUMERIC_CELL.is_match(cell)
}

fn is_prose_cell(cell: &str) -> bool {
    if is_numeric_cell(cell) {
        return false;
    }
    let words = cell.split_whitespace().count();
    words > MAX_LABEL_WORDS || (words >= 2 && cell.ends_with(|c: char| matches!(c, '.' | '!' | '?' | ';')))
}

fn classify(cells: &[String]) -> RowKind {
    let prose = cells.iter().filter(|c| is_prose_cell(c)).count();
    if prose > 0 && prose * 2 >= cells.len() {
        RowKind::Prose
    } else if cells.iter().any(|c| is_numeric_cell(c)) {
        RowKind::Data
    } else {
        RowKind::Header
    }
}

fn is_total_row(cells: &[String]) -> bool {
    cells
        .first()
        .map(|c| c.trim_end_matches(':').eq_ignore_ascii_case("total"))
        .unwrap_or(false)
}

/// Pipe rows and `---|---` separators, with or without outer pipes
fn is_markdown_row(line: &str) -> bool {
    line.contains('|')
}

fn split_terminator(raw: &str) -> (&str, &str) {
    let body = match raw.strip_suffix('\n') {
        Some(line) => line.strip_suffix('\r').unwrap_or(line),
        None => raw,
    };
    (body, &raw[body.len()..])
}

fn reflow_tables(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run = Run::default();
    let mut in_fence = false;

    for raw in text.split_inclusive('\n') {
        let (line, eol) = split_terminator(raw);

        if line.trim_start().starts_with("```") {
            run.flush(&mut out);
            in_fence = !in_fence;
            out.push_str(raw);
            continue;
        }
        if in_fence || is_markdown_row(line) {
            run.flush(&mut out);
            out.push_str(raw);
            continue;
        }

        let cells = split_columns(line);
        let kind = classify(&cells);
        let continues = match run.rows.first() {
            Some(first) => {
                cells.len() >= 2
                    && (is_total_row(&cells)
                        || (kind != RowKind::Prose && cells.len().abs_diff(first.cells.len()) <= 1))
            }
            None => false,
        };

        if continues {
            run.rows.push(Row { cells, kind, raw, eol });
        } else {
            run.flush(&mut out);
            if cells.len() >= MIN_COLUMNS && kind != RowKind::Prose {
                run.rows.push(Row { cells, kind, raw, eol });
            } else {
                out.push_str(raw);
            }
        }
    }
    run.flush(&mut out);
    out
}

impl Run<'_> {
    /// A run needs a numeric row, or nothing but short labels
    fn is_table(&self) -> bool {
        self.rows.len() >= MIN_ROWS
            && (self.rows.iter().any(|r| r.kind == RowKind::Data)
                || self.rows.iter().all(|r| !r.cells.iter().any(|c| is_prose_cell(c))))
    }

    /// Emit the pending run as a table, or verbatim when it does not qualify
    fn flush(&mut self, out: &mut String) {
        if self.is_table() {
            let width = self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(MIN_COLUMNS);
            for (i, row) in self.rows.iter().enumerate() {
                out.push_str(&markdown_row(&row.cells, width));
                out.push_str(row.eol);
                if i == 0 {
                    out.push('|');
                    out.push_str(&" --- |".repeat(width));
                    out.push_str(row.eol);
                }
            }
        } else {
            for row in &self.rows {
                out.push_str(row.raw);
            }
        }
        self.rows.clear();
    }
}

fn markdown_row(cells: &[String], width: usize) -> String {
    let mut row = String::from("|");
    for i in 0..width {
        row.push(' ');
        row.push_str(cells.get(i).map(String::as_str).unwrap_or_default());
        row.push_str(" |");
    }
    row
}
