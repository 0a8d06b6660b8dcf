// src/parse/csv.rs
use std::mem::take;

use super::table::{Row, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quoting {
    Unquoted,
    Quoted,
}

impl Quoting {
    fn toggle(self) -> Self {
        match self {
            Quoting::Unquoted => Quoting::Quoted,
            Quoting::Quoted => Quoting::Unquoted,
        }
    }
}

/// ECMAScript `String.prototype.trim` set: Unicode whitespace minus NEL,
/// plus the BOM.
fn is_trimmed(c: char) -> bool {
    (c.is_whitespace() && c != '\u{85}') || c == '\u{feff}'
}

fn trim_field(raw: &str) -> &str {
    raw.trim_matches(is_trimmed)
}

struct Scanner {
    quoting: Quoting,
    field: String,
    row: Vec<String>,
    rows: Vec<Row>,
}

impl Scanner {
    fn new() -> Self {
        Scanner {
            quoting: Quoting::Unquoted,
            field: String::new(),
            row: Vec::new(),
            rows: Vec::new(),
        }
    }

    fn feed(&mut self, ch: char) {
        match (self.quoting, ch) {
            (_, '"') => self.quoting = self.quoting.toggle(),
            (Quoting::Unquoted, ',') => self.commit_field(),
            (Quoting::Unquoted, '\n' | '\r') => self.end_line(),
            _ => self.field.push(ch),
        }
    }

    // judged on the untrimmed buffer: a line of spaces still yields a row
    fn has_pending(&self) -> bool {
        !self.field.is_empty() || !self.row.is_empty()
    }

    fn commit_field(&mut self) {
        self.row.push(trim_field(&self.field).to_string());
        self.field.clear();
    }

    fn end_line(&mut self) {
        if self.has_pending() {
            self.commit_field();
            self.rows.push(Row::new(take(&mut self.row)));
        }
    }

    fn finish(mut self) -> Table {
        self.end_line();
        Table::from_rows(self.rows)
    }
}

/// Parse a full CSV payload into rows of trimmed fields.
///
/// Quotes only toggle whether `,`, `\n` and `\r` are structural; they are
/// dropped from the output. A doubled quote (`""`) toggles twice and adds
/// nothing, so `"a""b"` reads as `ab` rather than the RFC 4180 `a"b`.
/// Blank lines are skipped and an unterminated quote is closed by end of
/// input. Never fails.
pub fn parse(text: &str) -> Table {
    let mut scanner = Scanner::new();
    for ch in text.chars() {
        scanner.feed(ch);
    }
    scanner.finish()
}
