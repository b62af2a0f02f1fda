//! Sequential reader of proj4 data file records.

use std::io::{self, BufRead, Lines};

const RECORD_END: &str = "<>";

/// A complete record read from a data file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Record {
    pub ident: String,
    pub name: Option<String>,
    pub body: String,
}

/// Record that has been opened but not yet terminated with `<>`.
struct OpenRecord {
    ident: String,
    fragments: Vec<String>,
}

impl OpenRecord {
    fn push(&mut self, fragment: &str) {
        let fragment = fragment.trim();
        if !fragment.is_empty() {
            self.fragments.push(fragment.to_string());
        }
    }
}

/// Iterator over records of a data file.
///
/// Only one record is accumulated at a time. Lines outside of a record that do not start a new one
/// are ignored.
pub(crate) struct RecordScanner<R> {
    lines: Lines<R>,
    open: Option<OpenRecord>,
    name: Option<String>,
}

impl<R: BufRead> RecordScanner<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            open: None,
            name: None,
        }
    }

    fn process_line(&mut self, line: &str) -> Option<Record> {
        let mut data = line.trim();
        if let Some((before, comment)) = data.split_once('#') {
            self.name = Some(comment.trim().to_string());
            data = before.trim();
        }

        if self.open.is_none() {
            let (ident, rest) = parse_header(data)?;
            self.open = Some(OpenRecord {
                ident: ident.to_string(),
                fragments: vec![],
            });
            data = rest.trim();
        }

        let open = self.open.as_mut()?;
        match data.strip_suffix(RECORD_END) {
            Some(last) => {
                open.push(last);
                let open = self.open.take()?;
                Some(Record {
                    ident: open.ident,
                    name: self.name.take(),
                    body: open.fragments.join(" "),
                })
            }
            None => {
                open.push(data);
                None
            }
        }
    }
}

impl<R: BufRead> Iterator for RecordScanner<R> {
    type Item = io::Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(line) = self.lines.next() {
            let line = match line {
                Ok(line) => line,
                Err(err) => return Some(Err(err)),
            };

            if let Some(record) = self.process_line(&line) {
                return Some(Ok(record));
            }
        }

        None
    }
}

/// Splits `<ident>rest` into the identifier and the rest of the line.
fn parse_header(data: &str) -> Option<(&str, &str)> {
    let (ident, rest) = data.strip_prefix('<')?.split_once('>')?;
    if ident.is_empty() || !ident.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }

    Some((ident, rest))
}
