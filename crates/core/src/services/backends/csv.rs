use std::path::Path;

use crate::analysis::selectors::parse_address_literal;
use crate::model::{AddressRange, ListedFunction};
use crate::services::listing::{read_listing_file, FunctionTable, ListingError, ListingLoader};

/// Loader for the `Name,Start,End,Size` compatibility table written by `export`.
///
/// Lets a previous function map be re-classified without the original session.
/// The table carries no thunk information.
pub struct CsvListingLoader;

impl ListingLoader for CsvListingLoader {
    fn load(&self, path: &Path) -> Result<FunctionTable, ListingError> {
        let bytes = read_listing_file(path)?;
        let body = String::from_utf8_lossy(&bytes);
        let functions = parse_function_map(&body)?;
        Ok(FunctionTable::new(path.display().to_string(), functions))
    }

    fn name(&self) -> &'static str {
        "csv"
    }

    fn description(&self) -> &'static str {
        "Function map CSV (Name,Start,End,Size)"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["csv"]
    }
}

fn malformed(message: String) -> ListingError {
    ListingError::Malformed { format: "csv", message }
}

/// One parsed row with the line number it started on.
struct Row {
    line_no: usize,
    fields: Vec<String>,
}

/// Split the whole table into rows, honouring double-quoted fields with `""` escapes.
///
/// Quoted fields may span lines. Blank lines are dropped and a trailing `\r` before a
/// line break outside quotes is ignored.
fn split_rows(body: &str) -> Vec<Row> {
    let mut rows = Vec::new();
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut line_no = 1;
    let mut row_start = 1;
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => {
                in_quotes = !in_quotes;
                quoted = true;
            }
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            '\r' if !in_quotes && chars.peek() == Some(&'\n') => {}
            '\n' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
                push_row(&mut rows, row_start, std::mem::take(&mut fields), quoted);
                quoted = false;
                line_no += 1;
                row_start = line_no;
            }
            '\n' => {
                current.push(c);
                line_no += 1;
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() || !fields.is_empty() || quoted {
        fields.push(current);
        push_row(&mut rows, row_start, fields, quoted);
    }
    rows
}

fn push_row(rows: &mut Vec<Row>, line_no: usize, fields: Vec<String>, quoted: bool) {
    let blank = !quoted && fields.iter().all(|f| f.trim().is_empty()) && fields.len() == 1;
    if !blank {
        rows.push(Row { line_no, fields });
    }
}

pub(crate) fn parse_function_map(body: &str) -> Result<Vec<ListedFunction>, ListingError> {
    let mut rows = split_rows(body).into_iter();

    let Some(header) = rows.next() else { return Ok(Vec::new()) };
    let header = header.fields.join(",");
    if !header.trim().eq_ignore_ascii_case("Name,Start,End,Size") {
        return Err(malformed(format!("unexpected header '{}'", header.trim())));
    }

    let mut functions = Vec::new();
    for Row { line_no, mut fields } in rows {
        // Names may contain commas, so take numeric columns from the right.
        if fields.len() < 4 {
            return Err(malformed(format!("line {line_no}: expected 4 columns")));
        }
        let size = fields.pop().unwrap_or_default();
        let end = fields.pop().unwrap_or_default();
        let start = fields.pop().unwrap_or_default();
        let name = fields.join(",");

        let start = parse_address_literal(&start)
            .ok_or_else(|| malformed(format!("line {line_no}: invalid start '{start}'")))?;
        let end = end
            .trim()
            .strip_prefix("0x")
            .and_then(|hex| u64::from_str_radix(hex, 16).ok())
            .ok_or_else(|| malformed(format!("line {line_no}: invalid end '{end}'")))?;
        let size: u64 = size
            .trim()
            .parse()
            .map_err(|_| malformed(format!("line {line_no}: invalid size '{size}'")))?;

        let body = if size == 0 { None } else { AddressRange::from_exclusive_end(start, end) };
        functions.push(ListedFunction {
            name: if name.is_empty() { None } else { Some(name) },
            entry: start,
            body,
            is_thunk: false,
            thunk_target: None,
        });
    }
    Ok(functions)
}
