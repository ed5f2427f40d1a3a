use std::path::Path;

use serde::Deserialize;

use crate::model::{AddressRange, ListedFunction};
use crate::services::listing::{read_listing_file, FunctionTable, ListingError, ListingLoader};

/// Loader for JSON function dumps exported from a disassembler session.
///
/// The document is an array of objects:
/// `{"name": "printf", "entry": "0x00100000", "end": "0x00100040", "thunk_target": null}`.
/// Addresses may be integers or `0x` strings; `size` may replace `end`.
pub struct JsonListingLoader;

impl ListingLoader for JsonListingLoader {
    fn load(&self, path: &Path) -> Result<FunctionTable, ListingError> {
        let bytes = read_listing_file(path)?;
        let functions = parse_functions(&bytes)?;
        Ok(FunctionTable::new(path.display().to_string(), functions))
    }

    fn name(&self) -> &'static str {
        "json"
    }

    fn description(&self) -> &'static str {
        "JSON function dump (name, entry, end/size, thunk, thunk_target)"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["json"]
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AddressValue {
    Number(u64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct JsonFunction {
    #[serde(default)]
    name: Option<String>,
    entry: AddressValue,
    #[serde(default)]
    end: Option<AddressValue>,
    #[serde(default)]
    size: Option<u64>,
    #[serde(default)]
    thunk: bool,
    #[serde(default)]
    thunk_target: Option<AddressValue>,
}

fn malformed(message: String) -> ListingError {
    ListingError::Malformed { format: "json", message }
}

fn parse_wide_literal(text: &str) -> Option<u64> {
    let text = text.trim();
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

fn address(value: &AddressValue, field: &str, idx: usize) -> Result<u64, ListingError> {
    match value {
        AddressValue::Number(n) => Ok(*n),
        AddressValue::Text(text) => parse_wide_literal(text)
            .ok_or_else(|| malformed(format!("function #{idx}: invalid {field} address '{text}'"))),
    }
}

fn entry_address(value: &AddressValue, field: &str, idx: usize) -> Result<u32, ListingError> {
    let raw = address(value, field, idx)?;
    u32::try_from(raw)
        .map_err(|_| malformed(format!("function #{idx}: {field} 0x{raw:X} exceeds 32 bits")))
}

pub(crate) fn parse_functions(bytes: &[u8]) -> Result<Vec<ListedFunction>, ListingError> {
    let raw: Vec<JsonFunction> = serde_json::from_slice(bytes)
        .map_err(|e| malformed(format!("failed to parse function JSON: {e}")))?;

    let mut functions = Vec::with_capacity(raw.len());
    for (idx, f) in raw.into_iter().enumerate() {
        let entry = entry_address(&f.entry, "entry", idx)?;
        let body = match (&f.end, f.size) {
            (Some(end), _) => AddressRange::from_exclusive_end(entry, address(end, "end", idx)?),
            (None, Some(size)) => AddressRange::from_size(entry, size),
            (None, None) => None,
        };
        let thunk_target =
            f.thunk_target.as_ref().map(|t| entry_address(t, "thunk_target", idx)).transpose()?;

        functions.push(ListedFunction {
            name: f.name.filter(|n| !n.is_empty()),
            entry,
            body,
            is_thunk: f.thunk || thunk_target.is_some(),
            thunk_target,
        });
    }
    Ok(functions)
}
