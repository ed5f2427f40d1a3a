use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{format_address, FunctionRecord};

/// Identifier for a function in the exported config: `name` or `name@0xXXXXXXXX`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Selector {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<u32>,
}

impl Selector {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), address: None }
    }

    pub fn at(name: impl Into<String>, address: u32) -> Self {
        Self { name: name.into(), address: Some(address) }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.address {
            Some(address) if self.name.is_empty() => {
                f.write_str(&format_address(u64::from(address)))
            }
            Some(address) => write!(f, "{}@{}", self.name, format_address(u64::from(address))),
            None => f.write_str(&self.name),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectorParseError {
    #[error("selector is empty")]
    Empty,
}

/// Parse a 32-bit address literal: `0x`-prefixed hex or plain decimal.
pub fn parse_address_literal(literal: &str) -> Option<u32> {
    let literal = literal.trim();
    if let Some(hex) = literal.strip_prefix("0x").or_else(|| literal.strip_prefix("0X")) {
        if hex.is_empty() {
            return None;
        }
        return u32::from_str_radix(hex, 16).ok();
    }
    if literal.is_empty() || !literal.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    literal.parse::<u32>().ok()
}

impl FromStr for Selector {
    type Err = SelectorParseError;

    /// Accepts `name`, `name@<address>` and a bare address literal.
    ///
    /// A trailing `@...` that is not a valid address keeps the whole text as the name.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SelectorParseError::Empty);
        }

        if let Some((name, address)) = trimmed.rsplit_once('@') {
            return Ok(match parse_address_literal(address) {
                Some(address) => Selector::at(name.trim(), address),
                None => Selector::named(trimmed),
            });
        }

        match parse_address_literal(trimmed) {
            Some(address) => Ok(Selector { name: String::new(), address: Some(address) }),
            None => Ok(Selector::named(trimmed)),
        }
    }
}

/// Selectors built for one name set, plus names no function body could back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorResolution {
    pub selectors: Vec<Selector>,
    pub unresolved: Vec<String>,
}

impl SelectorResolution {
    /// Rendered selector strings, in output order.
    pub fn rendered(&self) -> Vec<String> {
        self.selectors.iter().map(Selector::to_string).collect()
    }
}

/// Turn a name set into selectors using the collected records.
///
/// Records are walked in ascending start order (ties keep discovery order). With
/// `include_address`, every occurrence becomes its own `name@address` selector and
/// names with no record are reported as unresolved instead of being emitted bare.
/// Without it the list is deduplicated by name and sorted lexicographically.
pub fn resolve_selectors(
    names: &BTreeSet<String>,
    records: &[FunctionRecord],
    include_address: bool,
) -> SelectorResolution {
    let mut ordered: Vec<&FunctionRecord> = records.iter().collect();
    ordered.sort_by_key(|record| record.start);

    let mut selectors = Vec::new();
    let mut seen: HashSet<Selector> = HashSet::new();
    let mut covered: HashSet<&str> = HashSet::new();

    for record in ordered {
        let Some(name) = record.name.as_deref() else { continue };
        if !names.contains(name) {
            continue;
        }

        covered.insert(name);
        let selector = if include_address {
            Selector::at(name, record.start)
        } else {
            Selector::named(name)
        };
        if seen.insert(selector.clone()) {
            selectors.push(selector);
        }
    }

    let mut unresolved = Vec::new();
    if include_address {
        // BTreeSet iteration is already sorted.
        for name in names {
            if !covered.contains(name.as_str()) {
                log::warn!(
                    "unresolved selector name without address, omitting from config: {name}"
                );
                unresolved.push(name.clone());
            }
        }
    } else {
        selectors.sort();
    }

    SelectorResolution { selectors, unresolved }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_padded_uppercase_hex() {
        assert_eq!(Selector::at("memcpy", 0x1000).to_string(), "memcpy@0x00001000");
        assert_eq!(Selector::named("memcpy").to_string(), "memcpy");
    }

    #[test]
    fn parse_accepts_address_qualified_and_bare_forms() {
        assert_eq!("memcpy@0x00001000".parse(), Ok(Selector::at("memcpy", 0x1000)));
        assert_eq!(" printf @ 4096 ".parse(), Ok(Selector::at("printf", 4096)));
        assert_eq!("0x80001234".parse::<Selector>().unwrap().address, Some(0x8000_1234));
        assert_eq!("odd@name".parse(), Ok(Selector::named("odd@name")));
        assert_eq!("   ".parse::<Selector>(), Err(SelectorParseError::Empty));
    }

    #[test]
    fn bare_address_displays_without_separator() {
        let bare: Selector = "0x80001234".parse().unwrap();
        assert_eq!(bare.to_string(), "0x80001234");
        assert_eq!(bare.to_string().parse(), Ok(bare));
    }

    #[test]
    fn address_literals_reject_overflow_and_garbage() {
        assert_eq!(parse_address_literal("0x1_0000_0000"), None);
        assert_eq!(parse_address_literal("0x100000000"), None);
        assert_eq!(parse_address_literal("0x"), None);
        assert_eq!(parse_address_literal("12ab"), None);
        assert_eq!(parse_address_literal("0XfF"), Some(0xFF));
    }
}
