//! Core data model for function listings and scan records.
//!
//! - `AddressRange`: contiguous body extent reported by the analysis platform.
//! - `ListedFunction`: one function as the platform exposes it (name, entry, body, thunk link).
//! - `FunctionRecord`: the immutable per-function record built during a scan.

use serde::{Deserialize, Serialize};

/// Render an address as `0x` followed by 8 uppercase hex digits of its low 32 bits.
pub fn format_address(address: u64) -> String {
    format!("0x{:08X}", address & 0xFFFF_FFFF)
}

/// Contiguous address extent of a function body, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRange {
    pub min: u32,
    pub max: u32,
}

impl AddressRange {
    /// Build a range from an inclusive minimum and an exclusive end.
    ///
    /// Returns `None` when the extent is empty.
    pub fn from_exclusive_end(min: u32, end_exclusive: u64) -> Option<Self> {
        if end_exclusive <= u64::from(min) {
            return None;
        }
        let max = (end_exclusive - 1).min(u64::from(u32::MAX)) as u32;
        Some(Self { min, max })
    }

    /// Build a range covering `size` addresses starting at `min`.
    pub fn from_size(min: u32, size: u64) -> Option<Self> {
        Self::from_exclusive_end(min, u64::from(min).saturating_add(size))
    }

    /// Address immediately after the last byte of the body.
    pub fn end_exclusive(&self) -> u64 {
        u64::from(self.max) + 1
    }

    /// Number of addresses in the body.
    pub fn size(&self) -> u64 {
        self.end_exclusive() - u64::from(self.min)
    }
}

/// A function as supplied by a listing source.
///
/// `body` is `None` for functions without any addresses (externals, placeholders);
/// those are excluded from scans entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListedFunction {
    pub name: Option<String>,
    pub entry: u32,
    pub body: Option<AddressRange>,
    #[serde(default)]
    pub is_thunk: bool,
    /// Entry address of the function this thunk forwards to, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thunk_target: Option<u32>,
}

impl ListedFunction {
    /// Plain (non-thunk) function covering `size` bytes from `entry`.
    pub fn new(name: impl Into<String>, entry: u32, size: u64) -> Self {
        Self {
            name: Some(name.into()),
            entry,
            body: AddressRange::from_size(entry, size),
            is_thunk: false,
            thunk_target: None,
        }
    }

    /// Mark this function as a thunk forwarding to `target` (if known).
    pub fn with_thunk(mut self, target: Option<u32>) -> Self {
        self.is_thunk = true;
        self.thunk_target = target;
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Immutable per-function record collected during a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub name: Option<String>,
    pub start: u32,
    pub end_exclusive: u64,
    pub size: u64,
}

impl FunctionRecord {
    /// Build a record from a listed function; `None` when the body is empty.
    pub fn from_listed(function: &ListedFunction) -> Option<Self> {
        let body = function.body?;
        Some(Self {
            name: function.name.clone(),
            start: function.entry,
            end_exclusive: body.end_exclusive(),
            size: body.size(),
        })
    }
}
