//! Classification and selector logic.
//!
//! - `names`: pure name heuristics (library, kernel, vendor, system tables).
//! - `classify`: per-function policy including one-hop thunk resolution.
//! - `selectors`: address-qualified, deduplicated selectors for name sets.
//! - `scan`: the single pass tying the above together.

pub mod classify;
pub mod names;
pub mod scan;
pub mod selectors;

pub use classify::{classify, classify_name, Classification, NoThunks, ThunkResolver};
pub use scan::{scan, CancelSignal, NeverCancel, ScanCounts, ScanError, ScanReport};
pub use selectors::{parse_address_literal, resolve_selectors, Selector, SelectorResolution};
