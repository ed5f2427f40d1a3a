use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::classify::{classify, Classification};
use crate::analysis::selectors::{resolve_selectors, SelectorResolution};
use crate::model::FunctionRecord;
use crate::services::listing::FunctionListing;

/// Cooperative cancellation signal checked between function visits.
pub trait CancelSignal {
    fn is_cancelled(&self) -> bool;
}

/// Signal that never fires.
pub struct NeverCancel;

impl CancelSignal for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl CancelSignal for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

impl<T: CancelSignal + ?Sized> CancelSignal for Arc<T> {
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScanError {
    #[error("scan cancelled after {visited} functions")]
    Cancelled { visited: usize },
}

/// Summary counts written to the config's export section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanCounts {
    pub function_count: usize,
    pub stub_count: usize,
    pub skip_count: usize,
    pub uncategorized_count: usize,
    pub unresolved_count: usize,
}

/// Outcome of one complete scan pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Records in discovery order.
    pub records: Vec<FunctionRecord>,
    pub stub_names: BTreeSet<String>,
    pub skip_names: BTreeSet<String>,
    pub stubs: SelectorResolution,
    pub skips: SelectorResolution,
    pub uncategorized_count: usize,
}

impl ScanReport {
    pub fn counts(&self) -> ScanCounts {
        ScanCounts {
            function_count: self.records.len(),
            stub_count: self.stubs.selectors.len(),
            skip_count: self.skips.selectors.len(),
            uncategorized_count: self.uncategorized_count,
            unresolved_count: self.stubs.unresolved.len() + self.skips.unresolved.len(),
        }
    }

    /// Records sorted by start address; ties keep discovery order.
    pub fn records_by_address(&self) -> Vec<&FunctionRecord> {
        let mut ordered: Vec<&FunctionRecord> = self.records.iter().collect();
        ordered.sort_by_key(|record| record.start);
        ordered
    }
}

/// Walk every function once, classify it, and resolve the stub/skip selectors.
///
/// Functions with an empty body are ignored. A fired cancellation signal stops the
/// pass and discards everything collected so far.
pub fn scan<L, C>(listing: &L, cancel: &C) -> Result<ScanReport, ScanError>
where
    L: FunctionListing + ?Sized,
    C: CancelSignal + ?Sized,
{
    let mut records = Vec::new();
    let mut stub_names = BTreeSet::new();
    let mut skip_names = BTreeSet::new();
    let mut uncategorized_count = 0usize;

    for (visited, function) in listing.functions().iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(ScanError::Cancelled { visited });
        }

        let Some(record) = FunctionRecord::from_listed(function) else { continue };
        records.push(record);

        let classification = classify(function, listing);
        log::debug!(
            "0x{:08X} {:?} -> {}",
            function.entry,
            function.name().unwrap_or(""),
            classification.label()
        );
        match classification {
            Classification::Stub(name) => {
                stub_names.insert(name);
            }
            Classification::Skip(name) => {
                skip_names.insert(name);
            }
            Classification::None => uncategorized_count += 1,
        }
    }

    let stubs = resolve_selectors(&stub_names, &records, true);
    let skips = resolve_selectors(&skip_names, &records, true);

    Ok(ScanReport { records, stub_names, skip_names, stubs, skips, uncategorized_count })
}
