use anyhow::Result;
use serde::Serialize;
use stubmap_core::analysis::{classify, Classification};
use stubmap_core::model::ListedFunction;
use stubmap_core::services::listing::FunctionTable;

const PROBE_ENTRY: u32 = 0x0010_0000;
const TARGET_ENTRY: u32 = 0x0020_0000;

#[derive(Debug, Serialize)]
struct ClassifyOutput<'a> {
    name: &'a str,
    thunk: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    thunk_target: Option<&'a str>,
    classification: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    resolved_name: Option<&'a str>,
}

/// Classify a single name as if it were a function in a listing.
///
/// Passing a thunk target implies `thunk`.
pub fn classify_single(name: &str, thunk: bool, thunk_target: Option<&str>) -> Classification {
    let mut probe = ListedFunction::new(name, PROBE_ENTRY, 4);
    if thunk || thunk_target.is_some() {
        probe = probe.with_thunk(thunk_target.map(|_| TARGET_ENTRY));
    }
    let mut functions = vec![probe];
    if let Some(target) = thunk_target {
        functions.push(ListedFunction::new(target, TARGET_ENTRY, 4));
    }
    let table = FunctionTable::new("<command line>", functions);
    match table.get(PROBE_ENTRY) {
        Some(probe) => classify(probe, &table),
        None => Classification::None,
    }
}

pub fn classify_command(
    name: &str,
    thunk: bool,
    thunk_target: Option<&str>,
    json: bool,
) -> Result<()> {
    let result = classify_single(name, thunk, thunk_target);
    if json {
        let output = ClassifyOutput {
            name,
            thunk: thunk || thunk_target.is_some(),
            thunk_target,
            classification: result.label(),
            resolved_name: result.name(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    match result.name() {
        Some(resolved) if resolved != name => {
            println!("{}: {} (as {})", name, result.label(), resolved)
        }
        _ => println!("{}: {}", name, result.label()),
    }
    Ok(())
}
