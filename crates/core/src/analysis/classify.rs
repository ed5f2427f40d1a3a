use serde::{Deserialize, Serialize};

use crate::analysis::names::{is_do_not_touch, is_library_function_name, is_system_symbol_name};
use crate::model::ListedFunction;

/// Three-way classification of a function, carrying the name it should be listed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum Classification {
    /// Library/runtime routine whose effect is emulated by a stub.
    Stub(String),
    /// Startup/bootstrap artifact that is neither recompiled nor stubbed.
    Skip(String),
    /// Genuine application code (or anything we cannot name reliably).
    None,
}

impl Classification {
    /// Resolved name for stub/skip results.
    pub fn name(&self) -> Option<&str> {
        match self {
            Classification::Stub(name) | Classification::Skip(name) => Some(name),
            Classification::None => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Classification::Stub(_) => "stub",
            Classification::Skip(_) => "skip",
            Classification::None => "none",
        }
    }
}

/// Capability to resolve a thunk to the function it ultimately forwards to.
///
/// Implementations follow the forwarding chain themselves and must terminate on
/// cycles; the classifier calls this once and never classifies the target as a thunk.
pub trait ThunkResolver {
    fn resolve_thunk(&self, function: &ListedFunction) -> Option<&ListedFunction>;
}

/// Resolver for callers that have no thunk graph at all.
pub struct NoThunks;

impl ThunkResolver for NoThunks {
    fn resolve_thunk(&self, _function: &ListedFunction) -> Option<&ListedFunction> {
        None
    }
}

/// Classify a single function.
///
/// Order: do-not-touch allowlist, then (for thunks) own name, target name, and
/// system test on the own name; non-thunks take the library test before the system test.
pub fn classify<R: ThunkResolver + ?Sized>(
    function: &ListedFunction,
    resolver: &R,
) -> Classification {
    let name = match function.name() {
        Some(name) if !name.is_empty() && !is_do_not_touch(name) => name,
        _ => return Classification::None,
    };

    if function.is_thunk {
        if is_library_function_name(name) {
            return Classification::Stub(name.to_string());
        }

        let target_name = resolver.resolve_thunk(function).and_then(ListedFunction::name);
        if let Some(target_name) = target_name {
            if is_library_function_name(target_name) {
                return Classification::Stub(target_name.to_string());
            }
        }

        if is_system_symbol_name(name) {
            return Classification::Skip(name.to_string());
        }
        return Classification::None;
    }

    classify_name(name)
}

/// Classify a bare name with no thunk information.
pub fn classify_name(name: &str) -> Classification {
    if name.is_empty() || is_do_not_touch(name) {
        return Classification::None;
    }
    if is_library_function_name(name) {
        Classification::Stub(name.to_string())
    } else if is_system_symbol_name(name) {
        Classification::Skip(name.to_string())
    } else {
        Classification::None
    }
}
