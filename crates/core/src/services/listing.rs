use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::analysis::classify::ThunkResolver;
use crate::model::ListedFunction;

#[derive(Debug, Error)]
pub enum ListingError {
    #[error("Function listing not found at {0}")]
    MissingFile(PathBuf),
    #[error("Failed to read function listing {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed {format} listing: {message}")]
    Malformed { format: &'static str, message: String },
    #[error("Unknown listing format '{0}'")]
    UnknownFormat(String),
}

/// Source of functions for a scan, standing in for the analysis platform.
pub trait FunctionListing: ThunkResolver {
    /// Every function in discovery order.
    fn functions(&self) -> &[ListedFunction];

    /// Human-readable origin (file path, tool name) used for the config `input` key.
    fn source_name(&self) -> &str;
}

/// In-memory function listing produced by every loader.
#[derive(Debug, Clone, Default)]
pub struct FunctionTable {
    source: String,
    functions: Vec<ListedFunction>,
    by_entry: HashMap<u32, usize>,
}

impl FunctionTable {
    pub fn new(source: impl Into<String>, functions: Vec<ListedFunction>) -> Self {
        let mut by_entry = HashMap::with_capacity(functions.len());
        for (idx, function) in functions.iter().enumerate() {
            // First function registered at an address wins.
            by_entry.entry(function.entry).or_insert(idx);
        }
        Self { source: source.into(), functions, by_entry }
    }

    pub fn get(&self, entry: u32) -> Option<&ListedFunction> {
        self.by_entry.get(&entry).map(|&idx| &self.functions[idx])
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl ThunkResolver for FunctionTable {
    /// Follow `thunk_target` links until a non-thunk function.
    ///
    /// Returns `None` for a missing target, a thunk with no recorded target, or a cycle.
    fn resolve_thunk(&self, function: &ListedFunction) -> Option<&ListedFunction> {
        let mut visited = HashSet::new();
        visited.insert(function.entry);
        let mut next = function.thunk_target?;
        loop {
            if !visited.insert(next) {
                return None;
            }
            let target = self.get(next)?;
            if !target.is_thunk {
                return Some(target);
            }
            next = target.thunk_target?;
        }
    }
}

impl FunctionListing for FunctionTable {
    fn functions(&self) -> &[ListedFunction] {
        &self.functions
    }

    fn source_name(&self) -> &str {
        &self.source
    }
}

/// Loader for one on-disk listing format.
pub trait ListingLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<FunctionTable, ListingError>;
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    /// File extensions (lowercase, without dot) this loader claims.
    fn extensions(&self) -> &'static [&'static str];
}

/// Registry of listing loaders; callers select by name or file extension.
#[derive(Default)]
pub struct LoaderRegistry {
    loaders: HashMap<String, Box<dyn ListingLoader>>,
}

impl LoaderRegistry {
    pub fn new() -> Self {
        Self { loaders: HashMap::new() }
    }

    pub fn register<L: ListingLoader + 'static>(&mut self, loader: L) -> &mut Self {
        self.loaders.insert(loader.name().to_string(), Box::new(loader));
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn ListingLoader> {
        self.loaders.get(name).map(|l| &**l)
    }

    /// Pick the loader claiming `path`'s extension.
    pub fn for_path(&self, path: &Path) -> Option<&dyn ListingLoader> {
        let ext = path.extension().and_then(|e| e.to_str())?.to_ascii_lowercase();
        let mut names = self.names();
        names.retain(|name| {
            self.loaders.get(name).is_some_and(|l| l.extensions().contains(&ext.as_str()))
        });
        names.first().and_then(|name| self.get(name))
    }

    /// Return a sorted list of registered loader names for error messages/help.
    pub fn names(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.loaders.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Load `path` with the named loader, or by extension when `format` is `None`.
    pub fn load(&self, path: &Path, format: Option<&str>) -> Result<FunctionTable, ListingError> {
        let loader = match format {
            Some(name) => {
                self.get(name).ok_or_else(|| ListingError::UnknownFormat(name.to_string()))?
            }
            None => self.for_path(path).ok_or_else(|| {
                ListingError::UnknownFormat(
                    path.extension().and_then(|e| e.to_str()).unwrap_or("").to_string(),
                )
            })?,
        };
        if !path.is_file() {
            return Err(ListingError::MissingFile(path.to_path_buf()));
        }
        log::info!("Loading {} listing from {}", loader.name(), path.display());
        loader.load(path)
    }
}

/// Convenience builder for a registry holding every compiled-in loader.
pub fn default_loader_registry() -> LoaderRegistry {
    let mut registry = LoaderRegistry::new();
    registry.register(crate::services::backends::JsonListingLoader);
    registry.register(crate::services::backends::CsvListingLoader);
    #[cfg(feature = "elf-listing")]
    {
        registry.register(crate::services::backends::ElfListingLoader);
    }
    registry
}

pub(crate) fn read_listing_file(path: &Path) -> Result<Vec<u8>, ListingError> {
    std::fs::read(path)
        .map_err(|source| ListingError::Read { path: path.to_path_buf(), source })
}
