use std::collections::HashSet;
use std::path::Path;

use goblin::elf;

use crate::model::{AddressRange, ListedFunction};
use crate::services::listing::{read_listing_file, FunctionTable, ListingError, ListingLoader};

/// Loader that reads defined function symbols straight from an ELF image.
///
/// Only `STT_FUNC` symbols with a section and a non-zero size are listed; the
/// symbol table has no notion of thunks. Functions come out in address order and
/// aliases at an already-listed address are dropped.
pub struct ElfListingLoader;

impl ListingLoader for ElfListingLoader {
    fn load(&self, path: &Path) -> Result<FunctionTable, ListingError> {
        let bytes = read_listing_file(path)?;
        let functions = elf_functions(&bytes)?;
        Ok(FunctionTable::new(path.display().to_string(), functions))
    }

    fn name(&self) -> &'static str {
        "elf"
    }

    fn description(&self) -> &'static str {
        "ELF symbol table (defined STT_FUNC symbols with a size)"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["elf", "o", "irx"]
    }
}

pub(crate) fn elf_functions(bytes: &[u8]) -> Result<Vec<ListedFunction>, ListingError> {
    let elf = elf::Elf::parse(bytes).map_err(|e| ListingError::Malformed {
        format: "elf",
        message: format!("failed to parse ELF: {e}"),
    })?;

    let mut symbols: Vec<(u32, String, u64)> = Vec::new();
    for sym in &elf.syms {
        if !sym.is_function()
            || sym.st_size == 0
            || sym.st_shndx == elf::section_header::SHN_UNDEF as usize
        {
            continue;
        }
        let Ok(address) = u32::try_from(sym.st_value) else {
            log::warn!("skipping ELF symbol above 32-bit address space at 0x{:X}", sym.st_value);
            continue;
        };
        let name = elf.strtab.get_at(sym.st_name).unwrap_or("").to_string();
        symbols.push((address, name, sym.st_size));
    }
    symbols.sort_by_key(|(address, _, _)| *address);

    let mut seen = HashSet::new();
    let functions = symbols
        .into_iter()
        .filter(|(address, _, _)| seen.insert(*address))
        .map(|(address, name, size)| ListedFunction {
            name: if name.is_empty() { None } else { Some(name) },
            entry: address,
            body: AddressRange::from_size(address, size),
            is_thunk: false,
            thunk_target: None,
        })
        .collect();
    Ok(functions)
}
