use std::fmt::Write as _;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::scan::{scan, CancelSignal, ScanCounts, ScanError, ScanReport};
use crate::config::ExportSettings;
use crate::model::format_address;
use crate::services::listing::FunctionListing;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Destination files for one export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub config: PathBuf,
    pub function_map: Option<PathBuf>,
}

/// Values for the path-like keys of the `[general]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigHeader {
    pub input: String,
    pub output: String,
    pub ghidra_output: String,
}

/// What an export produced; serialized by the CLI for `--json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSummary {
    pub input: String,
    pub config_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_map_path: Option<String>,
    pub output_dir: String,
    pub counts: ScanCounts,
    pub unresolved_stubs: Vec<String>,
    pub unresolved_skips: Vec<String>,
}

/// Quote a string for the config file, escaping backslashes and double quotes.
pub fn quote_config_string(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn push_selector_list(out: &mut String, key: &str, selectors: &[String]) {
    let _ = writeln!(out, "{key} = [");
    for selector in selectors {
        let _ = writeln!(out, "  {},", quote_config_string(selector));
    }
    out.push_str("]\n");
}

/// Render the recompiler config for a finished scan.
pub fn render_config(
    report: &ScanReport,
    settings: &ExportSettings,
    header: &ConfigHeader,
) -> String {
    let counts = report.counts();
    let mut out = String::new();

    out.push_str("# Auto-generated by stubmap\n");
    out.push_str("#\n");
    out.push_str("# Classification policy (aligned with analyzer intent):\n");
    out.push_str("# - library/runtime names -> [general].stubs\n");
    out.push_str("# - system names -> [general].skip\n");
    out.push_str("# - others are left for recompilation\n");
    out.push('\n');

    out.push_str("[general]\n");
    let _ = writeln!(out, "input = {}", quote_config_string(&header.input));
    let _ = writeln!(out, "output = {}", quote_config_string(&header.output));
    let _ = writeln!(out, "ghidra_output = {}", quote_config_string(&header.ghidra_output));
    let _ = writeln!(out, "single_file_output = {}", settings.single_file_output);
    let _ = writeln!(out, "patch_syscalls = {}", settings.patch_syscalls);
    let _ = writeln!(out, "patch_cop0 = {}", settings.patch_cop0);
    let _ = writeln!(out, "patch_cache = {}", settings.patch_cache);
    push_selector_list(&mut out, "stubs", &report.stubs.rendered());
    push_selector_list(&mut out, "skip", &report.skips.rendered());
    out.push('\n');

    out.push_str("[ghidra_export]\n");
    let _ = writeln!(out, "function_count = {}", counts.function_count);
    let _ = writeln!(out, "stub_count = {}", counts.stub_count);
    let _ = writeln!(out, "skip_count = {}", counts.skip_count);
    let _ = writeln!(out, "uncategorized_count = {}", counts.uncategorized_count);
    out.push_str("runtime_call_name_count = 0\n");
    out.push_str("runtime_call_source = \"regex_only\"\n");
    let _ = writeln!(out, "unresolved_count = {}", counts.unresolved_count);
    out
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Render the `Name,Start,End,Size` compatibility table, ordered by start address.
///
/// End is exclusive and unmasked, so a function reaching the top of the address
/// space ends at `0x100000000`.
pub fn render_function_map(report: &ScanReport) -> String {
    let mut out = String::from("Name,Start,End,Size\n");
    for record in report.records_by_address() {
        let _ = writeln!(
            out,
            "{},{},{},{}",
            csv_field(record.name.as_deref().unwrap_or("")),
            format_address(u64::from(record.start)),
            format!("0x{:08X}", record.end_exclusive),
            record.size
        );
    }
    out
}

/// Write `contents` to `path` through a temporary file in the same directory.
///
/// The destination only appears once everything is written and flushed; on any
/// failure the temporary is removed and the destination is left untouched.
pub fn write_atomically(path: &Path, contents: &str) -> Result<(), ExportError> {
    let io_err = |source| ExportError::Io { path: path.to_path_buf(), source };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(contents.as_bytes()).map_err(io_err)?;
    tmp.as_file_mut().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}

/// Scan `listing`, then write the function map (when requested) and the config.
///
/// Nothing is written if the scan is cancelled.
pub fn export<L, C>(
    listing: &L,
    settings: &ExportSettings,
    paths: &ExportPaths,
    cancel: &C,
) -> Result<ExportSummary, ExportError>
where
    L: FunctionListing + ?Sized,
    C: CancelSignal + ?Sized,
{
    let report = scan(listing, cancel)?;

    if let Some(map_path) = &paths.function_map {
        write_atomically(map_path, &render_function_map(&report))?;
        log::info!("Exported {} functions to {}", report.records.len(), map_path.display());
    }

    let input = settings.input.clone().unwrap_or_else(|| listing.source_name().to_string());
    let output_dir = settings.resolve_output_dir(&paths.config).display().to_string();
    let header = ConfigHeader {
        input: input.clone(),
        output: output_dir.clone(),
        ghidra_output: paths
            .function_map
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default(),
    };
    write_atomically(&paths.config, &render_config(&report, settings, &header))?;
    log::info!("Exported config to {}", paths.config.display());

    Ok(ExportSummary {
        input,
        config_path: paths.config.display().to_string(),
        function_map_path: paths.function_map.as_ref().map(|p| p.display().to_string()),
        output_dir,
        counts: report.counts(),
        unresolved_stubs: report.stubs.unresolved.clone(),
        unresolved_skips: report.skips.unresolved.clone(),
    })
}
