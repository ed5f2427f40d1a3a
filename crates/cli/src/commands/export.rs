use std::path::Path;

use anyhow::{Context, Result};
use stubmap_core::analysis::{CancelSignal, NeverCancel};
use stubmap_core::config::{load_settings, ExportSettings};
use stubmap_core::services::export::{export, ExportPaths, ExportSummary};
use stubmap_core::services::listing::default_loader_registry;

use crate::canonicalize_or_current;

/// Options for the `export` command, gathered from CLI flags.
#[derive(Debug, Clone, Default)]
pub struct ExportArgs {
    pub functions: String,
    pub format: Option<String>,
    pub config: String,
    pub csv: Option<String>,
    pub input: Option<String>,
    pub settings: Option<String>,
    pub json: bool,
}

/// Classify every function in a listing and write the recompiler config.
pub fn export_command(args: &ExportArgs) -> Result<()> {
    let summary = run_export(args)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

/// Run an export and return its summary without printing anything.
pub fn run_export(args: &ExportArgs) -> Result<ExportSummary> {
    run_export_with_cancel(args, &NeverCancel)
}

/// Like [`run_export`], but stops when `cancel` fires; nothing is written then.
pub fn run_export_with_cancel<C: CancelSignal + ?Sized>(
    args: &ExportArgs,
    cancel: &C,
) -> Result<ExportSummary> {
    let listing_path = canonicalize_or_current(&args.functions)?;
    let registry = default_loader_registry();
    let listing = registry
        .load(&listing_path, args.format.as_deref())
        .with_context(|| format!("Failed to load function listing {}", listing_path.display()))?;

    let mut settings = match &args.settings {
        Some(path) => load_settings(Path::new(path))?,
        None => ExportSettings::default(),
    };
    if let Some(input) = &args.input {
        settings = settings.with_input(input.clone());
    }
    // The recompiler reads `output` and `ghidra_output` verbatim, so they must be absolute.
    if let Some(dir) = settings.output_dir.take() {
        settings = settings.with_output_dir(canonicalize_or_current(&dir.to_string_lossy())?);
    }

    let paths = ExportPaths {
        config: canonicalize_or_current(&args.config)?,
        function_map: args.csv.as_deref().map(canonicalize_or_current).transpose()?,
    };
    let summary = export(&listing, &settings, &paths, cancel)
        .with_context(|| format!("Failed to export config to {}", args.config))?;
    Ok(summary)
}

fn print_summary(summary: &ExportSummary) {
    println!("Input: {}", summary.input);
    println!("Config: {}", summary.config_path);
    if let Some(map) = &summary.function_map_path {
        println!("Function map: {}", map);
    }
    println!("Output dir: {}", summary.output_dir);
    let counts = &summary.counts;
    println!("Functions: {}", counts.function_count);
    println!("Stubs: {}", counts.stub_count);
    println!("Skips: {}", counts.skip_count);
    println!("Uncategorized: {}", counts.uncategorized_count);
    if counts.unresolved_count > 0 {
        println!("Unresolved: {}", counts.unresolved_count);
        for name in &summary.unresolved_stubs {
            println!("  - stub {}", name);
        }
        for name in &summary.unresolved_skips {
            println!("  - skip {}", name);
        }
    }
}
