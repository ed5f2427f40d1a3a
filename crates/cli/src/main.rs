use anyhow::Result;
use clap::{Parser, Subcommand};
use stubmap::commands::{classify_command, export_command, list_formats_command, ExportArgs};
use stubmap::init_logging;

/// Function classifier for static recompilation.
///
/// This CLI is a thin wrapper around `stubmap-core` (exposed in code as `stubmap_core`).
/// It reads a function listing exported from an analysis tool, sorts every function
/// into stub/skip/recompile buckets and writes the recompiler config.
#[derive(Parser, Debug)]
#[command(
    name = "stubmap",
    version,
    about = "Classify functions into stubs and skips for a static recompiler",
    long_about = None
)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify a function listing and write the recompiler config.
    ///
    /// This will:
    /// - Load the listing (format from `--format` or the file extension).
    /// - Write the `Name,Start,End,Size` function map when `--csv` is given.
    /// - Write the config with address-qualified stub and skip selectors.
    Export {
        /// Function listing to classify.
        #[arg(long)]
        functions: String,

        /// Listing format (json, csv, elf). Inferred from the extension when omitted.
        #[arg(long)]
        format: Option<String>,

        /// Destination for the generated config.
        #[arg(long)]
        config: String,

        /// Optional destination for the function map CSV.
        #[arg(long)]
        csv: Option<String>,

        /// Value for the config's `input` key. Defaults to the listing path.
        #[arg(long)]
        input: Option<String>,

        /// YAML or JSON file overriding export settings.
        #[arg(long)]
        settings: Option<String>,

        /// Emit the export summary as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Classify a single function name.
    Classify {
        /// Function name to classify.
        name: String,

        /// Treat the function as a thunk forwarding to this name (implies --thunk).
        #[arg(long)]
        thunk_target: Option<String>,

        /// Treat the function as a thunk with an unknown target.
        #[arg(long)]
        thunk: bool,

        /// Emit JSON instead of human-readable output.
        #[arg(long)]
        json: bool,
    },

    /// List the function listing formats this build can read.
    Formats {
        /// Emit JSON instead of human-readable output.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Export { functions, format, config, csv, input, settings, json } => {
            export_command(&ExportArgs { functions, format, config, csv, input, settings, json })?
        }
        Command::Classify { name, thunk_target, thunk, json } => {
            classify_command(&name, thunk, thunk_target.as_deref(), json)?
        }
        Command::Formats { json } => list_formats_command(json)?,
    }

    Ok(())
}
