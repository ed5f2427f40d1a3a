//! Export settings.
//!
//! The `[general]` feature flags in the generated config default to fixed values that
//! downstream recompilers expect. A settings file (YAML or JSON, picked by extension)
//! can override them together with the output directory and input path.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// Serializable settings applied when rendering the config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Value for the `input` key; defaults to the listing's source name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    /// Value for the `output` key; defaults to `<config dir>/output`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub single_file_output: bool,
    #[serde(default)]
    pub patch_syscalls: bool,
    #[serde(default = "default_true")]
    pub patch_cop0: bool,
    #[serde(default = "default_true")]
    pub patch_cache: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            input: None,
            output_dir: None,
            single_file_output: false,
            patch_syscalls: false,
            patch_cop0: true,
            patch_cache: true,
        }
    }
}

impl ExportSettings {
    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Output directory for a config written to `config_path`.
    pub fn resolve_output_dir(&self, config_path: &Path) -> PathBuf {
        if let Some(dir) = &self.output_dir {
            return dir.clone();
        }
        match config_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.join("output"),
            _ => PathBuf::from("output"),
        }
    }
}

/// Load settings from a YAML or JSON file.
pub fn load_settings(path: &Path) -> Result<ExportSettings> {
    let body = std::fs::read(path)
        .with_context(|| format!("Failed to read export settings at {}", path.display()))?;
    let settings = if path.extension().and_then(|e| e.to_str()) == Some("json") {
        serde_json::from_slice(&body).context("Failed to parse export settings JSON")?
    } else {
        serde_yaml::from_slice(&body).context("Failed to parse export settings YAML")?
    };
    Ok(settings)
}
