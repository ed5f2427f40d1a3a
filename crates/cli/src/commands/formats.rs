use anyhow::Result;
use serde::Serialize;
use stubmap_core::services::listing::default_loader_registry;

#[derive(Debug, Serialize)]
pub struct FormatInfo {
    pub name: String,
    pub description: String,
    pub extensions: Vec<String>,
}

/// Describe every compiled-in listing loader, sorted by name.
pub fn available_formats() -> Vec<FormatInfo> {
    let registry = default_loader_registry();
    registry
        .names()
        .into_iter()
        .filter_map(|name| {
            let loader = registry.get(&name)?;
            Some(FormatInfo {
                name,
                description: loader.description().to_string(),
                extensions: loader.extensions().iter().map(|e| e.to_string()).collect(),
            })
        })
        .collect()
}

pub fn list_formats_command(json: bool) -> Result<()> {
    let formats = available_formats();
    if json {
        println!("{}", serde_json::to_string_pretty(&formats)?);
        return Ok(());
    }
    println!("Available listing formats:");
    for format in formats {
        println!("  - {} (.{}): {}", format.name, format.extensions.join(", ."), format.description);
    }
    Ok(())
}
