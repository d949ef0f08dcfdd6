use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::types::{BakeOptions, DEFAULT_TEXTURE_NAMES};

/// Persisted project settings used by the CLI workflows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSettings {
    /// Root folder baked slots are written under.
    pub slot_folder: String,
    /// Shared asset folder created next to the slot folders.
    pub asset_folder: String,
    pub bake: BakeOptions,
    /// Texture names every slot material is expected to bind.
    pub default_texture_names: Vec<String>,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            slot_folder: "Slots".to_string(),
            asset_folder: "Shared".to_string(),
            bake: BakeOptions::default(),
            default_texture_names: DEFAULT_TEXTURE_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Save project settings to a JSON file.
pub fn save_project_settings(path: &Path, settings: &ProjectSettings) -> Result<()> {
    let content = serde_json::to_string_pretty(settings)
        .context("failed to serialize project settings as JSON")?;
    fs::write(path, content)
        .with_context(|| format!("failed to save project settings: {}", path.display()))?;
    Ok(())
}

/// Load project settings from a JSON file.
pub fn load_project_settings(path: &Path) -> Result<ProjectSettings> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to load project settings: {}", path.display()))?;
    let settings: ProjectSettings =
        serde_json::from_str(&content).context("failed to parse project settings JSON")?;
    Ok(settings)
}
