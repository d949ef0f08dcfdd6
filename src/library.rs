use std::{collections::HashMap, fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::bake::load_slot_asset;
use crate::error::SlotError;
use crate::types::SlotAsset;

/// Ordered collection of slot assets.
///
/// Entries may be empty, mirroring a list row with no slot assigned yet. A
/// name dictionary is kept in sync with the entries; when two slots share a
/// name the first one wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlotLibrary {
    slots: Vec<Option<SlotAsset>>,
    #[serde(skip)]
    by_name: HashMap<String, usize>,
}

impl SlotLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[Option<SlotAsset>] {
        &self.slots
    }

    pub fn get(&self, index: usize) -> Option<&SlotAsset> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Looks a slot up by name.
    pub fn find(&self, slot_name: &str) -> Option<&SlotAsset> {
        self.by_name.get(slot_name).and_then(|&index| self.get(index))
    }

    /// Appends an entry, which may be empty.
    pub fn add(&mut self, slot: Option<SlotAsset>) {
        self.slots.push(slot);
        self.update_dictionary();
    }

    pub fn set(&mut self, index: usize, slot: Option<SlotAsset>) -> Result<(), SlotError> {
        let len = self.slots.len();
        let entry = self
            .slots
            .get_mut(index)
            .ok_or(SlotError::LibraryIndexOutOfRange { index, len })?;
        *entry = slot;
        self.update_dictionary();
        Ok(())
    }

    /// Removes the entry at `index`; later entries move up by one.
    pub fn remove_at(&mut self, index: usize) -> Result<Option<SlotAsset>, SlotError> {
        if index >= self.slots.len() {
            return Err(SlotError::LibraryIndexOutOfRange {
                index,
                len: self.slots.len(),
            });
        }
        let removed = self.slots.remove(index);
        self.update_dictionary();
        Ok(removed)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.by_name.clear();
    }

    /// Drops empty entries and sorts the rest by slot name.
    pub fn order_by_name(&mut self) {
        self.remove_invalid();
        self.slots.sort_by(|a, b| {
            let a = a.as_ref().map(|slot| slot.slot_name.as_str());
            let b = b.as_ref().map(|slot| slot.slot_name.as_str());
            a.cmp(&b)
        });
        self.update_dictionary();
    }

    /// Drops empty entries, keeping the order of the others.
    pub fn remove_invalid(&mut self) -> usize {
        let before = self.slots.len();
        self.slots.retain(Option::is_some);
        self.update_dictionary();
        before - self.slots.len()
    }

    /// Adds every slot asset file found directly inside `dir`.
    ///
    /// Files are visited in name order. JSON files that do not parse as a
    /// slot asset are skipped. Returns the number of slots added.
    pub fn add_from_directory(&mut self, dir: &Path) -> Result<usize> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)
            .with_context(|| format!("failed to read slot directory: {}", dir.display()))?
        {
            let path = entry
                .with_context(|| format!("failed to list slot directory: {}", dir.display()))?
                .path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut added = 0;
        for path in paths {
            match load_slot_asset(&path) {
                Ok(slot) => {
                    self.slots.push(Some(slot));
                    added += 1;
                }
                Err(err) => log::debug!("skipping {}: {err:#}", path.display()),
            }
        }
        self.update_dictionary();
        Ok(added)
    }

    /// Repairs slots whose texture name list is empty and whose material does
    /// not bind every default texture name.
    ///
    /// Such slots get their material's texture properties as texture name
    /// list. Returns the names of the slots that were changed.
    pub fn validate_texture_name_lists(&mut self, default_texture_names: &[String]) -> Vec<String> {
        let mut fixed = Vec::new();
        for slot in self.slots.iter_mut().flatten() {
            if !slot.texture_name_list.is_empty() {
                continue;
            }
            let Some(material) = slot.material_sample.as_ref() else {
                continue;
            };
            let valid = default_texture_names
                .iter()
                .all(|name| material.has_property(name));
            if valid {
                continue;
            }

            slot.texture_name_list = material.texture_properties.clone();
            log::warn!("Fixed slot data: {}", slot.slot_name);
            fixed.push(slot.slot_name.clone());
        }
        fixed
    }

    fn update_dictionary(&mut self) {
        self.by_name.clear();
        for (index, slot) in self.slots.iter().enumerate() {
            if let Some(slot) = slot {
                self.by_name.entry(slot.slot_name.clone()).or_insert(index);
            }
        }
    }
}

/// Save a slot library as JSON.
pub fn save_slot_library(path: &Path, library: &SlotLibrary) -> Result<()> {
    let content = serde_json::to_string_pretty(library)
        .context("failed to serialize slot library as JSON")?;
    fs::write(path, content)
        .with_context(|| format!("failed to save slot library: {}", path.display()))?;
    Ok(())
}

/// Load a slot library from a JSON file.
pub fn load_slot_library(path: &Path) -> Result<SlotLibrary> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to load slot library: {}", path.display()))?;
    let mut library: SlotLibrary =
        serde_json::from_str(&content).context("failed to parse slot library JSON")?;
    library.update_dictionary();
    Ok(library)
}
