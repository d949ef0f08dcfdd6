use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::mesh::SkinnedMesh;

// ─── Texture slot names ───────────────────────────────────────────────────────

/// glTF material texture slots recognized as material texture properties.
pub const MATERIAL_TEXTURE_SLOTS: [&str; 5] = [
    "baseColorTexture",
    "metallicRoughnessTexture",
    "normalTexture",
    "occlusionTexture",
    "emissiveTexture",
];

/// Texture names a slot is expected to provide when none are configured.
pub const DEFAULT_TEXTURE_NAMES: [&str; 3] =
    ["baseColorTexture", "normalTexture", "metallicRoughnessTexture"];

// ─── Public types ─────────────────────────────────────────────────────────────

/// Material reference captured alongside a baked slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialSample {
    pub name: String,
    /// Texture properties the material actually binds.
    pub texture_properties: Vec<String>,
}

impl MaterialSample {
    pub fn has_property(&self, name: &str) -> bool {
        self.texture_properties.iter().any(|property| property == name)
    }
}

/// Reusable mesh piece of a customizable character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotAsset {
    pub slot_name: String,
    pub material_sample: Option<MaterialSample>,
    #[serde(default)]
    pub texture_name_list: Vec<String>,
    pub mesh: SkinnedMesh,
    /// Bone names parallel to `mesh.bind_poses`.
    pub bones: Vec<String>,
    pub root_bone: Option<String>,
}

/// Options controlling how a slot is baked from a source mesh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BakeOptions {
    /// Node or mesh name to bake; the first skinned node when `None`.
    pub mesh_name: Option<String>,
    /// Drops bones no vertex is weighted to.
    pub reduce_bones: bool,
    /// Texture name list stored on the baked slot.
    pub texture_name_list: Vec<String>,
}

impl Default for BakeOptions {
    fn default() -> Self {
        Self {
            mesh_name: None,
            reduce_bones: true,
            texture_name_list: Vec::new(),
        }
    }
}

/// Bone counts before and after compaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoneReduction {
    pub original_bone_count: usize,
    pub used_bone_count: usize,
}

/// Report returned after a slot has been baked and written.
#[derive(Debug, Clone, Serialize)]
pub struct SlotBakeReport {
    pub slot_name: String,
    pub mesh_name: String,
    pub original_bone_count: usize,
    pub used_bone_count: usize,
    pub vertex_count: usize,
    pub submesh_count: usize,
    pub triangle_count: usize,
    pub slot_path: PathBuf,
}
