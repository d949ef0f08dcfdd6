use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use crate::compaction::{analyze_bone_usage, compact_skin, remap_bone_references};
use crate::error::SlotError;
use crate::import::{ImportedSkin, import_skinned_mesh};
use crate::project::ProjectSettings;
use crate::types::{BakeOptions, BoneReduction, SlotAsset, SlotBakeReport};

// ─── Public API ───────────────────────────────────────────────────────────────

/// Location of a slot asset file inside the slot folder.
pub fn slot_asset_path(slot_folder: &Path, slot_name: &str) -> PathBuf {
    slot_folder
        .join(slot_name)
        .join(format!("{slot_name}_Slot.json"))
}

/// Bake a skinned mesh from a GLB file into a slot asset on disk.
///
/// Creates the shared asset folder and the slot's own folder under
/// `settings.slot_folder`, drops unused bones when enabled, and writes
/// `<slot_folder>/<slot_name>/<slot_name>_Slot.json`.
pub fn bake_slot(
    input_path: &Path,
    slot_name: &str,
    settings: &ProjectSettings,
) -> Result<SlotBakeReport> {
    let slot_folder = Path::new(&settings.slot_folder);
    for folder in [
        slot_folder.join(&settings.asset_folder),
        slot_folder.join(slot_name),
    ] {
        fs::create_dir_all(&folder)
            .with_context(|| format!("failed to create folder: {}", folder.display()))?;
    }

    let imported = import_skinned_mesh(input_path, settings.bake.mesh_name.as_deref())?;
    let (slot, reduction) = build_slot_asset(imported, slot_name, &settings.bake)
        .with_context(|| format!("failed to build slot {slot_name}"))?;

    let slot_path = slot_asset_path(slot_folder, slot_name);
    save_slot_asset(&slot_path, &slot)?;

    log::info!(
        "Baked slot {} from {} ({} -> {} bones)",
        slot_name,
        input_path.display(),
        reduction.original_bone_count,
        reduction.used_bone_count
    );

    Ok(SlotBakeReport {
        slot_name: slot.slot_name,
        mesh_name: slot.mesh.name.clone(),
        original_bone_count: reduction.original_bone_count,
        used_bone_count: reduction.used_bone_count,
        vertex_count: slot.mesh.vertex_count(),
        submesh_count: slot.mesh.submeshes.len(),
        triangle_count: slot.mesh.triangle_count(),
        slot_path,
    })
}

/// Turn an imported skinned mesh into a slot asset without touching disk.
///
/// The returned reduction reports the bone count the slot ends up with; it
/// equals the original count when reduction is disabled or nothing was unused.
pub fn build_slot_asset(
    imported: ImportedSkin,
    slot_name: &str,
    options: &BakeOptions,
) -> Result<(SlotAsset, BoneReduction), SlotError> {
    let ImportedSkin {
        mut mesh,
        mut bones,
        root_bone,
        material,
    } = imported;

    let original_bone_count = bones.len();
    if options.reduce_bones {
        let used = analyze_bone_usage(&mesh.bone_weights);
        if used.len() != bones.len() {
            mesh = mesh.with_reduced_bones(&used)?;
            bones = remap_bone_references(&bones, &used)?;
        }
    }

    let reduction = BoneReduction {
        original_bone_count,
        used_bone_count: bones.len(),
    };

    let slot = SlotAsset {
        slot_name: slot_name.to_string(),
        material_sample: material,
        texture_name_list: options.texture_name_list.clone(),
        mesh,
        bones,
        root_bone,
    };

    Ok((slot, reduction))
}

/// Drop unused bones from an already baked slot in place.
///
/// Returns `None` when every bone is referenced and the slot is unchanged.
pub fn optimize_slot_asset(slot: &mut SlotAsset) -> Result<Option<BoneReduction>, SlotError> {
    let skin = compact_skin(&slot.mesh.bone_weights, &slot.mesh.bind_poses, &slot.bones)?;
    if !skin.compacted {
        return Ok(None);
    }

    let reduction = BoneReduction {
        original_bone_count: slot.bones.len(),
        used_bone_count: skin.bones.len(),
    };

    slot.mesh.bone_weights = skin.bone_weights;
    slot.mesh.bind_poses = skin.bind_poses;
    slot.bones = skin.bones;

    log::info!(
        "Optimized mesh {} from {} bones to {} bones.",
        slot.mesh.name,
        reduction.original_bone_count,
        reduction.used_bone_count
    );

    Ok(Some(reduction))
}

/// Save a slot asset as pretty-printed JSON.
pub fn save_slot_asset(path: &Path, slot: &SlotAsset) -> Result<()> {
    let content =
        serde_json::to_string_pretty(slot).context("failed to serialize slot asset as JSON")?;
    fs::write(path, content)
        .with_context(|| format!("failed to write slot asset: {}", path.display()))?;
    Ok(())
}

/// Load a slot asset from a JSON file.
pub fn load_slot_asset(path: &Path) -> Result<SlotAsset> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read slot asset: {}", path.display()))?;
    let slot: SlotAsset = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse slot asset JSON: {}", path.display()))?;
    Ok(slot)
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::{fixtures, import_skinned_mesh_from_slice};
    use crate::skin::BoneWeight;

    fn imported() -> ImportedSkin {
        import_skinned_mesh_from_slice(&fixtures::skinned_glb(), None).expect("fixture imports")
    }

    #[test]
    fn given_unused_joint_when_building_slot_then_bones_are_reduced() {
        let (slot, reduction) =
            build_slot_asset(imported(), "Body", &BakeOptions::default()).expect("build slot");

        assert_eq!(reduction.original_bone_count, 4);
        assert_eq!(reduction.used_bone_count, 3);
        assert_eq!(slot.bones, vec!["Hips", "LeftLeg", "Head"]);
        assert_eq!(slot.mesh.bind_poses.len(), 3);
        assert_eq!(slot.mesh.bind_poses[2][(1, 3)], -3.0);
        assert_eq!(slot.mesh.bone_weights[4].joints, [2, 1, 0, 0]);
        assert_eq!(slot.mesh.bone_weights[5], BoneWeight::default());
        assert_eq!(slot.root_bone.as_deref(), Some("Hips"));
    }

    #[test]
    fn given_reduction_disabled_when_building_slot_then_bones_are_kept() {
        let options = BakeOptions {
            reduce_bones: false,
            ..BakeOptions::default()
        };

        let (slot, reduction) = build_slot_asset(imported(), "Body", &options).unwrap();

        assert_eq!(reduction.used_bone_count, 4);
        assert_eq!(slot.bones.len(), 4);
        assert_eq!(slot.mesh.bone_weights[4].joints, [3, 2, 0, 0]);
    }

    #[test]
    fn given_unreduced_slot_when_optimizing_then_reduction_is_reported_once() {
        let options = BakeOptions {
            reduce_bones: false,
            ..BakeOptions::default()
        };
        let (mut slot, _) = build_slot_asset(imported(), "Body", &options).unwrap();

        let first = optimize_slot_asset(&mut slot).expect("optimize");
        assert_eq!(
            first,
            Some(BoneReduction {
                original_bone_count: 4,
                used_bone_count: 3
            })
        );
        assert_eq!(slot.bones, vec!["Hips", "LeftLeg", "Head"]);

        let second = optimize_slot_asset(&mut slot).expect("optimize again");
        assert_eq!(second, None);
    }

    #[test]
    fn given_glb_file_when_baking_then_slot_file_and_folders_are_written() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let input = dir.path().join("body.glb");
        fs::write(&input, fixtures::skinned_glb()).expect("write fixture");

        let mut settings = ProjectSettings::default();
        settings.slot_folder = dir.path().join("Slots").to_string_lossy().to_string();
        settings.bake.texture_name_list = vec!["baseColorTexture".to_string()];

        let report = bake_slot(&input, "Body", &settings).expect("bake slot");

        assert_eq!(report.mesh_name, "BodyMesh");
        assert_eq!(report.original_bone_count, 4);
        assert_eq!(report.used_bone_count, 3);
        assert_eq!(report.vertex_count, 6);
        assert_eq!(report.submesh_count, 2);
        assert_eq!(report.triangle_count, 2);
        assert!(dir.path().join("Slots").join("Shared").is_dir());
        assert!(report.slot_path.ends_with("Body/Body_Slot.json"));

        let slot = load_slot_asset(&report.slot_path).expect("load slot");
        assert_eq!(slot.slot_name, "Body");
        assert_eq!(slot.texture_name_list, vec!["baseColorTexture"]);
        assert_eq!(slot.bones.len(), 3);
    }

    #[test]
    fn given_missing_input_when_baking_then_error_names_the_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let mut settings = ProjectSettings::default();
        settings.slot_folder = dir.path().to_string_lossy().to_string();

        let error = bake_slot(&dir.path().join("missing.glb"), "Body", &settings)
            .expect_err("missing input should fail");

        assert!(format!("{error:#}").contains("missing.glb"));
    }
}
