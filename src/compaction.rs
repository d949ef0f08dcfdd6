use nalgebra::Matrix4;

use crate::error::SlotError;
use crate::skin::{BoneWeight, UsedBoneMap};

// ─── Bone usage analysis ─────────────────────────────────────────────────────

/// Collects the bones referenced by positive weights, in first-seen order.
///
/// Vertices are scanned in input order and slots 0..3 within each vertex, so
/// identical input always yields an identical map. A vertex whose weights are
/// all `<= 0` contributes no bones at all.
pub fn analyze_bone_usage(bone_weights: &[BoneWeight]) -> UsedBoneMap {
    let mut used = UsedBoneMap::new();
    for weight in bone_weights {
        for (joint, _) in weight.influences() {
            used.insert(joint);
        }
    }
    used
}

// ─── Skin data remapping ─────────────────────────────────────────────────────

/// Rewrites every joint index through `used`.
///
/// Indices missing from the map (unused or out of range) become compacted
/// index 0 so no slot points past the shortened bone list. Weight values are
/// copied unchanged.
pub fn remap_bone_weights(bone_weights: &[BoneWeight], used: &UsedBoneMap) -> Vec<BoneWeight> {
    bone_weights
        .iter()
        .map(|source| BoneWeight {
            joints: source.joints.map(|joint| used.get(joint).unwrap_or(0)),
            weights: source.weights,
        })
        .collect()
}

/// Reorders bind poses into compacted order, dropping unused bones.
pub fn remap_bind_poses(
    bind_poses: &[Matrix4<f32>],
    used: &UsedBoneMap,
) -> Result<Vec<Matrix4<f32>>, SlotError> {
    scatter(bind_poses, used).map_err(|index| SlotError::BindPoseOutOfRange {
        index,
        len: bind_poses.len(),
    })
}

/// Reorders bone references into compacted order, dropping unused bones.
pub fn remap_bone_references<B: Clone>(bones: &[B], used: &UsedBoneMap) -> Result<Vec<B>, SlotError> {
    scatter(bones, used).map_err(|index| SlotError::BoneReferenceOutOfRange {
        index,
        len: bones.len(),
    })
}

/// `out[compacted] = source[original]`; fails with the first original index
/// that has no source element.
fn scatter<T: Clone>(source: &[T], used: &UsedBoneMap) -> Result<Vec<T>, u32> {
    // originals() is already ordered by compacted index, so the scatter is a
    // gather over it.
    used.originals()
        .iter()
        .map(|&original| source.get(original as usize).cloned().ok_or(original))
        .collect()
}

// ─── Combined compaction ─────────────────────────────────────────────────────

/// Skin arrays after bone compaction.
#[derive(Debug, Clone, PartialEq)]
pub struct CompactedSkin<B> {
    pub bone_weights: Vec<BoneWeight>,
    pub bind_poses: Vec<Matrix4<f32>>,
    pub bones: Vec<B>,
    pub used: UsedBoneMap,
    /// False when the bone list was already minimal and the inputs were kept.
    pub compacted: bool,
}

/// Analyzes bone usage and remaps all three skin arrays consistently.
///
/// When every bone is already referenced the inputs are returned unchanged.
pub fn compact_skin<B: Clone>(
    bone_weights: &[BoneWeight],
    bind_poses: &[Matrix4<f32>],
    bones: &[B],
) -> Result<CompactedSkin<B>, SlotError> {
    let used = analyze_bone_usage(bone_weights);

    if used.len() == bones.len() {
        return Ok(CompactedSkin {
            bone_weights: bone_weights.to_vec(),
            bind_poses: bind_poses.to_vec(),
            bones: bones.to_vec(),
            used,
            compacted: false,
        });
    }

    Ok(CompactedSkin {
        bone_weights: remap_bone_weights(bone_weights, &used),
        bind_poses: remap_bind_poses(bind_poses, &used)?,
        bones: remap_bone_references(bones, &used)?,
        used,
        compacted: true,
    })
}
