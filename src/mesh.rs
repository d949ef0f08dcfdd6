use nalgebra::{Matrix4, Point3};
use serde::{Deserialize, Serialize};

use crate::compaction::{remap_bind_poses, remap_bone_weights};
use crate::error::SlotError;
use crate::skin::{BoneWeight, UsedBoneMap};

/// Number of UV channels carried through a rebuild.
pub const UV_CHANNEL_COUNT: usize = 4;

/// Engine-neutral skinned mesh: vertex streams, sub-mesh topology and skin.
///
/// Optional streams (normals, tangents, UVs, colors) are empty when absent;
/// when present they hold one element per position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkinnedMesh {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    #[serde(default)]
    pub normals: Vec<[f32; 3]>,
    #[serde(default)]
    pub tangents: Vec<[f32; 4]>,
    #[serde(default)]
    pub uv_channels: Vec<Vec<[f32; 2]>>,
    #[serde(default)]
    pub colors: Vec<[f32; 4]>,
    /// Triangle index lists, one per sub-mesh.
    pub submeshes: Vec<Vec<u32>>,
    pub bone_weights: Vec<BoneWeight>,
    pub bind_poses: Vec<Matrix4<f32>>,
}

impl SkinnedMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.submeshes.iter().map(|indices| indices.len() / 3).sum()
    }

    /// Copy of this mesh with its skin rewritten through `used`.
    ///
    /// Every vertex stream and every sub-mesh index list is carried over as
    /// is; only bone weights and bind poses change.
    pub fn with_reduced_bones(&self, used: &UsedBoneMap) -> Result<SkinnedMesh, SlotError> {
        Ok(SkinnedMesh {
            name: self.name.clone(),
            positions: self.positions.clone(),
            normals: self.normals.clone(),
            tangents: self.tangents.clone(),
            uv_channels: self.uv_channels.clone(),
            colors: self.colors.clone(),
            submeshes: self.submeshes.clone(),
            bone_weights: remap_bone_weights(&self.bone_weights, used),
            bind_poses: remap_bind_poses(&self.bind_poses, used)?,
        })
    }

    /// Linear blend skinning of the positions.
    ///
    /// `bone_world` holds the current world matrix of every bone, parallel to
    /// `bind_poses`. Slots with weight `<= 0` are ignored.
    pub fn deform_positions(&self, bone_world: &[Matrix4<f32>]) -> Result<Vec<[f32; 3]>, SlotError> {
        let skinning: Vec<Matrix4<f32>> = bone_world
            .iter()
            .zip(&self.bind_poses)
            .map(|(world, bind)| world * bind)
            .collect();

        let mut deformed = Vec::with_capacity(self.positions.len());
        for (position, weight) in self.positions.iter().zip(&self.bone_weights) {
            let rest = Point3::from(*position);
            let mut acc = Point3::origin();
            for (joint, influence) in weight.influences() {
                let matrix =
                    skinning
                        .get(joint as usize)
                        .ok_or(SlotError::BoneReferenceOutOfRange {
                            index: joint,
                            len: skinning.len(),
                        })?;
                acc.coords += matrix.transform_point(&rest).coords * influence;
            }
            deformed.push([acc.x, acc.y, acc.z]);
        }
        Ok(deformed)
    }
}
