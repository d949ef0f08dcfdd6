use std::{fs, path::Path};

use anyhow::{Context, Result, anyhow, bail};
use gltf::{Document, Node, mesh::Mode};
use nalgebra::Matrix4;

use crate::mesh::{SkinnedMesh, UV_CHANNEL_COUNT};
use crate::skin::BoneWeight;
use crate::types::{MATERIAL_TEXTURE_SLOTS, MaterialSample};

/// Skinned mesh read from a glTF document together with its skeleton data.
#[derive(Debug, Clone)]
pub struct ImportedSkin {
    pub mesh: SkinnedMesh,
    /// Joint node names parallel to `mesh.bind_poses`.
    pub bones: Vec<String>,
    pub root_bone: Option<String>,
    pub material: Option<MaterialSample>,
}

/// Read a skinned mesh from a GLB/glTF file.
///
/// With `mesh_name`, the node whose node name or mesh name matches is used;
/// otherwise the first node that carries both a mesh and a skin.
pub fn import_skinned_mesh(path: &Path, mesh_name: Option<&str>) -> Result<ImportedSkin> {
    let bytes = fs::read(path)
        .with_context(|| format!("failed to read input file: {}", path.display()))?;
    import_skinned_mesh_from_slice(&bytes, mesh_name)
        .with_context(|| format!("failed to import skinned mesh: {}", path.display()))
}

/// Same as [`import_skinned_mesh`] for in-memory GLB data.
pub fn import_skinned_mesh_from_slice(bytes: &[u8], mesh_name: Option<&str>) -> Result<ImportedSkin> {
    let (document, buffers, _images) =
        gltf::import_slice(bytes).context("failed to parse glTF document")?;

    let node = find_skinned_node(&document, mesh_name)?;
    let (Some(mesh), Some(skin)) = (node.mesh(), node.skin()) else {
        bail!("node {} has no skinned mesh", node.index());
    };

    let name = mesh
        .name()
        .or_else(|| node.name())
        .map(str::to_string)
        .unwrap_or_else(|| format!("mesh_{}", mesh.index()));

    let mut out = SkinnedMesh {
        name,
        uv_channels: vec![Vec::new(); UV_CHANNEL_COUNT],
        ..SkinnedMesh::default()
    };
    let mut material = None;

    for primitive in mesh.primitives() {
        if primitive.mode() != Mode::Triangles {
            log::warn!(
                "primitive {} of mesh {} uses {:?}; indices are copied as-is",
                primitive.index(),
                out.name,
                primitive.mode()
            );
        }

        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|b| &b.0[..]));
        let Some(positions) = reader.read_positions() else {
            log::warn!(
                "primitive {} of mesh {} has no positions and was skipped",
                primitive.index(),
                out.name
            );
            continue;
        };
        let positions: Vec<[f32; 3]> = positions.collect();
        let base = out.positions.len();
        let count = positions.len();

        append_stream(&mut out.normals, base, count, reader.read_normals().map(Iterator::collect));
        append_stream(&mut out.tangents, base, count, reader.read_tangents().map(Iterator::collect));
        for (set, channel) in out.uv_channels.iter_mut().enumerate() {
            let values = reader
                .read_tex_coords(set as u32)
                .map(|coords| coords.into_f32().collect());
            append_stream(channel, base, count, values);
        }
        append_stream(
            &mut out.colors,
            base,
            count,
            reader.read_colors(0).map(|colors| colors.into_rgba_f32().collect()),
        );

        let bone_weights: Vec<BoneWeight> = match (reader.read_joints(0), reader.read_weights(0)) {
            (Some(joints), Some(weights)) => joints
                .into_u16()
                .zip(weights.into_f32())
                .map(|(joints, weights)| BoneWeight::new(joints.map(u32::from), weights))
                .collect(),
            _ => Vec::new(),
        };
        if bone_weights.len() != count {
            log::warn!(
                "primitive {} of mesh {} has {} skin records for {} vertices",
                primitive.index(),
                out.name,
                bone_weights.len(),
                count
            );
        }
        out.bone_weights.extend(bone_weights);
        out.bone_weights.resize(base + count, BoneWeight::default());

        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => {
                let mut merged = Vec::new();
                for index in indices.into_u32() {
                    if index as usize >= count {
                        bail!(
                            "primitive {} of mesh {} references vertex {} but has {} vertices",
                            primitive.index(),
                            out.name,
                            index,
                            count
                        );
                    }
                    merged.push((base + index as usize) as u32);
                }
                merged
            }
            None => (base as u32..(base + count) as u32).collect(),
        };
        out.submeshes.push(indices);
        out.positions.extend(positions);

        if material.is_none() {
            material = Some(material_sample(&primitive.material()));
        }
    }

    out.uv_channels.retain(|channel| !channel.is_empty());

    let bones: Vec<String> = skin
        .joints()
        .map(|joint| node_label(&joint))
        .collect();

    let reader = skin.reader(|buffer| buffers.get(buffer.index()).map(|b| &b.0[..]));
    out.bind_poses = match reader.read_inverse_bind_matrices() {
        Some(matrices) => matrices.map(Matrix4::from).collect(),
        None => vec![Matrix4::identity(); bones.len()],
    };
    if out.bind_poses.len() != bones.len() {
        bail!(
            "skin {} has {} joints but {} inverse bind matrices",
            skin.index(),
            bones.len(),
            out.bind_poses.len()
        );
    }

    log::debug!(
        "imported mesh {}: {} vertices, {} sub-meshes, {} bones",
        out.name,
        out.vertex_count(),
        out.submeshes.len(),
        bones.len()
    );

    Ok(ImportedSkin {
        mesh: out,
        bones,
        root_bone: skin.skeleton().map(|root| node_label(&root)),
        material,
    })
}

fn find_skinned_node<'a>(document: &'a Document, mesh_name: Option<&str>) -> Result<Node<'a>> {
    let mut skinned = document
        .nodes()
        .filter(|node| node.mesh().is_some() && node.skin().is_some());

    match mesh_name {
        Some(wanted) => skinned
            .find(|node| {
                node.name() == Some(wanted)
                    || node.mesh().is_some_and(|mesh| mesh.name() == Some(wanted))
            })
            .ok_or_else(|| anyhow!("no skinned mesh named {wanted}")),
        None => skinned
            .next()
            .ok_or_else(|| anyhow!("document contains no skinned mesh")),
    }
}

fn node_label(node: &Node) -> String {
    node.name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("node_{}", node.index()))
}

fn material_sample(material: &gltf::Material) -> MaterialSample {
    let pbr = material.pbr_metallic_roughness();
    let bound = [
        pbr.base_color_texture().is_some(),
        pbr.metallic_roughness_texture().is_some(),
        material.normal_texture().is_some(),
        material.occlusion_texture().is_some(),
        material.emissive_texture().is_some(),
    ];

    MaterialSample {
        name: material.name().unwrap_or("default").to_string(),
        texture_properties: MATERIAL_TEXTURE_SLOTS
            .iter()
            .zip(bound)
            .filter(|(_, present)| *present)
            .map(|(slot, _)| slot.to_string())
            .collect(),
    }
}

/// Appends one primitive's values to a merged vertex stream.
///
/// `base` is the merged vertex count before this primitive. Streams missing
/// on some primitives are padded with defaults so every present stream stays
/// parallel to the positions.
fn append_stream<T: Clone + Default>(
    stream: &mut Vec<T>,
    base: usize,
    count: usize,
    values: Option<Vec<T>>,
) {
    match values {
        Some(mut values) => {
            stream.resize(base, T::default());
            values.resize(count, T::default());
            stream.extend(values);
        }
        None if !stream.is_empty() => stream.resize(base + count, T::default()),
        None => {}
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_two_primitives_when_importing_then_streams_are_merged_per_vertex() {
        let imported = import_skinned_mesh_from_slice(&fixtures::skinned_glb(), None)
            .expect("fixture should import");
        let mesh = &imported.mesh;

        assert_eq!(mesh.name, "BodyMesh");
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.normals.len(), 6);
        assert_eq!(mesh.normals[4], [0.0, 0.0, 0.0]);
        assert!(mesh.tangents.is_empty());
        assert!(mesh.uv_channels.is_empty());
        assert_eq!(mesh.submeshes, vec![vec![0, 1, 2], vec![3, 4, 5]]);
        assert_eq!(mesh.bone_weights.len(), 6);
        assert_eq!(mesh.bone_weights[4].joints, [3, 2, 0, 0]);
    }

    #[test]
    fn given_skin_when_importing_then_bones_and_bind_poses_are_parallel() {
        let imported = import_skinned_mesh_from_slice(&fixtures::skinned_glb(), None).unwrap();

        assert_eq!(imported.bones, vec!["Hips", "Spine", "LeftLeg", "Head"]);
        assert_eq!(imported.root_bone.as_deref(), Some("Hips"));
        assert_eq!(imported.mesh.bind_poses.len(), 4);
        assert_eq!(imported.mesh.bind_poses[3][(1, 3)], -3.0);

        let material = imported.material.expect("primitive material");
        assert_eq!(material.name, "Skin");
        assert!(material.texture_properties.is_empty());
    }

    #[test]
    fn given_unknown_mesh_name_when_importing_then_error_is_returned() {
        let result = import_skinned_mesh_from_slice(&fixtures::skinned_glb(), Some("Hair"));
        assert!(result.is_err());
    }

    #[test]
    fn given_node_name_when_importing_then_named_node_is_used() {
        let imported = import_skinned_mesh_from_slice(&fixtures::skinned_glb(), Some("Body"));
        assert!(imported.is_ok());
    }

    #[test]
    fn given_second_primitive_indices_when_importing_then_they_are_offset_by_base() {
        let imported =
            import_skinned_mesh_from_slice(&fixtures::skinned_glb_with_indices(&[2, 1, 0]), None)
                .expect("fixture should import");

        assert_eq!(imported.mesh.submeshes[1], vec![5, 4, 3]);
    }

    #[test]
    fn given_index_past_primitive_vertices_when_importing_then_error_is_returned() {
        for bad in [3, u32::MAX] {
            let glb = fixtures::skinned_glb_with_indices(&[0, 1, bad]);

            let error = import_skinned_mesh_from_slice(&glb, None)
                .expect_err("out-of-range index should fail");

            assert!(error.to_string().contains("references vertex"));
        }
    }

    #[test]
    fn given_missing_stream_on_first_primitive_when_appending_then_earlier_vertices_are_padded() {
        let mut stream: Vec<[f32; 2]> = Vec::new();
        append_stream(&mut stream, 0, 2, None);
        assert!(stream.is_empty());

        append_stream(&mut stream, 2, 1, Some(vec![[0.5, 0.5]]));
        assert_eq!(stream, vec![[0.0, 0.0], [0.0, 0.0], [0.5, 0.5]]);
    }
}
