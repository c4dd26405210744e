//! glTF / GLB decoding into [`ModelAsset`]
//!
//! Supports triangle-list primitives with positions, normals and the first UV
//! set, metallic-roughness base color (factor + texture), node hierarchy and
//! node TRS animation. Skins and morph targets are ignored.

use std::path::Path;

use glam::{Quat, Vec3};
use gltf::animation::util::ReadOutputs;

use super::model::{MaterialData, ModelAsset, ModelNode, NodeTransform, PrimitiveRef, TextureData};
use super::AssetError;
use crate::viewport::animation::{AnimationClip, Channel, ChannelValues, Interpolation};
use crate::viewport::mesh::MeshData;

/// Decode a GLB (or self-contained glTF JSON) byte slice
pub fn decode(bytes: &[u8]) -> Result<ModelAsset, AssetError> {
    let (document, buffers, images) = gltf::import_slice(bytes)?;
    build_asset(&document, &buffers, &images)
}

/// Decode a glTF file from disk, resolving external buffers relative to it
pub fn load_file(path: &Path) -> Result<ModelAsset, AssetError> {
    let (document, buffers, images) = gltf::import(path)?;
    build_asset(&document, &buffers, &images)
}

fn build_asset(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
    images: &[gltf::image::Data],
) -> Result<ModelAsset, AssetError> {
    let mut materials = load_materials(document, images);
    let mut default_material = None;
    let mut meshes = Vec::new();

    // gltf mesh index -> primitives it produced
    let mut mesh_primitives: Vec<Vec<PrimitiveRef>> = Vec::new();
    for mesh in document.meshes() {
        let mut refs = Vec::new();
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                tracing::debug!(
                    "Skipping non-triangle primitive in mesh {:?}",
                    mesh.name().unwrap_or("")
                );
                continue;
            }
            let Some(data) = read_primitive(&primitive, buffers) else {
                continue;
            };
            let material = match primitive.material().index() {
                Some(i) if i < materials.len() => i,
                _ => *default_material.get_or_insert_with(|| {
                    materials.push(MaterialData::default());
                    materials.len() - 1
                }),
            };
            refs.push(PrimitiveRef {
                mesh: meshes.len(),
                material,
            });
            meshes.push(data);
        }
        mesh_primitives.push(refs);
    }

    if meshes.is_empty() {
        return Err(AssetError::Empty);
    }

    let nodes: Vec<ModelNode> = document
        .nodes()
        .map(|node| {
            let (t, r, s) = node.transform().decomposed();
            ModelNode {
                name: node.name().map(str::to_string),
                transform: NodeTransform {
                    translation: Vec3::from(t),
                    rotation: Quat::from_array(r),
                    scale: Vec3::from(s),
                },
                children: node.children().map(|c| c.index()).collect(),
                primitives: node
                    .mesh()
                    .and_then(|m| mesh_primitives.get(m.index()).cloned())
                    .unwrap_or_default(),
            }
        })
        .collect();

    let roots = scene_roots(document, &nodes);
    let clips = document
        .animations()
        .map(|anim| read_clip(&anim, buffers))
        .collect();

    Ok(ModelAsset {
        nodes,
        roots,
        meshes,
        materials,
        clips,
    })
}

fn read_primitive(
    primitive: &gltf::Primitive<'_>,
    buffers: &[gltf::buffer::Data],
) -> Option<MeshData> {
    let reader = primitive.reader(|b| buffers.get(b.index()).map(|data| data.0.as_slice()));

    let positions: Vec<[f32; 3]> = reader.read_positions()?.collect();
    if positions.is_empty() {
        return None;
    }
    let normals: Option<Vec<[f32; 3]>> = reader.read_normals().map(|n| n.collect());
    let uvs: Option<Vec<[f32; 2]>> = reader.read_tex_coords(0).map(|t| t.into_f32().collect());
    let indices: Vec<u32> = reader
        .read_indices()
        .map(|i| i.into_u32().collect())
        .unwrap_or_else(|| (0..positions.len() as u32).collect());

    Some(MeshData::from_attributes(
        &positions,
        normals.as_deref(),
        uvs.as_deref(),
        indices,
    ))
}

fn load_materials(document: &gltf::Document, images: &[gltf::image::Data]) -> Vec<MaterialData> {
    document
        .materials()
        .map(|mat| {
            let pbr = mat.pbr_metallic_roughness();
            let base_color_texture = pbr
                .base_color_texture()
                .and_then(|info| images.get(info.texture().source().index()))
                .and_then(to_rgba8);
            MaterialData {
                name: mat.name().unwrap_or("").to_string(),
                base_color: pbr.base_color_factor(),
                base_color_texture,
                double_sided: mat.double_sided(),
            }
        })
        .collect()
}

fn to_rgba8(image: &gltf::image::Data) -> Option<TextureData> {
    use gltf::image::Format;

    let rgba = match image.format {
        Format::R8G8B8A8 => image.pixels.clone(),
        Format::R8G8B8 => image
            .pixels
            .chunks_exact(3)
            .flat_map(|c| [c[0], c[1], c[2], 255])
            .collect(),
        Format::R8G8 => image
            .pixels
            .chunks_exact(2)
            .flat_map(|c| [c[0], c[1], 0, 255])
            .collect(),
        Format::R8 => image.pixels.iter().flat_map(|&v| [v, v, v, 255]).collect(),
        other => {
            tracing::warn!("Unsupported texture format {other:?}, using base color only");
            return None;
        }
    };
    Some(TextureData {
        width: image.width,
        height: image.height,
        rgba,
    })
}

fn scene_roots(document: &gltf::Document, nodes: &[ModelNode]) -> Vec<usize> {
    if let Some(scene) = document.default_scene().or_else(|| document.scenes().next()) {
        return scene.nodes().map(|n| n.index()).collect();
    }
    // No scene declared: every node that is nobody's child
    let mut is_child = vec![false; nodes.len()];
    for node in nodes {
        for &c in &node.children {
            if let Some(flag) = is_child.get_mut(c) {
                *flag = true;
            }
        }
    }
    (0..nodes.len()).filter(|&i| !is_child[i]).collect()
}

fn read_clip(anim: &gltf::Animation<'_>, buffers: &[gltf::buffer::Data]) -> AnimationClip {
    let mut channels = Vec::new();

    for channel in anim.channels() {
        let reader = channel.reader(|b| buffers.get(b.index()).map(|data| data.0.as_slice()));
        let Some(times) = reader.read_inputs().map(|i| i.collect::<Vec<f32>>()) else {
            continue;
        };
        let interpolation = match channel.sampler().interpolation() {
            gltf::animation::Interpolation::Linear => Interpolation::Linear,
            gltf::animation::Interpolation::Step => Interpolation::Step,
            gltf::animation::Interpolation::CubicSpline => Interpolation::CubicSpline,
        };
        let values = match reader.read_outputs() {
            Some(ReadOutputs::Translations(v)) => {
                ChannelValues::Translations(keyframe_values(v.map(Vec3::from), interpolation))
            }
            Some(ReadOutputs::Scales(v)) => {
                ChannelValues::Scales(keyframe_values(v.map(Vec3::from), interpolation))
            }
            Some(ReadOutputs::Rotations(v)) => ChannelValues::Rotations(keyframe_values(
                v.into_f32().map(Quat::from_array),
                interpolation,
            )),
            // Morph target weights are not animated
            Some(ReadOutputs::MorphTargetWeights(_)) | None => continue,
        };
        if values.len() != times.len() {
            tracing::warn!(
                "Animation channel has {} keys but {} values, skipping",
                times.len(),
                values.len()
            );
            continue;
        }
        channels.push(Channel {
            node: channel.target().node().index(),
            interpolation,
            times,
            values,
        });
    }

    AnimationClip::new(anim.name().map(str::to_string), channels)
}

/// Cubic-spline outputs are [in-tangent, value, out-tangent] per key; keep the value.
fn keyframe_values<T>(values: impl Iterator<Item = T>, interpolation: Interpolation) -> Vec<T> {
    if interpolation == Interpolation::CubicSpline {
        values.skip(1).step_by(3).collect()
    } else {
        values.collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_decode_triangle_glb() {
        let glb = fixtures::triangle_glb([3.0, 0.0, 0.0], false);
        let asset = decode(&glb).unwrap();
        assert_eq!(asset.meshes.len(), 1);
        assert_eq!(asset.meshes[0].vertex_count(), 3);
        assert_eq!(asset.meshes[0].indices, vec![0, 1, 2]);
        assert_eq!(asset.roots, vec![0]);
        assert_eq!(asset.nodes[0].transform.translation, Vec3::new(3.0, 0.0, 0.0));
        // Primitive without material gets the default one
        assert_eq!(asset.materials.len(), 1);
        assert!(asset.clips.is_empty());
    }

    #[test]
    fn test_decode_animated_glb() {
        let glb = fixtures::triangle_glb([0.0, 0.0, 0.0], true);
        let asset = decode(&glb).unwrap();
        assert_eq!(asset.clips.len(), 1);
        let clip = &asset.clips[0];
        assert_eq!(clip.duration, 1.0);
        assert_eq!(clip.channels.len(), 1);
        assert_eq!(clip.channels[0].node, 0);
        assert!(matches!(clip.channels[0].values, ChannelValues::Translations(ref v) if v.len() == 2));
    }

    #[test]
    fn test_decode_garbage_fails() {
        let err = decode(b"definitely not a model").unwrap_err();
        assert!(matches!(err, AssetError::Gltf(_)));
    }

    #[test]
    fn test_cubic_spline_values_extracted() {
        let v = keyframe_values([1, 2, 3, 4, 5, 6].into_iter(), Interpolation::CubicSpline);
        assert_eq!(v, vec![2, 5]);
    }
}
