//! Factory functions for creating test data.
//!
//! Provides small in-memory models and hand-assembled GLB files used by unit
//! tests, integration tests and the headless harness.

use glam::Vec3;

use crate::asset::model::{MaterialData, ModelAsset, ModelNode, NodeTransform, PrimitiveRef};
use crate::viewport::animation::{AnimationClip, Channel, ChannelValues, Interpolation};
use crate::viewport::mesh::MeshData;

// ── Meshes ──────────────────────────────────────────────────────

/// Axis-aligned cube of edge `size` centered on the local origin.
pub fn cube_mesh(size: f32) -> MeshData {
    let h = size * 0.5;
    let positions = [
        [-h, -h, -h],
        [h, -h, -h],
        [h, h, -h],
        [-h, h, -h],
        [-h, -h, h],
        [h, -h, h],
        [h, h, h],
        [-h, h, h],
    ];
    #[rustfmt::skip]
    let indices = vec![
        0, 2, 1, 0, 3, 2, // back
        4, 5, 6, 4, 6, 7, // front
        0, 1, 5, 0, 5, 4, // bottom
        3, 7, 6, 3, 6, 2, // top
        0, 4, 7, 0, 7, 3, // left
        1, 2, 6, 1, 6, 5, // right
    ];
    MeshData::from_attributes(&positions, None, None, indices)
}

// ── Assets ──────────────────────────────────────────────────────

/// Single-node asset: one cube of edge `size` whose node sits at `center`.
pub fn offset_cube_asset(center: Vec3, size: f32) -> ModelAsset {
    let mut node = ModelNode::new(NodeTransform {
        translation: center,
        ..NodeTransform::IDENTITY
    });
    node.name = Some("cube".into());
    node.primitives.push(PrimitiveRef { mesh: 0, material: 0 });

    ModelAsset {
        nodes: vec![node],
        roots: vec![0],
        meshes: vec![cube_mesh(size)],
        materials: vec![MaterialData {
            name: "bone".into(),
            ..MaterialData::default()
        }],
        clips: Vec::new(),
    }
}

/// Parent/child asset with three meshes and two materials; both children
/// share the second material. Total: 3 geometries, 2 materials.
pub fn multi_part_asset() -> ModelAsset {
    let mut root = ModelNode::new(NodeTransform::IDENTITY);
    root.name = Some("cranium".into());
    root.children = vec![1, 2];
    root.primitives.push(PrimitiveRef { mesh: 0, material: 0 });

    let mut left = ModelNode::new(NodeTransform {
        translation: Vec3::new(-2.0, 0.0, 0.0),
        ..NodeTransform::IDENTITY
    });
    left.primitives.push(PrimitiveRef { mesh: 1, material: 1 });

    let mut right = ModelNode::new(NodeTransform {
        translation: Vec3::new(2.0, 0.0, 0.0),
        ..NodeTransform::IDENTITY
    });
    right.primitives.push(PrimitiveRef { mesh: 2, material: 1 });

    ModelAsset {
        nodes: vec![root, left, right],
        roots: vec![0],
        meshes: vec![cube_mesh(2.0), cube_mesh(1.0), cube_mesh(1.0)],
        materials: vec![
            MaterialData {
                name: "bone".into(),
                ..MaterialData::default()
            },
            MaterialData {
                name: "suture".into(),
                base_color: [0.8, 0.7, 0.6, 1.0],
                ..MaterialData::default()
            },
        ],
        clips: Vec::new(),
    }
}

/// Translation clip moving node 0 from the origin to `(distance, 0, 0)` over `duration` seconds.
pub fn slide_clip(name: &str, duration: f32, distance: f32) -> AnimationClip {
    AnimationClip::new(
        Some(name.to_string()),
        vec![Channel {
            node: 0,
            interpolation: Interpolation::Linear,
            times: vec![0.0, duration],
            values: ChannelValues::Translations(vec![Vec3::ZERO, Vec3::new(distance, 0.0, 0.0)]),
        }],
    )
}

/// Cube asset carrying the given clips (node 0 is the animated target).
pub fn animated_cube_asset(clips: Vec<AnimationClip>) -> ModelAsset {
    ModelAsset {
        clips,
        ..offset_cube_asset(Vec3::ZERO, 1.0)
    }
}

// ── GLB ─────────────────────────────────────────────────────────

const GLB_MAGIC: u32 = 0x4654_6C67;
const CHUNK_JSON: u32 = 0x4E4F_534A;
const CHUNK_BIN: u32 = 0x004E_4942;

/// Minimal binary glTF: one triangle on node 0 at `translation`, no
/// material. With `animated`, adds a 1-second two-key translation clip.
pub fn triangle_glb(translation: [f32; 3], animated: bool) -> Vec<u8> {
    let mut bin: Vec<u8> = Vec::new();
    for p in [[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
        p.iter().for_each(|v| bin.extend_from_slice(&v.to_le_bytes()));
    }
    for i in [0u16, 1, 2] {
        bin.extend_from_slice(&i.to_le_bytes());
    }
    bin.extend_from_slice(&[0, 0]); // align to 4

    let mut accessors = vec![
        serde_json::json!({
            "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
            "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]
        }),
        serde_json::json!({ "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }),
    ];
    let mut views = vec![
        serde_json::json!({ "buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962 }),
        serde_json::json!({ "buffer": 0, "byteOffset": 36, "byteLength": 6, "target": 34963 }),
    ];

    if animated {
        for t in [0.0f32, 1.0] {
            bin.extend_from_slice(&t.to_le_bytes());
        }
        for v in [0.0f32, 0.0, 0.0, 0.0, 2.0, 0.0] {
            bin.extend_from_slice(&v.to_le_bytes());
        }
        views.push(serde_json::json!({ "buffer": 0, "byteOffset": 44, "byteLength": 8 }));
        views.push(serde_json::json!({ "buffer": 0, "byteOffset": 52, "byteLength": 24 }));
        accessors.push(serde_json::json!({
            "bufferView": 2, "componentType": 5126, "count": 2, "type": "SCALAR",
            "min": [0.0], "max": [1.0]
        }));
        accessors.push(serde_json::json!({ "bufferView": 3, "componentType": 5126, "count": 2, "type": "VEC3" }));
    }

    let mut doc = serde_json::json!({
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [{ "mesh": 0, "translation": translation }],
        "meshes": [{ "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1 }] }],
        "accessors": accessors,
        "bufferViews": views,
        "buffers": [{ "byteLength": bin.len() }],
    });
    if animated {
        doc["animations"] = serde_json::json!([{
            "channels": [{ "sampler": 0, "target": { "node": 0, "path": "translation" } }],
            "samplers": [{ "input": 2, "output": 3, "interpolation": "LINEAR" }]
        }]);
    }

    assemble_glb(doc.to_string().into_bytes(), bin)
}

fn assemble_glb(mut json: Vec<u8>, mut bin: Vec<u8>) -> Vec<u8> {
    while json.len() % 4 != 0 {
        json.push(b' ');
    }
    while bin.len() % 4 != 0 {
        bin.push(0);
    }
    let total = 12 + 8 + json.len() + 8 + bin.len();

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&GLB_MAGIC.to_le_bytes());
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend_from_slice(&(json.len() as u32).to_le_bytes());
    out.extend_from_slice(&CHUNK_JSON.to_le_bytes());
    out.extend_from_slice(&json);
    out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    out.extend_from_slice(&CHUNK_BIN.to_le_bytes());
    out.extend_from_slice(&bin);
    out
}
