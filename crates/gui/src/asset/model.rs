//! CPU-side representation of a decoded 3D asset

use glam::{Mat4, Quat, Vec3};

use crate::viewport::animation::AnimationClip;
use crate::viewport::mesh::{Aabb, MeshData};

/// Translation / rotation / scale of a node relative to its parent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl NodeTransform {
    pub const IDENTITY: NodeTransform = NodeTransform {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// RGBA8 image used as a base color texture
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialData {
    pub name: String,
    /// Linear RGBA multiplier
    pub base_color: [f32; 4],
    pub base_color_texture: Option<TextureData>,
    pub double_sided: bool,
}

impl Default for MaterialData {
    fn default() -> Self {
        Self {
            name: String::new(),
            base_color: [1.0, 1.0, 1.0, 1.0],
            base_color_texture: None,
            double_sided: false,
        }
    }
}

/// One drawable piece of a node: a mesh paired with its material
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimitiveRef {
    pub mesh: usize,
    pub material: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelNode {
    pub name: Option<String>,
    pub transform: NodeTransform,
    pub children: Vec<usize>,
    pub primitives: Vec<PrimitiveRef>,
}

impl ModelNode {
    pub fn new(transform: NodeTransform) -> Self {
        Self {
            name: None,
            transform,
            children: Vec::new(),
            primitives: Vec::new(),
        }
    }
}

/// A decoded asset: node hierarchy, meshes, materials and animation clips
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelAsset {
    pub nodes: Vec<ModelNode>,
    pub roots: Vec<usize>,
    pub meshes: Vec<MeshData>,
    pub materials: Vec<MaterialData>,
    pub clips: Vec<AnimationClip>,
}

impl ModelAsset {
    /// Rest-pose transforms of every node
    pub fn rest_transforms(&self) -> Vec<NodeTransform> {
        self.nodes.iter().map(|n| n.transform).collect()
    }

    /// World matrices for each node given per-node transforms and a root matrix
    pub fn world_matrices(&self, root: Mat4, transforms: &[NodeTransform]) -> Vec<Mat4> {
        world_matrices(&self.roots, |i| &self.nodes[i].children, root, transforms)
    }

    /// Which nodes belong to the scene, i.e. are reachable from `roots`
    pub fn reachable_nodes(&self) -> Vec<bool> {
        reachable_nodes(&self.roots, |i| &self.nodes[i].children, self.nodes.len())
    }

    /// Bounding box of the scene's geometry in the rest pose
    pub fn bounds(&self) -> Aabb {
        let worlds = self.world_matrices(Mat4::IDENTITY, &self.rest_transforms());
        let reachable = self.reachable_nodes();
        let mut bounds = Aabb::EMPTY;
        for ((node, world), _) in self
            .nodes
            .iter()
            .zip(&worlds)
            .zip(&reachable)
            .filter(|(_, reached)| **reached)
        {
            for prim in &node.primitives {
                if let Some(mesh) = self.meshes.get(prim.mesh) {
                    bounds = bounds.union(&mesh.bounds().transformed(world));
                }
            }
        }
        bounds
    }

    pub fn primitive_count(&self) -> usize {
        self.nodes.iter().map(|n| n.primitives.len()).sum()
    }
}

/// Mark every node reachable from `roots` through `children`
pub(crate) fn reachable_nodes<'a>(
    roots: &[usize],
    children: impl Fn(usize) -> &'a Vec<usize>,
    len: usize,
) -> Vec<bool> {
    let mut visited = vec![false; len];
    let mut stack: Vec<usize> = roots.to_vec();
    while let Some(index) = stack.pop() {
        if index >= len || std::mem::replace(&mut visited[index], true) {
            continue;
        }
        stack.extend(children(index).iter().copied());
    }
    visited
}

/// Depth-first world matrix propagation shared by assets and attached models.
/// Nodes unreachable from `roots` keep the identity matrix.
pub(crate) fn world_matrices<'a>(
    roots: &[usize],
    children: impl Fn(usize) -> &'a Vec<usize>,
    root: Mat4,
    transforms: &[NodeTransform],
) -> Vec<Mat4> {
    let mut worlds = vec![Mat4::IDENTITY; transforms.len()];
    let mut visited = vec![false; transforms.len()];
    let mut stack: Vec<(usize, Mat4)> = roots.iter().rev().map(|&r| (r, root)).collect();

    while let Some((index, parent)) = stack.pop() {
        if index >= transforms.len() || visited[index] {
            continue;
        }
        visited[index] = true;
        let world = parent * transforms[index].matrix();
        worlds[index] = world;
        for &child in children(index).iter().rev() {
            stack.push((child, world));
        }
    }
    worlds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_bounds_follow_node_hierarchy() {
        let asset = fixtures::offset_cube_asset(Vec3::new(10.0, 0.0, 0.0), 2.0);
        let b = asset.bounds();
        assert!((b.center() - Vec3::new(10.0, 0.0, 0.0)).length() < 1e-5);
        assert!((b.max.x - b.min.x - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_child_inherits_parent_transform() {
        let mut asset = fixtures::offset_cube_asset(Vec3::ZERO, 1.0);
        let mut parent = ModelNode::new(NodeTransform {
            translation: Vec3::new(0.0, 5.0, 0.0),
            ..NodeTransform::IDENTITY
        });
        parent.children.push(0);
        asset.nodes.push(parent);
        asset.roots = vec![1];

        let worlds = asset.world_matrices(Mat4::IDENTITY, &asset.rest_transforms());
        let origin = worlds[0].transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(0.0, 5.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_bounds_ignore_nodes_outside_scene() {
        let mut asset = fixtures::offset_cube_asset(Vec3::new(10.0, 0.0, 0.0), 2.0);
        let mut stray = ModelNode::new(NodeTransform {
            translation: Vec3::new(-50.0, 0.0, 0.0),
            ..NodeTransform::IDENTITY
        });
        stray.primitives = asset.nodes[0].primitives.clone();
        asset.nodes.push(stray);

        assert_eq!(asset.reachable_nodes(), vec![true, false]);
        let b = asset.bounds();
        assert!((b.center() - Vec3::new(10.0, 0.0, 0.0)).length() < 1e-5);
    }
}
