//! Scene graph: static lights plus at most one attached model

use std::collections::BTreeSet;

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use super::mesh::Aabb;
use super::surface::{DrawItem, GeometryHandle, MaterialHandle};
use crate::asset::model::{self, NodeTransform};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Light {
    Ambient {
        color: [f32; 3],
        intensity: f32,
    },
    Directional {
        color: [f32; 3],
        intensity: f32,
        /// Light shines from this point toward the origin
        position: [f32; 3],
    },
}

/// White ambient 0.6 + white directional 0.8 from (5, 5, 5)
pub fn standard_lights() -> Vec<Light> {
    vec![
        Light::Ambient {
            color: [1.0, 1.0, 1.0],
            intensity: 0.6,
        },
        Light::Directional {
            color: [1.0, 1.0, 1.0],
            intensity: 0.8,
            position: [5.0, 5.0, 5.0],
        },
    ]
}

/// Full-strength ambient only
pub fn hero_lights() -> Vec<Light> {
    vec![Light::Ambient {
        color: [1.0, 1.0, 1.0],
        intensity: 1.0,
    }]
}

/// Wrapper transform placing the model's bounding-box center at the origin
/// after applying `scale`.
pub fn normalization(bounds: &Aabb, scale: f32, center: bool) -> NodeTransform {
    let translation = if center && !bounds.is_empty() {
        -bounds.center() * scale
    } else {
        Vec3::ZERO
    };
    NodeTransform {
        translation,
        scale: Vec3::splat(scale),
        ..NodeTransform::IDENTITY
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub children: Vec<usize>,
    pub parts: Vec<(GeometryHandle, MaterialHandle)>,
}

/// A model whose GPU resources have been uploaded to a surface
#[derive(Debug, Clone, PartialEq)]
pub struct AttachedModel {
    pub wrapper: NodeTransform,
    pub nodes: Vec<SceneNode>,
    pub roots: Vec<usize>,
    /// Current pose, indexed like `nodes`
    pub transforms: Vec<NodeTransform>,
}

impl AttachedModel {
    pub fn world_matrices(&self) -> Vec<Mat4> {
        model::world_matrices(
            &self.roots,
            |i| &self.nodes[i].children,
            self.wrapper.matrix(),
            &self.transforms,
        )
    }

    pub fn reachable_nodes(&self) -> Vec<bool> {
        model::reachable_nodes(&self.roots, |i| &self.nodes[i].children, self.nodes.len())
    }

    /// Every geometry and material reachable from the roots, each once
    pub fn reachable_resources(&self) -> (BTreeSet<GeometryHandle>, BTreeSet<MaterialHandle>) {
        let mut geometries = BTreeSet::new();
        let mut materials = BTreeSet::new();
        for (node, _) in self
            .nodes
            .iter()
            .zip(self.reachable_nodes())
            .filter(|(_, reached)| *reached)
        {
            for &(g, m) in &node.parts {
                geometries.insert(g);
                materials.insert(m);
            }
        }
        (geometries, materials)
    }
}

pub struct SceneGraph {
    lights: Vec<Light>,
    pub background: Option<[f32; 3]>,
    model: Option<AttachedModel>,
}

impl SceneGraph {
    pub fn new(lights: Vec<Light>, background: Option<[f32; 3]>) -> Self {
        Self {
            lights,
            background,
            model: None,
        }
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn model(&self) -> Option<&AttachedModel> {
        self.model.as_ref()
    }

    pub fn model_mut(&mut self) -> Option<&mut AttachedModel> {
        self.model.as_mut()
    }

    /// Attach a fully uploaded model, returning any model it replaced
    pub fn attach(&mut self, model: AttachedModel) -> Option<AttachedModel> {
        self.model.replace(model)
    }

    pub fn detach(&mut self) -> Option<AttachedModel> {
        self.model.take()
    }

    pub fn draw_list(&self) -> Vec<DrawItem> {
        let Some(model) = &self.model else {
            return Vec::new();
        };
        let worlds = model.world_matrices();
        model
            .nodes
            .iter()
            .zip(worlds)
            .zip(model.reachable_nodes())
            .filter(|(_, reached)| *reached)
            .flat_map(|((node, world), _)| {
                node.parts.iter().map(move |&(geometry, material)| DrawItem {
                    world,
                    geometry,
                    material,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization_centers_after_scale() {
        let bounds = Aabb {
            min: Vec3::new(8.0, -1.0, 2.0),
            max: Vec3::new(12.0, 3.0, 4.0),
        };
        let wrap = normalization(&bounds, 1.5, true);
        let centered = bounds.transformed(&wrap.matrix());
        assert!(centered.center().length() < 1e-5);
        assert!((centered.max.x - centered.min.x - 6.0).abs() < 1e-5);
    }

    #[test]
    fn test_normalization_without_centering() {
        let bounds = Aabb {
            min: Vec3::ONE,
            max: Vec3::splat(3.0),
        };
        let wrap = normalization(&bounds, 1.5, false);
        assert_eq!(wrap.translation, Vec3::ZERO);
        assert_eq!(wrap.scale, Vec3::splat(1.5));
    }

    #[test]
    fn test_reachable_resources_dedup_shared_material() {
        let model = AttachedModel {
            wrapper: NodeTransform::IDENTITY,
            nodes: vec![
                SceneNode {
                    children: vec![1],
                    parts: vec![(GeometryHandle(1), MaterialHandle(10))],
                },
                SceneNode {
                    children: vec![],
                    parts: vec![(GeometryHandle(2), MaterialHandle(10))],
                },
            ],
            roots: vec![0],
            transforms: vec![NodeTransform::IDENTITY; 2],
        };
        let (g, m) = model.reachable_resources();
        assert_eq!(g.len(), 2);
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn test_empty_scene_draws_nothing() {
        let scene = SceneGraph::new(standard_lights(), Some([1.0; 3]));
        assert!(scene.draw_list().is_empty());
        assert_eq!(scene.lights().len(), 2);
    }
}
