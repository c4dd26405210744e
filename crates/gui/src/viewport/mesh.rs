use glam::{Mat4, Vec3};

/// Floats per vertex: position(3) + normal(3) + uv(2)
pub const VERTEX_STRIDE: usize = 8;

/// CPU-side mesh data: interleaved [pos.x, pos.y, pos.z, norm.x, norm.y, norm.z, u, v]
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Build interleaved mesh data from separate attribute streams.
    /// Missing normals are computed from triangle faces.
    pub fn from_attributes(
        positions: &[[f32; 3]],
        normals: Option<&[[f32; 3]]>,
        uvs: Option<&[[f32; 2]]>,
        indices: Vec<u32>,
    ) -> Self {
        let computed;
        let normals = match normals {
            Some(n) if n.len() == positions.len() => n,
            _ => {
                computed = face_normals(positions, &indices);
                &computed[..]
            }
        };

        let mut vertices = Vec::with_capacity(positions.len() * VERTEX_STRIDE);
        for (i, p) in positions.iter().enumerate() {
            let n = normals[i];
            let uv = uvs.and_then(|u| u.get(i)).copied().unwrap_or([0.0, 0.0]);
            vertices.extend_from_slice(&[p[0], p[1], p[2], n[0], n[1], n[2], uv[0], uv[1]]);
        }

        Self { vertices, indices }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / VERTEX_STRIDE
    }

    pub fn position(&self, i: usize) -> Vec3 {
        let base = i * VERTEX_STRIDE;
        Vec3::new(self.vertices[base], self.vertices[base + 1], self.vertices[base + 2])
    }

    /// Local-space bounding box
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points((0..self.vertex_count()).map(|i| self.position(i)))
    }
}

fn face_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut acc = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let pa = Vec3::from(positions[a]);
        let n = (Vec3::from(positions[b]) - pa).cross(Vec3::from(positions[c]) - pa);
        acc[a] += n;
        acc[b] += n;
        acc[c] += n;
    }
    acc.into_iter()
        .map(|n| {
            let n = n.normalize_or_zero();
            if n == Vec3::ZERO { [0.0, 1.0, 0.0] } else { n.to_array() }
        })
        .collect()
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// An empty box; unions with it return the other operand
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::MAX),
        max: Vec3::splat(f32::MIN),
    };

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        points.into_iter().fold(Self::EMPTY, |acc, p| Self {
            min: acc.min.min(p),
            max: acc.max.max(p),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Box enclosing all eight corners after transformation
    pub fn transformed(&self, m: &Mat4) -> Aabb {
        if self.is_empty() {
            return *self;
        }
        let (lo, hi) = (self.min, self.max);
        Aabb::from_points((0..8).map(|i| {
            let corner = Vec3::new(
                if i & 1 == 0 { lo.x } else { hi.x },
                if i & 2 == 0 { lo.y } else { hi.y },
                if i & 4 == 0 { lo.z } else { hi.z },
            );
            m.transform_point3(corner)
        }))
    }

    /// Center of the bounding box
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}
