//! Procedural primitive geometry.
//!
//! Vertex layout, winding and uv orientation follow the conventions of common
//! scene-graph libraries so textures authored for them line up. Texture
//! coordinates are flipped vertically on output since wgpu samples with the
//! origin in the top-left corner.

use std::{collections::HashSet, f32::consts::PI};

use cgmath::{InnerSpace, Vector2, Vector3, Zero};

use crate::data_structures::model::ModelVertex;

/// Shape and subdivision of a primitive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Geometry {
    Plane {
        width: f32,
        height: f32,
        width_segments: u32,
        height_segments: u32,
    },
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
    Torus {
        radius: f32,
        tube: f32,
        radial_segments: u32,
        tubular_segments: u32,
    },
}

/// CPU side vertex and index data ready to be uploaded.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
}

impl Geometry {
    pub fn name(&self) -> &'static str {
        match self {
            Geometry::Plane { .. } => "plane",
            Geometry::Sphere { .. } => "sphere",
            Geometry::Torus { .. } => "torus",
        }
    }

    /// Same shape with every subdivision count replaced by `segments`.
    pub fn with_segments(self, segments: u32) -> Self {
        let segments = segments.max(1);
        match self {
            Geometry::Plane { width, height, .. } => Geometry::Plane {
                width,
                height,
                width_segments: segments,
                height_segments: segments,
            },
            Geometry::Sphere { radius, .. } => Geometry::Sphere {
                radius,
                width_segments: segments.max(3),
                height_segments: segments.max(2),
            },
            Geometry::Torus { radius, tube, .. } => Geometry::Torus {
                radius,
                tube,
                radial_segments: segments.max(3),
                tubular_segments: segments.max(3),
            },
        }
    }

    pub fn build(&self) -> MeshData {
        let mut data = match *self {
            Geometry::Plane {
                width,
                height,
                width_segments,
                height_segments,
            } => plane(width, height, width_segments.max(1), height_segments.max(1)),
            Geometry::Sphere {
                radius,
                width_segments,
                height_segments,
            } => sphere(radius, width_segments.max(3), height_segments.max(2)),
            Geometry::Torus {
                radius,
                tube,
                radial_segments,
                tubular_segments,
            } => torus(radius, tube, radial_segments.max(3), tubular_segments.max(3)),
        };
        compute_tangents(&mut data.vertices, &data.indices);
        data
    }
}

impl MeshData {
    /// Unique triangle edges as a line list.
    pub fn wire_indices(&self) -> Vec<u32> {
        let mut seen = HashSet::new();
        let mut lines = Vec::new();
        for tri in self.indices.chunks(3) {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                if seen.insert((a.min(b), a.max(b))) {
                    lines.push(a);
                    lines.push(b);
                }
            }
        }
        lines
    }
}

fn vertex(position: Vector3<f32>, normal: Vector3<f32>, u: f32, v: f32) -> ModelVertex {
    ModelVertex {
        position: position.into(),
        tex_coords: [u, 1.0 - v],
        normal: normal.into(),
        tangent: [0.0; 3],
        bitangent: [0.0; 3],
    }
}

fn plane(width: f32, height: f32, grid_x: u32, grid_y: u32) -> MeshData {
    let width_half = width / 2.0;
    let height_half = height / 2.0;
    let segment_width = width / grid_x as f32;
    let segment_height = height / grid_y as f32;
    let normal = Vector3::new(0.0, 0.0, 1.0);

    let mut vertices = Vec::with_capacity(((grid_x + 1) * (grid_y + 1)) as usize);
    for iy in 0..=grid_y {
        let y = iy as f32 * segment_height - height_half;
        for ix in 0..=grid_x {
            let x = ix as f32 * segment_width - width_half;
            vertices.push(vertex(
                Vector3::new(x, -y, 0.0),
                normal,
                ix as f32 / grid_x as f32,
                1.0 - iy as f32 / grid_y as f32,
            ));
        }
    }

    let row = grid_x + 1;
    let mut indices = Vec::with_capacity((grid_x * grid_y * 6) as usize);
    for iy in 0..grid_y {
        for ix in 0..grid_x {
            let a = ix + row * iy;
            let b = ix + row * (iy + 1);
            let c = (ix + 1) + row * (iy + 1);
            let d = (ix + 1) + row * iy;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    MeshData { vertices, indices }
}

fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let mut vertices = Vec::with_capacity(((width_segments + 1) * (height_segments + 1)) as usize);
    let mut grid = Vec::with_capacity(height_segments as usize + 1);
    let mut index = 0;

    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        // Pole vertices sit in the middle of their segment so the texture doesn't pinch sideways
        let u_offset = if iy == 0 {
            0.5 / width_segments as f32
        } else if iy == height_segments {
            -0.5 / width_segments as f32
        } else {
            0.0
        };
        let mut row = Vec::with_capacity(width_segments as usize + 1);
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let (phi, theta) = (u * 2.0 * PI, v * PI);
            let position = Vector3::new(
                -radius * phi.cos() * theta.sin(),
                radius * theta.cos(),
                radius * phi.sin() * theta.sin(),
            );
            vertices.push(vertex(position, position.normalize(), u + u_offset, 1.0 - v));
            row.push(index);
            index += 1;
        }
        grid.push(row);
    }

    let mut indices = Vec::new();
    for iy in 0..height_segments as usize {
        for ix in 0..width_segments as usize {
            let a = grid[iy][ix + 1];
            let b = grid[iy][ix];
            let c = grid[iy + 1][ix];
            let d = grid[iy + 1][ix + 1];
            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments as usize - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }
    MeshData { vertices, indices }
}

fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> MeshData {
    let mut vertices =
        Vec::with_capacity(((radial_segments + 1) * (tubular_segments + 1)) as usize);
    for j in 0..=radial_segments {
        for i in 0..=tubular_segments {
            let u = i as f32 / tubular_segments as f32 * 2.0 * PI;
            let v = j as f32 / radial_segments as f32 * 2.0 * PI;
            let position = Vector3::new(
                (radius + tube * v.cos()) * u.cos(),
                (radius + tube * v.cos()) * u.sin(),
                tube * v.sin(),
            );
            let center = Vector3::new(radius * u.cos(), radius * u.sin(), 0.0);
            vertices.push(vertex(
                position,
                (position - center).normalize(),
                i as f32 / tubular_segments as f32,
                j as f32 / radial_segments as f32,
            ));
        }
    }

    let row = tubular_segments + 1;
    let mut indices = Vec::with_capacity((radial_segments * tubular_segments * 6) as usize);
    for j in 1..=radial_segments {
        for i in 1..=tubular_segments {
            let a = row * j + i - 1;
            let b = row * (j - 1) + i - 1;
            let c = row * (j - 1) + i;
            let d = row * j + i;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    MeshData { vertices, indices }
}

/// Per-vertex tangent frames for normal mapping, averaged over adjacent triangles.
fn compute_tangents(vertices: &mut [ModelVertex], indices: &[u32]) {
    let mut tangents = vec![Vector3::<f32>::zero(); vertices.len()];
    let mut bitangents = vec![Vector3::<f32>::zero(); vertices.len()];

    for c in indices.chunks(3) {
        let (i0, i1, i2) = (c[0] as usize, c[1] as usize, c[2] as usize);
        let pos0: Vector3<f32> = vertices[i0].position.into();
        let pos1: Vector3<f32> = vertices[i1].position.into();
        let pos2: Vector3<f32> = vertices[i2].position.into();
        let uv0: Vector2<f32> = vertices[i0].tex_coords.into();
        let uv1: Vector2<f32> = vertices[i1].tex_coords.into();
        let uv2: Vector2<f32> = vertices[i2].tex_coords.into();

        let delta_pos1 = pos1 - pos0;
        let delta_pos2 = pos2 - pos0;
        let delta_uv1 = uv1 - uv0;
        let delta_uv2 = uv2 - uv0;

        let det = delta_uv1.x * delta_uv2.y - delta_uv1.y * delta_uv2.x;
        // Collapsed uvs (sphere poles) carry no orientation
        if det.abs() < f32::EPSILON {
            continue;
        }
        let r = 1.0 / det;
        let tangent = (delta_pos1 * delta_uv2.y - delta_pos2 * delta_uv1.y) * r;
        // Flipped for right-handed normal maps in wgpu's texture coordinate system
        let bitangent = (delta_pos2 * delta_uv1.x - delta_pos1 * delta_uv2.x) * -r;

        for i in [i0, i1, i2] {
            tangents[i] += tangent;
            bitangents[i] += bitangent;
        }
    }

    for (i, v) in vertices.iter_mut().enumerate() {
        let normal: Vector3<f32> = v.normal.into();
        let t = tangents[i] - normal * normal.dot(tangents[i]);
        let t = if t.magnitude2() > 1e-12 {
            t.normalize()
        } else {
            any_perpendicular(normal)
        };
        let b = normal.cross(t);
        let b = if b.dot(bitangents[i]) < 0.0 { -b } else { b };
        v.tangent = t.into();
        v.bitangent = b.into();
    }
}

fn any_perpendicular(n: Vector3<f32>) -> Vector3<f32> {
    let axis = if n.x.abs() < 0.9 {
        Vector3::unit_x()
    } else {
        Vector3::unit_y()
    };
    (axis - n * n.dot(axis)).normalize()
}
