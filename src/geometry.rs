use glam::Vec3;
use serde::Serialize;

/// Interleaved vertex layout shared by every pipeline.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Triangle-list mesh produced on the CPU and uploaded wholesale.
/// Structural parameter changes regenerate a fresh mesh; meshes are never
/// patched in place.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Shape parameters for the supported primitives. Segment counts are
/// clamped to the minimum the tessellation needs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum GeometryParams {
    Box {
        width: f32,
        height: f32,
        depth: f32,
    },
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
    Plane {
        width: f32,
        height: f32,
        width_segments: u32,
        height_segments: u32,
    },
    Torus {
        radius: f32,
        tube: f32,
        radial_segments: u32,
        tubular_segments: u32,
        /// Central angle of the sweep, radians. A full torus is TAU.
        arc: f32,
    },
}

impl GeometryParams {
    pub fn generate(&self) -> MeshData {
        match *self {
            GeometryParams::Box {
                width,
                height,
                depth,
            } => generate_box(width, height, depth),
            GeometryParams::Sphere {
                radius,
                width_segments,
                height_segments,
            } => generate_sphere(radius, width_segments.max(3), height_segments.max(2)),
            GeometryParams::Plane {
                width,
                height,
                width_segments,
                height_segments,
            } => generate_plane(width, height, width_segments.max(1), height_segments.max(1)),
            GeometryParams::Torus {
                radius,
                tube,
                radial_segments,
                tubular_segments,
                arc,
            } => generate_torus(
                radius,
                tube,
                radial_segments.max(2),
                tubular_segments.max(3),
                arc,
            ),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            GeometryParams::Box { .. } => "box",
            GeometryParams::Sphere { .. } => "sphere",
            GeometryParams::Plane { .. } => "plane",
            GeometryParams::Torus { .. } => "torus",
        }
    }
}

/// Axis-aligned box centered at the origin, four vertices per face so
/// normals stay hard.
fn generate_box(width: f32, height: f32, depth: f32) -> MeshData {
    let (hw, hh, hd) = (width * 0.5, height * 0.5, depth * 0.5);

    // (normal, tangent u, tangent v) per face
    let faces: [(Vec3, Vec3, Vec3); 6] = [
        (Vec3::X, -Vec3::Z, Vec3::Y),
        (-Vec3::X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, -Vec3::Z),
        (-Vec3::Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (-Vec3::Z, -Vec3::X, Vec3::Y),
    ];
    let half = Vec3::new(hw, hh, hd);

    let mut mesh = MeshData::default();
    for (normal, tu, tv) in faces {
        let base = mesh.vertices.len() as u32;
        for (su, sv, u, v) in [
            (-1.0, -1.0, 0.0, 1.0),
            (1.0, -1.0, 1.0, 1.0),
            (1.0, 1.0, 1.0, 0.0),
            (-1.0, 1.0, 0.0, 0.0),
        ] {
            let position = (normal + tu * su + tv * sv) * half;
            mesh.vertices.push(Vertex {
                position: position.to_array(),
                normal: normal.to_array(),
                uv: [u, v],
            });
        }
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    mesh
}

/// UV sphere. Pole rows collapse to single triangles so no degenerate
/// quads are emitted.
fn generate_sphere(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let mut mesh = MeshData::default();
    let (ws, hs) = (width_segments, height_segments);

    for iy in 0..=hs {
        let v = iy as f32 / hs as f32;
        let theta = v * std::f32::consts::PI;
        for ix in 0..=ws {
            let u = ix as f32 / ws as f32;
            let phi = u * std::f32::consts::TAU;
            let position = Vec3::new(
                -radius * phi.cos() * theta.sin(),
                radius * theta.cos(),
                radius * phi.sin() * theta.sin(),
            );
            mesh.vertices.push(Vertex {
                position: position.to_array(),
                normal: (position / radius.max(f32::EPSILON)).to_array(),
                uv: [u, 1.0 - v],
            });
        }
    }

    let stride = ws + 1;
    for iy in 0..hs {
        for ix in 0..ws {
            let a = iy * stride + ix + 1;
            let b = iy * stride + ix;
            let c = (iy + 1) * stride + ix;
            let d = (iy + 1) * stride + ix + 1;
            if iy != 0 {
                mesh.indices.extend_from_slice(&[a, b, d]);
            }
            if iy != hs - 1 {
                mesh.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }
    mesh
}

/// Subdivided plane in the XY plane facing +Z.
fn generate_plane(width: f32, height: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let mut mesh = MeshData::default();
    let (ws, hs) = (width_segments, height_segments);

    for iy in 0..=hs {
        let v = iy as f32 / hs as f32;
        let y = height * (0.5 - v);
        for ix in 0..=ws {
            let u = ix as f32 / ws as f32;
            let x = width * (u - 0.5);
            mesh.vertices.push(Vertex {
                position: [x, y, 0.0],
                normal: [0.0, 0.0, 1.0],
                uv: [u, 1.0 - v],
            });
        }
    }

    let stride = ws + 1;
    for iy in 0..hs {
        for ix in 0..ws {
            let a = iy * stride + ix;
            let b = (iy + 1) * stride + ix;
            let c = (iy + 1) * stride + ix + 1;
            let d = iy * stride + ix + 1;
            mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    mesh
}

/// Torus swept through `arc` radians around Z. Normals point away from the
/// tube's center ring.
fn generate_torus(
    radius: f32,
    tube: f32,
    radial_segments: u32,
    tubular_segments: u32,
    arc: f32,
) -> MeshData {
    let mut mesh = MeshData::default();
    let (rs, ts) = (radial_segments, tubular_segments);

    for j in 0..=rs {
        let v = j as f32 / rs as f32 * std::f32::consts::TAU;
        for i in 0..=ts {
            let u = i as f32 / ts as f32 * arc;
            let center = Vec3::new(radius * u.cos(), radius * u.sin(), 0.0);
            let position = Vec3::new(
                (radius + tube * v.cos()) * u.cos(),
                (radius + tube * v.cos()) * u.sin(),
                tube * v.sin(),
            );
            mesh.vertices.push(Vertex {
                position: position.to_array(),
                normal: (position - center).normalize_or_zero().to_array(),
                uv: [i as f32 / ts as f32, j as f32 / rs as f32],
            });
        }
    }

    let stride = ts + 1;
    for j in 0..rs {
        for i in 0..ts {
            let a = (j + 1) * stride + i;
            let b = j * stride + i;
            let c = j * stride + i + 1;
            let d = (j + 1) * stride + i + 1;
            mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_has_24_vertices_36_indices() {
        let mesh = GeometryParams::Box {
            width: 1.0,
            height: 1.0,
            depth: 1.0,
        }
        .generate();
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        assert_eq!(mesh.triangle_count(), 12);
    }

    #[test]
    fn box_vertices_on_surface() {
        let mesh = generate_box(2.0, 4.0, 6.0);
        for v in &mesh.vertices {
            assert!(v.position[0].abs() <= 1.0 + 1e-6);
            assert!(v.position[1].abs() <= 2.0 + 1e-6);
            assert!(v.position[2].abs() <= 3.0 + 1e-6);
        }
    }

    #[test]
    fn sphere_counts_match_segments() {
        let (ws, hs) = (32u32, 16u32);
        let mesh = generate_sphere(0.5, ws, hs);
        assert_eq!(mesh.vertices.len() as u32, (ws + 1) * (hs + 1));
        // One triangle per quad at the poles, two everywhere else.
        assert_eq!(mesh.indices.len() as u32, ws * (2 * hs - 2) * 3);
    }

    #[test]
    fn sphere_vertices_at_radius() {
        let mesh = generate_sphere(1.2, 8, 6);
        for v in &mesh.vertices {
            let r = Vec3::from_array(v.position).length();
            assert!((r - 1.2).abs() < 1e-5, "vertex radius {r}");
        }
    }

    #[test]
    fn sphere_normals_unit_and_radial() {
        let mesh = generate_sphere(2.0, 8, 6);
        for v in &mesh.vertices {
            let n = Vec3::from_array(v.normal);
            assert!((n.length() - 1.0).abs() < 1e-5);
            let radial = Vec3::from_array(v.position).normalize_or_zero();
            assert!(n.dot(radial) > 0.999);
        }
    }

    #[test]
    fn plane_counts_and_flat_normals() {
        let mesh = generate_plane(5.0, 5.0, 10, 7);
        assert_eq!(mesh.vertices.len(), 11 * 8);
        assert_eq!(mesh.indices.len(), 10 * 7 * 6);
        for v in &mesh.vertices {
            assert_eq!(v.normal, [0.0, 0.0, 1.0]);
            assert_eq!(v.position[2], 0.0);
        }
    }

    #[test]
    fn torus_counts_match_segments() {
        let (rs, ts) = (16u32, 32u32);
        let mesh = generate_torus(0.45, 0.24, rs, ts, std::f32::consts::TAU);
        assert_eq!(mesh.vertices.len() as u32, (rs + 1) * (ts + 1));
        assert_eq!(mesh.indices.len() as u32, rs * ts * 6);
    }

    #[test]
    fn torus_vertices_at_tube_distance() {
        let (radius, tube) = (0.45, 0.24);
        let mesh = generate_torus(radius, tube, 8, 12, std::f32::consts::TAU);
        for v in &mesh.vertices {
            let p = Vec3::from_array(v.position);
            let ring = Vec3::new(p.x, p.y, 0.0).normalize_or_zero() * radius;
            let d = (p - ring).length();
            assert!((d - tube).abs() < 1e-5, "tube distance {d}");
        }
    }

    #[test]
    fn partial_torus_arc_respected() {
        // Arc of 6.9 rad like the mesh-standard demo default.
        let mesh = generate_torus(0.45, 0.24, 4, 16, 6.9);
        assert!(!mesh.vertices.is_empty());
        assert_eq!(mesh.indices.len(), 4 * 16 * 6);
    }

    #[test]
    fn segment_minimums_clamped() {
        let mesh = GeometryParams::Sphere {
            radius: 1.0,
            width_segments: 0,
            height_segments: 0,
        }
        .generate();
        // Clamped to 3x2.
        assert_eq!(mesh.vertices.len(), 4 * 3);
    }

    #[test]
    fn regeneration_is_deterministic() {
        let params = GeometryParams::Torus {
            radius: 0.45,
            tube: 0.24,
            radial_segments: 16,
            tubular_segments: 32,
            arc: 6.9,
        };
        let a = params.generate();
        let b = params.generate();
        assert_eq!(a.vertices, b.vertices);
        assert_eq!(a.indices, b.indices);
    }
}
