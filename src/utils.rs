use wgpu::util::DeviceExt;
use bytemuck::NoUninit;
use glam::Vec3;

use crate::model::Aabb;

#[repr(C)]
#[derive(Debug, Clone, Copy, NoUninit)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

/// CPU-side triangle list in mesh-local space.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn empty() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.indices.is_empty()
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.vertices.iter().map(|v| Vec3::from_array(v.pos)))
    }

    pub fn upload(&self, device: &wgpu::Device) -> MeshBuffer {

        let vertices = bytemuck::cast_slice(&self.vertices);
        let indices = bytemuck::cast_slice(&self.indices);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: vertices,
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: indices,
            usage: wgpu::BufferUsages::INDEX,
        });

        MeshBuffer {
            vertex_buffer,
            index_buffer,
            index_count: self.indices.len() as u32,
        }
    }
}

impl Mesh {
    /// Append an axis-aligned box with outward normals.
    pub fn push_box(&mut self, aabb: &Aabb, color: [f32; 4]) {
        let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
            // normal, u axis, v axis
            ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
            ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
            ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
            ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
            ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ];
        let (center, half) = (aabb.center(), aabb.size() * 0.5);

        for (normal, u, v) in faces {
            let (n, u, v) = (Vec3::from_array(normal), Vec3::from_array(u), Vec3::from_array(v));
            let base = self.vertices.len() as u32;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let pos = center + (n + u * su + v * sv) * half;
                self.vertices.push(Vertex { pos: pos.to_array(), normal, color });
            }
            self.indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_mesh_is_unit_sized() {
        let mut mesh = Mesh::empty();
        mesh.push_box(&Aabb::from_center_and_size(Vec3::ZERO, Vec3::ONE), [1.0; 4]);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        let b = mesh.bounds();
        assert_eq!(b.min, Vec3::splat(-0.5));
        assert_eq!(b.max, Vec3::splat(0.5));
    }

    #[test]
    fn pushed_boxes_follow_their_aabb() {
        let mut mesh = Mesh::empty();
        let a = Aabb::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(2.0, 5.0, 4.0));
        mesh.push_box(&a, [1.0; 4]);
        mesh.push_box(&Aabb::from_center_and_size(Vec3::ZERO, Vec3::ONE), [1.0; 4]);
        assert_eq!(mesh.vertices.len(), 48);
        assert_eq!(mesh.indices[36], 24);
        let b = Mesh { vertices: mesh.vertices[..24].to_vec(), indices: Vec::new() }.bounds();
        assert_eq!(b, a);
    }

    #[test]
    fn empty_mesh_has_empty_bounds() {
        assert!(Mesh::empty().bounds().is_empty());
    }
}
