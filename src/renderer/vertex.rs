//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// 2D vertex in container pixels with a straight-alpha color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Fixed colors; the liquid itself is derived from the user's color
pub mod colors {
    /// Surface highlight line
    pub const HIGHLIGHT: [f32; 4] = [1.0, 1.0, 1.0, 0.42];
    /// Soft glow under the surface
    pub const GLOW: [f32; 4] = [1.0, 1.0, 1.0, 0.75 * 0.16];
    /// Specular dot on droplets
    pub const DROPLET_HIGHLIGHT: [f32; 4] = [1.0, 1.0, 1.0, 0.85 * 0.5];
    /// Canvas clear color (the page shows through)
    pub const CLEAR: [f32; 4] = [0.0, 0.0, 0.0, 0.0];
}
