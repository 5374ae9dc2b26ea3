//! WebGPU rendering module
//!
//! The frame view is tessellated into colored triangles on the CPU
//! (`shapes`) and drawn by a single alpha-blended pipeline (`pipeline`).

pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use shapes::Rgb;
pub use vertex::Vertex;
