use crate::math::{Mat4, ortho};

/// Projection from device pixels (origin top-left, y down) to clip space.
///
/// Vertices are emitted already transformed by the viewport, so the
/// uniform only has to know the backing-store size.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Uniforms {
    transform: [[f32; 4]; 4],
}

impl Uniforms {
    pub fn new() -> Self {
        Self {
            transform: Mat4::identity().into(),
        }
    }

    pub fn update_projection(&mut self, backing_size: (u32, u32)) {
        let width = backing_size.0.max(1) as f32;
        let height = backing_size.1.max(1) as f32;
        self.transform = ortho(0.0, width, height, 0.0, -1.0, 1.0).into();
    }
}

impl Default for Uniforms {
    fn default() -> Self {
        Self::new()
    }
}
