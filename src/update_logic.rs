use wgpu::util::DeviceExt;

use crate::app_state::State;
use crate::color::Rgb;
use crate::drawing::FontDescriptor;
use crate::math::Vec2;
use crate::render::{self, Painter, TextBaseline};

const ZOOM_LABEL_PX: f32 = 14.0;

impl State {
    /// Rebuilds all frame geometry from the scene.
    pub fn update(&mut self) {
        let dpr = self.scene.viewport.device_pixel_ratio();
        self.frame.set_device_pixel_ratio(dpr);
        render::redraw(&self.scene, &self.outliner, self.background, &mut self.frame);
        self.add_zoom_label();

        upload(
            &self.gpu.device,
            &mut self.geometry,
            bytemuck::cast_slice(self.frame.vertices()),
            bytemuck::cast_slice(self.frame.indices()),
            self.frame.indices().len(),
            "Canvas",
        );

        let mesh = self.toolbar.build(self.scene.session.tool(), self.scene.session.color.color(), dpr);
        upload(
            &self.gpu.device,
            &mut self.ui_geo,
            bytemuck::cast_slice(&mesh.vertices),
            bytemuck::cast_slice(&mesh.indices),
            mesh.indices.len(),
            "UI",
        );

        self.text_renderer
            .prepare(&self.gpu.device, &self.gpu.queue, self.frame.text_runs());

        self.canvas.uniform.update_projection(self.scene.viewport.backing_size());
        self.gpu.queue.write_buffer(
            &self.canvas.uniform_buffer,
            0,
            bytemuck::cast_slice(&[self.canvas.uniform]),
        );
    }

    fn add_zoom_label(&mut self) {
        let label = format!("{}%", (self.scene.viewport.scale() * 100.0).round() as i32);
        let font = FontDescriptor {
            size_px: ZOOM_LABEL_PX,
            family: self.scene.defaults.font.family.clone(),
        };
        let position = Vec2::new(12.0, self.scene.viewport.size().y - 12.0 - ZOOM_LABEL_PX);
        let color = if self.background == Rgb::WHITE { Rgb::BLACK } else { Rgb::new(160, 160, 160) };
        self.frame.reset_transform();
        self.frame.fill_text(&label, position, &font, TextBaseline::Top, color);
    }
}

fn upload(
    device: &wgpu::Device,
    target: &mut crate::state::GeometryBuffers,
    vertices: &[u8],
    indices: &[u8],
    count: usize,
    label: &str,
) {
    if count == 0 {
        *target = Default::default();
        return;
    }
    target.vertex = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{label} Vertex Buffer")),
        contents: vertices,
        usage: wgpu::BufferUsages::VERTEX,
    }));
    target.index = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{label} Index Buffer")),
        contents: indices,
        usage: wgpu::BufferUsages::INDEX,
    }));
    target.count = count as u32;
}
