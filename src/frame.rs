//! CPU side of a frame: turns painter calls into vertex data and an ordered
//! list of GPU draw operations.

use std::ops::Range;

use crate::color::Rgb;
use crate::drawing::FontDescriptor;
use crate::math::{Mat4, Vec2};
use crate::render::{Painter, SketchRenderer, SketchStyle, TextBaseline};
use crate::rough::RoughGenerator;
use crate::stroke::StrokePath;
use crate::vertex::Vertex;

/// Maximum deviation of flattened curves from the true path, in device pixels.
const FLATTEN_TOLERANCE: f32 = 0.25;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Plain alpha-blended triangles.
    Mesh { indices: Range<u32> },
    /// Non-zero fill: the fan is written to the stencil buffer, then the
    /// cover quad is drawn where the stencil is non-zero (and resets it).
    StencilFill { fan: Range<u32>, cover: Range<u32> },
    Text { run: usize },
}

/// A line of text, already positioned in device pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub origin: Vec2,
    pub size_px: f32,
    pub family: String,
    pub baseline: TextBaseline,
    pub color: [f32; 4],
}

#[derive(Debug)]
pub struct FrameBuilder {
    device_pixel_ratio: f32,
    transform: Mat4,
    clear_color: Rgb,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    ops: Vec<DrawOp>,
    text_runs: Vec<TextRun>,
}

impl FrameBuilder {
    pub fn new(device_pixel_ratio: f32) -> Self {
        Self {
            device_pixel_ratio,
            transform: Mat4::from_scale(device_pixel_ratio),
            clear_color: Rgb::BLACK,
            vertices: Vec::new(),
            indices: Vec::new(),
            ops: Vec::new(),
            text_runs: Vec::new(),
        }
    }

    pub fn set_device_pixel_ratio(&mut self, ratio: f32) {
        self.device_pixel_ratio = ratio;
    }

    pub fn clear_color(&self) -> Rgb {
        self.clear_color
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn text_runs(&self) -> &[TextRun] {
        &self.text_runs
    }

    fn reset_buffers(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.ops.clear();
        self.text_runs.clear();
    }

    fn push_quad(&mut self, corners: [Vec2; 4], color: [f32; 4]) {
        let base = self.vertices.len() as u32;
        self.vertices.extend(corners.iter().map(|p| Vertex {
            position: p.to_array(),
            color,
        }));
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    /// Records a mesh op for indices pushed since `start`, merging with the
    /// previous op when that was also a mesh.
    fn push_mesh(&mut self, start: u32) {
        let end = self.indices.len() as u32;
        if start == end {
            return;
        }
        if let Some(DrawOp::Mesh { indices }) = self.ops.last_mut() {
            if indices.end == start {
                indices.end = end;
                return;
            }
        }
        self.ops.push(DrawOp::Mesh { indices: start..end });
    }

    /// Thick polyline in device space. Segments are extended by half the
    /// width at both ends so joins do not show gaps.
    fn push_polyline(&mut self, points: &[Vec2], width: f32, color: [f32; 4]) {
        let half = width * 0.5;
        for pair in points.windows(2) {
            let dir = (pair[1] - pair[0]).normalize_or_zero();
            if dir == Vec2::ZERO {
                continue;
            }
            let normal = dir.perp() * half;
            let a = pair[0] - dir * half;
            let b = pair[1] + dir * half;
            self.push_quad([a - normal, a + normal, b + normal, b - normal], color);
        }
    }

    fn push_strokes(&mut self, strokes: Vec<Vec<Vec2>>, style: &SketchStyle) {
        let width = (style.stroke_width * self.transform.scale_factor()).max(1.0);
        let color = style.stroke.to_linear_rgba();
        let start = self.indices.len() as u32;
        for stroke in strokes {
            let device: Vec<Vec2> = stroke.into_iter().map(|p| self.transform.transform_point(p)).collect();
            self.push_polyline(&device, width, color);
        }
        self.push_mesh(start);
    }
}

impl Painter for FrameBuilder {
    fn reset_transform(&mut self) {
        self.transform = Mat4::from_scale(self.device_pixel_ratio);
    }

    fn clear(&mut self, color: Rgb) {
        self.reset_buffers();
        self.clear_color = color;
    }

    fn translate(&mut self, offset: Vec2) {
        self.transform = self.transform * Mat4::from_translation(offset);
    }

    fn scale(&mut self, factor: f32) {
        self.transform = self.transform * Mat4::from_scale(factor);
    }

    fn fill_path(&mut self, path: &StrokePath, color: Rgb) {
        let scale = self.transform.scale_factor();
        if scale <= 0.0 {
            return;
        }
        let polygon: Vec<Vec2> = path
            .flatten(FLATTEN_TOLERANCE / scale)
            .into_iter()
            .map(|p| self.transform.transform_point(p))
            .collect();
        if polygon.len() < 3 {
            return;
        }

        let rgba = color.to_linear_rgba();
        let base = self.vertices.len() as u32;
        let fan_start = self.indices.len() as u32;
        let (mut min, mut max) = (polygon[0], polygon[0]);
        for p in &polygon {
            min = min.min(*p);
            max = max.max(*p);
            self.vertices.push(Vertex {
                position: p.to_array(),
                color: rgba,
            });
        }
        for i in 1..polygon.len() as u32 - 1 {
            self.indices.extend_from_slice(&[base, base + i, base + i + 1]);
        }
        let fan_end = self.indices.len() as u32;

        self.push_quad([min, Vec2::new(max.x, min.y), max, Vec2::new(min.x, max.y)], rgba);
        let cover_end = self.indices.len() as u32;

        self.ops.push(DrawOp::StencilFill {
            fan: fan_start..fan_end,
            cover: fan_end..cover_end,
        });
    }

    fn fill_text(&mut self, text: &str, position: Vec2, font: &FontDescriptor, baseline: TextBaseline, color: Rgb) {
        if text.is_empty() {
            return;
        }
        self.text_runs.push(TextRun {
            text: text.to_owned(),
            origin: self.transform.transform_point(position),
            size_px: font.size_px * self.transform.scale_factor(),
            family: font.family.clone(),
            baseline,
            color: color.to_linear_rgba(),
        });
        self.ops.push(DrawOp::Text {
            run: self.text_runs.len() - 1,
        });
    }
}

impl SketchRenderer for FrameBuilder {
    fn rectangle(&mut self, x: f32, y: f32, width: f32, height: f32, style: &SketchStyle) {
        if width == 0.0 && height == 0.0 {
            return;
        }
        let origin = Vec2::new(x + width.min(0.0), y + height.min(0.0));
        let size = Vec2::new(width, height).abs();
        let strokes = RoughGenerator::new(style.seed).rectangle(origin, size);
        self.push_strokes(strokes, style);
    }

    fn ellipse(&mut self, cx: f32, cy: f32, width: f32, height: f32, style: &SketchStyle) {
        if width == 0.0 && height == 0.0 {
            return;
        }
        let strokes = RoughGenerator::new(style.seed).ellipse(Vec2::new(cx, cy), width.abs(), height.abs());
        self.push_strokes(strokes, style);
    }

    fn line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, style: &SketchStyle) {
        let (start, end) = (Vec2::new(x0, y0), Vec2::new(x1, y1));
        if start == end {
            return;
        }
        let strokes = RoughGenerator::new(style.seed).line(start, end);
        self.push_strokes(strokes, style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawing::ElementId;
    use crate::stroke::path_from_outline;

    fn style() -> SketchStyle {
        SketchStyle::for_element(ElementId(0), Rgb::WHITE)
    }

    fn square_path() -> StrokePath {
        path_from_outline(
            &[
                Vec2::new(0.0, 0.0),
                Vec2::new(10.0, 0.0),
                Vec2::new(10.0, 10.0),
                Vec2::new(0.0, 10.0),
                Vec2::new(0.0, 0.0),
            ],
            true,
        )
    }

    #[test]
    fn ops_keep_painter_order() {
        let mut frame = FrameBuilder::new(1.0);
        frame.reset_transform();
        frame.clear(Rgb::BLACK);
        frame.rectangle(0.0, 0.0, 10.0, 10.0, &style());
        frame.fill_path(&square_path(), Rgb::WHITE);
        frame.fill_text("a", Vec2::ZERO, &FontDescriptor::default(), TextBaseline::Top, Rgb::WHITE);
        frame.line(0.0, 0.0, 5.0, 5.0, &style());

        let kinds: Vec<_> = frame
            .ops()
            .iter()
            .map(|op| match op {
                DrawOp::Mesh { .. } => "mesh",
                DrawOp::StencilFill { .. } => "fill",
                DrawOp::Text { .. } => "text",
            })
            .collect();
        assert_eq!(kinds, ["mesh", "fill", "text", "mesh"]);
    }

    #[test]
    fn adjacent_meshes_are_merged() {
        let mut frame = FrameBuilder::new(1.0);
        frame.rectangle(0.0, 0.0, 10.0, 10.0, &style());
        frame.ellipse(0.0, 0.0, 10.0, 10.0, &style());
        assert_eq!(frame.ops().len(), 1);
        assert_eq!(frame.ops()[0], DrawOp::Mesh { indices: 0..frame.indices().len() as u32 });
    }

    #[test]
    fn degenerate_shapes_emit_nothing() {
        let mut frame = FrameBuilder::new(1.0);
        frame.rectangle(4.0, 4.0, 0.0, 0.0, &style());
        frame.ellipse(4.0, 4.0, 0.0, 0.0, &style());
        frame.line(4.0, 4.0, 4.0, 4.0, &style());
        frame.fill_path(&StrokePath::default(), Rgb::WHITE);
        frame.fill_text("", Vec2::ZERO, &FontDescriptor::default(), TextBaseline::Top, Rgb::WHITE);
        assert!(frame.ops().is_empty());
        assert!(frame.vertices().is_empty());
    }

    #[test]
    fn negative_rectangles_match_their_mirror() {
        let mut a = FrameBuilder::new(1.0);
        a.rectangle(50.0, 30.0, -40.0, -20.0, &style());
        let mut b = FrameBuilder::new(1.0);
        b.rectangle(10.0, 10.0, 40.0, 20.0, &style());
        assert_eq!(a.vertices(), b.vertices());
    }

    #[test]
    fn transform_reaches_device_pixels() {
        let mut frame = FrameBuilder::new(2.0);
        frame.reset_transform();
        frame.translate(Vec2::new(10.0, 0.0));
        frame.scale(3.0);
        frame.fill_text("x", Vec2::new(1.0, 1.0), &FontDescriptor::default(), TextBaseline::Top, Rgb::WHITE);
        let run = &frame.text_runs()[0];
        assert_eq!(run.origin, Vec2::new(26.0, 6.0));
        assert_eq!(run.size_px, 300.0);
    }

    #[test]
    fn fill_path_builds_fan_and_cover() {
        let mut frame = FrameBuilder::new(1.0);
        frame.fill_path(&square_path(), Rgb::WHITE);
        let DrawOp::StencilFill { fan, cover } = frame.ops()[0].clone() else {
            panic!("expected a stencil fill");
        };
        assert_eq!(fan.len() % 3, 0);
        assert_eq!(cover.len(), 6);
        assert_eq!(fan.end, cover.start);

        let cover_vertices: Vec<_> = frame.indices()[cover.start as usize..cover.end as usize]
            .iter()
            .map(|&i| Vec2::from(frame.vertices()[i as usize].position))
            .collect();
        for v in cover_vertices {
            assert!(v.x >= -0.01 && v.x <= 10.01 && v.y >= -0.01 && v.y <= 10.01);
        }
    }

    #[test]
    fn clear_drops_previous_frame() {
        let mut frame = FrameBuilder::new(1.0);
        frame.line(0.0, 0.0, 5.0, 5.0, &style());
        frame.clear(Rgb::new(1, 2, 3));
        assert!(frame.ops().is_empty());
        assert_eq!(frame.clear_color(), Rgb::new(1, 2, 3));
    }
}
