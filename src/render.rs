//! Full-buffer redraw onto an abstract drawing surface.

use crate::color::Rgb;
use crate::drawing::{ElementId, ElementKind, FontDescriptor, ShapeKind};
use crate::math::Vec2;
use crate::scene::Scene;
use crate::stroke::{StrokeOutliner, StrokePath, path_from_outline};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextBaseline {
    /// `position` is the top of the em box.
    Top,
    Alphabetic,
}

/// Immediate-mode 2D surface with a current transform.
pub trait Painter {
    /// Resets to the surface's base transform (device pixel ratio only).
    fn reset_transform(&mut self);
    fn clear(&mut self, color: Rgb);
    fn translate(&mut self, offset: Vec2);
    fn scale(&mut self, factor: f32);
    /// Fills `path` with the non-zero winding rule.
    fn fill_path(&mut self, path: &StrokePath, color: Rgb);
    fn fill_text(&mut self, text: &str, position: Vec2, font: &FontDescriptor, baseline: TextBaseline, color: Rgb);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SketchStyle {
    pub stroke: Rgb,
    pub stroke_width: f32,
    /// Keeps an element's wobble identical from frame to frame.
    pub seed: u64,
}

impl SketchStyle {
    pub fn for_element(id: ElementId, stroke: Rgb) -> Self {
        Self {
            stroke,
            stroke_width: 1.0,
            seed: (id.0 as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ 0x5EED,
        }
    }
}

/// Hand-drawn style shapes, drawn under the painter's current transform.
pub trait SketchRenderer {
    fn rectangle(&mut self, x: f32, y: f32, width: f32, height: f32, style: &SketchStyle);
    /// `(cx, cy)` is the centre; `width`/`height` the full diameters.
    fn ellipse(&mut self, cx: f32, cy: f32, width: f32, height: f32, style: &SketchStyle);
    fn line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, style: &SketchStyle);
}

/// Repaints the whole scene back to front.
pub fn redraw<S, O>(scene: &Scene, outliner: &O, background: Rgb, surface: &mut S)
where
    S: Painter + SketchRenderer,
    O: StrokeOutliner + ?Sized,
{
    surface.reset_transform();
    surface.clear(background);
    surface.translate(scene.viewport.offset);
    surface.scale(scene.viewport.scale());

    for element in scene.elements() {
        let color = element.style.stroke_color;
        match &element.kind {
            ElementKind::Freehand { points } => {
                let outline = outliner.outline(points.as_slice(), element.style.line_width);
                let path = path_from_outline(&outline, true);
                if !path.is_empty() {
                    surface.fill_path(&path, color);
                }
            }
            ElementKind::Shape { kind, bounds } => {
                let style = SketchStyle::for_element(element.id, color);
                let (a, e) = (bounds.anchor, bounds.extent);
                match kind {
                    ShapeKind::Rectangle => surface.rectangle(a.x, a.y, e.x, e.y, &style),
                    ShapeKind::Ellipse => surface.ellipse(a.x, a.y, e.x, e.y, &style),
                    ShapeKind::Line => surface.line(a.x, a.y, e.x, e.y, &style),
                }
            }
            ElementKind::Text { font, position, content } => {
                surface.fill_text(content, *position, font, TextBaseline::Top, color);
            }
        }
    }
}
