use std::f32::consts::TAU;

use crate::color::Rgb;
use crate::drawing::Tool;
use crate::math::Vec2;
use crate::vertex::Vertex;

const BUTTON: f32 = 40.0;
const GAP: f32 = 10.0;
const MARGIN: f32 = 10.0;
const SWATCH: f32 = 24.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToolbarHit {
    Tool(Tool),
    Color(Rgb),
}

struct Button {
    tool: Tool,
    min: Vec2,
}

struct Swatch {
    color: Rgb,
    min: Vec2,
}

/// Tool buttons and colour swatches along the top-left corner, laid out in
/// screen units.
pub struct Toolbar {
    buttons: Vec<Button>,
    swatches: Vec<Swatch>,
    extent: Vec2,
}

#[derive(Debug, Default)]
pub struct ToolbarMesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl ToolbarMesh {
    fn quad(&mut self, min: Vec2, max: Vec2, color: [f32; 4]) {
        self.polygon(&[min, Vec2::new(max.x, min.y), max, Vec2::new(min.x, max.y)], color);
    }

    /// Convex polygon as a triangle fan.
    fn polygon(&mut self, points: &[Vec2], color: [f32; 4]) {
        let base = self.vertices.len() as u32;
        self.vertices.extend(points.iter().map(|p| Vertex {
            position: p.to_array(),
            color,
        }));
        for i in 1..points.len().saturating_sub(1) as u32 {
            self.indices.extend_from_slice(&[base, base + i, base + i + 1]);
        }
    }

    fn line(&mut self, start: Vec2, end: Vec2, width: f32, color: [f32; 4]) {
        let normal = (end - start).normalize_or_zero().perp() * (width * 0.5);
        if normal == Vec2::ZERO {
            return;
        }
        self.polygon(&[start - normal, start + normal, end + normal, end - normal], color);
    }

    fn scale(&mut self, factor: f32) {
        for v in &mut self.vertices {
            v.position = [v.position[0] * factor, v.position[1] * factor];
        }
    }
}

impl Toolbar {
    pub fn new(palette: &[Rgb]) -> Self {
        let buttons: Vec<Button> = Tool::ALL
            .iter()
            .enumerate()
            .map(|(i, &tool)| Button {
                tool,
                min: Vec2::new(MARGIN + i as f32 * (BUTTON + GAP), MARGIN),
            })
            .collect();

        let swatch_x = MARGIN + buttons.len() as f32 * (BUTTON + GAP) + GAP;
        let swatch_y = MARGIN + (BUTTON - SWATCH) / 2.0;
        let swatches: Vec<Swatch> = palette
            .iter()
            .enumerate()
            .map(|(i, &color)| Swatch {
                color,
                min: Vec2::new(swatch_x + i as f32 * (SWATCH + GAP / 2.0), swatch_y),
            })
            .collect();

        let right = swatches
            .last()
            .map(|s| s.min.x + SWATCH)
            .or_else(|| buttons.last().map(|b| b.min.x + BUTTON))
            .unwrap_or(MARGIN);
        let extent = Vec2::new(right + MARGIN / 2.0, MARGIN + BUTTON + MARGIN / 2.0);

        Self { buttons, swatches, extent }
    }

    /// Whether `pos` falls on the toolbar background, so it should not
    /// start a gesture on the canvas.
    pub fn contains(&self, pos: Vec2) -> bool {
        pos.x >= MARGIN / 2.0 && pos.y >= MARGIN / 2.0 && pos.x <= self.extent.x && pos.y <= self.extent.y
    }

    pub fn handle_click(&self, pos: Vec2) -> Option<ToolbarHit> {
        let inside = |min: Vec2, size: f32| pos.x >= min.x && pos.x <= min.x + size && pos.y >= min.y && pos.y <= min.y + size;

        self.buttons
            .iter()
            .find(|b| inside(b.min, BUTTON))
            .map(|b| ToolbarHit::Tool(b.tool))
            .or_else(|| {
                self.swatches
                    .iter()
                    .find(|s| inside(s.min, SWATCH))
                    .map(|s| ToolbarHit::Color(s.color))
            })
    }

    /// Digit shortcuts follow the button order: `1` is the first button.
    pub fn tool_for_digit(digit: u32) -> Option<Tool> {
        (digit as usize).checked_sub(1).and_then(|i| Tool::ALL.get(i).copied())
    }

    pub fn build(&self, current_tool: Tool, current_color: Rgb, device_pixel_ratio: f32) -> ToolbarMesh {
        let mut mesh = ToolbarMesh::default();
        mesh.quad(Vec2::splat(MARGIN / 2.0), self.extent, [0.95, 0.95, 0.95, 0.9]);

        let icon_color = [0.2, 0.2, 0.2, 1.0];
        for button in &self.buttons {
            let fill = if button.tool == current_tool {
                [0.5, 0.7, 1.0, 1.0]
            } else {
                [0.8, 0.8, 0.8, 1.0]
            };
            mesh.quad(button.min, button.min + Vec2::splat(BUTTON), fill);
            draw_icon(&mut mesh, button.tool, button.min + Vec2::splat(BUTTON / 2.0), icon_color);
        }

        for swatch in &self.swatches {
            let max = swatch.min + Vec2::splat(SWATCH);
            if swatch.color == current_color {
                mesh.quad(swatch.min - Vec2::splat(3.0), max + Vec2::splat(3.0), [0.5, 0.7, 1.0, 1.0]);
            }
            mesh.quad(swatch.min - Vec2::splat(1.0), max + Vec2::splat(1.0), icon_color);
            mesh.quad(swatch.min, max, swatch.color.to_linear_rgba());
        }

        mesh.scale(device_pixel_ratio);
        mesh
    }
}

fn draw_icon(mesh: &mut ToolbarMesh, tool: Tool, c: Vec2, color: [f32; 4]) {
    let p = |dx: f32, dy: f32| c + Vec2::new(dx, dy);
    match tool {
        Tool::Freehand => {
            let wave: Vec<Vec2> = (0..=8)
                .map(|i| {
                    let t = i as f32 / 8.0;
                    p(-9.0 + 18.0 * t, (t * TAU).sin() * 5.0)
                })
                .collect();
            for pair in wave.windows(2) {
                mesh.line(pair[0], pair[1], 2.0, color);
            }
        }
        Tool::Rectangle => {
            let corners = [p(-9.0, -7.0), p(9.0, -7.0), p(9.0, 7.0), p(-9.0, 7.0)];
            for i in 0..4 {
                mesh.line(corners[i], corners[(i + 1) % 4], 2.0, color);
            }
        }
        Tool::Ellipse => {
            const SEGMENTS: u32 = 16;
            for i in 0..SEGMENTS {
                let a0 = i as f32 * TAU / SEGMENTS as f32;
                let a1 = (i + 1) as f32 * TAU / SEGMENTS as f32;
                mesh.line(p(a0.cos() * 10.0, a0.sin() * 7.0), p(a1.cos() * 10.0, a1.sin() * 7.0), 2.0, color);
            }
        }
        Tool::Line => mesh.line(p(-9.0, 8.0), p(9.0, -8.0), 2.0, color),
        Tool::Text => {
            mesh.line(p(-7.0, -8.0), p(7.0, -8.0), 2.0, color);
            mesh.line(p(0.0, -8.0), p(0.0, 8.0), 2.0, color);
        }
    }
}
