use std::fmt;
use std::str::FromStr;

use crate::color::Rgb;
use crate::math::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tool {
    Freehand,
    Rectangle,
    Ellipse,
    Line,
    #[default]
    Text,
}

impl Tool {
    pub const ALL: [Tool; 5] = [
        Tool::Freehand,
        Tool::Rectangle,
        Tool::Ellipse,
        Tool::Line,
        Tool::Text,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Tool::Freehand => "freehand",
            Tool::Rectangle => "rectangle",
            Tool::Ellipse => "ellipse",
            Tool::Line => "line",
            Tool::Text => "text",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub usize);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub stroke_color: Rgb,
    pub fill_color: Option<Rgb>,
    pub line_width: f32,
    pub dash: Option<Vec<f32>>,
}

impl Style {
    pub fn stroke(stroke_color: Rgb, line_width: f32) -> Self {
        Self {
            stroke_color,
            fill_color: None,
            line_width,
            dash: None,
        }
    }
}

/// Font shorthand in the `"<size>px <family>"` form, e.g. `50px sans-serif`.
#[derive(Debug, Clone, PartialEq)]
pub struct FontDescriptor {
    pub size_px: f32,
    pub family: String,
}

impl Default for FontDescriptor {
    fn default() -> Self {
        Self {
            size_px: 50.0,
            family: "sans-serif".to_owned(),
        }
    }
}

impl fmt::Display for FontDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}px {}", self.size_px, self.family)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFontError(String);

impl fmt::Display for ParseFontError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid font descriptor '{}', expected e.g. '50px sans-serif'", self.0)
    }
}

impl std::error::Error for ParseFontError {}

impl FromStr for FontDescriptor {
    type Err = ParseFontError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseFontError(s.to_owned());
        let (size, family) = s.trim().split_once(char::is_whitespace).ok_or_else(err)?;
        let size_px: f32 = size
            .strip_suffix("px")
            .and_then(|n| n.parse().ok())
            .filter(|n: &f32| n.is_finite() && *n > 0.0)
            .ok_or_else(err)?;
        let family = family.trim();
        if family.is_empty() {
            return Err(err());
        }
        Ok(Self {
            size_px,
            family: family.to_owned(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Rectangle,
    Ellipse,
    Line,
}

/// Shape geometry. The meaning of `extent` depends on the shape kind:
/// a signed size for rectangles, the full width/height for ellipses
/// (centred on `anchor`) and the absolute end point for lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub anchor: Vec2,
    pub extent: Vec2,
}

/// Ordered stroke samples; never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline(Vec<Vec2>);

impl Polyline {
    pub fn new(first: Vec2) -> Self {
        Self(vec![first])
    }

    pub fn push(&mut self, point: Vec2) {
        self.0.push(point);
    }

    pub fn first(&self) -> Vec2 {
        self.0[0]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[Vec2] {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    Freehand {
        points: Polyline,
    },
    Shape {
        kind: ShapeKind,
        bounds: Bounds,
    },
    Text {
        font: FontDescriptor,
        position: Vec2,
        content: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: ElementId,
    pub style: Style,
    pub kind: ElementKind,
}

impl Element {
    /// Geometry stub for a gesture that starts at `anchor`.
    pub fn create(id: ElementId, tool: Tool, anchor: Vec2, style: Style, font: &FontDescriptor) -> Self {
        let kind = match tool {
            Tool::Freehand => ElementKind::Freehand {
                points: Polyline::new(anchor),
            },
            Tool::Rectangle => ElementKind::Shape {
                kind: ShapeKind::Rectangle,
                bounds: Bounds { anchor, extent: Vec2::ZERO },
            },
            Tool::Ellipse => ElementKind::Shape {
                kind: ShapeKind::Ellipse,
                bounds: Bounds { anchor, extent: Vec2::ZERO },
            },
            Tool::Line => ElementKind::Shape {
                kind: ShapeKind::Line,
                bounds: Bounds { anchor, extent: anchor },
            },
            Tool::Text => ElementKind::Text {
                font: font.clone(),
                position: anchor,
                content: String::new(),
            },
        };

        Self { id, style, kind }
    }

    /// Applies a pointer position from an in-progress gesture.
    pub fn update(&mut self, extent: Vec2) {
        match &mut self.kind {
            ElementKind::Freehand { points } => points.push(extent),
            ElementKind::Shape { kind, bounds } => {
                bounds.extent = match kind {
                    ShapeKind::Rectangle => extent - bounds.anchor,
                    ShapeKind::Ellipse => (extent - bounds.anchor) * 2.0,
                    ShapeKind::Line => extent,
                };
            }
            ElementKind::Text { .. } => {}
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, ElementKind::Text { .. })
    }

    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            ElementKind::Freehand { .. } => "freehand",
            ElementKind::Shape { kind: ShapeKind::Rectangle, .. } => "rectangle",
            ElementKind::Shape { kind: ShapeKind::Ellipse, .. } => "ellipse",
            ElementKind::Shape { kind: ShapeKind::Line, .. } => "line",
            ElementKind::Text { .. } => "text",
        }
    }
}
