use std::fmt;

use crate::math::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Vec2),
    QuadTo { control: Vec2, to: Vec2 },
    /// Quadratic segment whose control point mirrors the previous one.
    SmoothQuadTo(Vec2),
    Close,
}

/// A curved outline, serializable as an SVG path description.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrokePath {
    commands: Vec<PathCommand>,
}

impl StrokePath {
    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Polygon approximation of the path. Curves are subdivided until they
    /// deviate from their chord by less than `tolerance`.
    pub fn flatten(&self, tolerance: f32) -> Vec<Vec2> {
        let mut out = Vec::new();
        let mut current = Vec2::ZERO;
        let mut start = Vec2::ZERO;
        let mut last_control: Option<Vec2> = None;

        for command in &self.commands {
            match *command {
                PathCommand::MoveTo(p) => {
                    out.push(p);
                    current = p;
                    start = p;
                    last_control = None;
                }
                PathCommand::QuadTo { control, to } => {
                    flatten_quad(current, control, to, tolerance, 0, &mut out);
                    current = to;
                    last_control = Some(control);
                }
                PathCommand::SmoothQuadTo(to) => {
                    let control = match last_control {
                        Some(c) => current * 2.0 - c,
                        None => current,
                    };
                    flatten_quad(current, control, to, tolerance, 0, &mut out);
                    current = to;
                    last_control = Some(control);
                }
                PathCommand::Close => {
                    current = start;
                    last_control = None;
                }
            }
        }

        out
    }
}

const MAX_FLATTEN_DEPTH: u32 = 10;

fn flatten_quad(p0: Vec2, p1: Vec2, p2: Vec2, tolerance: f32, depth: u32, out: &mut Vec<Vec2>) {
    let mid = p0.midpoint(p2);
    if depth >= MAX_FLATTEN_DEPTH || p1.distance(mid) <= tolerance {
        out.push(p2);
        return;
    }
    let q0 = p0.midpoint(p1);
    let q1 = p1.midpoint(p2);
    let r = q0.midpoint(q1);
    flatten_quad(p0, q0, r, tolerance, depth + 1, out);
    flatten_quad(r, q1, p2, tolerance, depth + 1, out);
}

/// Smooths an outline polygon into quadratic segments that pass through the
/// midpoints of consecutive outline points, using the points themselves as
/// control points. Outlines with fewer than four points produce an empty path.
pub fn path_from_outline(points: &[Vec2], closed: bool) -> StrokePath {
    let len = points.len();
    if len < 4 {
        return StrokePath::default();
    }

    let mut commands = Vec::with_capacity(len);
    commands.push(PathCommand::MoveTo(points[0]));
    commands.push(PathCommand::QuadTo {
        control: points[1],
        to: points[1].midpoint(points[2]),
    });
    for pair in points[2..].windows(2) {
        commands.push(PathCommand::SmoothQuadTo(pair[0].midpoint(pair[1])));
    }
    if closed {
        commands.push(PathCommand::Close);
    }

    StrokePath { commands }
}

struct Coord(Vec2);

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2},{:.2}", self.0.x, self.0.y)
    }
}

impl fmt::Display for StrokePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, command) in self.commands.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match *command {
                PathCommand::MoveTo(p) => write!(f, "M{}", Coord(p))?,
                PathCommand::QuadTo { control, to } => write!(f, "Q{} {}", Coord(control), Coord(to))?,
                PathCommand::SmoothQuadTo(to) => write!(f, "T{}", Coord(to))?,
                PathCommand::Close => f.write_str("Z")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(raw: &[(f32, f32)]) -> Vec<Vec2> {
        raw.iter().map(|&p| p.into()).collect()
    }

    #[test]
    fn short_outlines_are_empty() {
        for n in 0..4 {
            let points: Vec<Vec2> = (0..n).map(|i| Vec2::new(i as f32, 0.0)).collect();
            assert!(path_from_outline(&points, true).is_empty());
            assert_eq!(path_from_outline(&points, true).to_string(), "");
        }
    }

    #[test]
    fn four_points_serialize_with_two_decimals() {
        let path = path_from_outline(&pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0), (3.0, 1.0)]), true);
        assert_eq!(path.to_string(), "M0.00,0.00 Q1.00,1.00 1.50,0.50 T2.50,0.50 Z");
    }

    #[test]
    fn smooth_segment_count_is_len_minus_three() {
        for n in 4..12 {
            let points: Vec<Vec2> = (0..n)
                .map(|i| Vec2::new(i as f32 * 1.234, (i % 3) as f32 * 0.5))
                .collect();
            let path = path_from_outline(&points, true);
            let smooth = path
                .commands()
                .iter()
                .filter(|c| matches!(c, PathCommand::SmoothQuadTo(_)))
                .count();
            assert_eq!(smooth, n - 3);

            let text = path.to_string();
            assert!(text.starts_with("M0.00,0.00 Q"));
            assert_eq!(text.matches('T').count(), n - 3);
            assert!(text.ends_with('Z'));
        }
    }

    #[test]
    fn open_paths_are_not_closed() {
        let path = path_from_outline(&pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0), (3.0, 1.0)]), false);
        assert!(!path.commands().contains(&PathCommand::Close));
    }

    #[test]
    fn coordinates_round_to_two_decimals() {
        let path = path_from_outline(
            &pts(&[(0.123456, 9.87654), (1.0, 1.0), (2.0, 0.0), (3.0, 1.0)]),
            true,
        );
        assert!(path.to_string().starts_with("M0.12,9.88 "));
    }

    #[test]
    fn flatten_passes_through_segment_ends() {
        let outline = pts(&[(0.0, 0.0), (10.0, 10.0), (20.0, 0.0), (30.0, 10.0), (40.0, 0.0)]);
        let path = path_from_outline(&outline, true);
        let polygon = path.flatten(0.1);

        assert_eq!(polygon[0], Vec2::new(0.0, 0.0));
        for end in [Vec2::new(15.0, 5.0), Vec2::new(25.0, 5.0), Vec2::new(35.0, 5.0)] {
            assert!(polygon.iter().any(|p| p.distance(end) < 1e-4), "missing {:?}", end);
        }
        // Implicit control points mirror the previous one, which here lands on the raw sample.
        let peak = polygon.iter().fold(f32::MIN, |m, p| if p.x > 15.0 && p.x < 25.0 { m.max(-p.y) } else { m });
        assert!(peak > -5.0 && peak < 0.0);
    }
}
