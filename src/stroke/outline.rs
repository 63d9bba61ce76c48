//! Variable-width silhouette of a sampled freehand stroke.
//!
//! The input points are streamlined towards each other, a pressure value is
//! simulated from how fast the pointer moved, and the stroke radius follows
//! that pressure. Left and right offset curves are then joined with round
//! caps into one closed polygon.

use std::f32::consts::PI;

use crate::math::Vec2;

/// Produces the closed outline polygon of a stroke drawn with a brush of `size`.
pub trait StrokeOutliner {
    /// Fewer than two input points yield an empty outline.
    fn outline(&self, points: &[Vec2], size: f32) -> Vec<Vec2>;
}

// Slightly above PI so the half-turn arcs overlap instead of leaving a seam.
const FIXED_PI: f32 = PI + 0.0001;
const RATE_OF_PRESSURE_CHANGE: f32 = 0.275;
const DEFAULT_PRESSURE: f32 = 0.5;
const CAP_STEPS: u32 = 13;
const END_CAP_STEPS: u32 = 29;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreehandOutliner {
    /// How much pressure narrows the stroke, `0.0` for constant width.
    pub thinning: f32,
    /// Minimum spacing between outline points, as a fraction of the size.
    pub smoothing: f32,
    /// How strongly each sample is pulled towards the previous one.
    pub streamline: f32,
    pub simulate_pressure: bool,
}

impl Default for FreehandOutliner {
    fn default() -> Self {
        Self {
            thinning: 0.5,
            smoothing: 0.5,
            streamline: 0.5,
            simulate_pressure: true,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct StrokePoint {
    point: Vec2,
    pressure: f32,
    /// Unit vector pointing back towards the previous sample.
    vector: Vec2,
    distance: f32,
    running_length: f32,
}

impl FreehandOutliner {
    fn stroke_points(&self, input: &[Vec2], size: f32) -> Vec<StrokePoint> {
        let t = 0.15 + (1.0 - self.streamline) * 0.85;

        let mut pts: Vec<Vec2> = input.to_vec();
        if pts.len() == 2 {
            let last = pts[1];
            pts.truncate(1);
            for i in 1..5 {
                pts.push(input[0].lerp(last, i as f32 / 4.0));
            }
        }

        let mut out = vec![StrokePoint {
            point: pts[0],
            pressure: DEFAULT_PRESSURE,
            vector: Vec2::splat(1.0),
            distance: 0.0,
            running_length: 0.0,
        }];

        let mut reached_min_length = false;
        let mut running_length = 0.0;
        let max = pts.len() - 1;

        for (i, &raw) in pts.iter().enumerate().skip(1) {
            let prev = out[out.len() - 1];
            let point = if i == max { raw } else { prev.point.lerp(raw, t) };
            if point == prev.point {
                continue;
            }

            let distance = point.distance(prev.point);
            running_length += distance;

            // Skip the jittery first few samples until the stroke is at least one brush wide.
            if i < max && !reached_min_length {
                if running_length < size {
                    continue;
                }
                reached_min_length = true;
            }

            out.push(StrokePoint {
                point,
                pressure: DEFAULT_PRESSURE,
                vector: (prev.point - point).normalize_or_zero(),
                distance,
                running_length,
            });
        }

        out[0].vector = out.get(1).map(|p| p.vector).unwrap_or(Vec2::ZERO);
        out
    }

    fn radius(&self, size: f32, pressure: f32) -> f32 {
        size * (0.5 - self.thinning * (0.5 - pressure))
    }

    fn next_pressure(&self, prev: f32, distance: f32, size: f32) -> f32 {
        let sp = (distance / size).min(1.0);
        let rp = (1.0 - sp).min(1.0);
        (prev + (rp - prev) * (sp * RATE_OF_PRESSURE_CHANGE)).min(1.0)
    }

    fn outline_points(&self, points: &[StrokePoint], size: f32) -> Vec<Vec2> {
        let min_distance = (size * self.smoothing).powi(2);
        let total_length = points[points.len() - 1].running_length;

        let mut prev_pressure = points.iter().take(10).fold(points[0].pressure, |acc, p| {
            let pressure = if self.simulate_pressure {
                self.next_pressure(acc, p.distance, size)
            } else {
                p.pressure
            };
            (acc + pressure) / 2.0
        });

        let mut radius = self.radius(size, points[points.len() - 1].pressure);
        let mut first_radius: Option<f32> = None;
        let mut prev_vector = points[0].vector;
        let mut pl = points[0].point;
        let mut pr = pl;
        let mut tl = pl;
        let mut tr = pr;
        let mut prev_sharp = false;

        let mut left = Vec::new();
        let mut right = Vec::new();

        for (i, sp) in points.iter().enumerate() {
            let is_last = i == points.len() - 1;

            // Samples this close to the end are covered by the end cap.
            if !is_last && total_length - sp.running_length < 3.0 {
                continue;
            }

            if self.thinning != 0.0 {
                let pressure = if self.simulate_pressure {
                    self.next_pressure(prev_pressure, sp.distance, size)
                } else {
                    sp.pressure
                };
                radius = self.radius(size, pressure);
                prev_pressure = pressure;
            } else {
                radius = size / 2.0;
            }
            radius = radius.max(0.01);
            first_radius.get_or_insert(radius);

            let next_vector = if is_last { sp.vector } else { points[i + 1].vector };
            let next_dot = if is_last { 1.0 } else { sp.vector.dot(next_vector) };
            let prev_dot = sp.vector.dot(prev_vector);

            let sharp_here = prev_dot < 0.0 && !prev_sharp;
            let sharp_next = next_dot < 0.0;

            if sharp_here || sharp_next {
                let offset = prev_vector.perp() * radius;
                for step in 0..=CAP_STEPS {
                    let t = step as f32 / CAP_STEPS as f32;
                    tl = (sp.point - offset).rotate_around(sp.point, FIXED_PI * t);
                    left.push(tl);
                    tr = (sp.point + offset).rotate_around(sp.point, FIXED_PI * -t);
                    right.push(tr);
                }
                pl = tl;
                pr = tr;
                if sharp_next {
                    prev_sharp = true;
                }
                continue;
            }

            prev_sharp = false;

            if is_last {
                let offset = sp.vector.perp() * radius;
                left.push(sp.point - offset);
                right.push(sp.point + offset);
                continue;
            }

            let offset = next_vector.lerp(sp.vector, next_dot).perp() * radius;

            tl = sp.point - offset;
            if i <= 1 || pl.distance_squared(tl) > min_distance {
                left.push(tl);
                pl = tl;
            }

            tr = sp.point + offset;
            if i <= 1 || pr.distance_squared(tr) > min_distance {
                right.push(tr);
                pr = tr;
            }

            prev_vector = sp.vector;
        }

        let first_point = points[0].point;
        let last_point = if points.len() > 1 {
            points[points.len() - 1].point
        } else {
            first_point + Vec2::splat(1.0)
        };
        let first_radius = first_radius.unwrap_or(radius);

        if points.len() == 1 || left.is_empty() || right.is_empty() {
            return dot(first_point, last_point, first_radius);
        }

        let start_cap: Vec<Vec2> = (1..=CAP_STEPS)
            .map(|step| {
                let t = step as f32 / CAP_STEPS as f32;
                right[0].rotate_around(first_point, FIXED_PI * t)
            })
            .collect();

        let direction = (-points[points.len() - 1].vector).perp();
        let end_start = last_point + direction * radius;
        let end_cap = (1..END_CAP_STEPS).map(|step| {
            let t = step as f32 / END_CAP_STEPS as f32;
            end_start.rotate_around(last_point, FIXED_PI * 3.0 * t)
        });

        let mut outline = left;
        outline.extend(end_cap);
        outline.extend(right.into_iter().rev());
        outline.extend(start_cap);
        outline
    }
}

/// A round dot for strokes that never left their starting point.
fn dot(first: Vec2, last: Vec2, radius: f32) -> Vec<Vec2> {
    let direction = (first - last).perp().normalize_or_zero();
    let start = first - direction * radius;
    (1..=CAP_STEPS)
        .map(|step| {
            let t = step as f32 / CAP_STEPS as f32;
            start.rotate_around(first, FIXED_PI * 2.0 * t)
        })
        .collect()
}

impl StrokeOutliner for FreehandOutliner {
    fn outline(&self, points: &[Vec2], size: f32) -> Vec<Vec2> {
        if points.len() < 2 || !(size > 0.0) {
            return Vec::new();
        }

        let stroke = self.stroke_points(points, size);
        self.outline_points(&stroke, size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(points: &[Vec2]) -> (Vec2, Vec2) {
        points.iter().fold(
            (Vec2::splat(f32::MAX), Vec2::splat(f32::MIN)),
            |(lo, hi), p| (lo.min(*p), hi.max(*p)),
        )
    }

    #[test]
    fn fewer_than_two_points_is_empty() {
        let outliner = FreehandOutliner::default();
        assert!(outliner.outline(&[], 3.0).is_empty());
        assert!(outliner.outline(&[Vec2::new(1.0, 1.0)], 3.0).is_empty());
    }

    #[test]
    fn non_positive_size_is_empty() {
        let outliner = FreehandOutliner::default();
        let points = [Vec2::new(0.0, 0.0), Vec2::new(50.0, 0.0)];
        assert!(outliner.outline(&points, 0.0).is_empty());
        assert!(outliner.outline(&points, f32::NAN).is_empty());
    }

    #[test]
    fn straight_stroke_hugs_the_samples() {
        let outliner = FreehandOutliner::default();
        let points: Vec<Vec2> = (0..=20).map(|i| Vec2::new(i as f32 * 10.0, 100.0)).collect();
        let size = 8.0;

        let outline = outliner.outline(&points, size);
        assert!(outline.len() >= 4, "got {} points", outline.len());
        assert!(outline.iter().all(|p| p.x.is_finite() && p.y.is_finite()));

        let (lo, hi) = bbox(&outline);
        assert!(lo.y >= 100.0 - size && hi.y <= 100.0 + size);
        assert!(lo.x >= -size && hi.x <= 200.0 + size);
        // The silhouette has some width on both sides of the centre line.
        assert!(lo.y < 100.0 && hi.y > 100.0);
    }

    #[test]
    fn hairpin_turn_still_produces_a_finite_outline() {
        let outliner = FreehandOutliner::default();
        let mut points: Vec<Vec2> = (0..=10).map(|i| Vec2::new(i as f32 * 10.0, 0.0)).collect();
        points.extend((0..=10).rev().map(|i| Vec2::new(i as f32 * 10.0, 1.0)));

        let outline = outliner.outline(&points, 6.0);
        assert!(outline.len() >= 4);
        assert!(outline.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
    }

    #[test]
    fn two_points_are_subdivided() {
        let outliner = FreehandOutliner::default();
        let outline = outliner.outline(&[Vec2::new(0.0, 0.0), Vec2::new(40.0, 0.0)], 4.0);
        assert!(outline.len() >= 4);
    }
}
