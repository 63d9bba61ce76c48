//! Hand-drawn looking polylines for rectangles, ellipses and lines.
//!
//! Output is fully determined by the seed, so an element redrawn every frame
//! keeps the same wobble.

use std::f32::consts::{PI, TAU};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::math::Vec2;

#[derive(Debug, Clone)]
pub struct RoughOptions {
    pub roughness: f32,
    pub bowing: f32,
    pub max_randomness_offset: f32,
    pub curve_step_count: u32,
    pub disable_multi_stroke: bool,
}

impl Default for RoughOptions {
    fn default() -> Self {
        Self {
            roughness: 1.0,
            bowing: 1.0,
            max_randomness_offset: 2.0,
            curve_step_count: 32,
            disable_multi_stroke: false,
        }
    }
}

impl RoughOptions {
    /// Per-shape jitter of the base options, drawn from the shape's own rng.
    fn varied(rng: &mut StdRng, kind: Preset) -> Self {
        let mut r = || rng.random::<f32>();
        match kind {
            Preset::Rectangle => Self {
                roughness: 0.7 + r() * 0.5,
                bowing: 0.3 + r() * 1.2,
                max_randomness_offset: 1.0 + r() * 1.5,
                ..Default::default()
            },
            Preset::Ellipse => Self {
                roughness: 0.4 + r() * 0.4,
                bowing: 0.5 + r() * 0.5,
                max_randomness_offset: 0.8 + r() * 0.8,
                curve_step_count: 28 + (r() * 8.0) as u32,
                ..Default::default()
            },
            Preset::Line => Self {
                roughness: 0.6 + r() * 0.6,
                bowing: 0.5 + r() * 1.0,
                max_randomness_offset: 1.0 + r() * 1.0,
                ..Default::default()
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Preset {
    Rectangle,
    Ellipse,
    Line,
}

pub struct RoughGenerator {
    rng: StdRng,
}

impl RoughGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn random(&mut self) -> f32 {
        self.rng.random::<f32>()
    }

    fn offset(&mut self, min: f32, max: f32, options: &RoughOptions, gain: f32) -> f32 {
        options.roughness * gain * (self.random() * (max - min) + min)
    }

    fn jitter(&mut self, x: f32, options: &RoughOptions, gain: f32) -> f32 {
        self.offset(-x, x, options, gain)
    }

    /// Two overlapping wobbly strokes per side.
    pub fn rectangle(&mut self, origin: Vec2, size: Vec2) -> Vec<Vec<Vec2>> {
        let options = RoughOptions::varied(&mut self.rng, Preset::Rectangle);
        let corners = [
            origin,
            Vec2::new(origin.x + size.x, origin.y),
            origin + size,
            Vec2::new(origin.x, origin.y + size.y),
        ];

        let mut strokes = Vec::with_capacity(8);
        for i in 0..4 {
            let (start, end) = (corners[i], corners[(i + 1) % 4]);
            strokes.push(self.line_points(start, end, &options));
            if !options.disable_multi_stroke {
                strokes.push(self.line_points(start, end, &options));
            }
        }
        strokes
    }

    pub fn line(&mut self, start: Vec2, end: Vec2) -> Vec<Vec<Vec2>> {
        let options = RoughOptions::varied(&mut self.rng, Preset::Line);
        let mut strokes = vec![self.line_points(start, end, &options)];
        if !options.disable_multi_stroke {
            strokes.push(self.line_points(start, end, &options));
        }
        strokes
    }

    pub fn ellipse(&mut self, center: Vec2, width: f32, height: f32) -> Vec<Vec<Vec2>> {
        let options = RoughOptions::varied(&mut self.rng, Preset::Ellipse);
        let radii = Vec2::new(width / 2.0, height / 2.0);

        let step_count = (options.curve_step_count + (self.random() * 4.0) as u32).clamp(16, 48);
        let increment = TAU / step_count as f32;

        let first_radii = Vec2::new(
            radii.x + self.jitter(radii.x * 0.02, &options, 1.0),
            radii.y + self.jitter(radii.y * 0.02, &options, 1.0),
        );
        let overlap = increment * self.offset(0.05, 0.1, &options, 1.0);
        let mut strokes = vec![self.ellipse_points(center, first_radii, increment, overlap, 1.0, &options, step_count)];

        if !options.disable_multi_stroke {
            let softer = RoughOptions {
                roughness: options.roughness * 0.8,
                ..options.clone()
            };
            let second_radii = Vec2::new(
                radii.x + self.jitter(radii.x * 0.01, &softer, 1.0),
                radii.y + self.jitter(radii.y * 0.01, &softer, 1.0),
            );
            let overlap = increment * self.offset(0.02, 0.05, &softer, 1.0);
            strokes.push(self.ellipse_points(center, second_radii, increment, overlap, 0.5, &softer, step_count));
        }
        strokes
    }

    fn line_points(&mut self, start: Vec2, end: Vec2, options: &RoughOptions) -> Vec<Vec2> {
        let length_sq = start.distance_squared(end);
        let length = length_sq.sqrt();

        let gain = if length < 200.0 {
            1.0
        } else if length > 500.0 {
            0.4
        } else {
            -0.0016668 * length + 1.233334
        };

        let mut offset = options.max_randomness_offset;
        if offset * offset * 100.0 > length_sq {
            offset = length / 10.0;
        }

        let diverge = 0.2 + self.random() * 0.2;
        let bow = Vec2::new(end.y - start.y, start.x - end.x) * (options.bowing * options.max_randomness_offset / 200.0);
        let bow = Vec2::new(
            bow.x + self.jitter(bow.x, options, gain),
            bow.y + self.jitter(bow.y, options, gain),
        );

        let wobble = |g: &mut Self| Vec2::new(g.jitter(offset, options, gain), g.jitter(offset, options, gain));

        let p0 = start + wobble(self);
        let delta = end - start;
        let c1 = bow + start + delta * diverge + wobble(self);
        let c2 = bow + start + delta * (2.0 * diverge) + wobble(self);
        let p3 = end + wobble(self);

        let mut points = Vec::with_capacity(11);
        points.push(p0);
        points.extend(cubic_points(p0, c1, c2, p3, 10));
        points
    }

    #[allow(clippy::too_many_arguments)]
    fn ellipse_points(
        &mut self,
        center: Vec2,
        radii: Vec2,
        increment: f32,
        overlap: f32,
        spread: f32,
        options: &RoughOptions,
        step_count: u32,
    ) -> Vec<Vec2> {
        let on_ellipse = |r: Vec2, angle: f32| center + Vec2::new(r.x * angle.cos(), r.y * angle.sin());
        let mut points = Vec::with_capacity(step_count as usize + 4);

        let start_angle = self.jitter(0.1, options, 1.0) - PI / 2.0;
        let start_scale = 0.98 + self.random() * 0.04;
        let nudge = Vec2::new(self.jitter(spread * 0.3, options, 1.0), self.jitter(spread * 0.3, options, 1.0));
        points.push(nudge + on_ellipse(radii * start_scale, start_angle - increment));

        let end_angle = TAU + start_angle + overlap;
        let mut angle = start_angle;
        let mut segment = 0;
        while angle < end_angle {
            let progress = segment as f32 / step_count as f32;
            let wave = (progress * PI * 3.0).sin() * 0.01 + (progress * PI * 5.0).cos() * 0.005;
            let modifier = (1.0 + wave + self.jitter(0.02, options, 1.0)).clamp(0.95, 1.05);

            let r = Vec2::new(
                (radii.x * modifier + self.jitter(radii.x * 0.01, options, 1.0)).clamp(radii.x.min(radii.x * 0.92), radii.x.max(radii.x * 1.08)),
                (radii.y * modifier + self.jitter(radii.y * 0.01, options, 1.0)).clamp(radii.y.min(radii.y * 0.92), radii.y.max(radii.y * 1.08)),
            );
            let nudge = Vec2::new(self.jitter(spread * 0.2, options, 1.0), self.jitter(spread * 0.2, options, 1.0));
            points.push(nudge + on_ellipse(r, angle));

            angle += increment * (0.95 + self.random() * 0.1);
            segment += 1;
        }

        let end_scale = 0.96 + self.random() * 0.08;
        let nudge = Vec2::new(self.jitter(spread * 0.5, options, 1.0), self.jitter(spread * 0.5, options, 1.0));
        points.push(nudge + on_ellipse(radii * end_scale, start_angle + TAU + overlap * 0.5));

        let close_scale = 0.95 + self.random() * 0.1;
        let nudge = Vec2::new(self.jitter(spread * 0.3, options, 1.0), self.jitter(spread * 0.3, options, 1.0));
        points.push(nudge + on_ellipse(radii * close_scale, start_angle + overlap));

        points
    }
}

fn cubic_points(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, segments: u32) -> impl Iterator<Item = Vec2> {
    (1..=segments).map(move |i| {
        let t = i as f32 / segments as f32;
        let u = 1.0 - t;
        p0 * (u * u * u) + p1 * (3.0 * u * u * t) + p2 * (3.0 * u * t * t) + p3 * (t * t * t)
    })
}
