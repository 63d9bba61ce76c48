use crate::math::Vec2;

pub const MIN_SCALE: f32 = 0.1;
pub const MAX_SCALE: f32 = 4.0;
pub const ZOOM_IN_FACTOR: f32 = 1.1;
pub const ZOOM_OUT_FACTOR: f32 = 0.9;
/// Pan distance per wheel tick, in screen units.
pub const PAN_STEP: f32 = 7.0;

/// One wheel tick. `delta_y > 0` means the wheel was rolled down (towards the user).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelInput {
    pub delta_y: f32,
    pub ctrl: bool,
    pub shift: bool,
}

/// Pan/zoom state mapping screen coordinates onto the logical drawing plane.
///
/// Screen coordinates are window pixels as reported with pointer events;
/// the backing store is `size * device_pixel_ratio` device pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasTransform {
    pub offset: Vec2,
    scale: f32,
    size: Vec2,
    device_pixel_ratio: f32,
}

impl CanvasTransform {
    pub fn new(size: Vec2, device_pixel_ratio: f32) -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: 1.0,
            size,
            device_pixel_ratio: sanitize_ratio(device_pixel_ratio),
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn device_pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio
    }

    pub fn center(&self) -> Vec2 {
        self.size / 2.0
    }

    /// Backing-store dimensions in device pixels.
    pub fn backing_size(&self) -> (u32, u32) {
        let px = self.size * self.device_pixel_ratio;
        (px.x.round().max(0.0) as u32, px.y.round().max(0.0) as u32)
    }

    pub fn screen_to_canvas(&self, screen_pos: Vec2) -> Vec2 {
        (screen_pos - self.offset) / self.scale
    }

    pub fn canvas_to_screen(&self, canvas_pos: Vec2) -> Vec2 {
        canvas_pos * self.scale + self.offset
    }

    /// Multiplies the scale by `factor` (clamped to `[MIN_SCALE, MAX_SCALE]`)
    /// while keeping the logical point under the viewport centre in place.
    pub fn zoom(&mut self, factor: f32) {
        let new_scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        let center = self.center();
        self.offset = center - (center - self.offset) / self.scale * new_scale;
        self.scale = new_scale;
        log::debug!("zoom to {:.3}, offset {:?}", self.scale, self.offset);
    }

    pub fn zoom_in(&mut self) {
        self.zoom(ZOOM_IN_FACTOR);
    }

    pub fn zoom_out(&mut self) {
        self.zoom(ZOOM_OUT_FACTOR);
    }

    /// Applies a wheel tick. Returns whether the transform changed.
    pub fn apply_wheel(&mut self, wheel: WheelInput) -> bool {
        if wheel.delta_y == 0.0 || wheel.delta_y.is_nan() {
            return false;
        }
        let direction = wheel.delta_y.signum();

        if wheel.ctrl {
            if direction < 0.0 {
                self.zoom_in();
            } else {
                self.zoom_out();
            }
        } else if wheel.shift {
            self.offset.x += PAN_STEP * direction;
        } else {
            self.offset.y += PAN_STEP * direction;
        }
        true
    }

    /// Follows a window resize, carrying the relative position of the old
    /// viewport centre over to the new size.
    pub fn resize(&mut self, new_size: Vec2, device_pixel_ratio: f32) {
        let old = self.size;
        if old.x > 0.0 && old.y > 0.0 {
            let center_ratio = (self.offset + old / 2.0) / old;
            self.offset = new_size * center_ratio - new_size / 2.0;
        }
        self.size = new_size;
        self.device_pixel_ratio = sanitize_ratio(device_pixel_ratio);
    }
}

fn sanitize_ratio(ratio: f32) -> f32 {
    if ratio.is_finite() && ratio > 0.0 { ratio } else { 1.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Vec2, b: Vec2) {
        assert!(a.distance(b) < 1e-3, "{:?} != {:?}", a, b);
    }

    fn ctrl_wheel(delta_y: f32) -> WheelInput {
        WheelInput { delta_y, ctrl: true, shift: false }
    }

    #[test]
    fn screen_canvas_round_trip() {
        let mut transform = CanvasTransform::new(Vec2::new(800.0, 600.0), 1.0);
        transform.offset = Vec2::new(-31.5, 12.25);
        transform.zoom(2.5);
        for p in [Vec2::new(0.0, 0.0), Vec2::new(-120.5, 33.0), Vec2::new(1e4, -2e3)] {
            assert_close(transform.screen_to_canvas(transform.canvas_to_screen(p)), p);
        }
    }

    #[test]
    fn zoom_keeps_the_centre_point() {
        let mut transform = CanvasTransform::new(Vec2::new(1024.0, 768.0), 2.0);
        transform.offset = Vec2::new(40.0, -75.0);
        for delta in [-3.0, -1.0, 5.0, -1.0, 2.0] {
            let before = transform.screen_to_canvas(transform.center());
            transform.apply_wheel(ctrl_wheel(delta));
            let after = transform.screen_to_canvas(transform.center());
            assert_close(before, after);
        }
    }

    #[test]
    fn zoom_is_clamped() {
        let mut transform = CanvasTransform::new(Vec2::new(100.0, 100.0), 1.0);
        for _ in 0..100 {
            transform.apply_wheel(ctrl_wheel(-1.0));
            assert!(transform.scale() <= MAX_SCALE);
        }
        assert_eq!(transform.scale(), 4.0);

        for _ in 0..200 {
            transform.apply_wheel(ctrl_wheel(1.0));
            assert!(transform.scale() >= MIN_SCALE);
        }
        assert_eq!(transform.scale(), 0.1);
    }

    #[test]
    fn wheel_pans_by_fixed_steps() {
        let mut transform = CanvasTransform::new(Vec2::new(100.0, 100.0), 1.0);
        transform.apply_wheel(WheelInput { delta_y: 120.0, ..Default::default() });
        assert_eq!(transform.offset, Vec2::new(0.0, 7.0));
        transform.apply_wheel(WheelInput { delta_y: -0.5, shift: true, ..Default::default() });
        assert_eq!(transform.offset, Vec2::new(-7.0, 7.0));
        assert_eq!(transform.scale(), 1.0);
    }

    #[test]
    fn zero_delta_is_ignored() {
        let mut transform = CanvasTransform::new(Vec2::new(100.0, 100.0), 1.0);
        assert!(!transform.apply_wheel(ctrl_wheel(0.0)));
        assert_eq!(transform.scale(), 1.0);
    }

    #[test]
    fn resize_carries_the_centre_ratio() {
        let mut transform = CanvasTransform::new(Vec2::new(800.0, 600.0), 1.0);
        transform.offset = Vec2::new(100.0, -60.0);
        transform.resize(Vec2::new(400.0, 1200.0), 2.0);
        // ((100 + 400) / 800) * 400 - 200 and ((-60 + 300) / 600) * 1200 - 600
        assert_close(transform.offset, Vec2::new(50.0, -120.0));
        assert_eq!(transform.backing_size(), (800, 2400));
    }

    #[test]
    fn resize_from_empty_keeps_offset() {
        let mut transform = CanvasTransform::new(Vec2::ZERO, 1.0);
        transform.offset = Vec2::new(5.0, 5.0);
        transform.resize(Vec2::new(300.0, 200.0), 0.0);
        assert_eq!(transform.offset, Vec2::new(5.0, 5.0));
        assert_eq!(transform.device_pixel_ratio(), 1.0);
    }
}
