mod mat4;
mod vec2;

pub use mat4::Mat4;
pub use vec2::Vec2;

/// Orthographic projection mapping the given box onto clip space.
pub fn ortho(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    let w = right - left;
    let h = top - bottom;
    let d = far - near;

    let result = Mat4::new([
        [2.0 / w, 0.0, 0.0, 0.0],
        [0.0, 2.0 / h, 0.0, 0.0],
        [0.0, 0.0, -2.0 / d, 0.0],
        [-(right + left) / w, -(top + bottom) / h, -(far + near) / d, 1.0],
    ]);

    log::trace!(
        "ortho projection: left={left}, right={right}, bottom={bottom}, top={top}"
    );

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_matrix() {
        let identity = Mat4::identity();
        let p = Vec2::new(1.0, 2.0);
        let result = identity.transform_point(p);

        assert!((result.x - p.x).abs() < 0.001);
        assert!((result.y - p.y).abs() < 0.001);
    }

    #[test]
    fn test_translate_then_scale() {
        // Same order a 2D canvas context applies them: translate first, then scale.
        let m = Mat4::from_translation(Vec2::new(10.0, 20.0)) * Mat4::from_scale(2.0);
        let result = m.transform_point(Vec2::new(1.0, 2.0));

        assert!((result.x - 12.0).abs() < 0.001);
        assert!((result.y - 24.0).abs() < 0.001);
        assert_eq!(m.scale_factor(), 2.0);
    }

    #[test]
    fn test_matrix_multiplication() {
        let identity = Mat4::identity();
        let translation = Mat4::from_translation(Vec2::new(1.0, 2.0));
        let result = identity * translation;

        assert_eq!(result, translation);
    }

    #[test]
    fn test_ortho_maps_corners_to_clip_space() {
        let proj = ortho(0.0, 800.0, 600.0, 0.0, -1.0, 1.0);
        let top_left = proj.transform_point(Vec2::new(0.0, 0.0));
        let bottom_right = proj.transform_point(Vec2::new(800.0, 600.0));

        assert!((top_left.x + 1.0).abs() < 1e-5 && (top_left.y - 1.0).abs() < 1e-5);
        assert!((bottom_right.x - 1.0).abs() < 1e-5 && (bottom_right.y + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_vec2_rotate_around() {
        let p = Vec2::new(1.0, 0.0).rotate_around(Vec2::ZERO, std::f32::consts::FRAC_PI_2);
        assert!(p.x.abs() < 1e-6);
        assert!((p.y - 1.0).abs() < 1e-6);
    }
}
