use crate::math::Vec2;

/// Column-major 4x4 matrix; `data[column][row]`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mat4 {
    pub data: [[f32; 4]; 4],
}

impl Mat4 {
    pub fn new(data: [[f32; 4]; 4]) -> Self {
        Self { data }
    }

    pub fn identity() -> Self {
        Self {
            data: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    pub fn zero() -> Self {
        Self { data: [[0.0; 4]; 4] }
    }

    pub fn from_translation(offset: Vec2) -> Self {
        Self {
            data: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [offset.x, offset.y, 0.0, 1.0],
            ],
        }
    }

    pub fn from_scale(scale: f32) -> Self {
        Self {
            data: [
                [scale, 0.0, 0.0, 0.0],
                [0.0, scale, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Uniform scale applied to x, assuming no rotation or skew.
    pub fn scale_factor(&self) -> f32 {
        self.data[0][0]
    }

    pub fn transform_point(&self, point: Vec2) -> Vec2 {
        let x = self.data[0][0] * point.x + self.data[1][0] * point.y + self.data[3][0];
        let y = self.data[0][1] * point.x + self.data[1][1] * point.y + self.data[3][1];
        let w = self.data[0][3] * point.x + self.data[1][3] * point.y + self.data[3][3];

        if w != 0.0 && w != 1.0 {
            Vec2::new(x / w, y / w)
        } else {
            Vec2::new(x, y)
        }
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::ops::Mul for Mat4 {
    type Output = Self;

    fn mul(self, other: Self) -> Self {
        let mut result = Self::zero();

        for i in 0..4 {
            for j in 0..4 {
                for k in 0..4 {
                    result.data[i][j] += self.data[k][j] * other.data[i][k];
                }
            }
        }

        result
    }
}

impl From<Mat4> for [[f32; 4]; 4] {
    fn from(mat: Mat4) -> Self {
        mat.data
    }
}
