mod canvas_transform;
mod uniform;

pub use canvas_transform::{
    CanvasTransform, MAX_SCALE, MIN_SCALE, PAN_STEP, WheelInput, ZOOM_IN_FACTOR, ZOOM_OUT_FACTOR,
};
pub use uniform::Uniforms;
