//! Freehand stroke geometry: sample points to outline polygon to curved path.

mod outline;
mod path;

pub use outline::{FreehandOutliner, StrokeOutliner};
pub use path::{PathCommand, StrokePath, path_from_outline};
