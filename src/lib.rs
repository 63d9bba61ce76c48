pub mod canvas;
pub mod color;
pub mod config;
pub mod drawing;
pub mod frame;
pub mod math;
pub mod render;
pub mod rough;
pub mod scene;
pub mod session;
pub mod stroke;

mod app;
mod app_state;
mod event_handler;
mod renderer;
mod state;
mod text_renderer;
mod ui;
mod update_logic;
mod vertex;

pub use app::{Args, run};
pub use vertex::Vertex;
