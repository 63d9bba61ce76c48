use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Window, WindowId},
};

use crate::app_state::State;
use crate::color::ColorControl;
use crate::config::Config;

/// Command line: `inkboard [CONFIG] [--color R,G,B]`.
#[derive(Debug, Default, PartialEq)]
pub struct Args {
    pub config: Option<PathBuf>,
    pub color: Option<String>,
}

impl Args {
    pub fn parse<I: IntoIterator<Item = OsString>>(args: I) -> anyhow::Result<Self> {
        let mut parsed = Args::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.to_str() {
                Some("--color") => {
                    let value = args.next().context("`--color` needs a value like 255,0,0")?;
                    parsed.color = Some(value.to_string_lossy().into_owned());
                }
                Some(flag) if flag.starts_with("--") => bail!("unknown option `{flag}`"),
                _ if parsed.config.is_none() => parsed.config = Some(PathBuf::from(arg)),
                _ => bail!("usage: {} [CONFIG] [--color R,G,B]", env!("CARGO_PKG_NAME")),
            }
        }
        Ok(parsed)
    }
}

struct App {
    config: Config,
    color: ColorControl,
    state: Option<State>,
    error: Option<anyhow::Error>,
}

impl App {
    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<State> {
        let window_attributes = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(LogicalSize::new(self.config.window.width, self.config.window.height));
        let window = event_loop
            .create_window(window_attributes)
            .context("failed to create the window")?;

        pollster::block_on(State::new(Arc::new(window), &self.config, self.color))
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        match self.create_window(event_loop) {
            Ok(state) => {
                state.window().request_redraw();
                self.state = Some(state);
            }
            Err(e) => {
                log::error!("{e:#}");
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(state) = &mut self.state else {
            return;
        };
        if window_id != state.window().id() || state.input(&event) {
            return;
        }
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        logical_key: Key::Named(NamedKey::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::Resized(physical_size) => {
                log::info!("WindowEvent::Resized: {}x{}", physical_size.width, physical_size.height);
                state.resize(physical_size);
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                let size = state.window().inner_size();
                state.resize(size);
            }
            WindowEvent::RedrawRequested => {
                state.update();
                match state.render() {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => state.resize(state.size),
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("out of GPU memory");
                        event_loop.exit();
                    }
                    Err(e) => log::warn!("dropped frame: {e:?}"),
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &mut self.state {
            let settled = state.text_surface.settle();
            state.apply_text_event(settled);
        }
    }
}

/// Parses the command line, loads the configuration and runs the window
/// until it is closed.
pub fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse(std::env::args_os().skip(1))?;
    let config = Config::discover(args.config.as_deref())?;

    let mut color = config.color_control();
    if let Some(text) = &args.color {
        color.set_from_text(text);
    }
    log::info!("stroke colour {}", color.color());

    let event_loop = EventLoop::new()?;
    let mut app = App {
        config,
        color,
        state: None,
        error: None,
    };
    event_loop.run_app(&mut app)?;

    match app.error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
