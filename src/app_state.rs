use std::sync::Arc;

use anyhow::Context;
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::canvas::{CanvasTransform, Uniforms};
use crate::color::{ColorControl, Rgb};
use crate::config::Config;
use crate::frame::FrameBuilder;
use crate::math::Vec2;
use crate::renderer::{create_pipelines, create_stencil_view};
use crate::scene::{ElementDefaults, Scene};
use crate::state::{Canvas, GeometryBuffers, GpuContext, InputState, Pipelines, TextSurface};
use crate::stroke::FreehandOutliner;
use crate::text_renderer::{TextRenderer, load_font};
use crate::ui::Toolbar;

pub struct State {
    pub window: Arc<Window>,
    pub size: PhysicalSize<u32>,

    pub gpu: GpuContext,
    pub pipelines: Pipelines,
    pub canvas: Canvas,
    pub geometry: GeometryBuffers,
    pub ui_geo: GeometryBuffers,
    pub input: InputState,
    pub text_surface: TextSurface,

    pub scene: Scene,
    pub outliner: FreehandOutliner,
    pub frame: FrameBuilder,
    pub background: Rgb,

    pub toolbar: Toolbar,
    pub text_renderer: TextRenderer,
}

impl State {
    pub async fn new(window: Arc<Window>, config: &Config, color: ColorControl) -> anyhow::Result<State> {
        let size = window.inner_size();
        let scale_factor = window.scale_factor() as f32;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("failed to create a rendering surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no suitable graphics adapter")?;
        log::info!("using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                label: None,
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to open the graphics device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .context("the surface reports no supported formats")?;

        let config_surface = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes.first().copied().unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps.alpha_modes.first().copied().unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config_surface);

        let stencil_view = create_stencil_view(&device, config_surface.width, config_surface.height);

        let logical = Vec2::new(size.width as f32, size.height as f32) / scale_factor;
        let viewport = CanvasTransform::new(logical, scale_factor);

        let mut uniforms = Uniforms::new();
        uniforms.update_projection(viewport.backing_size());

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::cast_slice(&[uniforms]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some("uniform_bind_group_layout"),
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
            label: Some("uniform_bind_group"),
        });

        let pipelines = create_pipelines(&device, surface_format, &uniform_bind_group_layout);
        let font = load_font(config.canvas.font_path.as_deref());
        let text_renderer = TextRenderer::new(&device, surface_format, &uniform_bind_group_layout, font);

        let defaults = ElementDefaults {
            line_width: config.canvas.line_width,
            font: config.canvas.font.clone(),
        };
        log::info!(
            "surface {}x{} ({:?}), scale factor {scale_factor}",
            size.width,
            size.height,
            surface_format
        );

        Ok(Self {
            window,
            size,
            gpu: GpuContext {
                surface,
                device,
                queue,
                config: config_surface,
                stencil_view,
            },
            pipelines,
            canvas: Canvas {
                uniform: uniforms,
                uniform_buffer,
                uniform_bind_group,
            },
            geometry: GeometryBuffers::default(),
            ui_geo: GeometryBuffers::default(),
            input: InputState {
                cursor: Vec2::ZERO,
                modifiers: winit::keyboard::ModifiersState::empty(),
            },
            text_surface: TextSurface::default(),
            scene: Scene::new(viewport, defaults, color),
            outliner: FreehandOutliner::default(),
            frame: FrameBuilder::new(scale_factor),
            background: config.canvas.background,
            toolbar: Toolbar::new(&config.canvas.palette),
            text_renderer,
        })
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }
}
