use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::ops::Range;
use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontArc, GlyphId, PxScale, ScaleFont, point};
use wgpu::util::DeviceExt;

use crate::frame::TextRun;
use crate::render::TextBaseline;
use crate::renderer::{STENCIL_FORMAT, stencil_passthrough};

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TextVertex {
    pos: [f32; 2],
    uv: [f32; 2],
    color: [f32; 4],
}

impl TextVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2, 2 => Float32x4];

    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<TextVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[derive(Clone, Copy)]
struct GlyphInfo {
    uv_min: [f32; 2],
    uv_max: [f32; 2],
    size: [f32; 2],
    bearing: [f32; 2],
}

impl GlyphInfo {
    const EMPTY: GlyphInfo = GlyphInfo {
        uv_min: [0.0; 2],
        uv_max: [0.0; 2],
        size: [0.0; 2],
        bearing: [0.0; 2],
    };
}

const ATLAS_SIZE: u32 = 2048;
/// Glyphs are rasterized at their on-screen size, up to this many pixels.
const MAX_RASTER_PX: f32 = 256.0;

const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Loads the configured font, or the first system font that can be found.
pub fn load_font(configured: Option<&Path>) -> Option<FontArc> {
    let candidates: Vec<PathBuf> = match configured {
        Some(path) => vec![path.to_path_buf()],
        None => FONT_CANDIDATES.iter().map(PathBuf::from).collect(),
    };

    for path in &candidates {
        let Ok(bytes) = std::fs::read(path) else {
            continue;
        };
        match FontArc::try_from_vec(bytes) {
            Ok(font) => {
                log::info!("using font {}", path.display());
                return Some(font);
            }
            Err(e) => log::warn!("{} is not a usable font: {e}", path.display()),
        }
    }

    log::warn!("no font found (set `canvas.font_path`), text elements will not be drawn");
    None
}

pub struct TextRenderer {
    font: Option<FontArc>,
    tex: wgpu::Texture,
    cache: HashMap<(GlyphId, u32), GlyphInfo>,
    next_x: u32,
    next_y: u32,
    row_h: u32,
    atlas_full: bool,
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    vertices: Vec<TextVertex>,
    indices: Vec<u32>,
    runs: Vec<Range<u32>>,
    vbuf: Option<wgpu::Buffer>,
    ibuf: Option<wgpu::Buffer>,
}

impl TextRenderer {
    pub fn new(
        device: &wgpu::Device,
        fmt: wgpu::TextureFormat,
        uniform_layout: &wgpu::BindGroupLayout,
        font: Option<FontArc>,
    ) -> Self {
        let tex = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("glyph atlas"),
            size: wgpu::Extent3d {
                width: ATLAS_SIZE,
                height: ATLAS_SIZE,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = tex.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("text-bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bgl,
            label: Some("text-bg"),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("text-shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../data/shaders/text.wgsl").into()),
        });
        let pl_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("text-pl"),
            bind_group_layouts: &[uniform_layout, &bgl],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("text-pipe"),
            layout: Some(&pl_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[TextVertex::desc()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: fmt,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: Some(wgpu::DepthStencilState {
                format: STENCIL_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Always,
                stencil: stencil_passthrough(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            font,
            tex,
            cache: HashMap::new(),
            next_x: 0,
            next_y: 0,
            row_h: 0,
            atlas_full: false,
            pipeline,
            bind_group,
            vertices: Vec::new(),
            indices: Vec::new(),
            runs: Vec::new(),
            vbuf: None,
            ibuf: None,
        }
    }

    fn cache_glyph(&mut self, queue: &wgpu::Queue, font: &FontArc, gid: GlyphId, px: u32) -> GlyphInfo {
        let vacant = match self.cache.entry((gid, px)) {
            Entry::Occupied(entry) => return *entry.get(),
            Entry::Vacant(vacant) => vacant,
        };

        let mut glyph = gid.with_scale(PxScale::from(px as f32));
        glyph.position = point(0.0, 0.0);
        let Some(outline) = font.outline_glyph(glyph) else {
            return *vacant.insert(GlyphInfo::EMPTY);
        };

        let bounds = outline.px_bounds();
        let w = bounds.width().ceil() as u32;
        let h = bounds.height().ceil() as u32;
        if w == 0 || h == 0 {
            return *vacant.insert(GlyphInfo::EMPTY);
        }

        if self.next_x + w + 1 >= ATLAS_SIZE {
            self.next_x = 0;
            self.next_y += self.row_h + 1;
            self.row_h = 0;
        }
        if self.next_y + h >= ATLAS_SIZE {
            if !self.atlas_full {
                log::warn!("glyph atlas full, further glyphs are skipped");
                self.atlas_full = true;
            }
            return GlyphInfo::EMPTY;
        }
        self.row_h = self.row_h.max(h);

        let mut coverage = vec![0u8; (w * h) as usize];
        outline.draw(|x, y, v| {
            if x < w && y < h {
                coverage[(y * w + x) as usize] = (v.clamp(0.0, 1.0) * 255.0) as u8;
            }
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.tex,
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: self.next_x,
                    y: self.next_y,
                    z: 0,
                },
                aspect: wgpu::TextureAspect::All,
            },
            &coverage,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(w),
                rows_per_image: Some(h),
            },
            wgpu::Extent3d {
                width: w,
                height: h,
                depth_or_array_layers: 1,
            },
        );

        let atlas = ATLAS_SIZE as f32;
        let info = GlyphInfo {
            uv_min: [self.next_x as f32 / atlas, self.next_y as f32 / atlas],
            uv_max: [(self.next_x + w) as f32 / atlas, (self.next_y + h) as f32 / atlas],
            size: [w as f32, h as f32],
            bearing: [bounds.min.x, bounds.min.y],
        };
        self.next_x += w + 1;
        *vacant.insert(info)
    }

    /// Lays out every run and uploads the glyph quads. Run `i` can then be
    /// drawn with [`TextRenderer::draw_run`].
    pub fn prepare(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, runs: &[TextRun]) {
        self.vertices.clear();
        self.indices.clear();
        self.runs.clear();

        let Some(font) = self.font.clone() else {
            self.runs.resize(runs.len(), 0..0);
            self.vbuf = None;
            self.ibuf = None;
            return;
        };

        for run in runs {
            let start = self.indices.len() as u32;
            self.layout_run(queue, &font, run);
            self.runs.push(start..self.indices.len() as u32);
        }

        if self.indices.is_empty() {
            self.vbuf = None;
            self.ibuf = None;
            return;
        }
        self.vbuf = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("text vbuf"),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        }));
        self.ibuf = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("text ibuf"),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        }));
    }

    fn layout_run(&mut self, queue: &wgpu::Queue, font: &FontArc, run: &TextRun) {
        if run.size_px <= 0.5 {
            return;
        }
        let raster_px = run.size_px.min(MAX_RASTER_PX).round() as u32;
        let to_screen = run.size_px / raster_px as f32;
        let scaled = font.as_scaled(PxScale::from(run.size_px));

        let baseline_y = match run.baseline {
            TextBaseline::Top => run.origin.y + scaled.ascent(),
            TextBaseline::Alphabetic => run.origin.y,
        };
        let mut pen_x = run.origin.x;
        let mut prev: Option<GlyphId> = None;

        for ch in run.text.chars() {
            let gid = font.glyph_id(ch);
            if let Some(prev) = prev {
                pen_x += scaled.kern(prev, gid);
            }
            prev = Some(gid);

            let info = self.cache_glyph(queue, font, gid, raster_px);
            let advance = scaled.h_advance(gid);
            if info.size[0] == 0.0 || info.size[1] == 0.0 {
                pen_x += advance;
                continue;
            }

            let x0 = pen_x + info.bearing[0] * to_screen;
            let y0 = baseline_y + info.bearing[1] * to_screen;
            let x1 = x0 + info.size[0] * to_screen;
            let y1 = y0 + info.size[1] * to_screen;
            let [u0, v0] = info.uv_min;
            let [u1, v1] = info.uv_max;
            let color = run.color;

            let base = self.vertices.len() as u32;
            self.vertices.extend_from_slice(&[
                TextVertex { pos: [x0, y0], uv: [u0, v0], color },
                TextVertex { pos: [x1, y0], uv: [u1, v0], color },
                TextVertex { pos: [x1, y1], uv: [u1, v1], color },
                TextVertex { pos: [x0, y1], uv: [u0, v1], color },
            ]);
            self.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
            pen_x += advance;
        }
    }

    pub fn draw_run(&self, rp: &mut wgpu::RenderPass<'_>, uniform_bind_group: &wgpu::BindGroup, run: usize) {
        let Some(range) = self.runs.get(run).filter(|r| !r.is_empty()) else {
            return;
        };
        if let (Some(vb), Some(ib)) = (&self.vbuf, &self.ibuf) {
            rp.set_pipeline(&self.pipeline);
            rp.set_bind_group(0, uniform_bind_group, &[]);
            rp.set_bind_group(1, &self.bind_group, &[]);
            rp.set_vertex_buffer(0, vb.slice(..));
            rp.set_index_buffer(ib.slice(..), wgpu::IndexFormat::Uint32);
            rp.draw_indexed(range.clone(), 0, 0..1);
        }
    }
}
