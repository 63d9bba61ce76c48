use wgpu::{BindGroup, Buffer, Device, Queue, RenderPipeline, Surface, SurfaceConfiguration, TextureView};
use winit::keyboard::ModifiersState;

use crate::canvas::Uniforms;
use crate::drawing::ElementId;
use crate::math::Vec2;
use crate::scene::TextSurfaceEvent;

pub struct GpuContext {
    pub surface: Surface<'static>,
    pub device: Device,
    pub queue: Queue,
    pub config: SurfaceConfiguration,
    pub stencil_view: TextureView,
}

pub struct Pipelines {
    /// Alpha-blended triangles, ignores the stencil.
    pub mesh: RenderPipeline,
    /// Writes winding numbers into the stencil, no colour.
    pub stencil: RenderPipeline,
    /// Colours where the stencil is non-zero and resets it.
    pub cover: RenderPipeline,
}

pub struct Canvas {
    pub uniform: Uniforms,
    pub uniform_buffer: Buffer,
    pub uniform_bind_group: BindGroup,
}

#[derive(Default)]
pub struct GeometryBuffers {
    pub vertex: Option<Buffer>,
    pub index: Option<Buffer>,
    pub count: u32,
}

pub struct InputState {
    /// Last cursor position in screen (logical) pixels.
    pub cursor: Vec2,
    pub modifiers: ModifiersState,
}

impl InputState {
    /// Ctrl on most platforms, Cmd on macOS.
    pub fn zoom_modifier(&self) -> bool {
        self.modifiers.control_key() || self.modifiers.super_key()
    }
}

/// Keyboard and IME state behind the focused text element.
///
/// The surface owns the text being typed and reports every change as a
/// [`TextSurfaceEvent`]. An IME composition that is cleared without a commit
/// in the same event batch counts as cancelled; see [`TextSurface::settle`].
#[derive(Debug, Default)]
pub struct TextSurface {
    target: Option<ElementId>,
    buffer: String,
    preedit: String,
    cleared_preedit: bool,
}

impl TextSurface {
    pub fn is_active(&self) -> bool {
        self.target.is_some()
    }

    /// The element this surface is currently editing.
    pub fn target(&self) -> Option<ElementId> {
        self.target
    }

    /// Starts editing `element` with an empty buffer.
    pub fn focus(&mut self, element: ElementId) {
        *self = Self {
            target: Some(element),
            ..Default::default()
        };
    }

    pub fn blur(&mut self) {
        *self = Self::default();
    }

    fn changed(&self) -> Option<TextSurfaceEvent> {
        let mut content = self.buffer.clone();
        content.push_str(&self.preedit);
        Some(TextSurfaceEvent::Changed(content))
    }

    pub fn insert(&mut self, text: &str) -> Option<TextSurfaceEvent> {
        if !self.is_active() {
            return None;
        }
        let printable: String = text.chars().filter(|c| !c.is_control()).collect();
        if printable.is_empty() {
            return None;
        }
        self.buffer.push_str(&printable);
        self.changed()
    }

    pub fn backspace(&mut self) -> Option<TextSurfaceEvent> {
        if !self.is_active() {
            return None;
        }
        self.buffer.pop()?;
        self.changed()
    }

    pub fn finish(&mut self) -> Option<TextSurfaceEvent> {
        if !self.is_active() {
            return None;
        }
        self.blur();
        Some(TextSurfaceEvent::FocusLost)
    }

    pub fn preedit(&mut self, text: &str) -> Option<TextSurfaceEvent> {
        if !self.is_active() {
            return None;
        }
        if text.is_empty() {
            if self.preedit.is_empty() {
                return None;
            }
            self.preedit.clear();
            self.cleared_preedit = true;
        } else {
            self.preedit = text.to_owned();
            self.cleared_preedit = false;
        }
        self.changed()
    }

    pub fn commit(&mut self, text: &str) -> Option<TextSurfaceEvent> {
        if !self.is_active() {
            return None;
        }
        self.cleared_preedit = false;
        self.preedit.clear();
        self.buffer.push_str(text);
        self.changed()
    }

    /// Called once the pending window events have been handled.
    pub fn settle(&mut self) -> Option<TextSurfaceEvent> {
        if self.is_active() && std::mem::take(&mut self.cleared_preedit) {
            self.blur();
            return Some(TextSurfaceEvent::CompositionCancelled);
        }
        None
    }
}
