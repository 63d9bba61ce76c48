use winit::dpi::{LogicalPosition, LogicalSize, PhysicalSize};
use winit::event::*;
use winit::keyboard::{Key, NamedKey};

use crate::app_state::State;
use crate::canvas::WheelInput;
use crate::math::Vec2;
use crate::renderer::create_stencil_view;
use crate::scene::TextSurfaceEvent;
use crate::ui::{Toolbar, ToolbarHit};

/// Pixels per line for line-based wheel deltas; only the sign matters.
const LINE_HEIGHT: f32 = 20.0;

impl State {
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.size = new_size;
        self.gpu.config.width = new_size.width;
        self.gpu.config.height = new_size.height;
        self.gpu
            .surface
            .configure(&self.gpu.device, &self.gpu.config);
        self.gpu.stencil_view = create_stencil_view(&self.gpu.device, new_size.width, new_size.height);

        let scale_factor = self.window.scale_factor() as f32;
        let logical = Vec2::new(new_size.width as f32, new_size.height as f32) / scale_factor;
        self.scene.resize(logical, scale_factor);
        self.sync_text_surface();
        self.window.request_redraw();
    }

    /// Returns `true` when the event was consumed.
    pub fn input(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::ModifiersChanged(modifiers) => {
                self.input.modifiers = modifiers.state();
                false
            }
            WindowEvent::CursorMoved { position, .. } => {
                let logical: LogicalPosition<f32> = position.to_logical(self.window.scale_factor());
                self.input.cursor = Vec2::new(logical.x, logical.y);
                let changed = self.scene.pointer_move(self.input.cursor);
                self.redraw_if(changed);
                true
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                self.pointer_pressed();
                true
            }
            WindowEvent::MouseInput {
                state: ElementState::Released,
                button: MouseButton::Left,
                ..
            } => {
                let changed = self.scene.pointer_up();
                self.redraw_if(changed);
                true
            }
            WindowEvent::CursorLeft { .. } | WindowEvent::Focused(false) => {
                let changed = self.scene.cancel_gesture();
                self.redraw_if(changed);
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let delta_y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -y * LINE_HEIGHT,
                    MouseScrollDelta::PixelDelta(pos) => -pos.y as f32,
                };
                let wheel = WheelInput {
                    delta_y,
                    ctrl: self.input.zoom_modifier(),
                    shift: self.input.modifiers.shift_key(),
                };
                let changed = self.scene.wheel(wheel);
                if changed {
                    self.sync_text_surface();
                }
                self.redraw_if(changed);
                true
            }
            WindowEvent::Ime(ime) => {
                let event = match ime {
                    Ime::Preedit(text, _) => self.text_surface.preedit(text),
                    Ime::Commit(text) => self.text_surface.commit(text),
                    Ime::Enabled | Ime::Disabled => None,
                };
                self.apply_text_event(event);
                true
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        logical_key,
                        text,
                        ..
                    },
                ..
            } => {
                if self.text_surface.is_active() {
                    let event = match logical_key {
                        Key::Named(NamedKey::Backspace) => self.text_surface.backspace(),
                        Key::Named(NamedKey::Enter | NamedKey::Escape) => self.text_surface.finish(),
                        _ => text.as_deref().and_then(|t| self.text_surface.insert(t)),
                    };
                    self.apply_text_event(event);
                    return true;
                }
                self.shortcut(logical_key)
            }
            _ => false,
        }
    }

    fn pointer_pressed(&mut self) {
        let cursor = self.input.cursor;
        if self.toolbar.contains(cursor) {
            match self.toolbar.handle_click(cursor) {
                Some(ToolbarHit::Tool(tool)) => {
                    let changed = self.scene.set_tool(tool);
                    self.redraw_if(changed);
                }
                Some(ToolbarHit::Color(color)) => {
                    self.scene.session.color.set_color(color);
                    log::debug!("stroke colour {color}");
                    self.window.request_redraw();
                }
                None => {}
            }
            return;
        }

        let changed = self.scene.pointer_down(cursor);
        self.sync_text_surface();
        self.redraw_if(changed);
    }

    fn shortcut(&mut self, key: &Key) -> bool {
        let Key::Character(ch) = key else {
            return false;
        };
        let changed = if self.input.zoom_modifier() {
            match ch.as_str() {
                "=" | "+" => self.scene.zoom_in(),
                "-" | "_" => self.scene.zoom_out(),
                _ => return false,
            }
        } else {
            let Some(tool) = ch
                .chars()
                .next()
                .and_then(|c| c.to_digit(10))
                .and_then(Toolbar::tool_for_digit)
            else {
                return false;
            };
            self.scene.set_tool(tool)
        };
        self.sync_text_surface();
        self.redraw_if(changed);
        true
    }

    /// Forwards a text-surface change to the scene. Also used for the
    /// end-of-batch IME check.
    pub fn apply_text_event(&mut self, event: Option<TextSurfaceEvent>) {
        let Some(event) = event else {
            return;
        };
        let changed = self.scene.text_event(event);
        self.sync_text_surface();
        self.redraw_if(changed);
    }

    /// Matches the window's IME state to the scene's text focus.
    fn sync_text_surface(&mut self) {
        match self.scene.session.text_focus() {
            Some(focus) => {
                if self.text_surface.target() != Some(focus.element) {
                    self.text_surface.focus(focus.element);
                    self.window.set_ime_allowed(true);
                }
                let line = self.scene.defaults.font.size_px * self.scene.viewport.scale();
                self.window.set_ime_cursor_area(
                    LogicalPosition::new(focus.screen_position.x, focus.screen_position.y),
                    LogicalSize::new(1.0, line.max(1.0)),
                );
            }
            None => {
                if self.text_surface.is_active() {
                    self.text_surface.blur();
                }
                self.window.set_ime_allowed(false);
            }
        }
    }

    fn redraw_if(&self, changed: bool) {
        if changed {
            self.window.request_redraw();
        }
    }
}
