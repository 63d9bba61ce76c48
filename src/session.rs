use crate::color::ColorControl;
use crate::drawing::{ElementId, Tool};
use crate::math::Vec2;

/// Pointer gesture state. `Drawing` references the element being shaped,
/// which is always the last one in the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Drawing { element: ElementId },
}

/// The text element currently receiving keyboard input, and where its
/// editable region sits on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextFocus {
    pub element: ElementId,
    pub screen_position: Vec2,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    tool: Tool,
    pub color: ColorControl,
    gesture: Gesture,
    selected: Option<ElementId>,
    text_focus: Option<TextFocus>,
}

impl Session {
    pub fn new(color: ColorControl) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn set_tool(&mut self, tool: Tool) -> bool {
        if self.tool == tool {
            return false;
        }
        log::debug!("tool: {} -> {}", self.tool.name(), tool.name());
        self.tool = tool;
        true
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.gesture, Gesture::Drawing { .. })
    }

    pub(crate) fn begin_gesture(&mut self, element: ElementId) {
        self.gesture = Gesture::Drawing { element };
    }

    /// Returns the element whose gesture just ended, if any.
    pub(crate) fn end_gesture(&mut self) -> Option<ElementId> {
        match std::mem::take(&mut self.gesture) {
            Gesture::Drawing { element } => Some(element),
            Gesture::Idle => None,
        }
    }

    pub fn selected(&self) -> Option<ElementId> {
        self.selected
    }

    pub(crate) fn select(&mut self, element: ElementId) {
        self.selected = Some(element);
    }

    pub fn text_focus(&self) -> Option<TextFocus> {
        self.text_focus
    }

    pub(crate) fn focus_text(&mut self, focus: TextFocus) {
        self.text_focus = Some(focus);
    }

    pub(crate) fn release_text_focus(&mut self) -> Option<TextFocus> {
        self.text_focus.take()
    }
}
