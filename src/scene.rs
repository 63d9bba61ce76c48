use crate::canvas::{CanvasTransform, WheelInput};
use crate::color::ColorControl;
use crate::drawing::{Element, ElementId, ElementKind, FontDescriptor, Style, Tool};
use crate::math::Vec2;
use crate::session::{Gesture, Session, TextFocus};

/// Values stamped onto every new element.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementDefaults {
    pub line_width: f32,
    pub font: FontDescriptor,
}

impl Default for ElementDefaults {
    fn default() -> Self {
        Self {
            line_width: 3.0,
            font: FontDescriptor::default(),
        }
    }
}

/// Events coming back from the editable text surface.
#[derive(Debug, Clone, PartialEq)]
pub enum TextSurfaceEvent {
    /// The surface content changed; carries the full current content.
    Changed(String),
    /// An input-method composition was dropped without committing anything.
    CompositionCancelled,
    FocusLost,
}

/// Drawing buffer, viewport and session state.
///
/// Every input handler returns `true` when the scene changed and a redraw
/// is needed.
#[derive(Debug, Clone)]
pub struct Scene {
    elements: Vec<Element>,
    pub viewport: CanvasTransform,
    pub session: Session,
    pub defaults: ElementDefaults,
}

impl Scene {
    pub fn new(viewport: CanvasTransform, defaults: ElementDefaults, color: ColorControl) -> Self {
        Self {
            elements: Vec::new(),
            viewport,
            session: Session::new(color),
            defaults,
        }
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.0)
    }

    pub fn set_tool(&mut self, tool: Tool) -> bool {
        self.session.set_tool(tool)
    }

    pub fn pointer_down(&mut self, screen_pos: Vec2) -> bool {
        if self.session.release_text_focus().is_some() {
            log::debug!("text focus released by pointer down");
        }
        if let Some(stale) = self.session.end_gesture() {
            log::debug!("finalizing {} left open by a missing pointer up", stale);
        }

        let anchor = self.viewport.screen_to_canvas(screen_pos);
        let id = ElementId(self.elements.len());
        let tool = self.session.tool();
        let style = Style::stroke(self.session.color.color(), self.defaults.line_width);
        let element = Element::create(id, tool, anchor, style, &self.defaults.font);

        log::debug!("create {} {} at ({:.1}, {:.1})", element.kind_name(), id, anchor.x, anchor.y);

        if element.is_text() {
            self.session.focus_text(TextFocus {
                element: id,
                screen_position: self.viewport.canvas_to_screen(anchor),
            });
        }
        self.elements.push(element);
        self.session.select(id);
        self.session.begin_gesture(id);
        true
    }

    pub fn pointer_move(&mut self, screen_pos: Vec2) -> bool {
        let Gesture::Drawing { element } = self.session.gesture() else {
            return false;
        };
        let extent = self.viewport.screen_to_canvas(screen_pos);
        match self.elements.get_mut(element.0) {
            Some(target) if !target.is_text() => {
                target.update(extent);
                true
            }
            _ => false,
        }
    }

    /// Ends the gesture. The element keeps the geometry of the last move.
    pub fn pointer_up(&mut self) -> bool {
        self.session.end_gesture();
        false
    }

    /// Abandons the gesture (pointer left the window, focus lost). The
    /// element is kept as drawn so far.
    pub fn cancel_gesture(&mut self) -> bool {
        if let Some(element) = self.session.end_gesture() {
            log::debug!("gesture on {} cancelled", element);
        }
        false
    }

    pub fn wheel(&mut self, wheel: WheelInput) -> bool {
        let changed = self.viewport.apply_wheel(wheel);
        if changed {
            self.refresh_text_focus();
        }
        changed
    }

    pub fn zoom_in(&mut self) -> bool {
        self.viewport.zoom_in();
        self.refresh_text_focus();
        true
    }

    pub fn zoom_out(&mut self) -> bool {
        self.viewport.zoom_out();
        self.refresh_text_focus();
        true
    }

    pub fn resize(&mut self, size: Vec2, device_pixel_ratio: f32) -> bool {
        self.viewport.resize(size, device_pixel_ratio);
        self.refresh_text_focus();
        true
    }

    pub fn text_event(&mut self, event: TextSurfaceEvent) -> bool {
        match event {
            TextSurfaceEvent::Changed(text) => {
                let Some(focus) = self.session.text_focus() else {
                    return false;
                };
                match self.elements.get_mut(focus.element.0) {
                    Some(Element {
                        kind: ElementKind::Text { content, .. },
                        ..
                    }) => {
                        *content = text;
                        true
                    }
                    _ => false,
                }
            }
            TextSurfaceEvent::CompositionCancelled | TextSurfaceEvent::FocusLost => {
                if let Some(focus) = self.session.release_text_focus() {
                    log::debug!("text focus on {} released ({:?})", focus.element, event);
                }
                false
            }
        }
    }

    fn refresh_text_focus(&mut self) {
        let Some(focus) = self.session.text_focus() else {
            return;
        };
        if let Some(Element {
            kind: ElementKind::Text { position, .. },
            ..
        }) = self.elements.get(focus.element.0)
        {
            self.session.focus_text(TextFocus {
                element: focus.element,
                screen_position: self.viewport.canvas_to_screen(*position),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::drawing::{Bounds, ShapeKind};

    fn scene() -> Scene {
        Scene::new(
            CanvasTransform::new(Vec2::new(800.0, 600.0), 1.0),
            ElementDefaults::default(),
            ColorControl::new(Rgb::new(10, 20, 30)),
        )
    }

    fn bounds(scene: &Scene, index: usize) -> Bounds {
        match &scene.elements()[index].kind {
            ElementKind::Shape { bounds, .. } => *bounds,
            other => panic!("expected a shape, got {:?}", other),
        }
    }

    #[test]
    fn ids_follow_buffer_length() {
        let mut scene = scene();
        scene.set_tool(Tool::Line);
        for i in 0..3 {
            scene.pointer_down(Vec2::new(i as f32, 0.0));
            scene.pointer_up();
            assert_eq!(scene.elements()[i].id, ElementId(i));
            assert_eq!(scene.session.selected(), Some(ElementId(i)));
        }
    }

    #[test]
    fn new_elements_take_current_colour_and_width() {
        let mut scene = scene();
        scene.set_tool(Tool::Freehand);
        scene.pointer_down(Vec2::ZERO);
        let style = &scene.elements()[0].style;
        assert_eq!(style.stroke_color, Rgb::new(10, 20, 30));
        assert_eq!(style.line_width, 3.0);
        assert_eq!(style.fill_color, None);
    }

    #[test]
    fn pointer_positions_go_through_the_viewport() {
        let mut scene = scene();
        scene.viewport.offset = Vec2::new(100.0, 50.0);
        scene.set_tool(Tool::Rectangle);
        scene.pointer_down(Vec2::new(110.0, 60.0));
        scene.pointer_move(Vec2::new(150.0, 80.0));
        let b = bounds(&scene, 0);
        assert_eq!(b.anchor, Vec2::new(10.0, 10.0));
        assert_eq!(b.extent, Vec2::new(40.0, 20.0));
    }

    #[test]
    fn moves_outside_a_gesture_are_ignored() {
        let mut scene = scene();
        scene.set_tool(Tool::Line);
        assert!(!scene.pointer_move(Vec2::new(5.0, 5.0)));
        scene.pointer_down(Vec2::ZERO);
        scene.pointer_up();
        assert!(!scene.pointer_move(Vec2::new(9.0, 9.0)));
        assert_eq!(bounds(&scene, 0).extent, Vec2::ZERO);
    }

    #[test]
    fn only_the_last_element_changes() {
        let mut scene = scene();
        scene.set_tool(Tool::Ellipse);
        scene.pointer_down(Vec2::ZERO);
        scene.pointer_move(Vec2::new(5.0, 5.0));
        scene.pointer_up();
        scene.pointer_down(Vec2::new(20.0, 20.0));
        scene.pointer_move(Vec2::new(25.0, 30.0));
        assert_eq!(bounds(&scene, 0).extent, Vec2::new(10.0, 10.0));
        assert_eq!(bounds(&scene, 1).extent, Vec2::new(10.0, 20.0));
        assert!(matches!(
            scene.elements()[1].kind,
            ElementKind::Shape { kind: ShapeKind::Ellipse, .. }
        ));
    }

    #[test]
    fn stale_gesture_is_finalized_on_next_pointer_down() {
        let mut scene = scene();
        scene.set_tool(Tool::Freehand);
        scene.pointer_down(Vec2::ZERO);
        scene.pointer_move(Vec2::new(1.0, 1.0));
        // no pointer up
        scene.pointer_down(Vec2::new(10.0, 10.0));
        scene.pointer_move(Vec2::new(11.0, 11.0));
        match &scene.elements()[0].kind {
            ElementKind::Freehand { points } => assert_eq!(points.len(), 2),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(scene.session.gesture(), Gesture::Drawing { element: ElementId(1) });
    }

    #[test]
    fn cancel_returns_to_idle_and_keeps_the_element() {
        let mut scene = scene();
        scene.set_tool(Tool::Rectangle);
        scene.pointer_down(Vec2::ZERO);
        scene.pointer_move(Vec2::new(4.0, 4.0));
        scene.cancel_gesture();
        assert!(!scene.session.is_drawing());
        assert!(!scene.pointer_move(Vec2::new(8.0, 8.0)));
        assert_eq!(bounds(&scene, 0).extent, Vec2::new(4.0, 4.0));
    }

    #[test]
    fn text_focus_tracks_the_viewport() {
        let mut scene = scene();
        scene.viewport.offset = Vec2::new(20.0, 0.0);
        scene.pointer_down(Vec2::new(120.0, 40.0));
        let focus = scene.session.text_focus().expect("focused");
        assert_eq!(focus.element, ElementId(0));
        assert_eq!(focus.screen_position, Vec2::new(120.0, 40.0));

        scene.wheel(WheelInput { delta_y: 1.0, ..Default::default() });
        let focus = scene.session.text_focus().expect("still focused");
        assert_eq!(focus.screen_position, Vec2::new(120.0, 47.0));
    }

    #[test]
    fn text_changes_reach_the_focused_element_only() {
        let mut scene = scene();
        scene.pointer_down(Vec2::ZERO);
        scene.pointer_up();
        assert!(scene.text_event(TextSurfaceEvent::Changed("hi".into())));
        scene.pointer_down(Vec2::new(0.0, 100.0));
        assert!(scene.text_event(TextSurfaceEvent::Changed("there".into())));

        let contents: Vec<_> = scene
            .elements()
            .iter()
            .map(|e| match &e.kind {
                ElementKind::Text { content, .. } => content.as_str(),
                _ => "",
            })
            .collect();
        assert_eq!(contents, ["hi", "there"]);
    }

    #[test]
    fn released_focus_ignores_further_text() {
        let mut scene = scene();
        scene.pointer_down(Vec2::ZERO);
        scene.text_event(TextSurfaceEvent::Changed("a".into()));
        assert!(!scene.text_event(TextSurfaceEvent::CompositionCancelled));
        assert!(scene.session.text_focus().is_none());
        assert!(!scene.text_event(TextSurfaceEvent::Changed("ab".into())));
        match &scene.elements()[0].kind {
            ElementKind::Text { content, .. } => assert_eq!(content, "a"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn pointer_down_with_another_tool_releases_text_focus() {
        let mut scene = scene();
        scene.pointer_down(Vec2::ZERO);
        scene.pointer_up();
        scene.set_tool(Tool::Line);
        scene.pointer_down(Vec2::new(5.0, 5.0));
        assert!(scene.session.text_focus().is_none());
    }
}
