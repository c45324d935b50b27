//! Maps raw keyboard, wheel, and pointer input to viewer commands.

use crate::viewer::{ViewerCommand, ViewerState};
use eframe::egui::{Key, Pos2};

/// Viewer shortcut for a key press. Only consulted while the viewer is open.
pub fn command_for_key(key: Key) -> Option<ViewerCommand> {
    match key {
        Key::Escape => Some(ViewerCommand::Close),
        Key::ArrowLeft => Some(ViewerCommand::Prev),
        Key::ArrowRight => Some(ViewerCommand::Next),
        Key::Plus | Key::Equals => Some(ViewerCommand::ZoomIn),
        Key::Minus => Some(ViewerCommand::ZoomOut),
        Key::Num0 => Some(ViewerCommand::ResetZoom),
        _ => None,
    }
}

/// One zoom step per wheel event. `scroll_y` follows egui's convention, where
/// scrolling up is positive: up zooms in, anything else zooms out.
pub fn command_for_wheel(scroll_y: f32) -> ViewerCommand {
    if scroll_y > 0.0 {
        ViewerCommand::ZoomIn
    } else {
        ViewerCommand::ZoomOut
    }
}

/// Tracks the pointer during a pan drag. Panning only starts when the content is
/// zoomed beyond 100%.
#[derive(Debug, Default)]
pub struct PanGesture {
    last_pointer: Option<Pos2>,
}

impl PanGesture {
    pub fn press(&mut self, pointer: Pos2, viewer: &ViewerState) -> Option<ViewerCommand> {
        if viewer.scale() > 1.0 {
            self.last_pointer = Some(pointer);
            Some(ViewerCommand::SetDragging(true))
        } else {
            None
        }
    }

    pub fn moved(&mut self, pointer: Pos2, viewer: &ViewerState) -> Option<ViewerCommand> {
        if !viewer.is_dragging() || viewer.scale() <= 1.0 {
            return None;
        }
        let last = self.last_pointer.replace(pointer)?;
        let delta = pointer - last;
        (delta != eframe::egui::Vec2::ZERO).then_some(ViewerCommand::Pan(delta))
    }

    pub fn release(&mut self) -> ViewerCommand {
        self.last_pointer = None;
        ViewerCommand::SetDragging(false)
    }
}
