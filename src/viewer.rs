//! Modal viewer state: which file is inspected and how it is zoomed and panned.
//!
//! All transitions are total. Navigation wraps around the collection, zoom is
//! clamped to `[MIN_VIEWER_SCALE, MAX_VIEWER_SCALE]`, and pan offsets accumulate
//! without bounds (the renderer clips).

use crate::constants::{MAX_VIEWER_SCALE, MIN_VIEWER_SCALE, ZOOM_STEP};
use eframe::egui::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpenViewer {
    pub current_index: usize,
    pub scale: f32,
    pub position: Vec2,
    pub is_dragging: bool,
}

impl OpenViewer {
    fn at(index: usize) -> Self {
        Self {
            current_index: index,
            scale: 1.0,
            position: Vec2::ZERO,
            is_dragging: false,
        }
    }

    fn reset_view(&mut self) {
        self.scale = 1.0;
        self.position = Vec2::ZERO;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ViewerState {
    #[default]
    Closed,
    Open(OpenViewer),
}

/// Every input the viewer reacts to, as dispatched by keyboard, wheel, and buttons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewerCommand {
    Open(usize),
    Close,
    Next,
    Prev,
    ZoomIn,
    ZoomOut,
    ResetZoom,
    Pan(Vec2),
    SetDragging(bool),
}

impl ViewerState {
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open(_))
    }

    pub fn current_index(&self) -> Option<usize> {
        match self {
            Self::Open(open) => Some(open.current_index),
            Self::Closed => None,
        }
    }

    pub fn scale(&self) -> f32 {
        match self {
            Self::Open(open) => open.scale,
            Self::Closed => 1.0,
        }
    }

    pub fn position(&self) -> Vec2 {
        match self {
            Self::Open(open) => open.position,
            Self::Closed => Vec2::ZERO,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Open(open) if open.is_dragging)
    }

    /// Applies one command. `len` is the current collection length, used for
    /// wrap-around navigation.
    pub fn apply(&mut self, command: ViewerCommand, len: usize) {
        match command {
            ViewerCommand::Open(index) => self.open(index),
            ViewerCommand::Close => self.close(),
            ViewerCommand::Next => self.next(len),
            ViewerCommand::Prev => self.prev(len),
            ViewerCommand::ZoomIn => self.zoom_in(),
            ViewerCommand::ZoomOut => self.zoom_out(),
            ViewerCommand::ResetZoom => self.reset_zoom(),
            ViewerCommand::Pan(delta) => self.update_position(delta.x, delta.y),
            ViewerCommand::SetDragging(dragging) => self.set_dragging(dragging),
        }
    }

    pub fn open(&mut self, index: usize) {
        log::debug!("viewer open at {index}");
        *self = Self::Open(OpenViewer::at(index));
    }

    pub fn close(&mut self) {
        if self.is_open() {
            log::debug!("viewer closed");
        }
        *self = Self::Closed;
    }

    pub fn next(&mut self, len: usize) {
        if let Self::Open(open) = self {
            if len == 0 {
                return;
            }
            open.current_index = (open.current_index + 1) % len;
            open.reset_view();
        }
    }

    pub fn prev(&mut self, len: usize) {
        if let Self::Open(open) = self {
            if len == 0 {
                return;
            }
            open.current_index = (open.current_index % len + len - 1) % len;
            open.reset_view();
        }
    }

    pub fn zoom_in(&mut self) {
        if let Self::Open(open) = self {
            open.scale = (open.scale * ZOOM_STEP).min(MAX_VIEWER_SCALE);
        }
    }

    pub fn zoom_out(&mut self) {
        if let Self::Open(open) = self {
            open.scale = (open.scale / ZOOM_STEP).max(MIN_VIEWER_SCALE);
        }
    }

    pub fn reset_zoom(&mut self) {
        if let Self::Open(open) = self {
            open.reset_view();
        }
    }

    /// Accumulates a pan delta. Gating on `scale > 1` is the caller's job.
    pub fn update_position(&mut self, dx: f32, dy: f32) {
        if let Self::Open(open) = self {
            open.position += Vec2::new(dx, dy);
        }
    }

    pub fn set_dragging(&mut self, dragging: bool) {
        if let Self::Open(open) = self {
            open.is_dragging = dragging;
        }
    }

    /// Keeps the viewer consistent after the record at `removed` left a collection
    /// that now holds `remaining` records.
    ///
    /// Removing the viewed record shows its successor (or the new last record) with
    /// a fresh zoom, and closes the viewer once nothing is left. Removing an earlier
    /// record shifts the index so the same record stays in view.
    pub fn record_removed(&mut self, removed: usize, remaining: usize) {
        let Self::Open(open) = self else {
            return;
        };

        if remaining == 0 {
            self.close();
            return;
        }

        if removed == open.current_index {
            open.current_index = open.current_index.min(remaining - 1);
            open.reset_view();
            open.is_dragging = false;
        } else if removed < open.current_index {
            open.current_index -= 1;
        }
    }

    /// Follows the viewed record after the record at `from` was spliced into `to`.
    /// Any pan drag in progress ends.
    pub fn record_moved(&mut self, from: usize, to: usize, len: usize) {
        if let Self::Open(open) = self {
            let current = open.current_index;
            open.current_index = if current == from {
                to
            } else if from < current && current <= to {
                current - 1
            } else if to <= current && current < from {
                current + 1
            } else {
                current
            };
            open.is_dragging = false;
        }
        self.revalidate(len);
    }

    /// Re-clamps a stale index against the collection length, closing on empty.
    pub fn revalidate(&mut self, len: usize) {
        let Self::Open(open) = self else {
            return;
        };
        if len == 0 {
            self.close();
        } else if open.current_index >= len {
            open.current_index = len - 1;
            open.reset_view();
            open.is_dragging = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opened(index: usize) -> ViewerState {
        let mut viewer = ViewerState::default();
        viewer.open(index);
        viewer
    }

    #[test]
    fn test_initial_state_is_closed() {
        let viewer = ViewerState::default();
        assert!(!viewer.is_open());
        assert_eq!(viewer.current_index(), None);
        assert_eq!(viewer.scale(), 1.0);
        assert_eq!(viewer.position(), Vec2::ZERO);
        assert!(!viewer.is_dragging());
    }

    #[test]
    fn test_six_zoom_ins_clamp_to_max() {
        let mut viewer = opened(0);
        for _ in 0..6 {
            viewer.zoom_in();
        }
        assert_eq!(viewer.scale(), MAX_VIEWER_SCALE);
    }

    #[test]
    fn test_zoom_out_floor() {
        let mut viewer = opened(0);
        viewer.zoom_out();
        viewer.zoom_out();
        assert_eq!(viewer.scale(), MIN_VIEWER_SCALE);
        viewer.zoom_out();
        assert_eq!(viewer.scale(), MIN_VIEWER_SCALE);
    }

    #[test]
    fn test_two_zoom_ins() {
        let mut viewer = opened(0);
        viewer.zoom_in();
        viewer.zoom_in();
        assert!((viewer.scale() - 2.25).abs() < f32::EPSILON);
    }

    #[test]
    fn test_navigation_wraps() {
        let mut viewer = opened(2);
        viewer.next(3);
        assert_eq!(viewer.current_index(), Some(0));
        viewer.prev(3);
        assert_eq!(viewer.current_index(), Some(2));
        viewer.prev(3);
        assert_eq!(viewer.current_index(), Some(1));
    }

    #[test]
    fn test_navigation_on_empty_collection_is_noop() {
        let mut viewer = opened(0);
        viewer.zoom_in();
        viewer.next(0);
        viewer.prev(0);
        assert_eq!(viewer.current_index(), Some(0));
        assert_eq!(viewer.scale(), ZOOM_STEP);
    }

    #[test]
    fn test_navigation_resets_zoom_and_pan() {
        let mut viewer = opened(0);
        viewer.zoom_in();
        viewer.update_position(10.0, -4.0);
        viewer.next(2);
        assert_eq!(viewer.scale(), 1.0);
        assert_eq!(viewer.position(), Vec2::ZERO);
    }

    #[test]
    fn test_open_overrides_prior_zoom_and_pan() {
        let mut viewer = opened(1);
        viewer.zoom_in();
        viewer.update_position(3.0, 3.0);
        viewer.set_dragging(true);
        viewer.open(4);
        assert_eq!(viewer.current_index(), Some(4));
        assert_eq!(viewer.scale(), 1.0);
        assert_eq!(viewer.position(), Vec2::ZERO);
        assert!(!viewer.is_dragging());
    }

    #[test]
    fn test_pan_accumulates_without_clamping() {
        let mut viewer = opened(0);
        viewer.update_position(5000.0, 1.0);
        viewer.update_position(1.0, -9000.0);
        assert_eq!(viewer.position(), Vec2::new(5001.0, -8999.0));
    }

    #[test]
    fn test_reset_zoom() {
        let mut viewer = opened(0);
        viewer.zoom_in();
        viewer.update_position(2.0, 2.0);
        viewer.reset_zoom();
        assert_eq!(viewer.scale(), 1.0);
        assert_eq!(viewer.position(), Vec2::ZERO);
    }

    #[test]
    fn test_commands_ignored_while_closed() {
        let mut viewer = ViewerState::default();
        viewer.apply(ViewerCommand::ZoomIn, 3);
        viewer.apply(ViewerCommand::Next, 3);
        viewer.apply(ViewerCommand::Pan(Vec2::new(1.0, 1.0)), 3);
        viewer.apply(ViewerCommand::SetDragging(true), 3);
        assert_eq!(viewer, ViewerState::Closed);
    }

    #[test]
    fn test_close_resets_view() {
        let mut viewer = opened(1);
        viewer.zoom_in();
        viewer.close();
        assert!(!viewer.is_open());
        assert_eq!(viewer.scale(), 1.0);
        assert_eq!(viewer.position(), Vec2::ZERO);
    }

    #[test]
    fn test_removing_viewed_last_record_clamps() {
        let mut viewer = opened(2);
        viewer.zoom_in();
        viewer.record_removed(2, 2);
        assert_eq!(viewer.current_index(), Some(1));
        assert_eq!(viewer.scale(), 1.0);
    }

    #[test]
    fn test_removing_earlier_record_keeps_same_record_in_view() {
        let mut viewer = opened(2);
        viewer.zoom_in();
        viewer.record_removed(0, 3);
        assert_eq!(viewer.current_index(), Some(1));
        assert_eq!(viewer.scale(), ZOOM_STEP);
    }

    #[test]
    fn test_removing_later_record_changes_nothing() {
        let mut viewer = opened(0);
        viewer.record_removed(1, 1);
        assert_eq!(viewer.current_index(), Some(0));
    }

    #[test]
    fn test_removing_only_record_closes() {
        let mut viewer = opened(0);
        viewer.record_removed(0, 0);
        assert!(!viewer.is_open());
    }

    #[test]
    fn test_viewed_record_is_followed_through_a_move() {
        // Moving the viewed record itself.
        let mut viewer = opened(0);
        viewer.zoom_in();
        viewer.set_dragging(true);
        viewer.record_moved(0, 2, 3);
        assert_eq!(viewer.current_index(), Some(2));
        assert!((viewer.scale() - 1.5).abs() < f32::EPSILON);
        assert!(!viewer.is_dragging());

        // A record moving from before to after the viewed one.
        let mut viewer = opened(1);
        viewer.record_moved(0, 2, 3);
        assert_eq!(viewer.current_index(), Some(0));

        // A record moving from after to before the viewed one.
        let mut viewer = opened(1);
        viewer.record_moved(2, 0, 3);
        assert_eq!(viewer.current_index(), Some(2));

        // Moves entirely on one side leave the index alone.
        let mut viewer = opened(0);
        viewer.record_moved(1, 2, 3);
        assert_eq!(viewer.current_index(), Some(0));
    }

    #[test]
    fn test_record_moved_while_closed_stays_closed() {
        let mut viewer = ViewerState::default();
        viewer.record_moved(0, 1, 2);
        assert!(!viewer.is_open());
    }

    #[test]
    fn test_revalidate_clamps_stale_index() {
        let mut viewer = opened(5);
        viewer.revalidate(3);
        assert_eq!(viewer.current_index(), Some(2));
        viewer.revalidate(0);
        assert!(!viewer.is_open());
    }
}
