//! Frame stepping for animated images shown in the viewer.

use crate::image_loader::AnimationFrame;
use egui::ColorImage;
use std::time::Duration;

pub struct Animation {
    frames: Vec<AnimationFrame>,
    current_frame: usize,
    frame_elapsed: Duration,
}

impl Animation {
    /// Returns None for an empty frame list.
    pub fn new(frames: Vec<AnimationFrame>) -> Option<Self> {
        if frames.is_empty() {
            return None;
        }
        Some(Self {
            frames,
            current_frame: 0,
            frame_elapsed: Duration::ZERO,
        })
    }

    pub fn is_animated(&self) -> bool {
        self.frames.len() > 1
    }

    pub fn current_image(&self) -> &ColorImage {
        &self.frames[self.current_frame].image
    }

    /// Advances by `dt` seconds, looping forever. Returns true if the visible frame changed.
    pub fn update(&mut self, dt: f32) -> bool {
        if !self.is_animated() {
            return false;
        }

        self.frame_elapsed += Duration::from_secs_f32(dt.max(0.0));
        let mut updated = false;
        while self.frame_elapsed >= self.frames[self.current_frame].duration {
            self.frame_elapsed -= self.frames[self.current_frame].duration;
            self.current_frame = (self.current_frame + 1) % self.frames.len();
            updated = true;
        }
        updated
    }

    pub fn time_until_next_frame(&self) -> Option<Duration> {
        if !self.is_animated() {
            return None;
        }

        let remaining = self.frames[self.current_frame]
            .duration
            .saturating_sub(self.frame_elapsed);
        if remaining.is_zero() {
            Some(Duration::from_millis(1))
        } else {
            Some(remaining)
        }
    }
}
