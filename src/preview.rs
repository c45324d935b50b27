//! Preview handles and the texture cache behind them.
//!
//! A `PreviewHandle` is issued once per record and stays valid until revoked.
//! Revoking drops the cached textures, which frees them on the GPU side.
//! Thumbnails decode on the rayon pool and are uploaded when polled. Only the
//! record in the viewer holds full-size media, and it is released as soon as the
//! viewer moves elsewhere.

use crate::file_record::{FileSource, PreviewHandle};
use crate::format::FileKind;
use crate::image_loader;
use crate::playback::Animation;
use crate::video_frame;
use crate::video_player::VideoPlayer;
use eframe::egui::{self, ColorImage, TextureHandle, TextureOptions};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

/// Issues and revokes preview handles for file sources.
pub trait PreviewHost {
    fn create(&mut self, source: &FileSource) -> PreviewHandle;
    fn revoke(&mut self, handle: &PreviewHandle);
}

#[derive(Clone)]
pub enum PreviewStatus {
    Pending,
    Ready(TextureHandle),
    Unavailable,
}

/// Full-size media for the record in the viewer.
pub enum ViewerMedia {
    Still(TextureHandle),
    Animated {
        animation: Animation,
        texture: TextureHandle,
    },
    /// `texture` stays empty until the decoder delivers its first frame.
    Video {
        player: VideoPlayer,
        texture: Option<TextureHandle>,
    },
    Unavailable,
}

impl ViewerMedia {
    pub fn texture(&self) -> Option<&TextureHandle> {
        match self {
            Self::Still(texture) | Self::Animated { texture, .. } => Some(texture),
            Self::Video { texture, .. } => texture.as_ref(),
            Self::Unavailable => None,
        }
    }

    pub fn video(&self) -> Option<&VideoPlayer> {
        match self {
            Self::Video { player, .. } => Some(player),
            _ => None,
        }
    }
}

struct ViewerSlot {
    handle: PreviewHandle,
    media: ViewerMedia,
}

struct PreviewEntry {
    path: PathBuf,
    kind: FileKind,
    thumbnail: PreviewStatus,
}

type DecodedThumbnail = (PreviewHandle, Option<ColorImage>);

/// Texture-backed previews: thumbnails for the grid and one full-size slot for the viewer.
pub struct TexturePreviews {
    ctx: egui::Context,
    entries: HashMap<PreviewHandle, PreviewEntry>,
    next_seq: u64,
    thumbnail_size: u32,
    viewer_max_dimension: u32,
    decoded_tx: Sender<DecodedThumbnail>,
    decoded_rx: Receiver<DecodedThumbnail>,
    viewer: Option<ViewerSlot>,
}

impl TexturePreviews {
    pub fn new(ctx: egui::Context, thumbnail_size: u32, viewer_max_dimension: u32) -> Self {
        let (decoded_tx, decoded_rx) = mpsc::channel();
        Self {
            ctx,
            entries: HashMap::new(),
            next_seq: 0,
            thumbnail_size,
            viewer_max_dimension,
            decoded_tx,
            decoded_rx,
            viewer: None,
        }
    }

    pub fn thumbnail(&self, handle: &PreviewHandle) -> PreviewStatus {
        self.entries
            .get(handle)
            .map(|entry| entry.thumbnail.clone())
            .unwrap_or(PreviewStatus::Unavailable)
    }

    pub fn has_pending(&self) -> bool {
        self.entries
            .values()
            .any(|entry| matches!(entry.thumbnail, PreviewStatus::Pending))
    }

    /// Uploads every thumbnail the workers have finished since the last call.
    /// Results for revoked handles are discarded. Returns true if any entry changed.
    pub fn poll_thumbnails(&mut self) -> bool {
        let mut changed = false;
        while let Ok((handle, image)) = self.decoded_rx.try_recv() {
            if !self.entries.contains_key(&handle) {
                continue;
            }
            let status = match image {
                Some(image) => PreviewStatus::Ready(self.ctx.load_texture(
                    format!("{handle}/thumb"),
                    image,
                    TextureOptions::LINEAR,
                )),
                None => PreviewStatus::Unavailable,
            };
            if let Some(entry) = self.entries.get_mut(&handle) {
                entry.thumbnail = status;
                changed = true;
            }
        }
        changed
    }

    /// Full-size media for `handle`, loading it on first use. Switching to a new
    /// handle releases the media of the previous one.
    pub fn viewer_media(&mut self, handle: &PreviewHandle) -> Option<&mut ViewerMedia> {
        let (path, kind) = self
            .entries
            .get(handle)
            .map(|entry| (entry.path.clone(), entry.kind))?;
        let loaded = self.viewer.as_ref().is_some_and(|slot| &slot.handle == handle);
        if !loaded {
            // Free the old textures before decoding the next ones.
            self.viewer = None;
            let media = self.load_viewer_media(handle, &path, kind);
            self.viewer = Some(ViewerSlot {
                handle: handle.clone(),
                media,
            });
        }
        self.viewer.as_mut().map(|slot| &mut slot.media)
    }

    pub fn viewer_handle(&self) -> Option<&PreviewHandle> {
        self.viewer.as_ref().map(|slot| &slot.handle)
    }

    pub fn release_viewer_media(&mut self) {
        if let Some(slot) = self.viewer.take() {
            log::debug!("released viewer media for {}", slot.handle);
        }
    }

    /// Steps the viewer's animation or pulls its newest video frame. Returns how
    /// long until the next animation frame is due.
    pub fn advance_viewer(&mut self, dt: f32) -> Option<Duration> {
        let slot = self.viewer.as_mut()?;
        match &mut slot.media {
            ViewerMedia::Animated { animation, texture } => {
                if animation.update(dt) {
                    texture.set(animation.current_image().clone(), TextureOptions::LINEAR);
                }
                animation.time_until_next_frame()
            }
            ViewerMedia::Video { player, texture } => {
                if let Some(image) = player.poll() {
                    if let Some(existing) = texture.as_mut() {
                        existing.set(image, TextureOptions::LINEAR);
                    } else {
                        *texture = Some(self.ctx.load_texture(
                            format!("{}/full", slot.handle),
                            image,
                            TextureOptions::LINEAR,
                        ));
                    }
                }
                None
            }
            ViewerMedia::Still(_) | ViewerMedia::Unavailable => None,
        }
    }

    pub fn toggle_video(&mut self) {
        if let Some(ViewerSlot {
            media: ViewerMedia::Video { player, .. },
            ..
        }) = self.viewer.as_mut()
        {
            player.toggle();
        }
    }

    fn load_viewer_media(&self, handle: &PreviewHandle, path: &Path, kind: FileKind) -> ViewerMedia {
        let label = format!("{handle}/full");
        match kind {
            FileKind::Image => {
                let frames = match image_loader::load_frames_scaled(path, self.viewer_max_dimension, false) {
                    Ok(frames) => frames,
                    Err(err) => {
                        log::warn!("viewer preview unavailable: {err}");
                        return ViewerMedia::Unavailable;
                    }
                };
                let Some(animation) = Animation::new(frames) else {
                    return ViewerMedia::Unavailable;
                };
                let texture = self.ctx.load_texture(
                    label,
                    animation.current_image().clone(),
                    TextureOptions::LINEAR,
                );
                if animation.is_animated() {
                    ViewerMedia::Animated { animation, texture }
                } else {
                    ViewerMedia::Still(texture)
                }
            }
            FileKind::Video => ViewerMedia::Video {
                player: VideoPlayer::spawn(path, self.viewer_max_dimension, self.ctx.clone()),
                texture: None,
            },
            _ => ViewerMedia::Unavailable,
        }
    }
}

impl PreviewHost for TexturePreviews {
    fn create(&mut self, source: &FileSource) -> PreviewHandle {
        let handle = PreviewHandle::new(self.next_seq);
        self.next_seq += 1;

        let kind = FileKind::from_mime(&source.mime_type);
        let thumbnail = if kind.is_previewable() {
            let job = (handle.clone(), source.path.clone());
            let tx = self.decoded_tx.clone();
            let ctx = self.ctx.clone();
            let size = self.thumbnail_size;
            rayon::spawn(move || {
                let (handle, path) = job;
                let image = decode_preview(&path, kind, size);
                if tx.send((handle, image)).is_ok() {
                    ctx.request_repaint();
                }
            });
            PreviewStatus::Pending
        } else {
            PreviewStatus::Unavailable
        };

        self.entries.insert(
            handle.clone(),
            PreviewEntry {
                path: source.path.clone(),
                kind,
                thumbnail,
            },
        );
        handle
    }

    fn revoke(&mut self, handle: &PreviewHandle) {
        if self.entries.remove(handle).is_none() {
            log::warn!("revoking unknown preview {handle}");
        }
        if self.viewer_handle() == Some(handle) {
            self.release_viewer_media();
        }
    }
}

fn decode_preview(path: &Path, kind: FileKind, max_dimension: u32) -> Option<ColorImage> {
    let result = match kind {
        FileKind::Image => image_loader::load_image_scaled(path, max_dimension),
        FileKind::Video => video_frame::load_first_frame(path, max_dimension),
        _ => return None,
    };

    match result {
        Ok(image) => Some(image),
        Err(err) => {
            log::warn!("preview unavailable: {err}");
            None
        }
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use crate::intake::mime_from_path;

    /// Records every handle it issues and revokes.
    #[derive(Default)]
    pub struct RecordingHost {
        next_seq: u64,
        pub live: Vec<PreviewHandle>,
        pub revoked: Vec<PreviewHandle>,
    }

    impl PreviewHost for RecordingHost {
        fn create(&mut self, _source: &FileSource) -> PreviewHandle {
            let handle = PreviewHandle::new(self.next_seq);
            self.next_seq += 1;
            self.live.push(handle.clone());
            handle
        }

        fn revoke(&mut self, handle: &PreviewHandle) {
            self.live.retain(|h| h != handle);
            self.revoked.push(handle.clone());
        }
    }

    pub fn source(name: &str) -> FileSource {
        let path = PathBuf::from(name);
        FileSource {
            mime_type: mime_from_path(&path),
            path,
            name: name.to_string(),
            byte_size: 1024,
            last_modified_ms: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::time::Instant;

    fn wait_for_thumbnails(previews: &mut TexturePreviews) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while previews.has_pending() && Instant::now() < deadline {
            previews.poll_thumbnails();
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    fn png_source(name: &str, color: [u8; 4]) -> FileSource {
        let path = std::env::temp_dir().join(format!("temp_gallery_{}_{name}", std::process::id()));
        RgbaImage::from_pixel(64, 32, Rgba(color)).save(&path).unwrap();
        let mut source = testing::source(name);
        source.path = path;
        source
    }

    fn allocated_textures(ctx: &egui::Context) -> usize {
        ctx.tex_manager().read().num_allocated()
    }

    #[test]
    fn test_texture_previews_issue_unique_handles_and_forget_on_revoke() {
        let mut previews = TexturePreviews::new(egui::Context::default(), 64, 256);
        let a = previews.create(&testing::source("a.png"));
        let b = previews.create(&testing::source("a.png"));
        let doc = previews.create(&testing::source("notes.txt"));

        assert_ne!(a, b);
        assert!(matches!(previews.thumbnail(&a), PreviewStatus::Pending));
        assert!(matches!(previews.thumbnail(&doc), PreviewStatus::Unavailable));
        assert!(previews.has_pending());

        previews.revoke(&a);
        previews.revoke(&b);
        assert!(!previews.has_pending());
        assert!(matches!(previews.thumbnail(&a), PreviewStatus::Unavailable));
        assert!(previews.viewer_media(&a).is_none());

        // Late worker results for revoked handles are dropped.
        std::thread::sleep(Duration::from_millis(50));
        previews.poll_thumbnails();
        assert!(matches!(previews.thumbnail(&a), PreviewStatus::Unavailable));
    }

    #[test]
    fn test_missing_image_degrades_to_unavailable() {
        let mut previews = TexturePreviews::new(egui::Context::default(), 64, 256);
        let handle = previews.create(&testing::source("/nonexistent/temp_gallery.png"));

        wait_for_thumbnails(&mut previews);
        assert!(matches!(previews.thumbnail(&handle), PreviewStatus::Unavailable));
        assert!(!previews.poll_thumbnails());
        assert!(matches!(
            previews.viewer_media(&handle),
            Some(ViewerMedia::Unavailable)
        ));
    }

    #[test]
    fn test_thumbnails_decode_off_the_ui_thread() {
        let mut previews = TexturePreviews::new(egui::Context::default(), 16, 256);
        let source = png_source("thumb.png", [0, 128, 0, 255]);
        let handle = previews.create(&source);

        wait_for_thumbnails(&mut previews);
        match previews.thumbnail(&handle) {
            PreviewStatus::Ready(texture) => assert_eq!(texture.size(), [16, 8]),
            _ => panic!("thumbnail did not load"),
        }

        std::fs::remove_file(&source.path).unwrap();
    }

    #[test]
    fn test_only_the_viewed_record_keeps_full_media() {
        let ctx = egui::Context::default();
        let mut previews = TexturePreviews::new(ctx.clone(), 16, 256);
        let first = png_source("first.png", [255, 0, 0, 255]);
        let second = png_source("second.png", [0, 0, 255, 255]);
        let a = previews.create(&first);
        let b = previews.create(&second);
        let baseline = allocated_textures(&ctx);

        assert!(matches!(previews.viewer_media(&a), Some(ViewerMedia::Still(_))));
        assert_eq!(allocated_textures(&ctx), baseline + 1);

        assert!(matches!(previews.viewer_media(&b), Some(ViewerMedia::Still(_))));
        assert_eq!(previews.viewer_handle(), Some(&b));
        assert_eq!(allocated_textures(&ctx), baseline + 1);

        previews.release_viewer_media();
        assert_eq!(previews.viewer_handle(), None);
        assert_eq!(allocated_textures(&ctx), baseline);

        std::fs::remove_file(&first.path).unwrap();
        std::fs::remove_file(&second.path).unwrap();
    }

    #[test]
    fn test_revoking_the_viewed_record_releases_its_media() {
        let mut previews = TexturePreviews::new(egui::Context::default(), 16, 256);
        let source = png_source("viewed.png", [10, 20, 30, 255]);
        let handle = previews.create(&source);

        assert!(previews.viewer_media(&handle).is_some());
        previews.revoke(&handle);
        assert_eq!(previews.viewer_handle(), None);

        std::fs::remove_file(&source.path).unwrap();
    }
}
