use crate::error::{GalleryError, Result};
use egui::ColorImage;
use image::codecs::gif::GifDecoder;
use image::codecs::webp::WebPDecoder;
use image::{AnimationDecoder, DynamicImage, Frame, ImageFormat};
use std::fs;
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

/// Maximum number of frames kept for one animation.
pub const MAX_ANIMATION_FRAMES: usize = 1024;

/// One frame of an image and how long it stays on screen.
#[derive(Clone)]
pub struct AnimationFrame {
    pub image: ColorImage,
    pub duration: Duration,
}

/// Decodes the first frame of an image file and scales it down so that its longest
/// edge does not exceed `max_dimension`.
pub fn load_image_scaled(path: &Path, max_dimension: u32) -> Result<ColorImage> {
    let mut frames = load_frames_scaled(path, max_dimension, true)?;
    if frames.is_empty() {
        return Err(decode_error(path, "image did not contain frames".to_string()));
    }
    Ok(frames.swap_remove(0).image)
}

/// Decodes every frame of a GIF or animated WebP, or the single frame of any other
/// format, each scaled to fit `max_dimension`.
pub fn load_frames_scaled(
    path: &Path,
    max_dimension: u32,
    first_frame_only: bool,
) -> Result<Vec<AnimationFrame>> {
    let bytes = fs::read(path).map_err(|err| GalleryError::io(path, err))?;

    let format = image::guess_format(&bytes)
        .or_else(|_| ImageFormat::from_path(path))
        .map_err(|err| decode_error(path, format!("unknown format: {err}")))?;

    let limit = if first_frame_only {
        1
    } else {
        MAX_ANIMATION_FRAMES
    };

    let frames = match format {
        ImageFormat::Gif => decode_gif(&bytes, limit),
        ImageFormat::WebP => decode_webp(&bytes, limit),
        _ => decode_static(&bytes, format),
    }
    .map_err(|reason| decode_error(path, reason))?;

    Ok(frames
        .into_iter()
        .map(|frame| AnimationFrame {
            image: color_image_from_dynamic(fit_within(frame.0, max_dimension)),
            duration: frame.1,
        })
        .collect())
}

/// Shrinks an image to fit a `max_dimension` square, never enlarging it.
pub fn fit_within(image: DynamicImage, max_dimension: u32) -> DynamicImage {
    if image.width() > max_dimension || image.height() > max_dimension {
        image.thumbnail(max_dimension, max_dimension)
    } else {
        image
    }
}

pub fn color_image_from_dynamic(image: DynamicImage) -> ColorImage {
    let rgba = image.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    ColorImage::from_rgba_unmultiplied(size, &rgba.into_raw())
}

type RawFrame = (DynamicImage, Duration);

fn decode_static(bytes: &[u8], format: ImageFormat) -> std::result::Result<Vec<RawFrame>, String> {
    let image = image::load_from_memory_with_format(bytes, format).map_err(|err| err.to_string())?;
    Ok(vec![(image, Duration::ZERO)])
}

fn decode_gif(bytes: &[u8], limit: usize) -> std::result::Result<Vec<RawFrame>, String> {
    let decoder = GifDecoder::new(Cursor::new(bytes)).map_err(|err| format!("GIF: {err}"))?;
    let frames: Vec<Frame> = decoder
        .into_frames()
        .take(limit)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|err| format!("GIF frame: {err}"))?;
    frames_to_raw(frames)
}

fn decode_webp(bytes: &[u8], limit: usize) -> std::result::Result<Vec<RawFrame>, String> {
    let decoder = WebPDecoder::new(Cursor::new(bytes)).map_err(|err| format!("WebP: {err}"))?;
    if !decoder.has_animation() {
        return decode_static(bytes, ImageFormat::WebP);
    }
    let frames: Vec<Frame> = decoder
        .into_frames()
        .take(limit)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|err| format!("WebP frame: {err}"))?;
    frames_to_raw(frames)
}

fn frames_to_raw(frames: Vec<Frame>) -> std::result::Result<Vec<RawFrame>, String> {
    if frames.is_empty() {
        return Err("animation did not contain frames".to_string());
    }
    Ok(frames
        .into_iter()
        .map(|frame| {
            let duration = sanitize_duration(duration_from_delay(frame.delay()));
            (DynamicImage::ImageRgba8(frame.into_buffer()), duration)
        })
        .collect())
}

fn duration_from_delay(delay: image::Delay) -> Duration {
    let (numer, denom) = delay.numer_denom_ms();
    Duration::from_nanos(u64::from(numer) * 1_000_000 / u64::from(denom.max(1)))
}

/// Zero-delay frames play at roughly 60 FPS.
fn sanitize_duration(duration: Duration) -> Duration {
    if duration.is_zero() {
        Duration::from_millis(16)
    } else {
        duration
    }
}

fn decode_error(path: &Path, reason: String) -> GalleryError {
    GalleryError::ImageDecode {
        path: path.to_path_buf(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::gif::GifEncoder;
    use image::{Delay, Rgba, RgbaImage};

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("temp_gallery_{}_{name}", std::process::id()))
    }

    fn write_gif(path: &Path, colors: &[[u8; 4]], delay_ms: u32) {
        let file = fs::File::create(path).unwrap();
        let mut encoder = GifEncoder::new(file);
        let frames = colors.iter().map(|color| {
            Frame::from_parts(
                RgbaImage::from_pixel(40, 20, Rgba(*color)),
                0,
                0,
                Delay::from_numer_denom_ms(delay_ms, 1),
            )
        });
        encoder.encode_frames(frames).unwrap();
    }

    #[test]
    fn test_fit_within_shrinks_longest_edge() {
        let image = DynamicImage::ImageRgba8(RgbaImage::new(800, 400));
        let fitted = fit_within(image, 200);
        assert_eq!(fitted.width(), 200);
        assert_eq!(fitted.height(), 100);
    }

    #[test]
    fn test_fit_within_never_enlarges() {
        let image = DynamicImage::ImageRgba8(RgbaImage::new(50, 30));
        let fitted = fit_within(image, 200);
        assert_eq!((fitted.width(), fitted.height()), (50, 30));
    }

    #[test]
    fn test_load_png_from_disk() {
        let path = temp_path("loader.png");
        RgbaImage::from_pixel(64, 32, Rgba([255, 0, 0, 255]))
            .save(&path)
            .unwrap();

        let loaded = load_image_scaled(&path, 16).unwrap();
        assert_eq!(loaded.size, [16, 8]);
        assert_eq!(loaded.pixels[0], egui::Color32::from_rgb(255, 0, 0));

        let frames = load_frames_scaled(&path, 16, false).unwrap();
        assert_eq!(frames.len(), 1);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_gif_keeps_every_frame_and_its_delay() {
        let path = temp_path("anim.gif");
        write_gif(&path, &[[255, 0, 0, 255], [0, 0, 255, 255], [0, 255, 0, 255]], 120);

        let frames = load_frames_scaled(&path, 20, false).unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].image.size, [20, 10]);
        assert_eq!(frames[1].duration, Duration::from_millis(120));

        let first = load_frames_scaled(&path, 20, true).unwrap();
        assert_eq!(first.len(), 1);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_zero_delay_is_clamped() {
        assert_eq!(sanitize_duration(Duration::ZERO), Duration::from_millis(16));
        assert_eq!(
            sanitize_duration(duration_from_delay(Delay::from_numer_denom_ms(50, 1))),
            Duration::from_millis(50)
        );
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        let path = temp_path("garbage.png");
        fs::write(&path, b"definitely not a png").unwrap();

        let err = load_image_scaled(&path, 16).unwrap_err();
        assert!(matches!(err, GalleryError::ImageDecode { .. }));

        fs::remove_file(&path).unwrap();
    }
}
