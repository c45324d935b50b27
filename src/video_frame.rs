//! Video decoding with ffmpeg: an opened stream that yields RGBA frames in order,
//! plus the first-frame poster used for thumbnails.

use crate::error::{GalleryError, Result};
use egui::ColorImage;
use ffmpeg_next as ffmpeg;
use ffmpeg::format::Pixel;
use ffmpeg::media::Type;
use ffmpeg::software::scaling::{Context as Scaler, Flags};
use ffmpeg::util::frame::video::Video;
use std::path::Path;
use std::sync::OnceLock;

static FFMPEG_INIT: OnceLock<std::result::Result<(), String>> = OnceLock::new();

/// Initializes ffmpeg once per process and quiets its logging to errors only.
pub fn init_ffmpeg() -> std::result::Result<(), String> {
    FFMPEG_INIT
        .get_or_init(|| {
            ffmpeg::init().map_err(|err| format!("ffmpeg init: {err}"))?;
            ffmpeg::util::log::set_level(ffmpeg::util::log::Level::Error);
            Ok(())
        })
        .clone()
}

/// A frame ready for display and its presentation time.
pub struct DecodedFrame {
    pub image: ColorImage,
    pub pts_secs: f64,
}

/// The best video stream of a file, with a decoder and an RGBA scaler sized to fit
/// `max_dimension`. Not `Send`; open it on the thread that decodes.
pub struct VideoSource {
    input: ffmpeg::format::context::Input,
    stream_index: usize,
    decoder: ffmpeg::decoder::Video,
    scaler: Scaler,
    seconds_per_tick: f64,
}

impl VideoSource {
    pub fn open(path: &Path, max_dimension: u32) -> std::result::Result<Self, String> {
        init_ffmpeg()?;
        let input = ffmpeg::format::input(path).map_err(|err| err.to_string())?;

        let (stream_index, parameters, time_base) = {
            let stream = input
                .streams()
                .best(Type::Video)
                .ok_or_else(|| "no video stream".to_string())?;
            (stream.index(), stream.parameters(), stream.time_base())
        };

        let decoder = ffmpeg::codec::context::Context::from_parameters(parameters)
            .and_then(|context| context.decoder().video())
            .map_err(|err| err.to_string())?;

        let (width, height) = fit_dimensions(decoder.width(), decoder.height(), max_dimension);
        let scaler = Scaler::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            Pixel::RGBA,
            width,
            height,
            Flags::BILINEAR,
        )
        .map_err(|err| err.to_string())?;

        let seconds_per_tick =
            f64::from(time_base.numerator()) / f64::from(time_base.denominator().max(1));

        Ok(Self {
            input,
            stream_index,
            decoder,
            scaler,
            seconds_per_tick,
        })
    }

    /// Decodes the next frame, or returns None once the stream is exhausted.
    pub fn next_frame(&mut self) -> std::result::Result<Option<DecodedFrame>, String> {
        let mut decoded = Video::empty();
        loop {
            if self.decoder.receive_frame(&mut decoded).is_ok() {
                return self.finish_frame(&decoded).map(Some);
            }

            let stream_index = self.stream_index;
            let packet = self
                .input
                .packets()
                .find(|(stream, _)| stream.index() == stream_index)
                .map(|(_, packet)| packet);

            match packet {
                Some(packet) => {
                    if let Err(err) = self.decoder.send_packet(&packet) {
                        log::debug!("skipping undecodable packet: {err}");
                    }
                }
                None => {
                    // Repeated EOFs are rejected by the decoder; the drain below still works.
                    let _ = self.decoder.send_eof();
                    return match self.decoder.receive_frame(&mut decoded) {
                        Ok(()) => self.finish_frame(&decoded).map(Some),
                        Err(_) => Ok(None),
                    };
                }
            }
        }
    }

    /// Seeks back to the start of the file.
    pub fn rewind(&mut self) -> std::result::Result<(), String> {
        self.input.seek(0, ..0).map_err(|err| err.to_string())?;
        self.decoder.flush();
        Ok(())
    }

    fn finish_frame(&mut self, decoded: &Video) -> std::result::Result<DecodedFrame, String> {
        let image = convert_frame(&mut self.scaler, decoded).map_err(|err| err.to_string())?;
        let pts_secs = decoded
            .timestamp()
            .map_or(0.0, |pts| pts as f64 * self.seconds_per_tick);
        Ok(DecodedFrame { image, pts_secs })
    }
}

/// Decodes the first frame of the best video stream in `path`, scaled so that its
/// longest edge does not exceed `max_dimension`.
pub fn load_first_frame(path: &Path, max_dimension: u32) -> Result<ColorImage> {
    let fail = |reason: String| GalleryError::VideoDecode {
        path: path.to_path_buf(),
        reason,
    };

    let mut source = VideoSource::open(path, max_dimension).map_err(fail)?;
    match source.next_frame().map_err(fail)? {
        Some(frame) => Ok(frame.image),
        None => Err(fail("no decodable frames".to_string())),
    }
}

fn convert_frame(scaler: &mut Scaler, decoded: &Video) -> std::result::Result<ColorImage, ffmpeg::Error> {
    let mut rgba = Video::empty();
    scaler.run(decoded, &mut rgba)?;

    let width = rgba.width() as usize;
    let height = rgba.height() as usize;
    let stride = rgba.stride(0);
    let data = rgba.data(0);

    let mut packed = Vec::with_capacity(width * height * 4);
    for row in 0..height {
        let start = row * stride;
        packed.extend_from_slice(&data[start..start + width * 4]);
    }
    Ok(ColorImage::from_rgba_unmultiplied([width, height], &packed))
}

/// Scales `(width, height)` down to fit a `max_dimension` square, keeping the
/// aspect ratio and never returning a zero edge.
fn fit_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= max_dimension || longest == 0 {
        return (width.max(1), height.max(1));
    }
    let scale = max_dimension as f64 / longest as f64;
    let scaled = |edge: u32| ((edge as f64 * scale).round() as u32).max(1);
    (scaled(width), scaled(height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_dimensions() {
        assert_eq!(fit_dimensions(1920, 1080, 320), (320, 180));
        assert_eq!(fit_dimensions(1080, 1920, 320), (180, 320));
        assert_eq!(fit_dimensions(200, 100, 320), (200, 100));
        assert_eq!(fit_dimensions(4000, 2, 100), (100, 1));
        assert_eq!(fit_dimensions(0, 0, 100), (1, 1));
    }

    #[test]
    fn test_init_is_idempotent() {
        assert_eq!(init_ffmpeg(), init_ffmpeg());
    }

    #[test]
    fn test_missing_file_is_decode_error() {
        let path = std::env::temp_dir().join("temp_gallery_missing_video.mp4");
        let err = load_first_frame(&path, 64).unwrap_err();
        assert!(matches!(err, GalleryError::VideoDecode { .. }));
    }

    #[test]
    fn test_non_video_bytes_fail_to_open() {
        let path = std::env::temp_dir().join(format!("temp_gallery_fake_{}.mp4", std::process::id()));
        std::fs::write(&path, b"not a video at all").unwrap();
        assert!(VideoSource::open(&path, 64).is_err());
        std::fs::remove_file(&path).unwrap();
    }
}
