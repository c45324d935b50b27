//! Video playback on a dedicated decoder thread.
//!
//! The thread owns the ffmpeg state, paces frames by their timestamps and hands
//! them to the UI over a bounded channel. The UI polls once per frame.

use crate::video_frame::{DecodedFrame, VideoSource};
use egui::ColorImage;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender, SyncSender, TryRecvError};
use std::time::{Duration, Instant};

const IDLE_POLL: Duration = Duration::from_millis(10);

/// Frames in flight between the decoder and the UI.
const FRAME_QUEUE: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerCommand {
    Play,
    Pause,
    /// Seek to the start and show the first frame.
    Restart,
    Stop,
}

pub enum PlayerEvent {
    FrameReady(DecodedFrame),
    EndOfStream,
    Error(String),
}

pub struct VideoPlayer {
    command_tx: Sender<PlayerCommand>,
    event_rx: Receiver<PlayerEvent>,
    playing: bool,
    finished: bool,
    failed: bool,
    position_secs: f64,
}

impl VideoPlayer {
    /// Opens `path` on a new decoder thread. Playback starts paused on the first frame.
    pub fn spawn(path: &Path, max_dimension: u32, ctx: egui::Context) -> Self {
        let (command_tx, command_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::sync_channel(FRAME_QUEUE);
        let path: PathBuf = path.to_path_buf();

        let spawned = std::thread::Builder::new()
            .name("video-decoder".to_string())
            .spawn(move || {
                if let Err(reason) = decode_loop(&path, max_dimension, &command_rx, &event_tx, &ctx) {
                    log::warn!("video playback stopped for {}: {reason}", path.display());
                    let _ = event_tx.send(PlayerEvent::Error(reason));
                    ctx.request_repaint();
                }
            });

        if let Err(err) = &spawned {
            log::error!("failed to start video decoder: {err}");
        }

        Self {
            command_tx,
            event_rx,
            playing: false,
            finished: false,
            failed: spawned.is_err(),
            position_secs: 0.0,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn has_failed(&self) -> bool {
        self.failed
    }

    pub fn position_secs(&self) -> f64 {
        self.position_secs
    }

    /// Plays from a pause, restarts after the end, or pauses while playing.
    pub fn toggle(&mut self) {
        if self.playing {
            self.send(PlayerCommand::Pause);
            self.playing = false;
        } else {
            if self.finished {
                self.send(PlayerCommand::Restart);
                self.finished = false;
            }
            self.send(PlayerCommand::Play);
            self.playing = true;
        }
    }

    /// Drains decoder events and returns the newest frame, if any arrived.
    pub fn poll(&mut self) -> Option<ColorImage> {
        let mut latest = None;
        loop {
            match self.event_rx.try_recv() {
                Ok(PlayerEvent::FrameReady(frame)) => {
                    self.position_secs = frame.pts_secs;
                    latest = Some(frame.image);
                }
                Ok(PlayerEvent::EndOfStream) => {
                    self.playing = false;
                    self.finished = true;
                }
                Ok(PlayerEvent::Error(reason)) => {
                    log::debug!("decoder reported: {reason}");
                    self.playing = false;
                    self.failed = true;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.playing = false;
                    break;
                }
            }
        }
        latest
    }

    fn send(&self, command: PlayerCommand) {
        if self.command_tx.send(command).is_err() {
            log::debug!("video decoder is gone, dropping {command:?}");
        }
    }
}

impl Drop for VideoPlayer {
    fn drop(&mut self) {
        let _ = self.command_tx.send(PlayerCommand::Stop);
    }
}

/// Wall-clock anchor for pacing: when playback (re)started and the pts seen then.
struct Clock {
    started: Instant,
    first_pts: f64,
}

impl Clock {
    fn due(&self, pts_secs: f64) -> Instant {
        self.started + Duration::from_secs_f64((pts_secs - self.first_pts).max(0.0))
    }
}

fn decode_loop(
    path: &Path,
    max_dimension: u32,
    commands: &Receiver<PlayerCommand>,
    events: &SyncSender<PlayerEvent>,
    ctx: &egui::Context,
) -> Result<(), String> {
    let mut source = VideoSource::open(path, max_dimension)?;

    let mut playing = false;
    let mut show_one_frame = true;
    let mut clock: Option<Clock> = None;

    loop {
        match commands.try_recv() {
            Ok(PlayerCommand::Play) => {
                playing = true;
                clock = None;
            }
            Ok(PlayerCommand::Pause) => {
                playing = false;
                clock = None;
            }
            Ok(PlayerCommand::Restart) => {
                source.rewind()?;
                clock = None;
                show_one_frame = !playing;
            }
            Ok(PlayerCommand::Stop) | Err(TryRecvError::Disconnected) => break,
            Err(TryRecvError::Empty) => {}
        }

        if !playing && !show_one_frame {
            std::thread::sleep(IDLE_POLL);
            continue;
        }

        let event = match source.next_frame()? {
            Some(frame) => {
                if playing {
                    let clock = clock.get_or_insert_with(|| Clock {
                        started: Instant::now(),
                        first_pts: frame.pts_secs,
                    });
                    let due = clock.due(frame.pts_secs);
                    let now = Instant::now();
                    if due > now {
                        std::thread::sleep(due - now);
                    }
                }
                show_one_frame = false;
                PlayerEvent::FrameReady(frame)
            }
            None => {
                playing = false;
                show_one_frame = false;
                clock = None;
                PlayerEvent::EndOfStream
            }
        };

        if events.send(event).is_err() {
            break;
        }
        ctx.request_repaint();
    }

    Ok(())
}
