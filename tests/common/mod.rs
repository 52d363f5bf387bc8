//! Shared helpers: an in-memory frame source with scripted failures.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use lightscan::{Frame, FrameSource, FrameStream, LightscanError, VideoFileRef};

/// One step of a scripted video.
#[derive(Debug, Clone)]
pub enum Step {
    Frame(Vec<u8>),
    Corrupt,
}

#[derive(Debug, Clone)]
pub enum Script {
    Frames(Vec<Step>),
    Unopenable,
}

/// Frame source keyed by file label. Unknown labels fail to open.
#[derive(Debug, Default, Clone)]
pub struct ScriptedSource {
    scripts: HashMap<String, Script>,
    /// Streams currently alive.
    open_streams: Arc<AtomicUsize>,
    /// Frames handed out across all streams.
    frames_decoded: Arc<AtomicUsize>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_frames(mut self, label: &str, frames: Vec<Vec<u8>>) -> Self {
        let steps = frames.into_iter().map(Step::Frame).collect();
        self.scripts.insert(label.to_string(), Script::Frames(steps));
        self
    }

    pub fn with_steps(mut self, label: &str, steps: Vec<Step>) -> Self {
        self.scripts.insert(label.to_string(), Script::Frames(steps));
        self
    }

    pub fn with_unopenable(mut self, label: &str) -> Self {
        self.scripts.insert(label.to_string(), Script::Unopenable);
        self
    }

    pub fn open_streams(&self) -> usize {
        self.open_streams.load(Ordering::SeqCst)
    }

    pub fn frames_decoded(&self) -> usize {
        self.frames_decoded.load(Ordering::SeqCst)
    }
}

pub struct ScriptedStream {
    video: VideoFileRef,
    steps: std::vec::IntoIter<Step>,
    total: u64,
    yielded: u64,
    failed: bool,
    open_streams: Arc<AtomicUsize>,
    frames_decoded: Arc<AtomicUsize>,
}

impl Iterator for ScriptedStream {
    type Item = Result<Frame, LightscanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.steps.next()? {
            Step::Frame(samples) => {
                self.yielded += 1;
                self.frames_decoded.fetch_add(1, Ordering::SeqCst);
                Some(Ok(Frame::from_samples(samples).expect("scripted frame fits one row")))
            }
            Step::Corrupt => {
                self.failed = true;
                Some(Err(LightscanError::DecodeFrameError {
                    path: self.video.path().to_path_buf(),
                    frame_index: self.yielded,
                    reason: "corrupt packet".to_string(),
                }))
            }
        }
    }
}

impl FrameStream for ScriptedStream {
    fn estimated_frames(&self) -> Option<u64> {
        Some(self.total)
    }
}

impl Drop for ScriptedStream {
    fn drop(&mut self) {
        self.open_streams.fetch_sub(1, Ordering::SeqCst);
    }
}

impl FrameSource for ScriptedSource {
    type Frames = ScriptedStream;

    fn open(&self, video: &VideoFileRef) -> Result<ScriptedStream, LightscanError> {
        let open_error = |reason: &str| LightscanError::DecodeOpenError {
            path: video.path().to_path_buf(),
            reason: reason.to_string(),
        };
        let steps = match self.scripts.get(video.label()) {
            Some(Script::Frames(steps)) => steps.clone(),
            Some(Script::Unopenable) => return Err(open_error("invalid data found")),
            None => return Err(open_error("no such file")),
        };

        self.open_streams.fetch_add(1, Ordering::SeqCst);
        Ok(ScriptedStream {
            video: video.clone(),
            total: steps.len() as u64,
            steps: steps.into_iter(),
            yielded: 0,
            failed: false,
            open_streams: self.open_streams.clone(),
            frames_decoded: self.frames_decoded.clone(),
        })
    }
}

/// Create empty files with the given names.
pub fn touch_all(directory: &Path, names: &[&str]) {
    for name in names {
        std::fs::write(directory.join(name), b"").expect("Failed to create file");
    }
}

/// A frame whose samples are `value` repeated `count` times.
pub fn flat(value: u8, count: usize) -> Vec<u8> {
    vec![value; count]
}
