//! Directory replay frame source
//!
//! Replays the image files of a directory, in sorted order, as an RGBA
//! frame stream paced to the configured rate. Stands in for a live camera
//! in environments that have none.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::debug;

use super::frame::Frame;
use super::FrameSource;
use crate::errors::RecognitionError;

/// Frame source backed by a directory of still images
pub struct ReplaySource {
    files: Vec<PathBuf>,
    next_index: usize,
    frame_interval: Duration,
    last_delivery: Option<Instant>,
    dir: PathBuf,
}

impl ReplaySource {
    /// Open a directory as a frame source.
    ///
    /// Fails with `NoCaptureDevice` when the directory cannot be read or
    /// contains no image files.
    pub fn open(dir: &Path, max_fps: u32) -> Result<Self, RecognitionError> {
        let entries = std::fs::read_dir(dir).map_err(|e| {
            RecognitionError::NoCaptureDevice(format!("cannot read {}: {}", dir.display(), e))
        })?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| is_image_file(path))
            .collect();
        files.sort();

        if files.is_empty() {
            return Err(RecognitionError::NoCaptureDevice(format!(
                "no image files in {}",
                dir.display()
            )));
        }

        Ok(Self {
            files,
            next_index: 0,
            frame_interval: Duration::from_secs(1) / max_fps.max(1),
            last_delivery: None,
            dir: dir.to_path_buf(),
        })
    }
}

impl FrameSource for ReplaySource {
    fn next_frame(&mut self) -> Option<Frame> {
        while self.next_index < self.files.len() {
            let path = self.files[self.next_index].clone();
            self.next_index += 1;

            let decoded = match image::open(&path) {
                Ok(img) => img,
                Err(e) => {
                    debug!("Skipping undecodable file {:?}: {}", path, e);
                    continue;
                }
            };

            // Pace delivery to the configured rate
            if let Some(last) = self.last_delivery {
                let elapsed = last.elapsed();
                if elapsed < self.frame_interval {
                    std::thread::sleep(self.frame_interval - elapsed);
                }
            }
            self.last_delivery = Some(Instant::now());

            let rgba = decoded.to_rgba8();
            let (width, height) = rgba.dimensions();
            return Some(Frame::new(rgba.into_raw(), width, height));
        }
        None
    }

    fn describe(&self) -> String {
        format!(
            "replay of {} files from {}",
            self.files.len(),
            self.dir.display()
        )
    }
}

fn is_image_file(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    matches!(
        ext.to_ascii_lowercase().as_str(),
        "png" | "jpg" | "jpeg" | "bmp" | "gif" | "webp"
    )
}
