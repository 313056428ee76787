//! Frame acquisition layer
//!
//! Sources that feed frames into a recognition session. The session pulls
//! frames on its worker thread; delivery cadence is the source's job, not
//! the session's. Capture is read-only, sources never modify the material
//! they replay.

pub mod frame;
pub mod replay;

use std::path::PathBuf;

use crate::errors::RecognitionError;
use frame::Frame;
use replay::ReplaySource;

/// Runtime capture configuration for one session
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Directory of image files to replay as frames; `None` means no input
    pub input: Option<PathBuf>,
    /// Maximum frames per second to deliver
    pub max_fps: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            input: None,
            max_fps: 30,
        }
    }
}

/// A stream of frames with a bounded delivery rate
pub trait FrameSource: Send {
    /// Pull the next frame, blocking as needed to honor the source's pacing.
    /// `None` means the source is exhausted and the session should stop.
    fn next_frame(&mut self) -> Option<Frame>;

    /// Human-readable description of the input
    fn describe(&self) -> String;
}

/// Open the configured frame source.
///
/// `NoCaptureDevice` means no usable input exists; callers treat that as
/// "the session never starts", not as a crash.
pub fn open_source(config: &CaptureConfig) -> Result<Box<dyn FrameSource>, RecognitionError> {
    match &config.input {
        Some(dir) => {
            let source = ReplaySource::open(dir, config.max_fps)?;
            Ok(Box::new(source))
        }
        None => Err(RecognitionError::NoCaptureDevice(
            "no capture input configured".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_open_without_input_is_no_capture_device() {
        let config = CaptureConfig::default();
        let err = open_source(&config).err().unwrap();
        assert!(matches!(err, RecognitionError::NoCaptureDevice(_)));
    }

    #[test]
    fn test_open_missing_directory_is_no_capture_device() {
        let config = CaptureConfig {
            input: Some(Path::new("/nonexistent/frames").to_path_buf()),
            max_fps: 30,
        };
        let err = open_source(&config).err().unwrap();
        assert!(matches!(err, RecognitionError::NoCaptureDevice(_)));
    }
}
