//! Frames delivered to the recognition worker

use std::time::{Duration, Instant};

/// One RGBA frame pulled from a frame source
///
/// The buffer is row-major, 4 bytes per pixel. Frames are stamped on
/// creation so the pipeline can tell how stale its input is.
#[derive(Debug)]
pub struct Frame {
    /// Raw RGBA pixel data
    pub data: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    captured: Instant,
}

impl Frame {
    /// Wrap an RGBA buffer, stamping it with the current time.
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
            captured: Instant::now(),
        }
    }

    /// Get frame dimensions as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Time elapsed since this frame was produced
    pub fn age(&self) -> Duration {
        self.captured.elapsed()
    }
}
