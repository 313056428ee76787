//! Error taxonomy for the recognition pipeline

use thiserror::Error;

/// Ways a single recognition attempt can fail.
///
/// Every variant is terminal to the attempt that produced it. The live path
/// never surfaces these to the user; the next frame retries implicitly. The
/// photo path reports them verbatim, since there is exactly one
/// user-initiated attempt to report on.
#[derive(Debug, Error)]
pub enum RecognitionError {
    /// No capture input could be acquired; the session never starts producing.
    #[error("no capture device available: {0}")]
    NoCaptureDevice(String),

    /// The text-recognition call itself failed.
    #[error("text extraction failed: {0}")]
    ExtractionFailure(String),

    /// Extraction succeeded but nothing satisfied the plate grammar.
    #[error("plate not found on image")]
    NoMatchFound,
}
