//! Session state, events, and selection types

use std::time::SystemTime;

use uuid::Uuid;

use crate::filter::PlateCandidate;

/// Lifecycle of a recognition session
///
/// A session moves Idle -> Running -> Stopped and never back; a stopped
/// session is finished, not paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Created but not started, or start failed to find a frame source
    #[default]
    Idle,
    /// Worker thread is pulling frames
    Running,
    /// Worker has exited; no further candidate updates will arrive
    Stopped,
}

/// The user's one-shot choice of a recognized plate
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionSelection {
    /// Unique id for this selection event
    pub id: Uuid,
    /// The normalized plate text the user picked
    pub plate: String,
    /// When the selection was made
    pub selected_at: SystemTime,
}

impl RecognitionSelection {
    pub fn new(plate: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            plate: plate.to_string(),
            selected_at: SystemTime::now(),
        }
    }
}

/// Events published to session subscribers
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A frame finished processing; this set replaces the previous one
    CandidatesUpdated(Vec<PlateCandidate>),
    /// The user picked a plate
    SelectionMade(RecognitionSelection),
    /// The worker exited and no further updates will follow
    Stopped,
}

/// Point-in-time copy of everything a session knows
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    pub state: SessionState,
    /// Candidates from the most recent processed frame
    pub candidates: Vec<PlateCandidate>,
    /// The selection, if one has been made
    pub selection: Option<RecognitionSelection>,
    /// Frames processed so far, including ones that yielded nothing
    pub frames_processed: u64,
    /// Most recent extraction failure, kept for diagnostics
    pub last_error: Option<String>,
}
