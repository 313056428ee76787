//! Recognition session controller
//!
//! Owns the worker thread that pulls frames from a source, runs them
//! through extraction and filtering, and publishes candidate updates to
//! subscribers. The worker is the only writer of candidate state while
//! running; callers observe through snapshots and event channels.
//!
//! Lifecycle is one-way: Idle -> Running -> Stopped. A session whose
//! source runs dry stops on its own. Stopping never interrupts the frame
//! currently being processed; the stop flag is honored between frames.

pub mod events;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::capture::frame::Frame;
use crate::capture::{self, CaptureConfig, FrameSource};
use crate::filter::filter_observations;
use crate::grammar::PlateGrammar;
use crate::session::events::{RecognitionSelection, SessionEvent, SessionSnapshot, SessionState};
use crate::vision::Extractor;

type Subscribers = Arc<Mutex<Vec<Sender<SessionEvent>>>>;

/// Controls one recognition run from start to stop
pub struct RecognitionSession {
    grammar: PlateGrammar,
    snapshot: Arc<RwLock<SessionSnapshot>>,
    subscribers: Subscribers,
    stop_flag: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl RecognitionSession {
    pub fn new(grammar: PlateGrammar) -> Self {
        Self {
            grammar,
            snapshot: Arc::new(RwLock::new(SessionSnapshot::default())),
            subscribers: Arc::new(Mutex::new(Vec::new())),
            stop_flag: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    /// Register for session events.
    ///
    /// A subscriber joining mid-run first receives the current candidate
    /// set, so it never starts from a stale blank. Joining after the
    /// session stopped also delivers the final Stopped event.
    pub fn subscribe(&self) -> Receiver<SessionEvent> {
        let (tx, rx) = unbounded();
        let mut subs = self.subscribers.lock();
        {
            let snap = self.snapshot.read();
            if snap.frames_processed > 0 {
                let _ = tx.send(SessionEvent::CandidatesUpdated(snap.candidates.clone()));
            }
            if snap.state == SessionState::Stopped {
                let _ = tx.send(SessionEvent::Stopped);
            }
        }
        subs.push(tx);
        rx
    }

    /// Open the configured frame source and start recognizing.
    ///
    /// A missing or unusable source is not fatal: the failure is logged,
    /// recorded on the snapshot, and the session stays Idle.
    pub fn start(&mut self, config: &CaptureConfig, extractor: Extractor) {
        match capture::open_source(config) {
            Ok(source) => self.start_with_source(source, extractor),
            Err(e) => {
                warn!("Cannot start recognition: {}", e);
                self.snapshot.write().last_error = Some(e.to_string());
            }
        }
    }

    /// Start the worker thread over an already-open frame source.
    ///
    /// Only an Idle session starts; calling this on a Running or Stopped
    /// session is a no-op.
    pub fn start_with_source(&mut self, mut source: Box<dyn FrameSource>, mut extractor: Extractor) {
        {
            let mut snap = self.snapshot.write();
            if snap.state != SessionState::Idle {
                debug!("Ignoring start on a {:?} session", snap.state);
                return;
            }
            snap.state = SessionState::Running;
        }

        self.stop_flag.store(false, Ordering::SeqCst);

        let grammar = self.grammar.clone();
        let snapshot = Arc::clone(&self.snapshot);
        let subscribers = Arc::clone(&self.subscribers);
        let stop_flag = Arc::clone(&self.stop_flag);

        let handle = thread::spawn(move || {
            info!("Recognition worker started on {}", source.describe());

            loop {
                // The stop flag is checked before pulling the next frame,
                // so a frame already in flight always finishes.
                if stop_flag.load(Ordering::SeqCst) {
                    break;
                }
                let frame = match source.next_frame() {
                    Some(frame) => frame,
                    None => {
                        debug!("Frame source exhausted");
                        break;
                    }
                };
                process_frame(frame, &mut extractor, &grammar, &snapshot, &subscribers);
            }

            let frames = {
                let mut snap = snapshot.write();
                snap.state = SessionState::Stopped;
                snap.frames_processed
            };
            broadcast(&subscribers, SessionEvent::Stopped);
            info!("Recognition worker stopped after {} frames", frames);
        });

        self.worker = Some(handle);
    }

    /// Stop the session and wait for the worker to finish.
    ///
    /// Safe to call any number of times; stopping a session that never
    /// started leaves it Idle.
    pub fn stop(&mut self) {
        self.stop_flag.store(true, Ordering::SeqCst);
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                warn!("Recognition worker panicked");
            }
        }
    }

    /// Record the user's choice of a plate and notify subscribers.
    ///
    /// Every call produces exactly one selection event. Selecting does
    /// not stop the session.
    pub fn select(&self, plate: &str) -> RecognitionSelection {
        let selection = RecognitionSelection::new(plate);
        info!("Plate selected: {} ({})", selection.plate, selection.id);
        self.snapshot.write().selection = Some(selection.clone());
        broadcast(
            &self.subscribers,
            SessionEvent::SelectionMade(selection.clone()),
        );
        selection
    }

    pub fn state(&self) -> SessionState {
        self.snapshot.read().state
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.read().clone()
    }
}

impl Drop for RecognitionSession {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Run one frame through extraction and filtering, then publish.
///
/// Extraction failure is not fatal to the session: the frame publishes
/// an empty candidate set and the error is retained for diagnostics.
fn process_frame(
    frame: Frame,
    extractor: &mut Extractor,
    grammar: &PlateGrammar,
    snapshot: &Arc<RwLock<SessionSnapshot>>,
    subscribers: &Subscribers,
) {
    let (width, height) = frame.dimensions();
    debug!(
        "Processing {}x{} frame captured {:?} ago",
        width,
        height,
        frame.age()
    );
    let candidates = match extractor.extract(&frame.data, width, height) {
        Ok(observations) => filter_observations(&observations, grammar),
        Err(e) => {
            debug!("Extraction failed, publishing empty set: {}", e);
            snapshot.write().last_error = Some(e.to_string());
            Vec::new()
        }
    };

    {
        let mut snap = snapshot.write();
        snap.frames_processed += 1;
        snap.candidates = candidates.clone();
    }
    broadcast(subscribers, SessionEvent::CandidatesUpdated(candidates));
}

/// Send an event to every live subscriber, dropping closed channels.
fn broadcast(subscribers: &Subscribers, event: SessionEvent) {
    let mut subs = subscribers.lock();
    subs.retain(|tx| tx.send(event.clone()).is_ok());
}
