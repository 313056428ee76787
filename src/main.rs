//! PlateWatch - License plate recognition pipeline
//!
//! Recognizes Ukrainian-format license plates on photos or frame streams,
//! keeps a short history of recognized plates, and can look a plate up
//! in a vehicle registry service.

mod capture;
mod vision;
mod normalize;
mod grammar;
mod filter;
mod session;
mod photo;
mod history;
mod lookup;
mod storage;
mod config;
mod errors;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossbeam_channel::unbounded;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use crate::capture::CaptureConfig;
use crate::config::AppConfig;
use crate::grammar::PlateGrammar;
use crate::history::RecentPlates;
use crate::lookup::{LookupClient, LookupError};
use crate::normalize::normalize_plate_text;
use crate::session::events::{SessionEvent, SessionState};
use crate::session::RecognitionSession;
use crate::vision::{Extractor, RecognizerOptions};

/// PlateWatch - License plate recognition
#[derive(Parser, Debug)]
#[command(name = "platewatch")]
#[command(about = "Recognize license plates on photos or frame streams")]
struct Args {
    /// Path to a configuration file (defaults to the platform config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Recognize a plate on a single photo
    Photo {
        /// Photo file to recognize
        path: PathBuf,

        /// Look the recognized plate up in the vehicle registry
        #[arg(long)]
        lookup: bool,
    },
    /// Run live recognition over a frame source
    Watch {
        /// Directory of frames to replay (overrides the configured source)
        dir: Option<PathBuf>,

        /// Stop after this many frames
        #[arg(long)]
        max_frames: Option<u64>,

        /// Select the first candidate that appears
        #[arg(long)]
        select_first: bool,
    },
    /// Show recently recognized plates
    History {
        /// Clear the list instead of printing it
        #[arg(long)]
        clear: bool,
    },
    /// Query the vehicle registry for a plate
    Lookup {
        /// Plate text, normalized before querying
        plate: String,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Load or create configuration
    let config = load_or_create_config(args.config.as_deref());

    match args.command {
        Command::Photo { path, lookup } => run_photo(&config, &path, lookup),
        Command::Watch {
            dir,
            max_frames,
            select_first,
        } => run_watch(&config, dir, max_frames, select_first),
        Command::History { clear } => run_history(&config, clear),
        Command::Lookup { plate } => run_lookup(&config, &plate),
    }
}

/// Load configuration from file or create default
fn load_or_create_config(override_path: Option<&Path>) -> AppConfig {
    if let Some(path) = override_path {
        match config::load_config(path) {
            Ok(config) => {
                info!("Loaded configuration from {:?}", path);
                return config;
            }
            Err(e) => {
                warn!("Cannot load {:?}: {}, using defaults", path, e);
                return AppConfig::default();
            }
        }
    }
    if let Ok(config_dir) = storage::get_config_dir() {
        let config_path = config_dir.join("config.toml");
        if config_path.exists() {
            if let Ok(config) = config::load_config(&config_path) {
                info!("Loaded configuration from {:?}", config_path);
                return config;
            }
        } else {
            let config = AppConfig::default();
            match config::save_config(&config, &config_path) {
                Ok(()) => info!("Wrote default configuration to {:?}", config_path),
                Err(e) => warn!("Cannot write default configuration: {}", e),
            }
            return config;
        }
    }
    info!("Using default configuration");
    AppConfig::default()
}

/// Recognize a plate on a single photo
fn run_photo(config: &AppConfig, path: &Path, lookup: bool) -> Result<()> {
    let extractor = build_extractor(config)?;
    let grammar = PlateGrammar::new()?;
    let (tx, rx) = unbounded();

    let _task = photo::spawn_photo_task(path.to_path_buf(), extractor, grammar, tx);
    let result = rx
        .recv()
        .context("recognition task dropped without a result")?;
    debug!("Recognition finished for {:?}", result.path);

    match result.outcome {
        Ok(candidate) => {
            println!("{}", candidate.text);
            record_history(config, &candidate.text);
            if lookup {
                resolve_and_print(config, &candidate.text)?;
            }
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Run live recognition over a frame source, printing candidate updates
fn run_watch(
    config: &AppConfig,
    dir: Option<PathBuf>,
    max_frames: Option<u64>,
    select_first: bool,
) -> Result<()> {
    let extractor = build_extractor(config)?;
    let grammar = PlateGrammar::new()?;

    let capture_config = CaptureConfig {
        input: dir.or_else(|| config.capture.replay_dir.as_ref().map(PathBuf::from)),
        max_fps: config.capture.max_fps,
    };

    let mut session = RecognitionSession::new(grammar);
    let events = session.subscribe();
    session.start(&capture_config, extractor);

    if session.state() == SessionState::Idle {
        warn!("Recognition did not start; check the capture input");
        return Ok(());
    }

    let mut frames_seen = 0u64;
    let mut selected = false;
    for event in events.iter() {
        match event {
            SessionEvent::CandidatesUpdated(candidates) => {
                frames_seen += 1;
                if candidates.is_empty() {
                    println!("[frame {}] no candidates", frames_seen);
                } else {
                    let rendered: Vec<String> = candidates
                        .iter()
                        .map(|c| {
                            format!(
                                "{} @ ({:.2}, {:.2}, {:.2}x{:.2})",
                                c.text, c.region.x, c.region.y, c.region.width, c.region.height
                            )
                        })
                        .collect();
                    println!("[frame {}] {}", frames_seen, rendered.join("  "));
                }
                if select_first && !selected {
                    if let Some(candidate) = candidates.first() {
                        session.select(&candidate.text);
                        selected = true;
                    }
                }
                if let Some(limit) = max_frames {
                    if frames_seen >= limit {
                        session.stop();
                    }
                }
            }
            SessionEvent::SelectionMade(selection) => {
                println!("selected {}", selection.plate);
                if let Ok(latency) = selection.selected_at.elapsed() {
                    debug!("Selection delivered in {:?}", latency);
                }
                record_history(config, &selection.plate);
            }
            SessionEvent::Stopped => break,
        }
    }

    session.stop();
    let snapshot = session.snapshot();
    info!("Processed {} frames", snapshot.frames_processed);
    if let Some(selection) = snapshot.selection {
        info!("Final selection: {}", selection.plate);
    }
    if let Some(error) = snapshot.last_error {
        debug!("Last extraction error: {}", error);
    }

    Ok(())
}

/// Print or clear the recent-plates list
fn run_history(config: &AppConfig, clear: bool) -> Result<()> {
    let path = storage::history_file()?;
    let mut history = RecentPlates::load(&path, config.history.cap)?;

    if clear {
        history.clear();
        history.save(&path)?;
        println!("History cleared");
        return Ok(());
    }

    if history.is_empty() {
        println!("No plates recognized yet");
    } else {
        for plate in history.plates() {
            println!("{}", plate);
        }
    }
    Ok(())
}

/// Query the vehicle registry for a plate
fn run_lookup(config: &AppConfig, plate: &str) -> Result<()> {
    let normalized = normalize_plate_text(plate);
    let grammar = PlateGrammar::new()?;
    if !grammar.is_valid(&normalized) {
        warn!("{} does not look like a plate; querying anyway", normalized);
    }
    resolve_and_print(config, &normalized)
}

/// Build the OCR extractor from configuration
fn build_extractor(config: &AppConfig) -> Result<Extractor> {
    let options = RecognizerOptions {
        language: config.recognition.language.clone(),
        char_whitelist: config.recognition.char_whitelist.clone(),
        page_seg_mode: config.recognition.page_seg_mode,
        min_confidence: config.recognition.min_confidence,
    };
    debug!(
        "Recognizer options: language={}, whitelist={} chars, psm={}, min_confidence={}",
        options.language,
        options.char_whitelist.len(),
        options.page_seg_mode,
        options.min_confidence
    );
    let recognizer = vision::create_recognizer(&options)?;
    Ok(Extractor::new(
        recognizer,
        config.recognition.preprocess.clone(),
    ))
}

/// Record a plate into the persisted history, warning on failure
fn record_history(config: &AppConfig, plate: &str) {
    let result = storage::history_file().and_then(|path| {
        let mut history = RecentPlates::load(&path, config.history.cap)?;
        history.record(plate);
        history.save(&path)
    });
    if let Err(e) = result {
        warn!("Cannot update history: {}", e);
    }
}

/// Look the plate up in the registry and print the vehicle record
fn resolve_and_print(config: &AppConfig, plate: &str) -> Result<()> {
    let client = LookupClient::new(&config.lookup)?;
    match client.fetch(plate) {
        Ok(info) => {
            println!("VIN:    {}", info.vin);
            println!("Make:   {}", info.make);
            println!("Model:  {}", info.model);
            println!("Year:   {}", info.year);
            println!("Engine: {}", info.engine_capacity);
            Ok(())
        }
        Err(LookupError::NotFound(_)) => {
            println!("No vehicle found for {}", plate);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
