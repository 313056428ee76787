//! Plate candidate filtering
//!
//! Turns raw OCR observations into validated plate candidates by running
//! each one through normalization and the grammar check. The live path
//! collects every match in a frame into a whole-set replacement; the
//! photo path takes the first match and ignores the rest.

use tracing::debug;

use crate::grammar::PlateGrammar;
use crate::normalize::normalize_plate_text;
use crate::vision::{BoundingRegion, RawTextObservation};

/// A validated plate candidate from a single frame or image
#[derive(Debug, Clone, PartialEq)]
pub struct PlateCandidate {
    /// Normalized plate text, guaranteed to match the plate grammar
    pub text: String,
    /// Where the source observation sat in the image, normalized [0, 1]
    pub region: BoundingRegion,
}

/// Filter a frame's observations down to validated plate candidates.
///
/// Each observation is normalized and checked against the grammar.
/// Candidates are keyed by their normalized text: if two observations
/// normalize to the same plate, the first one's region wins. The result
/// replaces any previous frame's candidates wholesale.
pub fn filter_observations(
    observations: &[RawTextObservation],
    grammar: &PlateGrammar,
) -> Vec<PlateCandidate> {
    let mut candidates: Vec<PlateCandidate> = Vec::new();

    for observation in observations {
        let text = normalize_plate_text(&observation.text);
        if !grammar.is_valid(&text) {
            if !observation.alternatives.is_empty() {
                debug!(
                    "Discarding {:?}; engine alternatives were {:?}",
                    observation.text, observation.alternatives
                );
            }
            continue;
        }
        if candidates.iter().any(|c| c.text == text) {
            continue;
        }
        debug!(
            "Accepted {} ({:.0}% confidence)",
            text,
            observation.confidence * 100.0
        );
        candidates.push(PlateCandidate {
            text,
            region: observation.region,
        });
    }

    candidates
}

/// Find the first observation that survives normalization and validation.
///
/// Still-image recognition wants a single answer, so later matches in the
/// same observation list are never considered.
pub fn first_match(
    observations: &[RawTextObservation],
    grammar: &PlateGrammar,
) -> Option<PlateCandidate> {
    for observation in observations {
        let text = normalize_plate_text(&observation.text);
        if grammar.is_valid(&text) {
            return Some(PlateCandidate {
                text,
                region: observation.region,
            });
        }
    }
    None
}
