//! Post-hoc check of a recorded bracket path against the phase graph.
//!
//! Violations are logged and returned; they never abort the caller.
use log::warn;
use serde::Serialize;
use thiserror::Error;

use super::{BracketPhase, BracketSize, BracketStep, PendingBracketState, PlacementBand, Transition, transition};

#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViolationKind {
    #[error("expected {expected} but played {found}")]
    IllegalTransition {
        expected: BracketPhase,
        found: BracketPhase,
    },
    #[error("{phase} is not part of this bracket size")]
    PhaseNotInBracket { phase: BracketPhase },
    #[error("match recorded after the bracket finished")]
    StepAfterDone,
    #[error("{losses} losses recorded; elimination happens at two")]
    TooManyLosses { losses: u8 },
    #[error("{played} matches recorded; at most {max} are possible")]
    TooManyMatches { played: usize, max: usize },
    #[error("placement {placement} outside {best}..={worst}")]
    PlacementOutOfBand { placement: u8, best: u8, worst: u8 },
    #[error("finished path has no placement")]
    MissingPlacement,
    #[error("placement {placement} assigned before the path finished")]
    UnexpectedPlacement { placement: u8 },
}

/// A violation and the index of the step it was found at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BracketViolation {
    pub step: usize,
    pub kind: ViolationKind,
}

/// Walk `steps` from the opening phase and report every departure from the graph.
#[must_use]
pub fn validate_path(
    size: BracketSize,
    steps: &[BracketStep],
    placement: Option<u8>,
) -> Vec<BracketViolation> {
    let mut violations = Vec::new();
    let mut expected = size.opening_phase();
    let mut terminal: Option<PlacementBand> = None;
    let mut losses = 0_u8;

    for (index, step) in steps.iter().enumerate() {
        let mut flag = |kind| violations.push(BracketViolation { step: index, kind });
        if terminal.is_some() {
            flag(ViolationKind::StepAfterDone);
            continue;
        }
        if step.phase != expected {
            flag(ViolationKind::IllegalTransition {
                expected,
                found: step.phase,
            });
        }
        if !step.result.won {
            losses = losses.saturating_add(1);
            if losses > 2 {
                flag(ViolationKind::TooManyLosses { losses });
            }
        }
        // Continue from the phase actually played so one bad step is reported once.
        match transition(size, step.phase, step.result.won) {
            Some(Transition::Next(phase)) => expected = phase,
            Some(Transition::Finish(band)) => terminal = Some(band),
            None => {
                flag(ViolationKind::PhaseNotInBracket { phase: step.phase });
                break;
            }
        }
    }

    let end = steps.len();
    if end > size.max_matches() {
        violations.push(BracketViolation {
            step: end,
            kind: ViolationKind::TooManyMatches {
                played: end,
                max: size.max_matches(),
            },
        });
    }
    let placement_issue = match (terminal, placement) {
        (Some(band), Some(place)) if !band.contains(place) => {
            Some(ViolationKind::PlacementOutOfBand {
                placement: place,
                best: band.best,
                worst: band.worst,
            })
        }
        (Some(_), None) => Some(ViolationKind::MissingPlacement),
        (None, Some(place)) => Some(ViolationKind::UnexpectedPlacement { placement: place }),
        _ => None,
    };
    if let Some(kind) = placement_issue {
        violations.push(BracketViolation { step: end, kind });
    }
    violations
}

/// Validate a bracket state's recorded history, logging each violation.
#[must_use]
pub fn validate_state(state: &PendingBracketState) -> Vec<BracketViolation> {
    let violations = validate_path(state.size(), state.history(), state.placement());
    for violation in &violations {
        warn!(
            "bracket path violation at step {}: {}",
            violation.step, violation.kind
        );
    }
    violations
}
