//! Drives a bracket to completion through any `MatchResolver`.
use log::debug;
use serde::Serialize;

use super::{
    BracketError, BracketParticipant, BracketSize, BracketStep, BracketViolation,
    PendingBracketState, build, validate_state,
};
use crate::competitor::Entrant;
use crate::resolver::{MatchResolver, SimulationError};
use crate::result::MatchRecord;
use crate::rng::MatchRng;

/// A completed tournament.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BracketOutcome {
    pub size: BracketSize,
    pub placement: u8,
    pub participants: Vec<BracketParticipant>,
    pub steps: Vec<BracketStep>,
    pub records: Vec<MatchRecord>,
    /// Graph violations found by the validator; empty for a healthy run.
    pub violations: Vec<BracketViolation>,
}

impl BracketOutcome {
    #[must_use]
    pub fn wins(&self) -> usize {
        self.steps.iter().filter(|step| step.result.won).count()
    }

    #[must_use]
    pub fn losses(&self) -> usize {
        self.steps.len() - self.wins()
    }
}

/// Play a whole bracket for `player`, resolving each match with `resolver`.
///
/// # Errors
///
/// Returns `SimulationError::Exchange` when an interactive resolver breaks the
/// exchange protocol. Bracket errors indicate a corrupted state and do not
/// occur for freshly built brackets.
pub fn play_bracket<R: MatchResolver + ?Sized>(
    player: &Entrant,
    opponents: &[Entrant],
    size: BracketSize,
    resolver: &mut R,
    rng: &mut MatchRng,
) -> Result<BracketOutcome, SimulationError> {
    let participants = build(opponents, player, size);
    let mut state = PendingBracketState::new(opponents, size);
    let mut records = Vec::new();

    while !state.is_done() {
        let opponent = state
            .current_opponent()
            .cloned()
            .ok_or(BracketError::AlreadyDone)?;
        let record = resolver.resolve(&player.competitor, &opponent, rng)?;
        state = state.advance(&record.result, rng)?;
        records.push(record);
    }

    let violations = validate_state(&state);
    let placement = state.placement().ok_or(BracketError::Unplaced)?;
    debug!(
        "{} finished {size} bracket in place {placement} after {} matches",
        player.name,
        state.matches_played()
    );
    Ok(BracketOutcome {
        size,
        placement,
        participants,
        steps: state.history().to_vec(),
        records,
        violations,
    })
}
