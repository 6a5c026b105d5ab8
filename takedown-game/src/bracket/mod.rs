//! Double-elimination tournament bracket seen from the player's corner.
//!
//! Only the player's own matches are simulated. Each phase resolves one match
//! and the result picks the next phase from a fixed graph; terminal branches
//! carry a placement band that a coin flip narrows to a single place.
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::competitor::{Competitor, Entrant};
use crate::numbers::usize_to_f64;
use crate::result::MatchResult;
use crate::rng::MatchRng;

pub mod runner;
pub mod validator;

pub use runner::{BracketOutcome, play_bracket};
pub use validator::{BracketViolation, ViolationKind, validate_path, validate_state};

const FILLER_BASE_RATING: f64 = 60.0;
const FILLER_STEP: f64 = 1.5;

/// Supported field sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum BracketSize {
    Eight,
    Sixteen,
}

impl BracketSize {
    #[must_use]
    pub const fn entrants(self) -> u8 {
        match self {
            Self::Eight => 8,
            Self::Sixteen => 16,
        }
    }

    /// Upper bound on matches any path through the graph can take.
    #[must_use]
    pub const fn max_matches(self) -> usize {
        match self {
            Self::Eight => 6,
            Self::Sixteen => 8,
        }
    }

    #[must_use]
    pub const fn opening_phase(self) -> BracketPhase {
        match self {
            Self::Eight => BracketPhase::Qf,
            Self::Sixteen => BracketPhase::R16,
        }
    }
}

impl TryFrom<u8> for BracketSize {
    type Error = BracketError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            8 => Ok(Self::Eight),
            16 => Ok(Self::Sixteen),
            other => Err(BracketError::UnsupportedSize(other)),
        }
    }
}

impl From<BracketSize> for u8 {
    fn from(size: BracketSize) -> Self {
        size.entrants()
    }
}

impl fmt::Display for BracketSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-man", self.entrants())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketPhase {
    R16,
    Qf,
    Sf,
    WbFinal,
    Final,
    LbFinal,
    Reset,
    ConsR1,
    ConsR2,
    ConsR3,
    ConsR4,
    ThirdFourth,
    Done,
}

impl BracketPhase {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::R16 => "Round of 16",
            Self::Qf => "Quarterfinal",
            Self::Sf => "Semifinal",
            Self::WbFinal => "Winners' final",
            Self::Final => "Final",
            Self::LbFinal => "Losers' final",
            Self::Reset => "Reset match",
            Self::ConsR1 => "Consolation round 1",
            Self::ConsR2 => "Consolation round 2",
            Self::ConsR3 => "Consolation round 3",
            Self::ConsR4 => "Consolation round 4",
            Self::ThirdFourth => "Third place match",
            Self::Done => "Done",
        }
    }
}

impl fmt::Display for BracketPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inclusive range of places shared by competitors eliminated at the same point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementBand {
    pub best: u8,
    pub worst: u8,
}

impl PlacementBand {
    #[must_use]
    pub const fn fixed(place: u8) -> Self {
        Self {
            best: place,
            worst: place,
        }
    }

    #[must_use]
    pub const fn new(best: u8, worst: u8) -> Self {
        Self { best, worst }
    }

    #[must_use]
    pub const fn contains(self, place: u8) -> bool {
        place >= self.best && place <= self.worst
    }

    /// Narrow the band to one place, halving it with a coin flip per step.
    /// Fixed bands consume no draws.
    pub fn resolve(self, rng: &mut MatchRng) -> u8 {
        let (mut lo, mut hi) = (self.best, self.worst);
        while lo < hi {
            let half = (hi - lo + 1) / 2;
            if rng.chance(0.5) {
                hi = lo + half - 1;
            } else {
                lo += half;
            }
        }
        lo
    }
}

/// Where a result sends the player next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Next(BracketPhase),
    Finish(PlacementBand),
}

/// The phase graph. `None` for `Done` and for phases the field size never visits.
#[must_use]
pub const fn transition(size: BracketSize, phase: BracketPhase, won: bool) -> Option<Transition> {
    use BracketPhase::{
        ConsR1, ConsR2, ConsR3, ConsR4, Done, Final, LbFinal, Qf, R16, Reset, Sf, ThirdFourth,
        WbFinal,
    };
    use BracketSize::{Eight, Sixteen};
    use Transition::{Finish, Next};

    let step = match (size, phase, won) {
        (Sixteen, R16, true) => Next(Qf),
        (Sixteen, R16, false) => Next(ConsR1),
        (_, Qf, true) => Next(Sf),
        (Eight, Qf, false) => Next(ConsR1),
        (Sixteen, Qf, false) => Next(ConsR2),
        (_, Sf, true) => Next(WbFinal),
        (Eight, Sf, false) => Next(ConsR2),
        (Sixteen, Sf, false) => Next(ConsR4),
        (_, WbFinal, true) => Next(Final),
        (_, WbFinal, false) => Next(LbFinal),
        (_, Final, true) | (_, Reset, true) => Finish(PlacementBand::fixed(1)),
        (_, Final, false) | (_, LbFinal, true) => Next(Reset),
        (_, LbFinal, false) | (_, Reset, false) => Finish(PlacementBand::fixed(2)),
        (_, ConsR1, true) => Next(ConsR2),
        (Eight, ConsR1, false) => Finish(PlacementBand::new(7, 8)),
        (Sixteen, ConsR1, false) => Finish(PlacementBand::new(15, 16)),
        (Eight, ConsR2, true) => Next(ThirdFourth),
        (Eight, ConsR2, false) => Finish(PlacementBand::new(5, 6)),
        (Sixteen, ConsR2, true) => Next(ConsR3),
        (Sixteen, ConsR2, false) => Finish(PlacementBand::new(9, 12)),
        (Sixteen, ConsR3, true) => Next(ConsR4),
        (Sixteen, ConsR3, false) => Finish(PlacementBand::new(7, 8)),
        (Sixteen, ConsR4, true) => Next(ThirdFourth),
        (Sixteen, ConsR4, false) => Finish(PlacementBand::new(5, 6)),
        (_, ThirdFourth, true) => Finish(PlacementBand::fixed(3)),
        (_, ThirdFourth, false) => Finish(PlacementBand::fixed(4)),
        (Eight, R16 | ConsR3 | ConsR4, _) | (_, Done, _) => return None,
    };
    Some(step)
}

/// Bracket invariant violations raised by the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BracketError {
    #[error("bracket is already finished")]
    AlreadyDone,
    #[error("{phase} is not part of a {size} bracket")]
    PhaseNotInBracket {
        phase: BracketPhase,
        size: BracketSize,
    },
    #[error("finished bracket has no placement")]
    Unplaced,
    #[error("unsupported bracket size {0}; expected 8 or 16")]
    UnsupportedSize(u8),
}

/// Display row for the seeding table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketParticipant {
    pub seed: u8,
    pub name: String,
    pub rating: f64,
    pub is_player: bool,
}

/// One match the player wrestled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketStep {
    pub phase: BracketPhase,
    pub opponent: String,
    pub result: MatchResult,
}

/// Deterministic stand-in used when too few opponents are entered. Rated just
/// below `base_rating`; draw-free.
#[must_use]
pub fn filler_entrant(index: usize, base_rating: f64) -> Entrant {
    let offset = f64::from(u8::try_from(index % 5).unwrap_or(0)) + 1.0;
    let rating = FILLER_STEP.mul_add(-offset, base_rating);
    Entrant::new(
        format!("Open Entry {}", index + 1),
        Competitor::with_rating(rating),
    )
}

/// Exactly `size - 1` opponents: extras are dropped, gaps filled with open entries.
fn field_of(opponents: &[Entrant], size: BracketSize) -> Vec<Entrant> {
    let needed = usize::from(size.entrants() - 1);
    let mut field: Vec<Entrant> = opponents.iter().take(needed).cloned().collect();
    if field.len() < needed {
        let base = if field.is_empty() {
            FILLER_BASE_RATING
        } else {
            field.iter().map(Entrant::rating).sum::<f64>() / usize_to_f64(field.len())
        };
        debug!(
            "padding {size} bracket with {} open entries",
            needed - field.len()
        );
        let start = field.len();
        field.extend((start..needed).map(|index| filler_entrant(index - start, base)));
    }
    field
}

/// Seeding table for display. Seeds follow rating and never bias the simulation.
#[must_use]
pub fn build(opponents: &[Entrant], player: &Entrant, size: BracketSize) -> Vec<BracketParticipant> {
    let field = field_of(opponents, size);
    let mut rows: Vec<(&Entrant, bool)> = std::iter::once((player, true))
        .chain(field.iter().map(|entrant| (entrant, false)))
        .collect();
    rows.sort_by(|(a, _), (b, _)| {
        b.rating()
            .total_cmp(&a.rating())
            .then_with(|| a.name.cmp(&b.name))
    });
    rows.into_iter()
        .zip(1..=size.entrants())
        .map(|((entrant, is_player), seed)| BracketParticipant {
            seed,
            name: entrant.name.clone(),
            rating: entrant.rating(),
            is_player,
        })
        .collect()
}

/// In-progress tournament for the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingBracketState {
    size: BracketSize,
    phase: BracketPhase,
    opponents: Vec<Entrant>,
    opponent_index: usize,
    placement: Option<u8>,
    losses: u8,
    history: Vec<BracketStep>,
}

impl PendingBracketState {
    #[must_use]
    pub fn new(opponents: &[Entrant], size: BracketSize) -> Self {
        Self {
            size,
            phase: size.opening_phase(),
            opponents: field_of(opponents, size),
            opponent_index: 0,
            placement: None,
            losses: 0,
            history: Vec::new(),
        }
    }

    #[must_use]
    pub const fn size(&self) -> BracketSize {
        self.size
    }

    #[must_use]
    pub const fn phase(&self) -> BracketPhase {
        self.phase
    }

    #[must_use]
    pub const fn is_done(&self) -> bool {
        matches!(self.phase, BracketPhase::Done)
    }

    #[must_use]
    pub const fn placement(&self) -> Option<u8> {
        self.placement
    }

    #[must_use]
    pub const fn losses(&self) -> u8 {
        self.losses
    }

    #[must_use]
    pub fn history(&self) -> &[BracketStep] {
        &self.history
    }

    #[must_use]
    pub fn matches_played(&self) -> usize {
        self.history.len()
    }

    #[must_use]
    pub fn opponents(&self) -> &[Entrant] {
        &self.opponents
    }

    /// Opponent for the next match, `None` once the bracket is done.
    ///
    /// A cursor past the end of the field keeps returning the last opponent.
    #[must_use]
    pub fn current_opponent(&self) -> Option<&Entrant> {
        if self.is_done() {
            return None;
        }
        self.opponents
            .get(self.opponent_index)
            .or_else(|| self.opponents.last())
    }

    /// Apply the player's result for the current phase.
    ///
    /// Terminal transitions resolve the placement band, drawing one
    /// `chance(0.5)` per halving of a shared band.
    ///
    /// # Errors
    ///
    /// Returns `BracketError::AlreadyDone` after the final placement and
    /// `BracketError::PhaseNotInBracket` for a state whose phase the field size never visits.
    pub fn advance(&self, result: &MatchResult, rng: &mut MatchRng) -> Result<Self, BracketError> {
        if self.is_done() {
            return Err(BracketError::AlreadyDone);
        }
        let step = transition(self.size, self.phase, result.won).ok_or(
            BracketError::PhaseNotInBracket {
                phase: self.phase,
                size: self.size,
            },
        )?;
        let opponent = self
            .current_opponent()
            .map(|entrant| entrant.name.clone())
            .unwrap_or_default();

        let mut next = self.clone();
        next.history.push(BracketStep {
            phase: self.phase,
            opponent,
            result: *result,
        });
        next.opponent_index += 1;
        if !result.won {
            next.losses += 1;
        }
        match step {
            Transition::Next(phase) => next.phase = phase,
            Transition::Finish(band) => {
                next.placement = Some(band.resolve(rng));
                next.phase = BracketPhase::Done;
            }
        }
        debug!(
            "bracket {} {} -> {} ({})",
            self.phase,
            result,
            next.phase,
            next.placement
                .map_or_else(|| "pending".to_string(), |place| format!("place {place}"))
        );
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::MatchMethod;

    fn outcome(won: bool) -> MatchResult {
        MatchResult {
            won,
            method: MatchMethod::Decision,
            my_score: if won { 5 } else { 2 },
            opp_score: if won { 2 } else { 5 },
        }
    }

    fn play(size: BracketSize, script: &[bool], seed: &str) -> PendingBracketState {
        let mut rng = MatchRng::new(seed);
        let mut state = PendingBracketState::new(&[], size);
        for won in script {
            state = state.advance(&outcome(*won), &mut rng).unwrap();
        }
        state
    }

    #[test]
    fn undefeated_run_wins_eight_man() {
        let state = play(BracketSize::Eight, &[true, true, true, true], "champ");
        assert!(state.is_done());
        assert_eq!(state.placement(), Some(1));
        assert_eq!(state.losses(), 0);
        let phases: Vec<_> = state.history().iter().map(|step| step.phase).collect();
        assert_eq!(
            phases,
            [
                BracketPhase::Qf,
                BracketPhase::Sf,
                BracketPhase::WbFinal,
                BracketPhase::Final
            ]
        );
    }

    #[test]
    fn losers_final_win_forces_reset() {
        let state = play(BracketSize::Eight, &[true, true, false, true], "reset");
        assert_eq!(state.phase(), BracketPhase::Reset);
        let done = state
            .advance(&outcome(true), &mut MatchRng::new("reset-final"))
            .unwrap();
        assert_eq!(done.placement(), Some(1));
        assert_eq!(done.losses(), 1);
    }

    #[test]
    fn first_round_exit_shares_bottom_band() {
        let state = play(BracketSize::Sixteen, &[false, false], "early");
        assert!(state.is_done());
        let place = state.placement().unwrap();
        assert!((15..=16).contains(&place));
    }

    #[test]
    fn advancing_finished_bracket_is_rejected() {
        let state = play(BracketSize::Eight, &[false, false], "done");
        let err = state
            .advance(&outcome(true), &mut MatchRng::new("again"))
            .unwrap_err();
        assert_eq!(err, BracketError::AlreadyDone);
    }

    #[test]
    fn fixed_bands_consume_no_draws() {
        let mut rng = MatchRng::new("bands");
        assert_eq!(PlacementBand::fixed(3).resolve(&mut rng), 3);
        assert_eq!(rng.draws(), 0);
        let place = PlacementBand::new(5, 6).resolve(&mut rng);
        assert!((5..=6).contains(&place));
        assert_eq!(rng.draws(), 1);
        let place = PlacementBand::new(9, 12).resolve(&mut rng);
        assert!((9..=12).contains(&place));
        assert_eq!(rng.draws(), 3);
    }

    #[test]
    fn short_fields_are_padded_with_open_entries() {
        let player = Entrant::new("Player", Competitor::with_rating(75.0));
        let rival = Entrant::new("Rival", Competitor::with_rating(80.0));
        let rows = build(&[rival], &player, BracketSize::Sixteen);
        assert_eq!(rows.len(), 16);
        assert_eq!(rows[0].name, "Rival");
        assert_eq!(rows[0].seed, 1);
        assert_eq!(rows.iter().filter(|row| row.is_player).count(), 1);
        assert_eq!(
            rows.iter()
                .filter(|row| row.name.starts_with("Open Entry"))
                .count(),
            14
        );
    }

    #[test]
    fn extra_opponents_are_dropped() {
        let many: Vec<_> = (0..20)
            .map(|i| Entrant::new(format!("E{i}"), Competitor::with_rating(70.0)))
            .collect();
        let state = PendingBracketState::new(&many, BracketSize::Eight);
        assert_eq!(state.opponents().len(), 7);
        assert_eq!(state.current_opponent().unwrap().name, "E0");
    }

    #[test]
    fn exhausted_cursor_repeats_last_opponent() {
        let field: Vec<_> = (0..7)
            .map(|i| Entrant::new(format!("E{i}"), Competitor::with_rating(70.0)))
            .collect();
        let mut state = PendingBracketState::new(&field, BracketSize::Eight);
        state.opponent_index = 9;
        assert_eq!(state.current_opponent().unwrap().name, "E6");
    }

    #[test]
    fn filler_entrants_are_deterministic() {
        assert_eq!(filler_entrant(3, 70.0), filler_entrant(3, 70.0));
        assert_eq!(filler_entrant(0, 70.0).name, "Open Entry 1");
    }

    #[test]
    fn size_serializes_as_entrant_count() {
        assert_eq!(serde_json::to_string(&BracketSize::Sixteen).unwrap(), "16");
        assert_eq!(
            serde_json::from_str::<BracketSize>("8").unwrap(),
            BracketSize::Eight
        );
        assert!(serde_json::from_str::<BracketSize>("12").is_err());
    }

    #[test]
    fn eight_man_never_visits_late_consolation_rounds() {
        assert_eq!(transition(BracketSize::Eight, BracketPhase::ConsR3, true), None);
        assert_eq!(transition(BracketSize::Eight, BracketPhase::R16, false), None);
        assert_eq!(transition(BracketSize::Sixteen, BracketPhase::Done, true), None);
    }
}
