//! Resolution modes behind one seam so brackets and contests can use either.
use thiserror::Error;

use crate::bracket::BracketError;
use crate::calibration::CalibrationTable;
use crate::competitor::{Competitor, Entrant, MatchModifiers};
use crate::exchange::{ExchangeError, ExchangePolicy, MinigameMatchState, Position, play_out};
use crate::outcome::simulate;
use crate::result::MatchRecord;
use crate::rng::MatchRng;

/// Errors surfaced while driving a contest end to end.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SimulationError {
    #[error(transparent)]
    Bracket(#[from] BracketError),
    #[error(transparent)]
    Exchange(#[from] ExchangeError),
}

/// Resolves one match for `player` against `opponent`.
pub trait MatchResolver {
    /// # Errors
    ///
    /// Interactive resolvers propagate exchange protocol violations.
    fn resolve(
        &mut self,
        player: &Competitor,
        opponent: &Entrant,
        rng: &mut MatchRng,
    ) -> Result<MatchRecord, ExchangeError>;
}

/// One-shot resolution through the outcome model.
#[derive(Debug, Clone)]
pub struct InstantResolver<'a> {
    table: &'a CalibrationTable,
    modifiers: MatchModifiers,
}

impl<'a> InstantResolver<'a> {
    #[must_use]
    pub const fn new(table: &'a CalibrationTable, modifiers: MatchModifiers) -> Self {
        Self { table, modifiers }
    }
}

impl MatchResolver for InstantResolver<'_> {
    fn resolve(
        &mut self,
        player: &Competitor,
        opponent: &Entrant,
        rng: &mut MatchRng,
    ) -> Result<MatchRecord, ExchangeError> {
        let result = simulate(
            player,
            &opponent.competitor,
            &self.modifiers,
            self.table,
            rng,
        );
        Ok(MatchRecord::instant(result))
    }
}

/// Plays every match exchange by exchange, asking `policy` for each decision.
#[derive(Debug, Clone)]
pub struct InteractiveResolver<'a, P> {
    table: &'a CalibrationTable,
    policy: P,
    initial_position: Position,
}

impl<'a, P: ExchangePolicy> InteractiveResolver<'a, P> {
    #[must_use]
    pub const fn new(table: &'a CalibrationTable, policy: P) -> Self {
        Self {
            table,
            policy,
            initial_position: Position::Neutral,
        }
    }

    #[must_use]
    pub fn starting_from(mut self, position: Position) -> Self {
        self.initial_position = position;
        self
    }
}

impl<P: ExchangePolicy> MatchResolver for InteractiveResolver<'_, P> {
    fn resolve(
        &mut self,
        player: &Competitor,
        opponent: &Entrant,
        rng: &mut MatchRng,
    ) -> Result<MatchRecord, ExchangeError> {
        let state = MinigameMatchState::start(
            *player,
            opponent.competitor,
            self.initial_position,
            self.table,
        );
        play_out(state, &mut self.policy, rng)?.into_record()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::ConservativePolicy;

    #[test]
    fn instant_records_have_no_exchanges() {
        let table = CalibrationTable::default();
        let mut resolver = InstantResolver::new(&table, MatchModifiers::default());
        let mut rng = MatchRng::new("instant");
        let opponent = Entrant::new("Rival", Competitor::with_rating(70.0));
        let record = resolver
            .resolve(&Competitor::with_rating(72.0), &opponent, &mut rng)
            .unwrap();
        assert!(record.exchanges.is_empty());
        assert!(record.result.is_consistent(table.score.tech_fall_margin));
    }

    #[test]
    fn interactive_records_carry_history() {
        let table = CalibrationTable::default();
        let mut resolver =
            InteractiveResolver::new(&table, ConservativePolicy).starting_from(Position::Top);
        let mut rng = MatchRng::new("interactive");
        let opponent = Entrant::new("Rival", Competitor::with_rating(70.0));
        let record = resolver
            .resolve(&Competitor::with_rating(72.0), &opponent, &mut rng)
            .unwrap();
        assert!(!record.exchanges.is_empty());
        assert_eq!(record.exchanges[0].position, Position::Top);
        assert!(record.result.is_consistent(table.score.tech_fall_margin));
    }
}
