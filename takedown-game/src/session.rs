//! Career session: the random stream and calibration owned by one career.
use log::info;
use serde::{Deserialize, Serialize};

use crate::calibration::CalibrationTable;
use crate::competitor::{Entrant, MatchModifiers};
use crate::contest::{Contest, ContestOutcome, run_contest};
use crate::exchange::{
    ActionKey, ExchangeError, ExchangeResolution, MinigameMatchState, Position, ResolveOptions,
};
use crate::resolver::{InstantResolver, SimulationError};
use crate::rng::{MatchRng, RandomState, RngStateError};

/// What the persistence layer stores between turns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub rng: RandomState,
    pub week: u32,
}

/// Exclusive owner of a career's random stream.
#[derive(Debug, Clone, PartialEq)]
pub struct CareerSession {
    rng: MatchRng,
    table: CalibrationTable,
    week: u32,
}

impl CareerSession {
    #[must_use]
    pub fn new(seed: &str, table: CalibrationTable) -> Self {
        Self {
            rng: MatchRng::new(seed),
            table,
            week: 1,
        }
    }

    /// Rebuild a session from a stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns `RngStateError` when the stored random state is malformed.
    pub fn restore(snapshot: &SessionSnapshot, table: CalibrationTable) -> Result<Self, RngStateError> {
        Ok(Self {
            rng: MatchRng::restore(&snapshot.rng)?,
            table,
            week: snapshot.week,
        })
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            rng: self.rng.snapshot(),
            week: self.week,
        }
    }

    #[must_use]
    pub const fn week(&self) -> u32 {
        self.week
    }

    #[must_use]
    pub const fn table(&self) -> &CalibrationTable {
        &self.table
    }

    #[must_use]
    pub const fn rng(&self) -> &MatchRng {
        &self.rng
    }

    pub fn advance_week(&mut self) {
        self.week = self.week.saturating_add(1);
        info!("career advanced to week {}", self.week);
    }

    /// Resolve this week's contest instantly.
    ///
    /// # Errors
    ///
    /// Propagates bracket invariant violations.
    pub fn run_contest(
        &mut self,
        player: &Entrant,
        contest: &Contest,
        modifiers: MatchModifiers,
    ) -> Result<ContestOutcome, SimulationError> {
        let mut resolver = InstantResolver::new(&self.table, modifiers);
        run_contest(player, contest, &mut resolver, &self.table, &mut self.rng)
    }

    /// Begin a match the player will wrestle exchange by exchange.
    #[must_use]
    pub fn start_match(
        &self,
        player: &Entrant,
        opponent: &Entrant,
        position: Position,
    ) -> MinigameMatchState {
        MinigameMatchState::start(player.competitor, opponent.competitor, position, &self.table)
    }

    /// Resolve one exchange of a match started with [`Self::start_match`].
    ///
    /// # Errors
    ///
    /// See [`MinigameMatchState::resolve`].
    pub fn resolve_exchange(
        &mut self,
        state: &MinigameMatchState,
        action: Option<ActionKey>,
        options: ResolveOptions,
    ) -> Result<ExchangeResolution, ExchangeError> {
        state.resolve(action, &mut self.rng, options)
    }
}
