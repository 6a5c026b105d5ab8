//! Takedown Simulation Engine
//!
//! Deterministic match and tournament simulation for the Takedown wrestling
//! career game. The crate covers the seeded random source, the match outcome
//! model, the double-elimination bracket engine and the interactive exchange
//! engine. Calendar scheduling, persistence and UI live elsewhere and talk to
//! this crate through [`SimulationEngine`].

pub mod bracket;
pub mod calibration;
pub mod competitor;
pub mod contest;
pub mod exchange;
pub mod numbers;
pub mod outcome;
pub mod resolver;
pub mod result;
pub mod rng;
pub mod session;

// Re-export commonly used types
pub use bracket::{
    BracketError, BracketOutcome, BracketParticipant, BracketPhase, BracketSize, BracketStep,
    BracketViolation, PendingBracketState, PlacementBand, ViolationKind, build, play_bracket,
    validate_path, validate_state,
};
pub use calibration::{
    CalibrationError, CalibrationTable, ContestCalibration, ExchangeConfig, MethodCalibration,
    OutcomeCalibration, ScoreCalibration,
};
pub use competitor::{Competitor, Entrant, MatchModifiers, Skills};
pub use contest::{BoutReport, Contest, ContestOutcome, run_contest};
pub use exchange::{
    ActionKey, ActionOption, AggressivePolicy, ConservativePolicy, ExchangeError,
    ExchangeLogEntry, ExchangePolicy, ExchangePrompt, ExchangeResolution, MinigameMatchState,
    Position, ResolveOptions, RiskTag, ScriptedPolicy, play_out,
};
pub use outcome::{effective_gap, simulate, win_probability};
pub use resolver::{InstantResolver, InteractiveResolver, MatchResolver, SimulationError};
pub use result::{MatchMethod, MatchRecord, MatchResult};
pub use rng::{MatchRng, RandomState, RngStateError};
pub use session::{CareerSession, SessionSnapshot};

/// Trait for abstracting calibration loading.
/// Platform-specific implementations should provide this
pub trait CalibrationLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the calibration table the career runs with
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be loaded or parsed.
    fn load_calibration(&self) -> Result<CalibrationTable, Self::Error>;
}

/// Trait for abstracting snapshot persistence.
/// Platform-specific implementations should provide this
pub trait SnapshotStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Save a session snapshot
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be saved.
    fn save_snapshot(&self, slot: &str, snapshot: &SessionSnapshot) -> Result<(), Self::Error>;

    /// Load a session snapshot
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be loaded.
    fn load_snapshot(&self, slot: &str) -> Result<Option<SessionSnapshot>, Self::Error>;

    /// Delete a stored snapshot
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be deleted.
    fn delete_snapshot(&self, slot: &str) -> Result<(), Self::Error>;
}

/// Entry point for the scheduler: hands out sessions and persists their random state.
pub struct SimulationEngine<L, S>
where
    L: CalibrationLoader,
    S: SnapshotStore,
{
    loader: L,
    store: S,
}

impl<L, S> SimulationEngine<L, S>
where
    L: CalibrationLoader,
    S: SnapshotStore,
{
    pub const fn new(loader: L, store: S) -> Self {
        Self { loader, store }
    }

    /// Start a new career session from a seed string
    ///
    /// # Errors
    ///
    /// Returns an error if the calibration table cannot be loaded.
    pub fn create_session(&self, seed: &str) -> Result<CareerSession, L::Error> {
        let table = self.loader.load_calibration()?;
        Ok(CareerSession::new(seed, table))
    }

    /// Persist a session's random state
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be saved.
    pub fn save_session(&self, slot: &str, session: &CareerSession) -> Result<(), S::Error> {
        self.store.save_snapshot(slot, &session.snapshot())
    }

    /// Restore a session saved with [`Self::save_session`]
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot or calibration cannot be loaded, the
    /// calibration fails validation, or the stored random state is malformed.
    pub fn load_session(&self, slot: &str) -> Result<Option<CareerSession>, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
        S::Error: Into<anyhow::Error>,
    {
        let Some(snapshot) = self.store.load_snapshot(slot).map_err(Into::into)? else {
            return Ok(None);
        };
        let table = self.loader.load_calibration().map_err(Into::into)?;
        table.validate()?;
        Ok(Some(CareerSession::restore(&snapshot, table)?))
    }

    /// Remove a stored session
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be deleted.
    pub fn delete_session(&self, slot: &str) -> Result<(), S::Error> {
        self.store.delete_snapshot(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::convert::Infallible;
    use std::rc::Rc;

    #[derive(Clone, Copy, Default)]
    struct FixtureLoader;

    impl CalibrationLoader for FixtureLoader {
        type Error = Infallible;

        fn load_calibration(&self) -> Result<CalibrationTable, Self::Error> {
            Ok(CalibrationTable::default())
        }
    }

    #[derive(Clone, Default)]
    struct MemoryStore {
        slots: Rc<RefCell<HashMap<String, SessionSnapshot>>>,
    }

    impl SnapshotStore for MemoryStore {
        type Error = Infallible;

        fn save_snapshot(&self, slot: &str, snapshot: &SessionSnapshot) -> Result<(), Self::Error> {
            self.slots
                .borrow_mut()
                .insert(slot.to_string(), snapshot.clone());
            Ok(())
        }

        fn load_snapshot(&self, slot: &str) -> Result<Option<SessionSnapshot>, Self::Error> {
            Ok(self.slots.borrow().get(slot).cloned())
        }

        fn delete_snapshot(&self, slot: &str) -> Result<(), Self::Error> {
            self.slots.borrow_mut().remove(slot);
            Ok(())
        }
    }

    #[test]
    fn engine_creates_and_roundtrips_session() {
        let engine = SimulationEngine::new(FixtureLoader, MemoryStore::default());
        let mut session = engine.create_session("season-one").unwrap();
        let player = Entrant::new("Player", Competitor::with_rating(80.0));
        let dual = Contest::Dual {
            opponent: Entrant::new("Rival", Competitor::with_rating(79.0)),
        };
        session
            .run_contest(&player, &dual, MatchModifiers::default())
            .unwrap();
        session.advance_week();
        engine.save_session("slot-one", &session).unwrap();

        let loaded = engine
            .load_session("slot-one")
            .unwrap()
            .expect("save exists");
        assert_eq!(loaded, session);
        assert!(engine.load_session("missing-slot").unwrap().is_none());
    }

    #[test]
    fn deleted_sessions_are_gone() {
        let engine = SimulationEngine::new(FixtureLoader, MemoryStore::default());
        let session = engine.create_session("delete-me").unwrap();
        engine.save_session("slot", &session).unwrap();
        engine.delete_session("slot").unwrap();
        assert!(engine.load_session("slot").unwrap().is_none());
    }

    #[test]
    fn corrupted_snapshot_is_an_error() {
        let store = MemoryStore::default();
        store
            .save_snapshot(
                "bad",
                &SessionSnapshot {
                    rng: RandomState {
                        seed: "x".to_string(),
                        state: "not-a-state".to_string(),
                    },
                    week: 4,
                },
            )
            .unwrap();
        let engine = SimulationEngine::new(FixtureLoader, store);
        assert!(engine.load_session("bad").is_err());
    }
}
