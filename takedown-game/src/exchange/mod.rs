//! Interactive exchange engine: one match played as a sequence of timed decisions.
//!
//! Every transition produces a new [`MinigameMatchState`]; the previous value is
//! left untouched so callers can snapshot or rewind freely. The decision timer
//! is enforced by the caller, which reports expiry through [`ResolveOptions`].
use log::trace;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calibration::CalibrationTable;
use crate::competitor::{Competitor, MatchModifiers};
use crate::outcome::win_probability;
use crate::result::{MatchMethod, MatchRecord, MatchResult};
use crate::rng::MatchRng;

pub mod actions;
pub mod policy;
mod resolve;

pub use actions::{ActionKey, ActionOption, ActionOptions, RiskTag};
pub use policy::{
    AggressivePolicy, ConservativePolicy, ExchangePolicy, ScriptedPolicy, play_out,
};

/// Mat position from the acting competitor's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Neutral,
    Top,
    Bottom,
}

impl Position {
    /// The same position seen by the other competitor.
    #[must_use]
    pub const fn mirrored(self) -> Self {
        match self {
            Self::Neutral => Self::Neutral,
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
        }
    }
}

/// Errors raised when the caller breaks the exchange protocol.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    #[error("match is already finished")]
    MatchFinished,
    #[error("match is still in progress")]
    MatchInProgress,
    #[error("action {action} is not offered from {position:?}")]
    ActionUnavailable { action: ActionKey, position: Position },
    #[error("unknown action key {key:?}")]
    UnknownAction { key: String },
}

/// Flags accompanying a resolve call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// The decision window elapsed before the player chose.
    pub timed_out: bool,
}

impl ResolveOptions {
    #[must_use]
    pub const fn timed_out() -> Self {
        Self { timed_out: true }
    }
}

/// Contextual decision point shown to the player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExchangePrompt {
    pub period: u8,
    /// 1-based exchange number within the period.
    pub exchange: u8,
    pub position: Position,
    pub options: ActionOptions,
    pub timer_ms: u32,
    pub my_score: u16,
    pub opp_score: u16,
    pub my_energy: f64,
    pub opp_energy: f64,
    /// The opponent is exhausted or badly hurt.
    pub opponent_fading: bool,
}

impl ExchangePrompt {
    #[must_use]
    pub fn offers(&self, key: ActionKey) -> bool {
        self.options.iter().any(|option| option.key == key)
    }
}

/// One resolved decision point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeLogEntry {
    pub period: u8,
    pub exchange: u8,
    pub position: Position,
    pub position_after: Position,
    pub action: ActionKey,
    pub success: bool,
    pub points_for: u16,
    pub points_against: u16,
    pub energy_before: f64,
    pub energy_after: f64,
    pub injury_before: f64,
    pub injury_after: f64,
    pub opponent_energy_after: f64,
    pub momentum_after: i32,
    /// Set only when the caller reported an elapsed decision window.
    pub timed_out: bool,
}

/// Result of a resolve call: the next state and, unless the match ended, the next prompt.
#[derive(Debug, Clone)]
pub struct ExchangeResolution {
    pub state: MinigameMatchState,
    pub next_prompt: Option<ExchangePrompt>,
}

/// Running state of an interactive match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinigameMatchState {
    period: u8,
    exchange: u8,
    initial_position: Position,
    position: Position,
    my_score: u16,
    opp_score: u16,
    me: Competitor,
    opponent: Competitor,
    momentum: i32,
    log: Vec<ExchangeLogEntry>,
    finished: bool,
    result: Option<MatchResult>,
    tie_break: bool,
    table: CalibrationTable,
}

impl MinigameMatchState {
    /// Start a match between `me` (the acting competitor) and `opponent`.
    #[must_use]
    pub fn start(
        me: Competitor,
        opponent: Competitor,
        initial_position: Position,
        table: &CalibrationTable,
    ) -> Self {
        Self {
            period: 1,
            exchange: 0,
            initial_position,
            position: initial_position,
            my_score: 0,
            opp_score: 0,
            me,
            opponent,
            momentum: 0,
            log: Vec::new(),
            finished: false,
            result: None,
            tie_break: false,
            table: table.clone(),
        }
    }

    #[must_use]
    pub const fn period(&self) -> u8 {
        self.period
    }

    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// `(mine, theirs)`.
    #[must_use]
    pub const fn score(&self) -> (u16, u16) {
        (self.my_score, self.opp_score)
    }

    #[must_use]
    pub const fn me(&self) -> &Competitor {
        &self.me
    }

    #[must_use]
    pub const fn opponent(&self) -> &Competitor {
        &self.opponent
    }

    #[must_use]
    pub const fn momentum(&self) -> i32 {
        self.momentum
    }

    #[must_use]
    pub fn log(&self) -> &[ExchangeLogEntry] {
        &self.log
    }

    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    #[must_use]
    pub const fn result(&self) -> Option<MatchResult> {
        self.result
    }

    /// Whether regulation ended level and a tie-break draw decided the match.
    #[must_use]
    pub const fn went_to_tie_break(&self) -> bool {
        self.tie_break
    }

    /// Flush the finished match into a record carrying its exchange history.
    ///
    /// # Errors
    ///
    /// Returns `ExchangeError::MatchInProgress` until the match has ended.
    pub fn into_record(self) -> Result<MatchRecord, ExchangeError> {
        let result = self.result.ok_or(ExchangeError::MatchInProgress)?;
        Ok(MatchRecord {
            result,
            exchanges: self.log,
        })
    }

    /// The decision point for the next exchange.
    ///
    /// # Errors
    ///
    /// Returns `ExchangeError::MatchFinished` once the match has ended.
    pub fn prompt(&self) -> Result<ExchangePrompt, ExchangeError> {
        if self.finished {
            return Err(ExchangeError::MatchFinished);
        }
        let cfg = &self.table.exchange;
        Ok(ExchangePrompt {
            period: self.period,
            exchange: self.exchange + 1,
            position: self.position,
            options: self.options(),
            timer_ms: cfg.decision_timer_ms,
            my_score: self.my_score,
            opp_score: self.opp_score,
            my_energy: self.me.energy,
            opp_energy: self.opponent.energy,
            opponent_fading: self.is_spent(&self.opponent),
        })
    }

    /// Resolve the current exchange.
    ///
    /// A timed-out call (or one without an action) always succeeds and is
    /// resolved as a hesitation; any supplied key is ignored.
    ///
    /// # Errors
    ///
    /// Returns `ExchangeError::MatchFinished` after the match has ended and
    /// `ExchangeError::ActionUnavailable` for a key the current prompt does not offer.
    pub fn resolve(
        &self,
        action: Option<ActionKey>,
        rng: &mut MatchRng,
        options: ResolveOptions,
    ) -> Result<ExchangeResolution, ExchangeError> {
        if self.finished {
            return Err(ExchangeError::MatchFinished);
        }
        let key = match (options.timed_out, action) {
            (true, _) | (false, None) => ActionKey::Hesitate,
            (false, Some(key)) => {
                if !self.options().iter().any(|option| option.key == key) {
                    return Err(ExchangeError::ActionUnavailable {
                        action: key,
                        position: self.position,
                    });
                }
                key
            }
        };

        let mut next = self.clone();
        next.apply(key, options.timed_out, rng);
        let next_prompt = next.prompt().ok();
        Ok(ExchangeResolution {
            state: next,
            next_prompt,
        })
    }

    fn is_spent(&self, competitor: &Competitor) -> bool {
        let cfg = &self.table.exchange;
        competitor.energy < cfg.low_energy_threshold
            || competitor.injury >= cfg.high_injury_threshold
    }

    fn options(&self) -> ActionOptions {
        let spent = self.is_spent(&self.me);
        ActionKey::catalog(self.position)
            .iter()
            .copied()
            .filter(|key| !(spent && key.risk() == RiskTag::High))
            .map(ActionOption::from)
            .collect()
    }

    fn apply(&mut self, key: ActionKey, timed_out: bool, rng: &mut MatchRng) {
        let cfg = self.table.exchange.clone();
        let position_before = self.position;
        let energy_before = self.me.energy;
        let injury_before = self.me.injury;
        let profile = actions::profile(key, position_before);

        let roll = resolve::roll(
            key,
            &profile,
            &self.me,
            &self.opponent,
            self.momentum,
            &cfg,
            rng,
        );

        let mut points_for = 0;
        let mut points_against = 0;
        if roll.success {
            points_for = profile.success_points;
            self.position = profile.success_position;
            self.momentum += cfg.momentum_success;
        } else {
            self.momentum += if key == ActionKey::Hesitate {
                cfg.momentum_hesitate
            } else {
                cfg.momentum_failure
            };
            if roll.countered {
                points_against = profile.counter_points;
                self.position = profile.counter_position;
            }
        }
        self.momentum = self
            .momentum
            .clamp(-cfg.momentum_limit, cfg.momentum_limit);
        self.my_score = self.my_score.saturating_add(points_for);
        self.opp_score = self.opp_score.saturating_add(points_against);

        let actor_drain = resolve::actor_drain(&profile, &self.me, &cfg);
        let defender_drain = resolve::defender_drain(&profile, &self.opponent, &cfg);
        self.me.energy = (self.me.energy - actor_drain).max(0.0);
        self.opponent.energy = (self.opponent.energy - defender_drain).max(0.0);
        if roll.aggravated {
            self.me.injury = (self.me.injury + cfg.injury_step).min(1.0);
        }

        let entry = ExchangeLogEntry {
            period: self.period,
            exchange: self.exchange + 1,
            position: position_before,
            position_after: self.position,
            action: key,
            success: roll.success,
            points_for,
            points_against,
            energy_before,
            energy_after: self.me.energy,
            injury_before,
            injury_after: self.me.injury,
            opponent_energy_after: self.opponent.energy,
            momentum_after: self.momentum,
            timed_out,
        };
        trace!(
            "exchange p{} #{} {} {:?} -> {:?} success={} score {}-{}",
            entry.period,
            entry.exchange,
            key,
            position_before,
            self.position,
            roll.success,
            self.my_score,
            self.opp_score
        );
        self.log.push(entry);

        if roll.pin {
            self.finish(true, MatchMethod::Pin);
        } else if roll.counter_pin {
            self.finish(false, MatchMethod::Pin);
        } else if self.margin() >= u32::from(self.table.score.tech_fall_margin) {
            self.finish(self.my_score > self.opp_score, MatchMethod::TechnicalFall);
        } else {
            self.advance_clock(rng);
        }
    }

    fn margin(&self) -> u32 {
        u32::from(self.my_score.abs_diff(self.opp_score))
    }

    fn advance_clock(&mut self, rng: &mut MatchRng) {
        let cfg = &self.table.exchange;
        self.exchange += 1;
        if self.exchange < cfg.exchanges_per_period {
            return;
        }
        if self.period < cfg.periods {
            self.period += 1;
            self.exchange = 0;
            self.position = period_start(self.period, self.initial_position);
            return;
        }
        self.finish_regulation(rng);
    }

    fn finish_regulation(&mut self, rng: &mut MatchRng) {
        if self.my_score == self.opp_score {
            // Level after regulation: one draw weighted by live strength.
            let p = win_probability(
                &self.me,
                &self.opponent,
                &MatchModifiers::default(),
                &self.table,
            );
            let points = self.table.exchange.tie_break_points;
            if rng.chance(p) {
                self.my_score = self.my_score.saturating_add(points);
            } else {
                self.opp_score = self.opp_score.saturating_add(points);
            }
            self.tie_break = true;
        }
        self.finish(self.my_score > self.opp_score, MatchMethod::Decision);
    }

    fn finish(&mut self, won: bool, method: MatchMethod) {
        self.finished = true;
        self.result = Some(MatchResult {
            won,
            method,
            my_score: self.my_score,
            opp_score: self.opp_score,
        });
    }
}

/// Period 1 opens at the chosen position, period 2 with the actor on top, period 3 underneath.
const fn period_start(period: u8, initial: Position) -> Position {
    match period {
        0 | 1 => initial,
        2 => Position::Top,
        _ => Position::Bottom,
    }
}
