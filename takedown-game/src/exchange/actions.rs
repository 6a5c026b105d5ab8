//! Action catalog: labels, risk tags and resolution profiles per position.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

use self::Matchup::{Control, Escape, Shot};
use super::Position::{Bottom, Neutral, Top};
use super::{ExchangeError, Position};
use crate::competitor::Skills;

/// Qualitative risk shown to the player next to each option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTag {
    Low,
    Medium,
    High,
}

/// Every action the engine can resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKey {
    HandFight,
    SnapDown,
    SingleLeg,
    DoubleLeg,
    Ride,
    Tilt,
    Cradle,
    StandUp,
    Switch,
    Granby,
    /// Substituted when the decision timer runs out; never offered.
    Hesitate,
}

impl ActionKey {
    pub const NEUTRAL: [Self; 4] = [
        Self::HandFight,
        Self::SnapDown,
        Self::SingleLeg,
        Self::DoubleLeg,
    ];
    pub const TOP: [Self; 3] = [Self::Ride, Self::Tilt, Self::Cradle];
    pub const BOTTOM: [Self; 3] = [Self::StandUp, Self::Switch, Self::Granby];
    pub const ALL: [Self; 11] = [
        Self::HandFight,
        Self::SnapDown,
        Self::SingleLeg,
        Self::DoubleLeg,
        Self::Ride,
        Self::Tilt,
        Self::Cradle,
        Self::StandUp,
        Self::Switch,
        Self::Granby,
        Self::Hesitate,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HandFight => "hand_fight",
            Self::SnapDown => "snap_down",
            Self::SingleLeg => "single_leg",
            Self::DoubleLeg => "double_leg",
            Self::Ride => "ride",
            Self::Tilt => "tilt",
            Self::Cradle => "cradle",
            Self::StandUp => "stand_up",
            Self::Switch => "switch",
            Self::Granby => "granby",
            Self::Hesitate => "hesitate",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::HandFight => "Hand fight",
            Self::SnapDown => "Snap down",
            Self::SingleLeg => "Single leg",
            Self::DoubleLeg => "Double leg",
            Self::Ride => "Ride",
            Self::Tilt => "Tilt",
            Self::Cradle => "Cradle",
            Self::StandUp => "Stand up",
            Self::Switch => "Switch",
            Self::Granby => "Granby roll",
            Self::Hesitate => "Hesitate",
        }
    }

    #[must_use]
    pub const fn risk(self) -> RiskTag {
        match self {
            Self::HandFight | Self::SnapDown | Self::Ride | Self::StandUp | Self::Hesitate => {
                RiskTag::Low
            }
            Self::SingleLeg | Self::Tilt | Self::Switch => RiskTag::Medium,
            Self::DoubleLeg | Self::Cradle | Self::Granby => RiskTag::High,
        }
    }

    /// Base options for a position, before energy and injury filtering.
    #[must_use]
    pub fn catalog(position: Position) -> &'static [Self] {
        match position {
            Position::Neutral => &Self::NEUTRAL,
            Position::Top => &Self::TOP,
            Position::Bottom => &Self::BOTTOM,
        }
    }
}

impl fmt::Display for ActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKey {
    type Err = ExchangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == wanted)
            .ok_or_else(|| ExchangeError::UnknownAction { key: s.to_string() })
    }
}

/// One labeled choice in a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActionOption {
    pub key: ActionKey,
    pub label: &'static str,
    pub risk: RiskTag,
}

impl From<ActionKey> for ActionOption {
    fn from(key: ActionKey) -> Self {
        Self {
            key,
            label: key.label(),
            risk: key.risk(),
        }
    }
}

/// Up to four options stored inline.
pub type ActionOptions = SmallVec<[ActionOption; 4]>;

/// Which attribute blend decides an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Matchup {
    /// Neutral offense against neutral defense.
    Shot,
    /// Riding and turning from the top.
    Control,
    /// Escapes and reversals from underneath.
    Escape,
}

impl Matchup {
    /// Actor and defender attribute scores for this matchup.
    pub(crate) fn scores(self, actor: &Skills, defender: &Skills) -> (f64, f64) {
        match self {
            Self::Shot => (
                (actor.technique + actor.speed + actor.strength) / 3.0,
                (defender.mat_iq + defender.speed + defender.flexibility) / 3.0,
            ),
            Self::Control => (
                (actor.strength + actor.technique + actor.mat_iq) / 3.0,
                (defender.flexibility + defender.conditioning + defender.strength) / 3.0,
            ),
            Self::Escape => (
                (actor.speed + actor.flexibility + actor.technique) / 3.0,
                (defender.strength + defender.mat_iq + defender.conditioning) / 3.0,
            ),
        }
    }
}

/// Resolution parameters for one action in one position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ActionProfile {
    pub base_success: f64,
    pub success_points: u16,
    pub success_position: Position,
    /// Chance to finish the match when the action succeeds.
    pub pin_chance: f64,
    /// Chance the defender scores off a failed attempt.
    pub counter_chance: f64,
    pub counter_points: u16,
    pub counter_position: Position,
    /// Chance the defender finishes the match off a counter.
    pub counter_pin_chance: f64,
    pub energy_cost: f64,
    pub injury_risk: f64,
    pub matchup: Matchup,
}

impl ActionProfile {
    #[allow(clippy::too_many_arguments)]
    const fn new(
        base_success: f64,
        success: (u16, Position),
        pin_chance: f64,
        counter: (f64, u16, Position),
        counter_pin_chance: f64,
        energy_cost: f64,
        injury_risk: f64,
        matchup: Matchup,
    ) -> Self {
        Self {
            base_success,
            success_points: success.0,
            success_position: success.1,
            pin_chance,
            counter_chance: counter.0,
            counter_points: counter.1,
            counter_position: counter.2,
            counter_pin_chance,
            energy_cost,
            injury_risk,
            matchup,
        }
    }
}

/// Profile for `key` taken from `position`. Hesitation depends on where it happens.
pub(crate) const fn profile(key: ActionKey, position: Position) -> ActionProfile {
    match key {
        ActionKey::HandFight => {
            ActionProfile::new(0.60, (0, Neutral), 0.0, (0.05, 2, Bottom), 0.0, 2.0, 0.0, Shot)
        }
        ActionKey::SnapDown => {
            ActionProfile::new(0.45, (2, Top), 0.0, (0.15, 2, Bottom), 0.0, 4.0, 0.01, Shot)
        }
        ActionKey::SingleLeg => {
            ActionProfile::new(0.50, (2, Top), 0.0, (0.25, 2, Bottom), 0.0, 6.0, 0.02, Shot)
        }
        ActionKey::DoubleLeg => {
            ActionProfile::new(0.42, (2, Top), 0.0, (0.35, 2, Bottom), 0.02, 9.0, 0.04, Shot)
        }
        ActionKey::Ride => {
            ActionProfile::new(0.65, (0, Top), 0.0, (0.60, 1, Neutral), 0.0, 4.0, 0.01, Control)
        }
        ActionKey::Tilt => {
            ActionProfile::new(0.40, (3, Top), 0.10, (0.30, 2, Bottom), 0.0, 7.0, 0.02, Control)
        }
        ActionKey::Cradle => {
            ActionProfile::new(0.22, (4, Top), 0.35, (0.35, 2, Bottom), 0.02, 10.0, 0.03, Control)
        }
        ActionKey::StandUp => {
            ActionProfile::new(0.50, (1, Neutral), 0.0, (0.20, 2, Bottom), 0.02, 5.0, 0.02, Escape)
        }
        ActionKey::Switch => {
            ActionProfile::new(0.38, (2, Top), 0.0, (0.25, 2, Bottom), 0.04, 7.0, 0.03, Escape)
        }
        ActionKey::Granby => {
            ActionProfile::new(0.30, (2, Top), 0.0, (0.40, 3, Bottom), 0.08, 10.0, 0.05, Escape)
        }
        ActionKey::Hesitate => match position {
            Neutral => {
                ActionProfile::new(0.0, (0, Neutral), 0.0, (0.35, 2, Bottom), 0.0, 1.0, 0.0, Shot)
            }
            Top => {
                ActionProfile::new(0.0, (0, Top), 0.0, (0.50, 1, Neutral), 0.0, 1.0, 0.0, Control)
            }
            Bottom => {
                ActionProfile::new(0.0, (0, Bottom), 0.0, (0.30, 2, Bottom), 0.03, 1.0, 0.0, Escape)
            }
        },
    }
}
