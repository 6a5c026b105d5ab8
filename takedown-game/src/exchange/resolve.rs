//! Probability and drain arithmetic for a single exchange.
use super::actions::{ActionKey, ActionProfile};
use crate::calibration::ExchangeConfig;
use crate::competitor::{Competitor, ENERGY_MAX, SKILL_MAX};
use crate::rng::MatchRng;

const ROLL_CEILING: f64 = 0.95;

/// Draw results for one exchange. Draw order: success, then pin (on success)
/// or counter and counter pin (on failure), then injury.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(super) struct ExchangeRoll {
    pub success: bool,
    pub pin: bool,
    pub countered: bool,
    pub counter_pin: bool,
    pub aggravated: bool,
}

/// Fraction of the energy tank already spent.
fn fatigue(competitor: &Competitor) -> f64 {
    1.0 - competitor.energy.clamp(0.0, ENERGY_MAX) / ENERGY_MAX
}

pub(super) fn success_chance(
    key: ActionKey,
    profile: &ActionProfile,
    actor: &Competitor,
    defender: &Competitor,
    momentum: i32,
    cfg: &ExchangeConfig,
) -> f64 {
    if key == ActionKey::Hesitate {
        return 0.0;
    }
    let (attack, defense) = profile.matchup.scores(&actor.skills, &defender.skills);
    let mut chance = cfg
        .attribute_weight
        .mul_add((attack - defense) / SKILL_MAX, profile.base_success);
    chance *= cfg.energy_weight.mul_add(-fatigue(actor), 1.0);
    chance *= cfg.injury_weight.mul_add(-actor.injury.clamp(0.0, 1.0), 1.0);
    chance += cfg.momentum_weight * f64::from(momentum);
    chance += cfg.defender_fatigue_weight * fatigue(defender);
    chance.clamp(cfg.success_floor, cfg.success_ceiling)
}

pub(super) fn roll(
    key: ActionKey,
    profile: &ActionProfile,
    actor: &Competitor,
    defender: &Competitor,
    momentum: i32,
    cfg: &ExchangeConfig,
    rng: &mut MatchRng,
) -> ExchangeRoll {
    let mut roll = ExchangeRoll {
        success: rng.chance(success_chance(key, profile, actor, defender, momentum, cfg)),
        ..ExchangeRoll::default()
    };
    if roll.success {
        if profile.pin_chance > 0.0 {
            let pin = (profile.pin_chance * (0.5 + fatigue(defender))).min(ROLL_CEILING);
            roll.pin = rng.chance(pin);
        }
    } else {
        let counter = (profile.counter_chance * 0.5f64.mul_add(fatigue(actor), 1.0)).min(ROLL_CEILING);
        roll.countered = rng.chance(counter);
        if roll.countered && profile.counter_pin_chance > 0.0 {
            let pin = (profile.counter_pin_chance * (0.5 + fatigue(actor))).min(ROLL_CEILING);
            roll.counter_pin = rng.chance(pin);
        }
    }
    let aggravation = (profile.injury_risk * 2.0f64.mul_add(actor.injury.clamp(0.0, 1.0), 1.0)).min(1.0);
    roll.aggravated = rng.chance(aggravation);
    roll
}

/// Between 0.5 and 1.5: well-conditioned competitors burn less.
fn conditioning_factor(competitor: &Competitor) -> f64 {
    1.5 - competitor.skills.conditioning.clamp(0.0, SKILL_MAX) / SKILL_MAX
}

pub(super) fn actor_drain(profile: &ActionProfile, actor: &Competitor, cfg: &ExchangeConfig) -> f64 {
    profile
        .energy_cost
        .mul_add(conditioning_factor(actor), cfg.base_energy_drain)
}

pub(super) fn defender_drain(
    profile: &ActionProfile,
    defender: &Competitor,
    cfg: &ExchangeConfig,
) -> f64 {
    (profile.energy_cost * cfg.defender_drain_ratio)
        .mul_add(conditioning_factor(defender), cfg.base_energy_drain)
}
