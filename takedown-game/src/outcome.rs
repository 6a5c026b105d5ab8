//! Match outcome model: turns two competitors into a win probability and a result.
//!
//! The preview functions (`effective_gap`, `win_probability`) never touch the
//! random source. `simulate` draws in a fixed order: gap jitter, win roll,
//! method roll, then score draws.
use crate::calibration::{CalibrationTable, MethodCalibration, OutcomeCalibration, ScoreCalibration};
use crate::competitor::{Competitor, ENERGY_MAX, MatchModifiers};
use crate::numbers::{i32_to_u16, round_f64_to_u16};
use crate::result::{MatchMethod, MatchResult};
use crate::rng::MatchRng;

/// Gap points lost to fatigue at the given energy level.
#[must_use]
pub fn fatigue_penalty(energy: f64, cal: &OutcomeCalibration) -> f64 {
    let energy = if energy.is_finite() {
        energy.clamp(0.0, ENERGY_MAX)
    } else {
        0.0
    };
    let deficit = (ENERGY_MAX - energy) / ENERGY_MAX;
    cal.fatigue_weight * deficit.powf(cal.fatigue_exponent)
}

/// Net advantage of `a` over `b` in rating points after situational modifiers.
#[must_use]
pub fn effective_gap(
    a: &Competitor,
    b: &Competitor,
    modifiers: &MatchModifiers,
    cal: &OutcomeCalibration,
) -> f64 {
    let rating_a = a.overall_rating() * modifiers.effective_performance();
    let rating_b = b.overall_rating();
    let raw = cal.rating_weight * (rating_a - rating_b);
    let fatigue = fatigue_penalty(b.energy, cal) - fatigue_penalty(a.energy, cal);
    let injury = cal.injury_weight * (b.injury.clamp(0.0, 1.0) - a.injury.clamp(0.0, 1.0));
    let composure = cal.composure_weight * (a.composure - b.composure);
    raw + fatigue + injury + composure
}

/// Map an effective gap onto a clamped win probability.
#[must_use]
pub fn probability_for_gap(gap: f64, cal: &OutcomeCalibration) -> f64 {
    let gap = if gap.is_nan() { 0.0 } else { gap };
    let shaped = gap.signum() * gap.abs().powf(cal.curve_exponent);
    let p = 1.0 / (1.0 + (-shaped / cal.curve_scale).exp());
    p.clamp(cal.probability_floor, cal.probability_ceiling)
}

/// Jitter-free win probability for `a`; safe for previews.
#[must_use]
pub fn win_probability(
    a: &Competitor,
    b: &Competitor,
    modifiers: &MatchModifiers,
    table: &CalibrationTable,
) -> f64 {
    probability_for_gap(effective_gap(a, b, modifiers, &table.outcome), &table.outcome)
}

/// Resolve one match instantly, reporting the result from `a`'s perspective.
pub fn simulate(
    a: &Competitor,
    b: &Competitor,
    modifiers: &MatchModifiers,
    table: &CalibrationTable,
    rng: &mut MatchRng,
) -> MatchResult {
    let cal = &table.outcome;
    let half_width = if modifiers.rivalry {
        cal.rivalry_jitter
    } else {
        cal.jitter
    };
    let jitter = rng.float().mul_add(2.0, -1.0) * half_width;
    let p = probability_for_gap(effective_gap(a, b, modifiers, cal) + jitter, cal);
    let won = rng.chance(p);

    let winner_p = if won { p } else { 1.0 - p };
    let dominance = dominance(winner_p);
    let method = draw_method(dominance, &table.method, rng);
    let (winner_score, loser_score) = draw_scores(method, dominance, &table.score, rng);

    let (my_score, opp_score) = if won {
        (winner_score, loser_score)
    } else {
        (loser_score, winner_score)
    };
    MatchResult {
        won,
        method,
        my_score,
        opp_score,
    }
}

/// 0.0 for a coin flip (or an upset), 1.0 for a certain win.
#[must_use]
pub fn dominance(winner_probability: f64) -> f64 {
    ((winner_probability - 0.5) * 2.0).clamp(0.0, 1.0)
}

fn draw_method(dominance: f64, cal: &MethodCalibration, rng: &mut MatchRng) -> MatchMethod {
    let pin = cal.pin_slope.mul_add(dominance, cal.pin_base);
    let tech_fall = cal.tech_fall_slope.mul_add(dominance, cal.tech_fall_base);
    let roll = rng.float();
    if roll < pin {
        MatchMethod::Pin
    } else if roll < pin + tech_fall {
        MatchMethod::TechnicalFall
    } else {
        MatchMethod::Decision
    }
}

fn draw_scores(
    method: MatchMethod,
    dominance: f64,
    cal: &ScoreCalibration,
    rng: &mut MatchRng,
) -> (u16, u16) {
    match method {
        MatchMethod::Pin => {
            let winner = score_draw(rng, 0, cal.pin_score_max);
            let loser = score_draw(rng, 0, cal.pin_score_max);
            (winner, loser)
        }
        MatchMethod::TechnicalFall => {
            let loser = score_draw(rng, 0, cal.loser_score_max);
            let overshoot = score_draw(rng, 0, cal.tech_fall_overshoot);
            (
                loser
                    .saturating_add(cal.tech_fall_margin)
                    .saturating_add(overshoot),
                loser,
            )
        }
        MatchMethod::Decision => {
            // Close matches stay close; lopsided ones open up toward a major.
            let span = f64::from(cal.decision_margin_max - cal.decision_margin_min);
            let reach = round_f64_to_u16(span * 0.65f64.mul_add(dominance, 0.35));
            let cap = cal
                .decision_margin_min
                .saturating_add(reach)
                .min(cal.decision_margin_max);
            let margin = score_draw(rng, cal.decision_margin_min, cap);
            let loser = score_draw(rng, 0, cal.loser_score_max);
            (loser.saturating_add(margin), loser)
        }
    }
}

fn score_draw(rng: &mut MatchRng, min: u16, max: u16) -> u16 {
    i32_to_u16(rng.int(i32::from(min), i32::from(max)))
}
