//! Named calibration table for every tunable constant in the simulation.
//!
//! The defaults are the values the Monte Carlo acceptance suite validates.
//! Recalibration happens here, never inline in the formulas.
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when calibration invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum CalibrationError {
    #[error("{field} must be at least {min:.4} (got {value:.4})")]
    MinViolation {
        field: &'static str,
        min: f64,
        value: f64,
    },
    #[error("{field} must be between {min:.4} and {max:.4} (got {value:.4})")]
    RangeViolation {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("{field} bounds inverted (min {min} > max {max})")]
    InvertedBounds {
        field: &'static str,
        min: f64,
        max: f64,
    },
    #[error("method chances exceed certainty (total {total:.4})")]
    MethodChances { total: f64 },
    #[error("calibration table is not valid JSON: {message}")]
    Parse { message: String },
}

/// Root configuration consumed by every simulation component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibrationTable {
    #[serde(default)]
    pub outcome: OutcomeCalibration,
    #[serde(default)]
    pub method: MethodCalibration,
    #[serde(default)]
    pub score: ScoreCalibration,
    #[serde(default)]
    pub exchange: ExchangeConfig,
    #[serde(default)]
    pub contest: ContestCalibration,
}

impl CalibrationTable {
    /// Parse a table from JSON; missing fields fall back to the defaults.
    ///
    /// # Errors
    ///
    /// Returns `CalibrationError::Parse` for malformed JSON and any validation
    /// error for out-of-range values.
    pub fn from_json(json: &str) -> Result<Self, CalibrationError> {
        let table: Self = serde_json::from_str(json).map_err(|err| CalibrationError::Parse {
            message: err.to_string(),
        })?;
        table.validate()?;
        Ok(table)
    }

    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns `CalibrationError` when any field violates the documented bounds.
    pub fn validate(&self) -> Result<(), CalibrationError> {
        self.outcome.validate()?;
        self.method.validate()?;
        self.score.validate()?;
        self.exchange.validate()?;
        self.contest.validate()?;
        if self.exchange.tie_break_points >= self.score.tech_fall_margin {
            return Err(CalibrationError::RangeViolation {
                field: "exchange.tie_break_points",
                min: 1.0,
                max: f64::from(self.score.tech_fall_margin.saturating_sub(1)),
                value: f64::from(self.exchange.tie_break_points),
            });
        }
        Ok(())
    }
}

/// Weights and curve shape for the win-probability model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutcomeCalibration {
    pub rating_weight: f64,
    /// Gap points lost at zero energy.
    pub fatigue_weight: f64,
    /// Fatigue grows with the deficit raised to this power, so light fatigue barely matters.
    pub fatigue_exponent: f64,
    /// Gap points lost at injury severity 1.0.
    pub injury_weight: f64,
    /// Gap points per point of composure difference.
    pub composure_weight: f64,
    pub curve_exponent: f64,
    pub curve_scale: f64,
    pub probability_floor: f64,
    pub probability_ceiling: f64,
    /// Half-width of the uniform gap jitter applied to every match.
    pub jitter: f64,
    /// Half-width used instead of `jitter` for rivalry matches.
    pub rivalry_jitter: f64,
}

impl Default for OutcomeCalibration {
    fn default() -> Self {
        Self {
            rating_weight: 1.0,
            fatigue_weight: 16.0,
            fatigue_exponent: 3.0,
            injury_weight: 12.5,
            composure_weight: 0.04,
            curve_exponent: 1.3,
            curve_scale: 5.0,
            probability_floor: 0.0005,
            probability_ceiling: 0.9995,
            jitter: 1.0,
            rivalry_jitter: 4.0,
        }
    }
}

impl OutcomeCalibration {
    fn validate(&self) -> Result<(), CalibrationError> {
        min_check("outcome.rating_weight", self.rating_weight, 0.0)?;
        min_check("outcome.fatigue_weight", self.fatigue_weight, 0.0)?;
        range_check("outcome.fatigue_exponent", self.fatigue_exponent, 0.5, 6.0)?;
        min_check("outcome.injury_weight", self.injury_weight, 0.0)?;
        min_check("outcome.composure_weight", self.composure_weight, 0.0)?;
        range_check("outcome.curve_exponent", self.curve_exponent, 0.5, 3.0)?;
        range_check("outcome.curve_scale", self.curve_scale, 0.1, 100.0)?;
        range_check("outcome.probability_floor", self.probability_floor, 1e-6, 0.5)?;
        range_check(
            "outcome.probability_ceiling",
            self.probability_ceiling,
            0.5,
            1.0 - 1e-6,
        )?;
        if self.probability_floor >= self.probability_ceiling {
            return Err(CalibrationError::InvertedBounds {
                field: "outcome.probability",
                min: self.probability_floor,
                max: self.probability_ceiling,
            });
        }
        min_check("outcome.jitter", self.jitter, 0.0)?;
        min_check("outcome.rivalry_jitter", self.rivalry_jitter, self.jitter)?;
        Ok(())
    }
}

/// Chances of a dominant finish, scaled by how lopsided the match was.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MethodCalibration {
    pub pin_base: f64,
    pub pin_slope: f64,
    pub tech_fall_base: f64,
    pub tech_fall_slope: f64,
}

impl Default for MethodCalibration {
    fn default() -> Self {
        Self {
            pin_base: 0.08,
            pin_slope: 0.30,
            tech_fall_base: 0.06,
            tech_fall_slope: 0.26,
        }
    }
}

impl MethodCalibration {
    fn validate(&self) -> Result<(), CalibrationError> {
        range_check("method.pin_base", self.pin_base, 0.0, 1.0)?;
        range_check("method.pin_slope", self.pin_slope, 0.0, 1.0)?;
        range_check("method.tech_fall_base", self.tech_fall_base, 0.0, 1.0)?;
        range_check("method.tech_fall_slope", self.tech_fall_slope, 0.0, 1.0)?;
        let total = self.pin_base + self.pin_slope + self.tech_fall_base + self.tech_fall_slope;
        if total > 1.0 {
            return Err(CalibrationError::MethodChances { total });
        }
        Ok(())
    }
}

/// Score ranges for instant resolution; shared margins for interactive play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreCalibration {
    pub tech_fall_margin: u16,
    /// Extra points a technical fall may overshoot the margin by.
    pub tech_fall_overshoot: u16,
    pub decision_margin_min: u16,
    pub decision_margin_max: u16,
    pub loser_score_max: u16,
    pub pin_score_max: u16,
}

impl Default for ScoreCalibration {
    fn default() -> Self {
        Self {
            tech_fall_margin: 15,
            tech_fall_overshoot: 3,
            decision_margin_min: 1,
            decision_margin_max: 12,
            loser_score_max: 6,
            pin_score_max: 10,
        }
    }
}

impl ScoreCalibration {
    fn validate(&self) -> Result<(), CalibrationError> {
        range_check(
            "score.tech_fall_margin",
            f64::from(self.tech_fall_margin),
            2.0,
            30.0,
        )?;
        min_check(
            "score.decision_margin_min",
            f64::from(self.decision_margin_min),
            1.0,
        )?;
        if self.decision_margin_min > self.decision_margin_max {
            return Err(CalibrationError::InvertedBounds {
                field: "score.decision_margin",
                min: f64::from(self.decision_margin_min),
                max: f64::from(self.decision_margin_max),
            });
        }
        if self.decision_margin_max >= self.tech_fall_margin {
            return Err(CalibrationError::RangeViolation {
                field: "score.decision_margin_max",
                min: f64::from(self.decision_margin_min),
                max: f64::from(self.tech_fall_margin.saturating_sub(1)),
                value: f64::from(self.decision_margin_max),
            });
        }
        Ok(())
    }
}

/// Tuning for the interactive exchange engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    pub periods: u8,
    pub exchanges_per_period: u8,
    /// Decision window the caller enforces before reporting a timeout.
    pub decision_timer_ms: u32,
    pub momentum_success: i32,
    pub momentum_failure: i32,
    pub momentum_hesitate: i32,
    pub momentum_limit: i32,
    /// Energy both competitors lose every exchange regardless of action.
    pub base_energy_drain: f64,
    /// Share of the actor's action cost the defender also pays.
    pub defender_drain_ratio: f64,
    pub injury_step: f64,
    pub low_energy_threshold: f64,
    pub high_injury_threshold: f64,
    pub attribute_weight: f64,
    pub energy_weight: f64,
    pub injury_weight: f64,
    pub momentum_weight: f64,
    pub defender_fatigue_weight: f64,
    pub success_floor: f64,
    pub success_ceiling: f64,
    /// Points awarded by the tie-break draw at the end of regulation.
    pub tie_break_points: u16,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            periods: 3,
            exchanges_per_period: 5,
            decision_timer_ms: 6_000,
            momentum_success: 10,
            momentum_failure: -5,
            momentum_hesitate: -15,
            momentum_limit: 50,
            base_energy_drain: 2.0,
            defender_drain_ratio: 0.5,
            injury_step: 0.08,
            low_energy_threshold: 25.0,
            high_injury_threshold: 0.7,
            attribute_weight: 0.6,
            energy_weight: 0.4,
            injury_weight: 0.3,
            momentum_weight: 0.002,
            defender_fatigue_weight: 0.1,
            success_floor: 0.05,
            success_ceiling: 0.95,
            tie_break_points: 1,
        }
    }
}

impl ExchangeConfig {
    fn validate(&self) -> Result<(), CalibrationError> {
        range_check("exchange.periods", f64::from(self.periods), 1.0, 3.0)?;
        range_check(
            "exchange.exchanges_per_period",
            f64::from(self.exchanges_per_period),
            1.0,
            20.0,
        )?;
        min_check(
            "exchange.decision_timer_ms",
            f64::from(self.decision_timer_ms),
            500.0,
        )?;
        if self.momentum_hesitate >= self.momentum_failure
            || self.momentum_failure >= self.momentum_success
        {
            return Err(CalibrationError::InvertedBounds {
                field: "exchange.momentum",
                min: f64::from(self.momentum_hesitate),
                max: f64::from(self.momentum_success),
            });
        }
        min_check(
            "exchange.momentum_limit",
            f64::from(self.momentum_limit),
            1.0,
        )?;
        min_check("exchange.base_energy_drain", self.base_energy_drain, 0.1)?;
        range_check(
            "exchange.defender_drain_ratio",
            self.defender_drain_ratio,
            0.0,
            1.0,
        )?;
        range_check("exchange.injury_step", self.injury_step, 0.0, 1.0)?;
        range_check(
            "exchange.low_energy_threshold",
            self.low_energy_threshold,
            0.0,
            100.0,
        )?;
        range_check(
            "exchange.high_injury_threshold",
            self.high_injury_threshold,
            0.0,
            1.0,
        )?;
        range_check("exchange.energy_weight", self.energy_weight, 0.0, 1.0)?;
        range_check("exchange.injury_weight", self.injury_weight, 0.0, 1.0)?;
        min_check("exchange.attribute_weight", self.attribute_weight, 0.0)?;
        min_check("exchange.momentum_weight", self.momentum_weight, 0.0)?;
        min_check(
            "exchange.defender_fatigue_weight",
            self.defender_fatigue_weight,
            0.0,
        )?;
        if self.success_floor >= self.success_ceiling
            || self.success_floor <= 0.0
            || self.success_ceiling >= 1.0
        {
            return Err(CalibrationError::InvertedBounds {
                field: "exchange.success",
                min: self.success_floor,
                max: self.success_ceiling,
            });
        }
        min_check(
            "exchange.tie_break_points",
            f64::from(self.tie_break_points),
            1.0,
        )?;
        Ok(())
    }
}

/// Carry-over between bouts of a multi-opponent dual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContestCalibration {
    /// Energy lost after each bout of a multi-opponent dual.
    pub bout_energy_cost: f64,
}

impl Default for ContestCalibration {
    fn default() -> Self {
        Self {
            bout_energy_cost: 12.0,
        }
    }
}

impl ContestCalibration {
    fn validate(&self) -> Result<(), CalibrationError> {
        range_check("contest.bout_energy_cost", self.bout_energy_cost, 0.0, 100.0)
    }
}

fn min_check(field: &'static str, value: f64, min: f64) -> Result<(), CalibrationError> {
    if value.is_nan() || value < min {
        return Err(CalibrationError::MinViolation { field, min, value });
    }
    Ok(())
}

fn range_check(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), CalibrationError> {
    if !(min..=max).contains(&value) {
        return Err(CalibrationError::RangeViolation {
            field,
            min,
            max,
            value,
        });
    }
    Ok(())
}
