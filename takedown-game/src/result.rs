//! Match result vocabulary shared by instant and interactive resolution.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::exchange::ExchangeLogEntry;

/// How a match was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    /// Shoulders held to the mat; ends the match regardless of score.
    Pin,
    /// Lead reached the technical-fall margin.
    TechnicalFall,
    /// Points lead at the end of regulation (or tie-break).
    Decision,
}

impl MatchMethod {
    /// Pin and technical fall are the dominant finishes.
    #[must_use]
    pub const fn is_dominant(self) -> bool {
        matches!(self, Self::Pin | Self::TechnicalFall)
    }
}

impl fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pin => write!(f, "pin"),
            Self::TechnicalFall => write!(f, "technical_fall"),
            Self::Decision => write!(f, "decision"),
        }
    }
}

/// Outcome of one match from the requesting competitor's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchResult {
    pub won: bool,
    pub method: MatchMethod,
    pub my_score: u16,
    pub opp_score: u16,
}

impl MatchResult {
    /// The same match seen from the other corner.
    #[must_use]
    pub const fn flipped(self) -> Self {
        Self {
            won: !self.won,
            method: self.method,
            my_score: self.opp_score,
            opp_score: self.my_score,
        }
    }

    /// Winner's score minus loser's score; negative when the winner trailed on a pin.
    #[must_use]
    pub fn margin(&self) -> i32 {
        let (winner, loser) = if self.won {
            (self.my_score, self.opp_score)
        } else {
            (self.opp_score, self.my_score)
        };
        i32::from(winner) - i32::from(loser)
    }

    /// Whether the scores fit the value ranges every resolution mode guarantees.
    #[must_use]
    pub fn is_consistent(&self, tech_fall_margin: u16) -> bool {
        let margin = self.margin();
        let tech_fall = i32::from(tech_fall_margin);
        match self.method {
            MatchMethod::Pin => true,
            MatchMethod::TechnicalFall => margin >= tech_fall,
            MatchMethod::Decision => margin > 0 && margin < tech_fall,
        }
    }
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.won { "W" } else { "L" };
        write!(
            f,
            "{verdict} {} {}-{}",
            self.method, self.my_score, self.opp_score
        )
    }
}

/// A finished match together with its exchange history.
///
/// Instant resolutions carry an empty history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub result: MatchResult,
    #[serde(default)]
    pub exchanges: Vec<ExchangeLogEntry>,
}

impl MatchRecord {
    #[must_use]
    pub const fn instant(result: MatchResult) -> Self {
        Self {
            result,
            exchanges: Vec::new(),
        }
    }
}
