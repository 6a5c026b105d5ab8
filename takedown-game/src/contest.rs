//! Contest formats the weekly scheduler can book for the player.
use log::debug;
use serde::{Deserialize, Serialize};

use crate::bracket::{BracketOutcome, BracketSize, play_bracket};
use crate::calibration::CalibrationTable;
use crate::competitor::Entrant;
use crate::resolver::{MatchResolver, SimulationError};
use crate::result::MatchRecord;
use crate::rng::MatchRng;

/// What the player wrestles this week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Contest {
    /// One match against one opponent.
    Dual { opponent: Entrant },
    /// Several duals in a row; fatigue carries between bouts.
    MultiDual { opponents: Vec<Entrant> },
    Tournament {
        size: BracketSize,
        opponents: Vec<Entrant>,
    },
}

/// One dual bout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoutReport {
    pub opponent: String,
    pub record: MatchRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContestOutcome {
    Dual(BoutReport),
    MultiDual { bouts: Vec<BoutReport> },
    Tournament(BracketOutcome),
}

impl ContestOutcome {
    /// `(wins, losses)` across every match in the contest.
    #[must_use]
    pub fn record(&self) -> (usize, usize) {
        let tally = |won: &mut dyn Iterator<Item = bool>| {
            won.fold((0, 0), |(w, l), won| if won { (w + 1, l) } else { (w, l + 1) })
        };
        match self {
            Self::Dual(bout) => tally(&mut std::iter::once(bout.record.result.won)),
            Self::MultiDual { bouts } => {
                tally(&mut bouts.iter().map(|bout| bout.record.result.won))
            }
            Self::Tournament(outcome) => (outcome.wins(), outcome.losses()),
        }
    }
}

/// Run `contest` for `player`, resolving matches with `resolver`.
///
/// # Errors
///
/// Propagates resolver and bracket invariant violations as `SimulationError`.
pub fn run_contest<R: MatchResolver + ?Sized>(
    player: &Entrant,
    contest: &Contest,
    resolver: &mut R,
    table: &CalibrationTable,
    rng: &mut MatchRng,
) -> Result<ContestOutcome, SimulationError> {
    let outcome = match contest {
        Contest::Dual { opponent } => {
            let record = resolver.resolve(&player.competitor, opponent, rng)?;
            ContestOutcome::Dual(BoutReport {
                opponent: opponent.name.clone(),
                record,
            })
        }
        Contest::MultiDual { opponents } => {
            let mut competitor = player.competitor;
            let mut bouts = Vec::with_capacity(opponents.len());
            for opponent in opponents {
                let record = resolver.resolve(&competitor, opponent, rng)?;
                bouts.push(BoutReport {
                    opponent: opponent.name.clone(),
                    record,
                });
                competitor.energy = (competitor.energy - table.contest.bout_energy_cost).max(0.0);
            }
            ContestOutcome::MultiDual { bouts }
        }
        Contest::Tournament { size, opponents } => {
            ContestOutcome::Tournament(play_bracket(player, opponents, *size, resolver, rng)?)
        }
    };
    let (wins, losses) = outcome.record();
    debug!("{} contest finished {wins}-{losses}", player.name);
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::competitor::{Competitor, MatchModifiers};
    use crate::resolver::InstantResolver;

    fn entrant(name: &str, rating: f64) -> Entrant {
        Entrant::new(name, Competitor::with_rating(rating))
    }

    #[test]
    fn dual_reports_one_bout() {
        let table = CalibrationTable::default();
        let mut resolver = InstantResolver::new(&table, MatchModifiers::default());
        let mut rng = MatchRng::new("dual");
        let contest = Contest::Dual {
            opponent: entrant("Rival", 75.0),
        };
        let outcome =
            run_contest(&entrant("Player", 75.0), &contest, &mut resolver, &table, &mut rng)
                .unwrap();
        let (wins, losses) = outcome.record();
        assert_eq!(wins + losses, 1);
        assert!(rng.draws() > 0);
    }

    #[test]
    fn multi_dual_wears_the_player_down() {
        struct EnergySpy(Vec<f64>);
        impl MatchResolver for EnergySpy {
            fn resolve(
                &mut self,
                player: &Competitor,
                opponent: &Entrant,
                rng: &mut MatchRng,
            ) -> Result<MatchRecord, crate::exchange::ExchangeError> {
                self.0.push(player.energy);
                let table = CalibrationTable::default();
                InstantResolver::new(&table, MatchModifiers::default()).resolve(player, opponent, rng)
            }
        }

        let table = CalibrationTable::default();
        let mut spy = EnergySpy(Vec::new());
        let mut rng = MatchRng::new("multi");
        let contest = Contest::MultiDual {
            opponents: vec![entrant("A", 70.0), entrant("B", 70.0), entrant("C", 70.0)],
        };
        let outcome =
            run_contest(&entrant("Player", 75.0), &contest, &mut spy, &table, &mut rng).unwrap();
        assert_eq!(spy.0, vec![100.0, 88.0, 76.0]);
        assert_eq!(outcome.record().0 + outcome.record().1, 3);
    }

    #[test]
    fn tournament_runs_bracket() {
        let table = CalibrationTable::default();
        let mut resolver = InstantResolver::new(&table, MatchModifiers::default());
        let mut rng = MatchRng::new("tournament");
        let contest = Contest::Tournament {
            size: BracketSize::Eight,
            opponents: vec![entrant("A", 70.0)],
        };
        let outcome =
            run_contest(&entrant("Player", 75.0), &contest, &mut resolver, &table, &mut rng)
                .unwrap();
        let ContestOutcome::Tournament(bracket) = outcome else {
            panic!("expected tournament outcome");
        };
        assert!((1..=8).contains(&bracket.placement));
        assert_eq!(bracket.participants.len(), 8);
    }

    #[test]
    fn contest_deserializes_from_tagged_json() {
        let json = r#"{"kind":"tournament","size":16,"opponents":[]}"#;
        let contest: Contest = serde_json::from_str(json).unwrap();
        assert_eq!(
            contest,
            Contest::Tournament {
                size: BracketSize::Sixteen,
                opponents: Vec::new(),
            }
        );
    }
}
