use colored::Colorize;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::time::Instant;
use takedown_game::{
    AggressivePolicy, BracketSize, CalibrationTable, CareerSession, Competitor,
    ConservativePolicy, Contest, ContestOutcome, Entrant, ExchangeError, ExchangePolicy,
    MatchModifiers, MatchRng, MinigameMatchState, Position, RandomState, ResolveOptions,
    RngStateError, SessionSnapshot, SimulationError, play_out,
};
use thiserror::Error;

use super::{CheckKind, CheckResult};

/// Draw counts at which the random stream is paused and resumed.
const PAUSE_POINTS: [usize; 6] = [0, 1, 17, 64, 255, 999];
const RESUME_WINDOW: usize = 64;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("{check} diverged: expected {expected}, found {found}")]
    Diverged {
        check: String,
        expected: String,
        found: String,
    },
    #[error(transparent)]
    Simulation(#[from] SimulationError),
    #[error(transparent)]
    Exchange(#[from] ExchangeError),
    #[error(transparent)]
    RngState(#[from] RngStateError),
    #[error("snapshot encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

type ReplayCheck = fn(&CalibrationTable, &str) -> Result<(), ReplayError>;

const CHECKS: [(&str, ReplayCheck); 3] = [
    ("replay/rng-resume", check_rng_resume),
    ("replay/season", check_season),
    ("replay/interactive", check_interactive),
];

/// Hex SHA-256 of a value's JSON encoding.
fn digest<T: Serialize + ?Sized>(value: &T) -> Result<String, ReplayError> {
    let bytes = serde_json::to_vec(value)?;
    Ok(Sha256::digest(&bytes)
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect())
}

fn ensure_same(check: &str, expected: String, found: String) -> Result<(), ReplayError> {
    if expected == found {
        Ok(())
    } else {
        Err(ReplayError::Diverged {
            check: check.to_string(),
            expected,
            found,
        })
    }
}

fn check_rng_resume(_table: &CalibrationTable, seed: &str) -> Result<(), ReplayError> {
    for pause in PAUSE_POINTS {
        let mut rng = MatchRng::new(seed);
        for _ in 0..pause {
            rng.next();
        }
        let mut ahead = rng.clone();
        let mut resumed = MatchRng::deserialize(seed, &rng.serialize())?;
        let expected: Vec<u32> = (0..RESUME_WINDOW).map(|_| ahead.next()).collect();
        let found: Vec<u32> = (0..RESUME_WINDOW).map(|_| resumed.next()).collect();
        ensure_same(
            &format!("rng resume after {pause} draws"),
            digest(&expected)?,
            digest(&found)?,
        )?;
    }
    Ok(())
}

fn roster(prefix: &str, count: u32, base: f64) -> Vec<Entrant> {
    (0..count)
        .map(|index| {
            Entrant::new(
                format!("{prefix} {}", index + 1),
                Competitor::with_rating(base + f64::from(index % 9)),
            )
        })
        .collect()
}

/// Six weeks touching every contest kind.
fn schedule() -> Vec<Contest> {
    vec![
        Contest::Dual {
            opponent: Entrant::new("Rival", Competitor::with_rating(79.0)),
        },
        Contest::MultiDual {
            opponents: roster("Quad", 3, 72.0),
        },
        Contest::Tournament {
            size: BracketSize::Eight,
            opponents: roster("Invitational", 7, 70.0),
        },
        Contest::Dual {
            opponent: Entrant::new("Conference Champ", Competitor::with_rating(86.0)),
        },
        Contest::Tournament {
            size: BracketSize::Sixteen,
            opponents: roster("Regional", 12, 68.0),
        },
        Contest::MultiDual {
            opponents: roster("Tri", 2, 75.0),
        },
    ]
}

fn run_season(
    session: &mut CareerSession,
    player: &Entrant,
    contests: &[Contest],
) -> Result<Vec<ContestOutcome>, ReplayError> {
    let mut outcomes = Vec::with_capacity(contests.len());
    for contest in contests {
        outcomes.push(session.run_contest(player, contest, MatchModifiers::default())?);
        session.advance_week();
    }
    Ok(outcomes)
}

fn check_season(table: &CalibrationTable, seed: &str) -> Result<(), ReplayError> {
    let contests = schedule();
    let player = Entrant::new("Player", Competitor::with_rating(80.0));

    let mut first = CareerSession::new(seed, table.clone());
    let full = run_season(&mut first, &player, &contests)?;
    let mut second = CareerSession::new(seed, table.clone());
    let again = run_season(&mut second, &player, &contests)?;
    ensure_same("season replay", digest(&full)?, digest(&again)?)?;

    let split = contests.len() / 2;
    let mut paused = CareerSession::new(seed, table.clone());
    run_season(&mut paused, &player, &contests[..split])?;
    let stored = serde_json::to_string(&paused.snapshot())?;
    let snapshot: SessionSnapshot = serde_json::from_str(&stored)?;
    let mut resumed = CareerSession::restore(&snapshot, table.clone())?;
    let tail = run_season(&mut resumed, &player, &contests[split..])?;
    ensure_same("season resume", digest(&full[split..])?, digest(&tail)?)?;
    ensure_same(
        "season calendar",
        first.week().to_string(),
        resumed.week().to_string(),
    )
}

fn check_interactive(table: &CalibrationTable, seed: &str) -> Result<(), ReplayError> {
    let mut rng = MatchRng::new(&format!("{seed}-interactive"));
    let mut state = MinigameMatchState::start(
        Competitor::with_rating(80.0),
        Competitor::with_rating(80.0),
        Position::Neutral,
        table,
    );
    let mut opening = ConservativePolicy;
    for _ in 0..4 {
        if state.is_finished() {
            break;
        }
        let prompt = state.prompt()?;
        let choice = opening.choose(&prompt);
        state = state.resolve(choice, &mut rng, ResolveOptions::default())?.state;
    }

    let saved_state = serde_json::to_string(&state)?;
    let saved_rng = serde_json::to_string(&rng.snapshot())?;
    let original = play_out(state, &mut AggressivePolicy, &mut rng)?.into_record()?;

    let restored_state: MinigameMatchState = serde_json::from_str(&saved_state)?;
    let snapshot: RandomState = serde_json::from_str(&saved_rng)?;
    let mut restored_rng = MatchRng::restore(&snapshot)?;
    let replayed =
        play_out(restored_state, &mut AggressivePolicy, &mut restored_rng)?.into_record()?;
    ensure_same(
        "interactive replay",
        digest(&original)?,
        digest(&replayed)?,
    )
}

/// Run every replay check for every seed.
#[must_use]
pub fn run_replay_checks(
    table: &CalibrationTable,
    seeds: &[String],
    verbose: bool,
) -> Vec<CheckResult> {
    let mut results = Vec::with_capacity(CHECKS.len() * seeds.len());
    for seed in seeds {
        for (name, check) in CHECKS {
            if verbose {
                println!("🔁 Replaying: {} (seed: {seed})", name.bright_white());
            }
            let started = Instant::now();
            let mut result = CheckResult::new(name, CheckKind::Replay, seed, 1);
            if let Err(err) = check(table, seed) {
                result.fail(err.to_string());
            }
            results.push(result.finish(started.elapsed()));
        }
    }
    results
}
