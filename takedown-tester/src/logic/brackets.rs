use colored::Colorize;
use log::debug;
use std::time::Instant;
use takedown_game::numbers::{ratio, usize_to_f64};
use takedown_game::{
    AggressivePolicy, BracketOutcome, BracketSize, CalibrationTable, Competitor, Entrant,
    InstantResolver, InteractiveResolver, MatchModifiers, MatchResolver, MatchRng, play_bracket,
};

use super::{CheckKind, CheckResult};

/// How matches inside the sweep are decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepMode {
    Instant,
    Interactive,
}

impl SweepMode {
    const fn label(self) -> &'static str {
        match self {
            Self::Instant => "instant",
            Self::Interactive => "interactive",
        }
    }
}

/// A deterministic field for one trial. Every third trial leaves seats open
/// so the filler path is exercised too.
fn trial_field(size: BracketSize, trial: usize) -> (Entrant, Vec<Entrant>) {
    let spread = u32::try_from(trial % 25).unwrap_or(0);
    let player = Entrant::new(
        "Player",
        Competitor::with_rating(68.0 + f64::from(spread)),
    );
    let seats = usize::from(size.entrants()) - 1;
    let supplied = if trial % 3 == 0 { seats / 2 } else { seats };
    let opponents = (0..supplied)
        .map(|index| {
            let offset = u32::try_from((index * 7 + trial) % 30).unwrap_or(0);
            Entrant::new(
                format!("Entrant {}", index + 1),
                Competitor::with_rating(65.0 + f64::from(offset)),
            )
        })
        .collect();
    (player, opponents)
}

/// Structural problems with a finished bracket, if any.
fn inspect(outcome: &BracketOutcome) -> Vec<String> {
    let mut problems: Vec<String> = outcome
        .violations
        .iter()
        .map(|violation| format!("step {}: {}", violation.step, violation.kind))
        .collect();
    let size = outcome.size;
    if !(1..=size.entrants()).contains(&outcome.placement) {
        problems.push(format!("placement {} outside the field", outcome.placement));
    }
    if outcome.steps.len() > size.max_matches() {
        problems.push(format!("{} matches played", outcome.steps.len()));
    }
    if outcome.losses() > 2 {
        problems.push(format!("{} losses recorded", outcome.losses()));
    }
    if outcome.records.len() != outcome.steps.len() {
        problems.push("match records out of step with history".to_string());
    }
    if outcome.placement == 1 && !outcome.steps.last().is_some_and(|step| step.result.won) {
        problems.push("champion lost their last match".to_string());
    }
    problems
}

fn sweep(
    table: &CalibrationTable,
    seed: &str,
    size: BracketSize,
    mode: SweepMode,
    trials: usize,
) -> CheckResult {
    let started = Instant::now();
    let mut result = CheckResult::new(
        format!("bracket/{size}/{}", mode.label()),
        CheckKind::Bracket,
        seed,
        trials,
    );
    let mut placements = 0_usize;
    let mut titles = 0_usize;
    let mut matches = 0_usize;
    let mut completed = 0_usize;

    for trial in 0..trials {
        let (player, opponents) = trial_field(size, trial);
        let mut rng = MatchRng::new(&format!("{seed}-{size}-{}-{trial}", mode.label()));
        let mut instant = InstantResolver::new(table, MatchModifiers::default());
        let mut interactive = InteractiveResolver::new(table, AggressivePolicy);
        let resolver: &mut dyn MatchResolver = match mode {
            SweepMode::Instant => &mut instant,
            SweepMode::Interactive => &mut interactive,
        };

        match play_bracket(&player, &opponents, size, resolver, &mut rng) {
            Ok(outcome) => {
                for problem in inspect(&outcome) {
                    result.fail(format!("trial {trial}: {problem}"));
                }
                completed += 1;
                placements += usize::from(outcome.placement);
                matches += outcome.steps.len();
                if outcome.placement == 1 {
                    titles += 1;
                }
            }
            Err(err) => result.fail(format!("trial {trial}: {err}")),
        }
    }

    result.record("mean_placement", ratio(placements, completed));
    result.record("mean_matches", ratio(matches, completed));
    result.record("title_rate", ratio(titles, completed));
    result.record("completed", usize_to_f64(completed));
    debug!(
        "{size} {} sweep for seed {seed}: {completed}/{trials} completed",
        mode.label()
    );
    result.finish(started.elapsed())
}

/// Sweep both bracket sizes in both resolution modes for every seed.
#[must_use]
pub fn run_bracket_sweep(
    table: &CalibrationTable,
    seeds: &[String],
    trials: usize,
    verbose: bool,
) -> Vec<CheckResult> {
    let mut results = Vec::new();
    for seed in seeds {
        for size in [BracketSize::Eight, BracketSize::Sixteen] {
            for mode in [SweepMode::Instant, SweepMode::Interactive] {
                if verbose {
                    println!(
                        "🏆 Sweeping bracket: {} (mode: {}, seed: {seed})",
                        size.to_string().bright_white(),
                        mode.label()
                    );
                }
                results.push(sweep(table, seed, size, mode, trials));
            }
        }
    }
    results
}
