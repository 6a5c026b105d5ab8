use colored::Colorize;
use log::debug;
use std::time::Instant;
use takedown_game::numbers::ratio;
use takedown_game::{CalibrationTable, Competitor, MatchModifiers, MatchRng, simulate};

use super::{CheckKind, CheckResult};

pub const FAVORITE_RATING: f64 = 94.0;

/// One acceptance band: how often `underdog` may beat `favorite`.
#[derive(Debug, Clone)]
pub struct BandCheck {
    pub label: &'static str,
    pub underdog: Competitor,
    pub favorite: Competitor,
    pub modifiers: MatchModifiers,
    pub min_rate: f64,
    pub max_rate: f64,
}

impl BandCheck {
    #[must_use]
    pub fn contains(&self, rate: f64) -> bool {
        (self.min_rate..=self.max_rate).contains(&rate)
    }
}

fn band(
    label: &'static str,
    underdog_rating: f64,
    favorite: Competitor,
    modifiers: MatchModifiers,
    (min_rate, max_rate): (f64, f64),
) -> BandCheck {
    BandCheck {
        label,
        underdog: Competitor::with_rating(underdog_rating),
        favorite,
        modifiers,
        min_rate,
        max_rate,
    }
}

/// The calibrated underdog win-rate bands.
#[must_use]
pub fn standard_bands() -> Vec<BandCheck> {
    let favorite = Competitor::with_rating(FAVORITE_RATING);
    let plain = MatchModifiers::default();
    vec![
        band("gap-30", 64.0, favorite, plain, (0.0, 0.002)),
        band("gap-12", 82.0, favorite, plain, (0.0, 0.03)),
        band("gap-12-energy-45", 82.0, favorite.with_energy(45.0), plain, (0.0, 0.08)),
        band("gap-12-energy-20", 82.0, favorite.with_energy(20.0), plain, (0.15, 0.35)),
        band("gap-12-injury-60", 82.0, favorite.with_injury(0.6), plain, (0.10, 0.30)),
        band("gap-2", 92.0, favorite, plain, (0.35, 0.55)),
        band("gap-12-rivalry", 82.0, favorite, MatchModifiers::rivalry(), (0.0, 0.10)),
    ]
}

/// Measure one band over `trials` freshly seeded matches.
#[must_use]
pub fn measure_band(
    band: &BandCheck,
    table: &CalibrationTable,
    seed: &str,
    trials: usize,
) -> CheckResult {
    let started = Instant::now();
    let mut result = CheckResult::new(
        format!("calibration/{}", band.label),
        CheckKind::Calibration,
        seed,
        trials,
    );

    let wins = (0..trials)
        .filter(|trial| {
            let mut rng = MatchRng::new(&format!("{seed}-{}-{trial}", band.label));
            simulate(&band.underdog, &band.favorite, &band.modifiers, table, &mut rng).won
        })
        .count();
    let rate = ratio(wins, trials);

    result.record("underdog_rate", rate);
    result.record("min_rate", band.min_rate);
    result.record("max_rate", band.max_rate);
    if trials == 0 {
        result.fail("no trials run");
    } else if !band.contains(rate) {
        result.fail(format!(
            "underdog won {:.2}% outside [{:.2}%, {:.2}%]",
            rate * 100.0,
            band.min_rate * 100.0,
            band.max_rate * 100.0
        ));
    }
    debug!("band {} seed {seed}: {wins}/{trials}", band.label);
    result.finish(started.elapsed())
}

/// Run every band for every seed.
#[must_use]
pub fn run_calibration(
    table: &CalibrationTable,
    seeds: &[String],
    trials: usize,
    verbose: bool,
) -> Vec<CheckResult> {
    let bands = standard_bands();
    let mut results = Vec::with_capacity(bands.len() * seeds.len());
    for seed in seeds {
        for band in &bands {
            if verbose {
                println!(
                    "🎲 Calibrating band: {} (seed: {seed}, trials: {trials})",
                    band.label.bright_white()
                );
            }
            results.push(measure_band(band, table, seed, trials));
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_are_well_formed() {
        for band in standard_bands() {
            assert!(band.min_rate <= band.max_rate, "{}", band.label);
            assert!(band.underdog.overall_rating() < band.favorite.overall_rating());
        }
    }

    #[test]
    fn lopsided_band_passes_with_default_table() {
        let bands = standard_bands();
        let gap_30 = bands.iter().find(|b| b.label == "gap-30").unwrap();
        let result = measure_band(gap_30, &CalibrationTable::default(), "unit", 5_000);
        assert!(result.passed, "{:?}", result.failures);
        assert!(result.metrics["underdog_rate"] <= 0.002);
    }

    #[test]
    fn empty_run_fails() {
        let bands = standard_bands();
        let result = measure_band(&bands[0], &CalibrationTable::default(), "unit", 0);
        assert!(!result.passed);
    }

    #[test]
    fn runs_every_band_per_seed() {
        let seeds = vec!["a".to_string(), "b".to_string()];
        let results = run_calibration(&CalibrationTable::default(), &seeds, 5, false);
        assert_eq!(results.len(), standard_bands().len() * 2);
        assert!(results.iter().all(|r| r.kind == CheckKind::Calibration));
    }
}
