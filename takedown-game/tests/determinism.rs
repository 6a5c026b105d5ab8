use std::hash::Hasher;

use takedown_game::{
    AggressivePolicy, BracketSize, CalibrationTable, Competitor, ConservativePolicy, Entrant,
    InstantResolver, InteractiveResolver, MatchModifiers, MatchRng, RandomState, play_bracket,
    simulate,
};
use twox_hash::XxHash64;

fn fingerprint(bytes: &[u8]) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(bytes);
    hasher.finish()
}

fn stream_fingerprint(rng: &mut MatchRng, draws: usize) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    for _ in 0..draws {
        hasher.write_u32(rng.next());
    }
    hasher.finish()
}

#[test]
fn pausing_at_any_point_is_invisible() {
    let mut uninterrupted = MatchRng::new("pause-anywhere");
    let expected: Vec<u32> = (0..2_000).map(|_| uninterrupted.next()).collect();

    for pause in [0_usize, 1, 7, 15, 16, 17, 63, 64, 999, 1_999] {
        let mut rng = MatchRng::new("pause-anywhere");
        let mut seen: Vec<u32> = (0..pause).map(|_| rng.next()).collect();
        let state = rng.serialize();
        let mut resumed = MatchRng::deserialize("pause-anywhere", &state).unwrap();
        seen.extend((pause..2_000).map(|_| resumed.next()));
        assert_eq!(seen, expected, "diverged after pausing at {pause}");
        assert_eq!(resumed.draws(), 2_000);
    }
}

#[test]
fn mixed_draw_kinds_resume_exactly() {
    let mut rng = MatchRng::new("mixed");
    for draw in 0..10_000 {
        match draw % 4 {
            0 => {
                rng.next();
            }
            1 => {
                rng.float();
            }
            2 => {
                rng.int(-3, 17);
            }
            _ => {
                rng.chance(0.3);
            }
        }
        if draw % 1_000 == 999 {
            let snapshot: RandomState =
                serde_json::from_str(&serde_json::to_string(&rng.snapshot()).unwrap()).unwrap();
            let mut restored = MatchRng::restore(&snapshot).unwrap();
            let mut original = rng.clone();
            assert_eq!(
                stream_fingerprint(&mut restored, 32),
                stream_fingerprint(&mut original, 32)
            );
        }
    }
}

#[test]
fn seeds_fingerprint_distinctly() {
    let a = stream_fingerprint(&mut MatchRng::new("alpha"), 256);
    let b = stream_fingerprint(&mut MatchRng::new("beta"), 256);
    let a_again = stream_fingerprint(&mut MatchRng::new("alpha"), 256);
    assert_eq!(a, a_again);
    assert_ne!(a, b);
}

#[test]
fn instant_season_replays_byte_for_byte() {
    let table = CalibrationTable::default();
    let me = Competitor::with_rating(81.0).with_energy(88.0);
    let run = || {
        let mut rng = MatchRng::new("season");
        let results: Vec<_> = (0_u32..200)
            .map(|week| {
                let opponent = Competitor::with_rating(70.0 + f64::from(week % 20));
                simulate(&me, &opponent, &MatchModifiers::default(), &table, &mut rng)
            })
            .collect();
        fingerprint(serde_json::to_string(&results).unwrap().as_bytes())
    };
    assert_eq!(run(), run());
}

#[test]
fn brackets_replay_in_both_modes() {
    let table = CalibrationTable::default();
    let player = Entrant::new("Player", Competitor::with_rating(80.0));
    let field: Vec<_> = (0_u32..15)
        .map(|i| Entrant::new(format!("Entrant {i}"), Competitor::with_rating(72.0 + f64::from(i))))
        .collect();

    let instant = || {
        let mut resolver = InstantResolver::new(&table, MatchModifiers::default());
        let mut rng = MatchRng::new("bracket-instant");
        let outcome =
            play_bracket(&player, &field, BracketSize::Sixteen, &mut resolver, &mut rng).unwrap();
        fingerprint(serde_json::to_string(&outcome).unwrap().as_bytes())
    };
    assert_eq!(instant(), instant());

    let interactive = |aggressive: bool| {
        let mut rng = MatchRng::new("bracket-interactive");
        let played = if aggressive {
            let mut resolver = InteractiveResolver::new(&table, AggressivePolicy);
            play_bracket(&player, &field, BracketSize::Eight, &mut resolver, &mut rng)
        } else {
            let mut resolver = InteractiveResolver::new(&table, ConservativePolicy);
            play_bracket(&player, &field, BracketSize::Eight, &mut resolver, &mut rng)
        };
        let outcome = played.unwrap();
        fingerprint(serde_json::to_string(&outcome).unwrap().as_bytes())
    };
    assert_eq!(interactive(true), interactive(true));
    assert_eq!(interactive(false), interactive(false));
}

#[test]
fn previews_do_not_shift_the_stream() {
    let table = CalibrationTable::default();
    let a = Competitor::with_rating(80.0);
    let b = Competitor::with_rating(84.0);

    let mut plain = MatchRng::new("preview-stream");
    let expected = simulate(&a, &b, &MatchModifiers::default(), &table, &mut plain);

    let mut previewed = MatchRng::new("preview-stream");
    for _ in 0..10 {
        let _ = takedown_game::win_probability(&a, &b, &MatchModifiers::default(), &table);
        let _ = takedown_game::effective_gap(&a, &b, &MatchModifiers::default(), &table.outcome);
    }
    let actual = simulate(&a, &b, &MatchModifiers::default(), &table, &mut previewed);
    assert_eq!(expected, actual);
    assert_eq!(plain.draws(), previewed.draws());
}

#[test]
fn every_reachable_state_round_trips() {
    let mut rng = MatchRng::new("round-trip");
    for draws in 0..=10_000_u64 {
        assert_eq!(rng.draws(), draws);
        let mut resumed = MatchRng::deserialize(rng.seed(), &rng.serialize()).unwrap();
        let mut ahead = rng.clone();
        assert_eq!(
            (resumed.next(), resumed.float().to_bits()),
            (ahead.next(), ahead.float().to_bits()),
            "diverged after {draws} draws"
        );
        rng.next();
    }
}
