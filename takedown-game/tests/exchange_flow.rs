use takedown_game::{
    ActionKey, AggressivePolicy, CalibrationTable, Competitor, ConservativePolicy, ExchangeError,
    ExchangePolicy, MatchMethod, MatchModifiers, MatchRng, MinigameMatchState, Position,
    ResolveOptions, play_out, simulate,
};

fn table() -> CalibrationTable {
    CalibrationTable::default()
}

/// Play `steps` exchanges with the conservative autopilot.
fn mid_period(seed: &str, steps: usize) -> (MinigameMatchState, MatchRng) {
    let mut rng = MatchRng::new(seed);
    let mut state = MinigameMatchState::start(
        Competitor::with_rating(80.0),
        Competitor::with_rating(80.0),
        Position::Neutral,
        &table(),
    );
    let mut policy = ConservativePolicy;
    for _ in 0..steps {
        if state.is_finished() {
            break;
        }
        let prompt = state.prompt().unwrap();
        let choice = policy.choose(&prompt);
        state = state
            .resolve(choice, &mut rng, ResolveOptions::default())
            .unwrap()
            .state;
    }
    (state, rng)
}

#[test]
fn timeouts_always_resolve_and_cost_momentum() {
    for trial in 0..300 {
        let (state, rng) = mid_period(&format!("timeout-{trial}"), trial % 4);
        if state.is_finished() {
            continue;
        }
        let prompt = state.prompt().unwrap();

        let mut timeout_rng = rng.clone();
        let timed_out = state
            .resolve(None, &mut timeout_rng, ResolveOptions::timed_out())
            .expect("timeouts never fail");
        let entry = timed_out.state.log().last().unwrap();
        assert!(entry.timed_out);
        assert_eq!(entry.action, ActionKey::Hesitate);

        for option in &prompt.options {
            let mut action_rng = rng.clone();
            let acted = state
                .resolve(Some(option.key), &mut action_rng, ResolveOptions::default())
                .unwrap();
            assert!(
                timed_out.state.momentum() < acted.state.momentum(),
                "hesitating kept momentum {} vs {} for {}",
                timed_out.state.momentum(),
                acted.state.momentum(),
                option.key
            );
        }
    }
}

#[test]
fn interactive_and_instant_results_share_one_vocabulary() {
    let table = table();
    let tech_fall = table.score.tech_fall_margin;
    let me = Competitor::with_rating(84.0);
    let them = Competitor::with_rating(74.0);
    let mut methods = Vec::new();
    for trial in 0..300 {
        let mut rng = MatchRng::new(&format!("vocabulary-{trial}"));
        let instant = simulate(&me, &them, &MatchModifiers::default(), &table, &mut rng);
        assert!(instant.is_consistent(tech_fall), "instant {instant}");

        let start = MinigameMatchState::start(me, them, Position::Neutral, &table);
        let played = if trial % 2 == 0 {
            play_out(start, &mut AggressivePolicy, &mut rng)
        } else {
            play_out(start, &mut ConservativePolicy, &mut rng)
        };
        let interactive = played.unwrap().result().unwrap();
        assert!(interactive.is_consistent(tech_fall), "interactive {interactive}");
        methods.push(interactive.method);
    }
    assert!(methods.contains(&MatchMethod::Decision));
}

#[test]
fn energy_drains_and_injury_accumulates_monotonically() {
    for trial in 0..100 {
        let mut rng = MatchRng::new(&format!("monotonic-{trial}"));
        let start = MinigameMatchState::start(
            Competitor::with_rating(76.0),
            Competitor::with_rating(79.0).with_injury(0.2),
            Position::Bottom,
            &table(),
        );
        let done = play_out(start, &mut AggressivePolicy, &mut rng).unwrap();
        let log = done.log();
        for pair in log.windows(2) {
            assert!(pair[1].energy_before <= pair[0].energy_after + f64::EPSILON);
            assert!(pair[1].energy_after <= pair[1].energy_before);
            assert!(pair[1].injury_after >= pair[0].injury_after);
            assert!(pair[1].opponent_energy_after <= pair[0].opponent_energy_after);
        }
        assert!(done.me().energy < 100.0);
    }
}

#[test]
fn high_risk_options_disappear_when_spent() {
    let state = MinigameMatchState::start(
        Competitor::with_rating(80.0).with_injury(0.75),
        Competitor::with_rating(80.0),
        Position::Bottom,
        &table(),
    );
    let prompt = state.prompt().unwrap();
    assert!(!prompt.offers(ActionKey::Granby));
    assert!((2..=4).contains(&prompt.options.len()));
    let mut rng = MatchRng::new("spent");
    assert_eq!(
        state
            .resolve(Some(ActionKey::Granby), &mut rng, ResolveOptions::default())
            .unwrap_err(),
        ExchangeError::ActionUnavailable {
            action: ActionKey::Granby,
            position: Position::Bottom,
        }
    );
}

#[test]
fn match_ends_in_regulation_or_early() {
    let table = table();
    let limit = usize::from(table.exchange.periods) * usize::from(table.exchange.exchanges_per_period);
    let mut early = 0;
    for trial in 0..300 {
        let mut rng = MatchRng::new(&format!("length-{trial}"));
        let start = MinigameMatchState::start(
            Competitor::with_rating(92.0),
            Competitor::with_rating(60.0),
            Position::Neutral,
            &table,
        );
        let done = play_out(start, &mut AggressivePolicy, &mut rng).unwrap();
        assert!(done.log().len() <= limit);
        if done.log().len() < limit {
            early += 1;
            assert!(done.result().unwrap().method.is_dominant());
        }
        assert!(done.period() <= table.exchange.periods);
    }
    assert!(early > 0, "a lopsided matchup never finished early");
}

#[test]
fn interactive_match_replays_from_snapshot() {
    let (state, rng) = mid_period("snapshot", 3);
    let saved_state = serde_json::to_string(&state).unwrap();
    let saved_rng = rng.snapshot();

    let mut rng = rng;
    let original = play_out(state, &mut AggressivePolicy, &mut rng).unwrap();

    let restored_state: MinigameMatchState = serde_json::from_str(&saved_state).unwrap();
    let mut restored_rng = MatchRng::restore(&saved_rng).unwrap();
    let replayed = play_out(restored_state, &mut AggressivePolicy, &mut restored_rng).unwrap();
    assert_eq!(original.result(), replayed.result());
    assert_eq!(original.log(), replayed.log());
}
