use std::collections::BTreeSet;

use takedown_game::{
    BracketPhase, BracketSize, MatchMethod, MatchResult, MatchRng, PendingBracketState,
    validate_path,
};

fn result(won: bool) -> MatchResult {
    MatchResult {
        won,
        method: MatchMethod::Decision,
        my_score: if won { 6 } else { 3 },
        opp_score: if won { 3 } else { 6 },
    }
}

/// Every finished bracket reachable by some win/loss sequence.
fn all_paths(size: BracketSize, seed: &str) -> Vec<PendingBracketState> {
    let mut rng = MatchRng::new(seed);
    let mut finished = Vec::new();
    let mut frontier = vec![PendingBracketState::new(&[], size)];
    while let Some(state) = frontier.pop() {
        if state.is_done() {
            finished.push(state);
            continue;
        }
        assert!(
            state.matches_played() < size.max_matches(),
            "path exceeded {} matches: {:?}",
            size.max_matches(),
            state.history()
        );
        for won in [true, false] {
            frontier.push(state.advance(&result(won), &mut rng).unwrap());
        }
    }
    finished
}

fn sequence(state: &PendingBracketState) -> Vec<bool> {
    state.history().iter().map(|step| step.result.won).collect()
}

#[test]
fn every_path_terminates_with_a_placement() {
    for size in [BracketSize::Eight, BracketSize::Sixteen] {
        let paths = all_paths(size, "totality");
        assert!(!paths.is_empty());
        for state in &paths {
            let place = state.placement().expect("finished bracket is placed");
            assert!((1..=size.entrants()).contains(&place));
            assert!(state.matches_played() <= size.max_matches());
            assert!(state.losses() <= 2);
            assert!(
                validate_path(size, state.history(), state.placement()).is_empty(),
                "validator rejected {:?}",
                sequence(state)
            );
        }
    }
}

#[test]
fn path_counts_match_the_graph() {
    assert_eq!(all_paths(BracketSize::Eight, "count").len(), 13);
    assert_eq!(all_paths(BracketSize::Sixteen, "count").len(), 20);
}

#[test]
fn only_championship_wins_take_first() {
    for size in [BracketSize::Eight, BracketSize::Sixteen] {
        for state in all_paths(size, "first-place") {
            let last = state.history().last().expect("at least one match");
            match state.placement() {
                Some(1) => {
                    assert!(last.result.won);
                    assert!(matches!(last.phase, BracketPhase::Final | BracketPhase::Reset));
                }
                Some(2) => {
                    assert!(!last.result.won);
                    assert!(matches!(
                        last.phase,
                        BracketPhase::LbFinal | BracketPhase::Reset
                    ));
                }
                _ => assert!(!matches!(
                    last.phase,
                    BracketPhase::Final | BracketPhase::LbFinal | BracketPhase::Reset
                )),
            }
        }
    }
}

#[test]
fn losing_twice_always_ends_the_run() {
    for size in [BracketSize::Eight, BracketSize::Sixteen] {
        for state in all_paths(size, "two-losses") {
            let wins = sequence(&state);
            if let Some(second) = wins
                .iter()
                .enumerate()
                .filter(|(_, won)| !**won)
                .map(|(index, _)| index)
                .nth(1)
            {
                assert_eq!(second, wins.len() - 1, "played on after two losses");
            }
        }
    }
}

#[test]
fn undefeated_paths_are_the_shortest_titles() {
    let eight = BracketSize::Eight;
    let undefeated = all_paths(eight, "undefeated")
        .into_iter()
        .find(|state| state.losses() == 0)
        .expect("undefeated path");
    assert_eq!(undefeated.matches_played(), 4);
    assert_eq!(undefeated.placement(), Some(1));

    let sixteen = all_paths(BracketSize::Sixteen, "undefeated")
        .into_iter()
        .find(|state| state.losses() == 0)
        .expect("undefeated path");
    assert_eq!(sixteen.matches_played(), 5);
    assert_eq!(sixteen.placement(), Some(1));
}

#[test]
fn first_round_consolation_losers_split_last_two_places() {
    let mut places = BTreeSet::new();
    for trial in 0..200 {
        let mut rng = MatchRng::new(&format!("band-{trial}"));
        let state = PendingBracketState::new(&[], BracketSize::Sixteen)
            .advance(&result(false), &mut rng)
            .unwrap()
            .advance(&result(false), &mut rng)
            .unwrap();
        assert_eq!(rng.draws(), 1);
        places.insert(state.placement().unwrap());
    }
    assert_eq!(places.into_iter().collect::<Vec<_>>(), vec![15, 16]);
}

#[test]
fn semifinal_loser_can_still_take_third() {
    let mut rng = MatchRng::new("bronze");
    let mut state = PendingBracketState::new(&[], BracketSize::Eight);
    for won in [true, false, true, true] {
        state = state.advance(&result(won), &mut rng).unwrap();
    }
    assert_eq!(state.placement(), Some(3));
    let phases: Vec<_> = state.history().iter().map(|step| step.phase).collect();
    assert_eq!(
        phases,
        [
            BracketPhase::Qf,
            BracketPhase::Sf,
            BracketPhase::ConsR2,
            BracketPhase::ThirdFourth
        ]
    );
}
