//! Automated decision makers for driving interactive matches without a human.
use std::collections::VecDeque;

use super::{ActionKey, ExchangeError, ExchangePrompt, MinigameMatchState, ResolveOptions, RiskTag};
use crate::rng::MatchRng;

/// Chooses an option for each prompt. `None` lets the decision timer expire.
pub trait ExchangePolicy {
    fn choose(&mut self, prompt: &ExchangePrompt) -> Option<ActionKey>;
}

/// Always takes the riskiest option on offer.
#[derive(Debug, Clone, Copy, Default)]
pub struct AggressivePolicy;

impl ExchangePolicy for AggressivePolicy {
    fn choose(&mut self, prompt: &ExchangePrompt) -> Option<ActionKey> {
        prompt
            .options
            .iter()
            .rev()
            .max_by_key(|option| option.risk)
            .map(|option| option.key)
    }
}

/// Takes the safest option, and presses with a medium-risk move once the opponent is fading.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConservativePolicy;

impl ExchangePolicy for ConservativePolicy {
    fn choose(&mut self, prompt: &ExchangePrompt) -> Option<ActionKey> {
        let wanted = if prompt.opponent_fading {
            RiskTag::Medium
        } else {
            RiskTag::Low
        };
        prompt
            .options
            .iter()
            .find(|option| option.risk == wanted)
            .or_else(|| prompt.options.iter().min_by_key(|option| option.risk))
            .map(|option| option.key)
    }
}

/// Replays a fixed list of choices; once exhausted every prompt times out.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPolicy {
    script: VecDeque<Option<ActionKey>>,
}

impl ScriptedPolicy {
    #[must_use]
    pub fn new(script: impl IntoIterator<Item = Option<ActionKey>>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }
}

impl ExchangePolicy for ScriptedPolicy {
    fn choose(&mut self, _prompt: &ExchangePrompt) -> Option<ActionKey> {
        self.script.pop_front().flatten()
    }
}

/// Drive `state` to completion, asking `policy` at every decision point.
///
/// # Errors
///
/// Propagates `ExchangeError::ActionUnavailable` when the policy picks an option
/// the prompt did not offer.
pub fn play_out<P: ExchangePolicy + ?Sized>(
    state: MinigameMatchState,
    policy: &mut P,
    rng: &mut MatchRng,
) -> Result<MinigameMatchState, ExchangeError> {
    let mut state = state;
    while !state.is_finished() {
        let prompt = state.prompt()?;
        let choice = policy.choose(&prompt);
        let options = if choice.is_none() {
            ResolveOptions::timed_out()
        } else {
            ResolveOptions::default()
        };
        state = state.resolve(choice, rng, options)?.state;
    }
    Ok(state)
}
