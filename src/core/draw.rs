/// Random draws: the single injected source of non-determinism.
///
/// Every phrase choice goes through a `RandomSource`. Any `rand::Rng`
/// qualifies; `ScriptedDraws` replays fixed choices so tests can pin an
/// exact output.
use rand::distributions::WeightedIndex;
use rand::prelude::Distribution;
use rand::Rng;

pub trait RandomSource {
    /// Pick an index into `weights` with probability proportional to its
    /// weight. `None` when there is nothing to pick (empty or all zero).
    fn pick_weighted(&mut self, weights: &[u32]) -> Option<usize>;

    /// True with probability `p`.
    fn chance(&mut self, p: f64) -> bool;
}

impl<R: Rng> RandomSource for R {
    fn pick_weighted(&mut self, weights: &[u32]) -> Option<usize> {
        let dist = WeightedIndex::new(weights).ok()?;
        Some(dist.sample(self))
    }

    fn chance(&mut self, p: f64) -> bool {
        self.gen_bool(p.clamp(0.0, 1.0))
    }
}

/// Uniform choice from a pool. `None` for an empty pool.
pub fn choose<'a, T>(pool: &'a [T], rng: &mut dyn RandomSource) -> Option<&'a T> {
    let weights = vec![1; pool.len()];
    rng.pick_weighted(&weights).and_then(|i| pool.get(i))
}

/// Deterministic stand-in for a random generator.
///
/// Picks replay `picks` in order (cycling), each taken modulo the pool
/// size and skipping zero-weight entries. Rolls replay `rolls` the same
/// way. Empty scripts mean "always the first eligible entry" and "never".
#[derive(Debug, Clone, Default)]
pub struct ScriptedDraws {
    picks: Vec<usize>,
    rolls: Vec<bool>,
    pick_cursor: usize,
    roll_cursor: usize,
}

impl ScriptedDraws {
    pub fn new(picks: Vec<usize>) -> Self {
        Self {
            picks,
            ..Self::default()
        }
    }

    /// Always the first eligible entry; every roll fails.
    pub fn first() -> Self {
        Self::default()
    }

    pub fn with_rolls(mut self, rolls: Vec<bool>) -> Self {
        self.rolls = rolls;
        self
    }

    /// Number of picks consumed so far.
    pub fn picks_made(&self) -> usize {
        self.pick_cursor
    }
}

impl RandomSource for ScriptedDraws {
    fn pick_weighted(&mut self, weights: &[u32]) -> Option<usize> {
        let eligible: Vec<usize> = (0..weights.len()).filter(|&i| weights[i] > 0).collect();
        if eligible.is_empty() {
            return None;
        }
        let scripted = if self.picks.is_empty() {
            0
        } else {
            self.picks[self.pick_cursor % self.picks.len()]
        };
        self.pick_cursor += 1;
        Some(eligible[scripted % eligible.len()])
    }

    fn chance(&mut self, _p: f64) -> bool {
        if self.rolls.is_empty() {
            return false;
        }
        let roll = self.rolls[self.roll_cursor % self.rolls.len()];
        self.roll_cursor += 1;
        roll
    }
}
