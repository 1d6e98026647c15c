use std::ops::RangeInclusive;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::engine::trial::FalseStart;
use crate::engine::variant::{
    Difficulty, GameType, GameVariant, ScoringRule, StimulusKind, TrialParams, Verdict,
};

/// A shuffled run of consecutive numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberGrid {
    pub tiles: Vec<u32>,
    pub first: u32,
    pub last: u32,
}

/// Click the tiles in ascending order. The round ends on the last tile or
/// on the first wrong one; tiles already cleared are inert and numbers not
/// on the grid are not clicks at all.
#[derive(Debug, Clone)]
pub struct NumberOrder {
    params: TrialParams,
    tile_count: u32,
    next: u32,
    on_grid: RangeInclusive<u32>,
}

impl NumberOrder {
    pub fn new(difficulty: Difficulty) -> Self {
        let tile_count = match difficulty {
            Difficulty::Easy => 4,
            Difficulty::Medium => 6,
            Difficulty::Hard => 8,
        };
        Self {
            params: TrialParams {
                delay_range_ms: (600, 600),
                false_start: FalseStart::Ignore,
                stimulus_kind: StimulusKind::NumberGrid,
                scoring_rule: ScoringRule::Categorical,
                lead_in_ms: 0,
                inter_round_ms: 900,
            },
            tile_count,
            next: 0,
            on_grid: 1..=0,
        }
    }

    pub fn tile_count(&self) -> u32 {
        self.tile_count
    }

    /// The number the player must click next.
    pub fn next_expected(&self) -> u32 {
        self.next
    }
}

impl GameVariant for NumberOrder {
    type Stimulus = NumberGrid;
    type Input = u32;

    fn game_type(&self) -> GameType {
        GameType::NumberOrder
    }

    fn params(&self) -> &TrialParams {
        &self.params
    }

    fn present_stimulus<R: Rng>(&mut self, rng: &mut R) -> NumberGrid {
        let first = rng.random_range(1..=50);
        let last = first + self.tile_count - 1;
        let mut tiles: Vec<u32> = (first..=last).collect();
        tiles.shuffle(rng);
        self.next = first;
        self.on_grid = first..=last;
        NumberGrid { tiles, first, last }
    }

    fn classify_input(&mut self, stimulus: &NumberGrid, input: &u32) -> Verdict {
        let n = *input;
        if n >= stimulus.first && n < self.next {
            return Verdict::Ignored;
        }
        if n != self.next {
            return Verdict::Conclude { correct: Some(false) };
        }
        if n == stimulus.last {
            Verdict::Conclude { correct: Some(true) }
        } else {
            self.next += 1;
            Verdict::Pending
        }
    }

    fn is_qualifying(&self, input: &u32) -> bool {
        self.on_grid.contains(input)
    }
}
