//! Session Aggregator: append-only round results and the derived summary.

use serde::{Deserialize, Serialize};

use super::trial::TrialResult;
use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub average_time_ms: f64,
    pub average_accuracy: Option<f64>,
}

impl SessionSummary {
    /// Fold a full result sequence. `None` for an empty sequence.
    pub fn from_results(results: &[TrialResult]) -> Option<Self> {
        if results.is_empty() {
            return None;
        }

        let total: u128 = results.iter().map(|r| u128::from(r.elapsed_time_ms)).sum();
        let average_time_ms = total as f64 / results.len() as f64;

        let scored: Vec<bool> = results.iter().filter_map(|r| r.correct).collect();
        let average_accuracy = if scored.is_empty() {
            None
        } else {
            let hits = scored.iter().filter(|c| **c).count();
            Some(hits as f64 / scored.len() as f64)
        };

        Some(Self {
            average_time_ms,
            average_accuracy,
        })
    }

    /// Whole-millisecond score sent to the leaderboard (truncated).
    pub fn score_time_ms(&self) -> i64 {
        self.average_time_ms.floor() as i64
    }
}

#[derive(Debug, Clone)]
pub struct SessionAggregator {
    round_count: u32,
    results: Vec<TrialResult>,
    summary: Option<SessionSummary>,
}

impl SessionAggregator {
    pub fn new(round_count: u32) -> Self {
        Self {
            round_count,
            results: Vec::with_capacity(round_count as usize),
            summary: None,
        }
    }

    /// Append one round. Returns the summary exactly once, on the append
    /// that completes the session.
    pub fn record(&mut self, result: TrialResult) -> Result<Option<SessionSummary>, EngineError> {
        if self.is_complete() {
            return Err(EngineError::SessionComplete {
                rounds: self.results.len(),
            });
        }

        self.results.push(result);

        if self.results.len() == self.round_count as usize {
            self.summary = SessionSummary::from_results(&self.results);
            return Ok(self.summary);
        }
        Ok(None)
    }

    pub fn results(&self) -> &[TrialResult] {
        &self.results
    }

    pub fn round_count(&self) -> u32 {
        self.round_count
    }

    pub fn remaining(&self) -> usize {
        (self.round_count as usize).saturating_sub(self.results.len())
    }

    pub fn is_complete(&self) -> bool {
        self.results.len() >= self.round_count as usize
    }

    pub fn summary(&self) -> Option<SessionSummary> {
        self.summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple(ms: u64) -> TrialResult {
        TrialResult::new(ms, None)
    }

    fn choice(ms: u64, correct: bool) -> TrialResult {
        TrialResult::new(ms, Some(correct))
    }

    fn run(round_count: u32, results: &[TrialResult]) -> SessionSummary {
        let mut agg = SessionAggregator::new(round_count);
        let mut summary = None;
        for r in results {
            if let Some(s) = agg.record(*r).unwrap() {
                summary = Some(s);
            }
        }
        summary.expect("session should complete")
    }

    #[test]
    fn test_all_simple_inputs_at_200ms() {
        let summary = run(5, &[simple(200); 5]);
        assert_eq!(summary.average_time_ms, 200.0);
        assert_eq!(summary.average_accuracy, None);
        assert_eq!(summary.score_time_ms(), 200);
    }

    #[test]
    fn test_choice_task_two_correct_one_wrong() {
        let summary = run(3, &[choice(150, true), choice(200, true), choice(300, false)]);
        assert_eq!(summary.score_time_ms(), 216);
        let accuracy = summary.average_accuracy.unwrap();
        assert!((accuracy - 0.667).abs() < 0.001, "accuracy was {}", accuracy);
    }

    #[test]
    fn test_false_start_penalty_in_average() {
        let mut results = vec![simple(5000)];
        results.extend([simple(250); 4]);
        let summary = run(5, &results);
        assert_eq!(summary.average_time_ms, 1200.0);
    }

    #[test]
    fn test_exactly_n_results_for_any_round_count() {
        for n in 1..=12u32 {
            let mut agg = SessionAggregator::new(n);
            let mut completions = 0;
            for i in 0..n {
                if agg.record(simple(100 + u64::from(i))).unwrap().is_some() {
                    completions += 1;
                }
            }
            assert_eq!(agg.results().len(), n as usize);
            assert_eq!(completions, 1, "completion must be signalled once");
            assert_eq!(agg.remaining(), 0);
            assert!(matches!(
                agg.record(simple(1)),
                Err(EngineError::SessionComplete { .. })
            ));
            assert_eq!(agg.results().len(), n as usize);
        }
    }

    #[test]
    fn test_average_lies_within_min_and_max() {
        let samples = [
            vec![simple(180), simple(240), simple(9999)],
            vec![simple(1)],
            vec![choice(100, true), simple(700), choice(330, false), simple(415)],
        ];
        for results in samples {
            let summary = SessionSummary::from_results(&results).unwrap();
            let min = results.iter().map(|r| r.elapsed_time_ms).min().unwrap() as f64;
            let max = results.iter().map(|r| r.elapsed_time_ms).max().unwrap() as f64;
            assert!(summary.average_time_ms >= min && summary.average_time_ms <= max);
        }
    }

    #[test]
    fn test_accuracy_null_iff_no_correctness() {
        let none = SessionSummary::from_results(&[simple(100), simple(200)]).unwrap();
        assert!(none.average_accuracy.is_none());

        let mixed = SessionSummary::from_results(&[simple(100), choice(200, false)]).unwrap();
        assert_eq!(mixed.average_accuracy, Some(0.0));
    }

    #[test]
    fn test_empty_results_have_no_summary() {
        assert!(SessionSummary::from_results(&[]).is_none());
        assert!(SessionAggregator::new(3).summary().is_none());
    }
}
