use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::dto::StrategyEvaluation;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RankBy {
    #[default]
    Reward,
    Efficiency,
}

impl RankBy {
    fn key(self, evaluation: &StrategyEvaluation) -> f64 {
        match self {
            RankBy::Reward => evaluation.reward,
            RankBy::Efficiency => evaluation.efficiency_score,
        }
    }
}

/// Orders evaluations best-first. The sort is stable, so equal keys keep the
/// order in which the catalog declared them.
pub struct StrategyRanker;

impl StrategyRanker {
    pub fn rank(mut evaluations: Vec<StrategyEvaluation>, by: RankBy) -> Vec<StrategyEvaluation> {
        evaluations.sort_by(|a, b| {
            by.key(b)
                .partial_cmp(&by.key(a))
                .unwrap_or(Ordering::Equal)
        });
        evaluations
    }

    /// First evaluation with the highest key; earlier entries win ties.
    pub fn best<'e, I>(evaluations: I, by: RankBy) -> Option<&'e StrategyEvaluation>
    where
        I: IntoIterator<Item = &'e StrategyEvaluation>,
    {
        evaluations.into_iter().fold(None, |best, candidate| match best {
            Some(current) if by.key(candidate) <= by.key(current) => Some(current),
            _ => Some(candidate),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::{Archetype, RewardBreakdown};

    fn eval(name: &str, reward: f64, efficiency: f64) -> StrategyEvaluation {
        StrategyEvaluation {
            strategy_name: name.into(),
            description: String::new(),
            archetype: Archetype::Balanced,
            actions: Vec::new(),
            new_co2_ppm: 400.0,
            reduction_ppm: 0.0,
            reduction_pct: 0.0,
            estimated_cost: 0.0,
            efficiency_score: efficiency,
            reward,
            breakdown: RewardBreakdown::default(),
        }
    }

    fn names(evals: &[StrategyEvaluation]) -> Vec<&str> {
        evals.iter().map(|e| e.strategy_name.as_str()).collect()
    }

    #[test]
    fn ranks_descending_and_keeps_declaration_order_on_ties() {
        let ranked = StrategyRanker::rank(
            vec![
                eval("a", 0.4, 3.0),
                eval("b", 0.9, 1.0),
                eval("c", 0.4, 2.0),
                eval("d", 1.2, 0.5),
            ],
            RankBy::Reward,
        );
        assert_eq!(names(&ranked), vec!["d", "b", "a", "c"]);
    }

    #[test]
    fn ranks_by_efficiency_on_request() {
        let ranked = StrategyRanker::rank(
            vec![eval("a", 0.4, 3.0), eval("b", 0.9, 1.0), eval("c", 0.1, 3.0)],
            RankBy::Efficiency,
        );
        assert_eq!(names(&ranked), vec!["a", "c", "b"]);
    }

    #[test]
    fn best_prefers_first_of_equals() {
        let evals = vec![eval("a", 0.5, 1.0), eval("b", 0.5, 2.0), eval("c", 0.1, 2.0)];
        assert_eq!(
            StrategyRanker::best(&evals, RankBy::Reward).map(|e| e.strategy_name.as_str()),
            Some("a")
        );
        assert_eq!(
            StrategyRanker::best(&evals, RankBy::Efficiency).map(|e| e.strategy_name.as_str()),
            Some("b")
        );
        let empty: Vec<StrategyEvaluation> = Vec::new();
        assert!(StrategyRanker::best(&empty, RankBy::Reward).is_none());
    }
}
