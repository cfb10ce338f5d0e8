//! Candidate scoring against equipment access and preference weights

use std::collections::{HashMap, HashSet};

use super::{DEC, INC};
use crate::exercises::ExerciseCandidate;

/// Candidate with its desirability score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredExercise {
    pub candidate: ExerciseCandidate,
    pub score: f64,
}

/// Multiplicative score, base 1.0
pub fn score(candidate: &ExerciseCandidate, gym_access: bool, exercise_scores: &HashMap<String, f64>) -> f64 {
    let mut score = 1.0;

    if !gym_access {
        score *= if candidate.is_body_only() { INC } else { DEC };
    }

    // unseen exercises get a mild boost so new ones get sampled
    score *= exercise_scores.get(&candidate.key()).copied().unwrap_or(INC);

    score
}

/// Score candidates and sort them best first
///
/// Repeated display names keep their first occurrence. Equal scores keep
/// catalog order.
pub fn rank(
    candidates: Vec<ExerciseCandidate>,
    gym_access: bool,
    exercise_scores: &HashMap<String, f64>,
) -> Vec<ScoredExercise> {
    let mut seen = HashSet::new();
    let mut scored: Vec<ScoredExercise> = candidates
        .into_iter()
        .filter(|c| seen.insert(c.name.clone()))
        .map(|candidate| {
            let score = score(&candidate, gym_access, exercise_scores);
            ScoredExercise { candidate, score }
        })
        .collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored
}
