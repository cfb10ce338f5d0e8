//! Progressive overload: weight/rep targets from prior loads and difficulty feedback

use std::collections::HashMap;

use super::selection::SelectedExercise;
use super::{DEC, DEFAULT_REPS, DEFAULT_WEIGHT, INC};
use crate::profile::{Difficulty, PlannedExercise, Stats, UserProfile, WorkoutPlan};

/// Weight and reps assigned to one exercise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Load {
    pub weight: i64,
    pub reps: i64,
}

impl Load {
    pub const DEFAULT: Load = Load {
        weight: DEFAULT_WEIGHT,
        reps: DEFAULT_REPS,
    };
}

/// Truncating multiply, matching the historical integer loads
fn scale(value: i64, factor: f64) -> i64 {
    (value as f64 * factor).floor() as i64
}

/// Next load from the previous one and how hard it felt
pub fn next_load(previous: Option<Load>, difficulty: Option<Difficulty>) -> Load {
    let Some(Load { weight, reps }) = previous else {
        return Load::DEFAULT;
    };

    match difficulty {
        Some(Difficulty::Easy) => Load {
            weight: scale(weight, INC),
            reps: scale(reps, INC),
        },
        Some(Difficulty::Hard) => Load {
            weight: scale(weight, DEC),
            reps: scale(reps, DEC),
        },
        Some(Difficulty::Medium) | None => Load {
            weight: scale(weight, INC),
            reps,
        },
    }
}

/// Load shown to the user: no weight for body-weight moves, nothing for cardio
pub fn presented(load: Load, body_only: bool, cardio: bool) -> Load {
    if cardio {
        Load { weight: 0, reps: 0 }
    } else if body_only {
        Load { weight: 0, ..load }
    } else {
        load
    }
}

/// Plan for the day plus the progression state to persist with it
#[derive(Debug, Clone, PartialEq)]
pub struct Progression {
    pub plan: WorkoutPlan,
    /// New previous weight/reps per exercise key
    pub previous_loads: HashMap<String, (i64, i64)>,
    /// What this plan adds to the running totals
    pub stats_delta: Stats,
}

/// Assign loads to today's selection
pub fn assign(profile: &UserProfile, selected: &[SelectedExercise]) -> Progression {
    let mut previous_loads: HashMap<String, (i64, i64)> = HashMap::new();
    let mut stats = Stats::default();
    let mut exercises = Vec::with_capacity(selected.len());

    for exercise in selected {
        let key = exercise.key();
        let previous = previous_loads
            .get(&key)
            .copied()
            .or_else(|| profile.previous_load(&key))
            .map(|(weight, reps)| Load { weight, reps });

        let load = next_load(previous, profile.exercise_difficulty.get(&key).copied());
        previous_loads.insert(key, (load.weight, load.reps));

        let shown = presented(load, exercise.body_only, exercise.cardio);
        stats.total_weight += shown.weight;
        stats.total_reps += shown.reps;

        exercises.push(PlannedExercise {
            name: exercise.name.clone(),
            muscle: exercise.muscle.clone(),
            weight: shown.weight,
            reps: shown.reps,
        });
    }
    stats.total_days += 1;

    Progression {
        plan: WorkoutPlan { exercises },
        previous_loads,
        stats_delta: stats,
    }
}
