//! Exercise definitions - catalog entries and the daily rotation tables

use serde::{Deserialize, Serialize};

/// Equipment tag for exercises that need nothing but body weight
pub const BODY_ONLY: &str = "body_only";

/// Workout type (and rotation slot) for cardio exercises
pub const CARDIO: &str = "cardio";

/// Strength split: three tiers of four muscle groups, picked by day of month
pub const STRENGTH_TIERS: [[&str; 4]; 3] = [
    ["abdominals", "lower_back", "middle_back", "chest"],
    ["biceps", "forearms", "triceps", "traps"],
    ["calves", "glutes", "hamstrings", "quadriceps"],
];

/// Weight-loss rotation: muscle groups interleaved with cardio days
pub const WEIGHT_LOSS_ROTATION: [&str; 10] = [
    "abdominals",
    CARDIO,
    "biceps",
    CARDIO,
    "chest",
    CARDIO,
    "lower_back",
    CARDIO,
    "quadriceps",
    CARDIO,
];

/// Exercise as returned by the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseCandidate {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub muscle: String,
    pub equipment: String,
    #[serde(default)]
    pub difficulty: String,
}

impl ExerciseCandidate {
    /// Key used for all per-exercise history
    pub fn key(&self) -> String {
        canonical_key(&self.name)
    }

    pub fn is_body_only(&self) -> bool {
        self.equipment == BODY_ONLY
    }
}

/// Canonical exercise key: the display name with all whitespace removed
pub fn canonical_key(name: &str) -> String {
    name.chars().filter(|c| !c.is_whitespace()).collect()
}
