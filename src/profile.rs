//! User profile document and the field-level patches applied to it

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::ops::AddAssign;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Training objective, drives the selection mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    #[default]
    Strength,
    WeightLoss,
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Goal::Strength => write!(f, "strength"),
            Goal::WeightLoss => write!(f, "weight_loss"),
        }
    }
}

impl FromStr for Goal {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strength" => Ok(Goal::Strength),
            "weight_loss" | "weightloss" => Ok(Goal::WeightLoss),
            _ => Err(EngineError::InvalidArgument(format!("unknown goal: {s}"))),
        }
    }
}

/// Skill level, forwarded to the catalog as a difficulty filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Proficiency {
    Beginner,
    Intermediate,
    Expert,
}

impl Proficiency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Proficiency::Beginner => "beginner",
            Proficiency::Intermediate => "intermediate",
            Proficiency::Expert => "expert",
        }
    }

    /// Parse user input; "unset" clears the proficiency
    pub fn parse_optional(s: &str) -> Result<Option<Self>, EngineError> {
        match s {
            "unset" | "none" => Ok(None),
            other => other.parse().map(Some),
        }
    }
}

impl FromStr for Proficiency {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(Proficiency::Beginner),
            "intermediate" => Ok(Proficiency::Intermediate),
            "expert" => Ok(Proficiency::Expert),
            _ => Err(EngineError::InvalidArgument(format!("unknown proficiency: {s}"))),
        }
    }
}

/// How hard the user found the last session of an exercise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl FromStr for Difficulty {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(EngineError::InvalidArgument(format!("unknown difficulty: {s}"))),
        }
    }
}

/// Like/dislike feedback for an exercise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    Good,
    Bad,
}

impl FromStr for Rating {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1" | "good" => Ok(Rating::Good),
            "0" | "bad" => Ok(Rating::Bad),
            _ => Err(EngineError::InvalidArgument(format!("unknown rating: {s}"))),
        }
    }
}

/// Parse a gym access flag ("true" / "false")
pub fn parse_gym_access(s: &str) -> Result<bool, EngineError> {
    match s {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(EngineError::InvalidArgument(format!("gym access must be true or false, got {s}"))),
    }
}

/// One exercise of a daily plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedExercise {
    pub name: String,
    pub muscle: String,
    pub weight: i64,
    pub reps: i64,
}

/// Exercises assigned for one calendar day
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutPlan {
    pub exercises: Vec<PlannedExercise>,
}

/// Running totals over every computed plan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total_weight: i64,
    pub total_reps: i64,
    pub total_days: i64,
}

impl AddAssign for Stats {
    fn add_assign(&mut self, other: Self) {
        self.total_weight += other.total_weight;
        self.total_reps += other.total_reps;
        self.total_days += other.total_days;
    }
}

/// Per-user state, stored as one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub gym_access: bool,
    pub proficiency: Option<Proficiency>,
    pub goal: Goal,
    #[serde(default)]
    pub exercise_scores: HashMap<String, f64>,
    #[serde(default)]
    pub exercise_difficulty: HashMap<String, Difficulty>,
    #[serde(default)]
    pub previous_weights: HashMap<String, i64>,
    #[serde(default)]
    pub previous_reps: HashMap<String, i64>,
    #[serde(default)]
    pub workouts: BTreeMap<NaiveDate, WorkoutPlan>,
    #[serde(flatten)]
    pub stats: Stats,
}

impl UserProfile {
    /// Fresh profile as created at sign-up
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            gym_access: true,
            proficiency: None,
            goal: Goal::Strength,
            exercise_scores: HashMap::new(),
            exercise_difficulty: HashMap::new(),
            previous_weights: HashMap::new(),
            previous_reps: HashMap::new(),
            workouts: BTreeMap::new(),
            stats: Stats::default(),
        }
    }

    /// Last assigned weight and reps for an exercise key
    pub fn previous_load(&self, key: &str) -> Option<(i64, i64)> {
        let weight = self.previous_weights.get(key)?;
        let reps = self.previous_reps.get(key)?;
        Some((*weight, *reps))
    }
}

/// Named fields to merge into a stored profile
///
/// Map-valued fields merge per key, so two patches touching different
/// exercises never overwrite each other.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfilePatch {
    pub gym_access: Option<bool>,
    pub proficiency: Option<Option<Proficiency>>,
    pub goal: Option<Goal>,
    pub exercise_scores: HashMap<String, f64>,
    pub exercise_difficulty: HashMap<String, Difficulty>,
    /// Weight and reps per key, written together to keep both maps aligned
    pub previous_loads: HashMap<String, (i64, i64)>,
    pub workouts: BTreeMap<NaiveDate, WorkoutPlan>,
    /// Added to the stored totals, not written over them
    pub stats_delta: Stats,
}

impl ProfilePatch {
    pub fn apply(&self, profile: &mut UserProfile) {
        if let Some(gym_access) = self.gym_access {
            profile.gym_access = gym_access;
        }
        if let Some(proficiency) = self.proficiency {
            profile.proficiency = proficiency;
        }
        if let Some(goal) = self.goal {
            profile.goal = goal;
        }
        for (key, score) in &self.exercise_scores {
            profile.exercise_scores.insert(key.clone(), *score);
        }
        for (key, difficulty) in &self.exercise_difficulty {
            profile.exercise_difficulty.insert(key.clone(), *difficulty);
        }
        for (key, (weight, reps)) in &self.previous_loads {
            profile.previous_weights.insert(key.clone(), *weight);
            profile.previous_reps.insert(key.clone(), *reps);
        }
        for (date, plan) in &self.workouts {
            // plans are immutable once stored for a date
            profile.workouts.entry(*date).or_insert_with(|| plan.clone());
        }
        profile.stats += self.stats_delta;
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn plan(name: &str) -> WorkoutPlan {
        WorkoutPlan {
            exercises: vec![PlannedExercise {
                name: name.to_string(),
                muscle: "chest".to_string(),
                weight: 10,
                reps: 15,
            }],
        }
    }

    #[rstest]
    #[case("strength", Goal::Strength)]
    #[case("weight_loss", Goal::WeightLoss)]
    #[case("weightloss", Goal::WeightLoss)]
    fn test_goal_from_str(#[case] input: &str, #[case] expected: Goal) {
        assert_eq!(input.parse::<Goal>().unwrap(), expected);
    }

    #[rstest]
    #[case("extreme")]
    #[case("")]
    #[case("Easy")]
    fn test_difficulty_rejects_unknown(#[case] input: &str) {
        assert!(matches!(
            input.parse::<Difficulty>(),
            Err(EngineError::InvalidArgument(_))
        ));
    }

    #[rstest]
    #[case("1", Rating::Good)]
    #[case("good", Rating::Good)]
    #[case("0", Rating::Bad)]
    #[case("bad", Rating::Bad)]
    fn test_rating_from_str(#[case] input: &str, #[case] expected: Rating) {
        assert_eq!(input.parse::<Rating>().unwrap(), expected);
    }

    #[test]
    fn test_rating_rejects_unknown() {
        assert!(matches!("2".parse::<Rating>(), Err(EngineError::InvalidArgument(_))));
    }

    #[test]
    fn test_proficiency_unset() {
        assert_eq!(Proficiency::parse_optional("unset").unwrap(), None);
        assert_eq!(
            Proficiency::parse_optional("expert").unwrap(),
            Some(Proficiency::Expert)
        );
        assert!(Proficiency::parse_optional("guru").is_err());
    }

    #[test]
    fn test_gym_access_parse() {
        assert!(parse_gym_access("true").unwrap());
        assert!(!parse_gym_access("false").unwrap());
        assert!(parse_gym_access("yes").is_err());
    }

    #[test]
    fn test_new_profile_defaults() {
        let profile = UserProfile::new("alice");
        assert!(profile.gym_access);
        assert_eq!(profile.proficiency, None);
        assert_eq!(profile.goal, Goal::Strength);
        assert_eq!(profile.stats, Stats::default());
        assert!(profile.workouts.is_empty());
    }

    #[test]
    fn test_patch_merges_per_key() {
        let mut profile = UserProfile::new("alice");
        profile.exercise_scores.insert("PushUp".to_string(), 1.2);

        let patch = ProfilePatch {
            exercise_scores: HashMap::from([("Squat".to_string(), 0.8)]),
            previous_loads: HashMap::from([("Squat".to_string(), (12, 18))]),
            ..Default::default()
        };
        patch.apply(&mut profile);

        assert_eq!(profile.exercise_scores.get("PushUp"), Some(&1.2));
        assert_eq!(profile.exercise_scores.get("Squat"), Some(&0.8));
        assert_eq!(profile.previous_load("Squat"), Some((12, 18)));
    }

    #[test]
    fn test_patch_never_replaces_stored_plan() {
        let mut profile = UserProfile::new("alice");
        let day = date("2024-03-05");
        profile.workouts.insert(day, plan("first"));

        let patch = ProfilePatch {
            workouts: BTreeMap::from([(day, plan("second"))]),
            ..Default::default()
        };
        patch.apply(&mut profile);

        assert_eq!(profile.workouts[&day], plan("first"));
    }

    #[test]
    fn test_patch_adds_stats_delta() {
        let mut profile = UserProfile::new("alice");
        profile.stats = Stats {
            total_weight: 100,
            total_reps: 50,
            total_days: 3,
        };
        let patch = ProfilePatch {
            stats_delta: Stats {
                total_weight: 10,
                total_reps: 30,
                total_days: 1,
            },
            ..Default::default()
        };

        patch.apply(&mut profile);
        patch.apply(&mut profile);

        assert_eq!(
            profile.stats,
            Stats {
                total_weight: 120,
                total_reps: 110,
                total_days: 5,
            }
        );
    }

    #[test]
    fn test_patch_clears_proficiency() {
        let mut profile = UserProfile::new("alice");
        profile.proficiency = Some(Proficiency::Expert);
        let patch = ProfilePatch {
            proficiency: Some(None),
            ..Default::default()
        };
        patch.apply(&mut profile);
        assert_eq!(profile.proficiency, None);
    }

    #[test]
    fn test_profile_json_uses_iso_dates() {
        let mut profile = UserProfile::new("alice");
        profile.workouts.insert(date("2024-03-05"), plan("Push Up"));

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(
            json["workouts"]["2024-03-05"]["exercises"][0]["name"],
            "Push Up"
        );
        assert_eq!(json["total_days"], 0);

        let back: UserProfile = serde_json::from_value(json).unwrap();
        assert_eq!(back, profile);
    }
}
