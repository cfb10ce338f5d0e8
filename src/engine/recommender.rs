//! Engine facade: daily recommendations and profile feedback

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::NaiveDate;
use tokio::sync::OwnedMutexGuard;
use tracing::info;

use super::cache::{ComputedPlan, DailyPlanCache};
use super::{feedback, progression, selection};
use crate::catalog::{Catalog, CatalogFetcher};
use crate::db::ProfileStore;
use crate::error::EngineError;
use crate::exercises::canonical_key;
use crate::profile::{
    Difficulty, Goal, ProfilePatch, Proficiency, Rating, Stats, UserProfile, WorkoutPlan,
};

type UserLocks = Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>;

/// Holds one user's lock; the map entry goes away with the last holder
struct UserGuard<'a> {
    user: String,
    lock: Arc<tokio::sync::Mutex<()>>,
    guard: Option<OwnedMutexGuard<()>>,
    locks: &'a UserLocks,
}

impl Drop for UserGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // one reference in the map, one here: nobody else is waiting
        if Arc::strong_count(&self.lock) == 2 {
            locks.remove(&self.user);
        }
    }
}

/// Recommendation and progression engine over a catalog and a profile store
///
/// Every operation on a user runs under that user's lock, so a rating
/// arriving while a plan is computed is applied after it, never lost.
/// Locks exist only while some operation holds or waits on them.
pub struct Engine<C, S> {
    fetcher: CatalogFetcher<C>,
    store: S,
    user_locks: UserLocks,
}

impl<C: Catalog, S: ProfileStore> Engine<C, S> {
    pub fn new(fetcher: CatalogFetcher<C>, store: S) -> Self {
        Self {
            fetcher,
            store,
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn catalog(&self) -> &C {
        self.fetcher.catalog()
    }

    async fn lock_user(&self, user: &str) -> UserGuard<'_> {
        let lock = {
            let mut locks = self.user_locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.entry(user.to_string()).or_default().clone()
        };
        let mut held = UserGuard {
            user: user.to_string(),
            lock: lock.clone(),
            guard: None,
            locks: &self.user_locks,
        };
        held.guard = Some(lock.lock_owned().await);
        held
    }

    fn profile(&self, user: &str) -> Result<UserProfile, EngineError> {
        self.store
            .get(user)?
            .ok_or_else(|| EngineError::NotFound(user.to_string()))
    }

    async fn patch(&self, user: &str, patch: ProfilePatch) -> Result<(), EngineError> {
        let _guard = self.lock_user(user).await;
        self.store.update(user, &patch)?;
        Ok(())
    }

    /// Register a new user with default settings
    pub async fn create_user(&self, user: &str) -> Result<UserProfile, EngineError> {
        let _guard = self.lock_user(user).await;
        let profile = UserProfile::new(user);
        self.store.create(&profile)?;
        info!("Created user {}", user);
        Ok(profile)
    }

    /// Today's plan: stored if already computed, otherwise selected,
    /// loaded and persisted
    pub async fn compute_recommendation(
        &self,
        user: &str,
        requested_count: usize,
        today: NaiveDate,
    ) -> Result<WorkoutPlan, EngineError> {
        let _guard = self.lock_user(user).await;

        DailyPlanCache::new(&self.store)
            .get_or_compute(user, today, async |profile: &UserProfile| {
                let selected = selection::select(&self.fetcher, profile, requested_count, today).await;
                let progression = progression::assign(profile, &selected);
                info!(
                    "Planned {} of {} exercises for {} on {}",
                    progression.plan.exercises.len(),
                    requested_count,
                    user,
                    today
                );

                Ok(ComputedPlan {
                    plan: progression.plan,
                    patch: ProfilePatch {
                        previous_loads: progression.previous_loads,
                        stats_delta: progression.stats_delta,
                        ..Default::default()
                    },
                })
            })
            .await
    }

    /// Remember how hard the last session of an exercise felt
    pub async fn record_difficulty(
        &self,
        user: &str,
        exercise: &str,
        difficulty: Difficulty,
    ) -> Result<(), EngineError> {
        let key = canonical_key(exercise);
        info!("{} rated {} as {:?}", user, key, difficulty);
        self.patch(
            user,
            ProfilePatch {
                exercise_difficulty: HashMap::from([(key, difficulty)]),
                ..Default::default()
            },
        )
        .await
    }

    /// Apply a like/dislike rating; returns the new preference weight
    pub async fn record_rating(&self, user: &str, exercise: &str, rating: Rating) -> Result<f64, EngineError> {
        let _guard = self.lock_user(user).await;
        let key = canonical_key(exercise);

        let profile = self.profile(user)?;
        let score = feedback::rated_score(profile.exercise_scores.get(&key).copied(), rating);
        self.store.update(
            user,
            &ProfilePatch {
                exercise_scores: HashMap::from([(key.clone(), score)]),
                ..Default::default()
            },
        )?;

        info!("{} rated {} {:?}, score now {:.3}", user, key, rating, score);
        Ok(score)
    }

    pub async fn set_goal(&self, user: &str, goal: Goal) -> Result<(), EngineError> {
        self.patch(
            user,
            ProfilePatch {
                goal: Some(goal),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn set_proficiency(&self, user: &str, proficiency: Option<Proficiency>) -> Result<(), EngineError> {
        self.patch(
            user,
            ProfilePatch {
                proficiency: Some(proficiency),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn set_gym_access(&self, user: &str, gym_access: bool) -> Result<(), EngineError> {
        self.patch(
            user,
            ProfilePatch {
                gym_access: Some(gym_access),
                ..Default::default()
            },
        )
        .await
    }

    /// Running totals over all computed plans
    pub fn stats(&self, user: &str) -> Result<Stats, EngineError> {
        Ok(self.profile(user)?.stats)
    }

    /// Every stored plan, oldest first
    pub fn workout_history(&self, user: &str) -> Result<BTreeMap<NaiveDate, WorkoutPlan>, EngineError> {
        Ok(self.profile(user)?.workouts)
    }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::catalog::tests::{candidate, muscle_candidates};
    use crate::catalog::{DEFAULT_TIMEOUT, InMemoryCatalog};
    use crate::db::Database;
    use crate::exercises::{BODY_ONLY, CARDIO, ExerciseCandidate, STRENGTH_TIERS};

    /// 2024-05-03: strength tier 0, weight-loss cardio slot
    fn strength_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 3).unwrap()
    }

    fn cardio(name: &str) -> ExerciseCandidate {
        let mut c = candidate(name, "quadriceps", BODY_ONLY);
        c.kind = CARDIO.to_string();
        c
    }

    fn engine_with(exercises: Vec<ExerciseCandidate>) -> Engine<InMemoryCatalog, Database> {
        let fetcher = CatalogFetcher::new(InMemoryCatalog::new(exercises), DEFAULT_TIMEOUT);
        Engine::new(fetcher, Database::open_in_memory().unwrap())
    }

    fn tier_zero_catalog(per_muscle: usize) -> Vec<ExerciseCandidate> {
        STRENGTH_TIERS[0]
            .iter()
            .flat_map(|muscle| muscle_candidates(muscle, per_muscle))
            .collect()
    }

    #[tokio::test]
    async fn test_recommendation_is_idempotent_per_day() {
        let engine = engine_with(tier_zero_catalog(5));
        engine.create_user("alice").await.unwrap();

        let first = engine.compute_recommendation("alice", 8, strength_day()).await.unwrap();
        let queries = engine.catalog().queries();
        let second = engine.compute_recommendation("alice", 8, strength_day()).await.unwrap();

        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        assert_eq!(engine.catalog().queries(), queries);
        assert_eq!(engine.stats("alice").unwrap().total_days, 1);
    }

    #[tokio::test]
    async fn test_first_plan_uses_defaults() {
        let engine = engine_with(tier_zero_catalog(5));
        engine.create_user("alice").await.unwrap();

        let plan = engine.compute_recommendation("alice", 8, strength_day()).await.unwrap();

        assert_eq!(plan.exercises.len(), 8);
        assert!(plan.exercises.iter().all(|e| e.weight == 10 && e.reps == 15));

        let muscles: Vec<_> = plan.exercises.iter().map(|e| e.muscle.as_str()).collect();
        let tier = STRENGTH_TIERS[0];
        assert_eq!(muscles, [tier, tier].concat());

        let profile = engine.store().get("alice").unwrap().unwrap();
        assert_eq!(profile.previous_weights.len(), 8);
        assert_eq!(profile.previous_weights.len(), profile.previous_reps.len());
        assert!(profile.previous_weights.keys().all(|k| profile.previous_reps.contains_key(k)));
    }

    #[tokio::test]
    async fn test_progression_follows_difficulty() {
        let engine = engine_with(tier_zero_catalog(1));
        engine.create_user("alice").await.unwrap();
        let day = strength_day();

        engine.compute_recommendation("alice", 4, day).await.unwrap();
        engine.record_difficulty("alice", "abdominals move 0", Difficulty::Easy).await.unwrap();
        engine.record_difficulty("alice", "lower_back move 0", Difficulty::Medium).await.unwrap();
        engine.record_difficulty("alice", "middle_back move 0", Difficulty::Hard).await.unwrap();

        // same tier again three days later
        let later = day + chrono::Days::new(3);
        let plan = engine.compute_recommendation("alice", 4, later).await.unwrap();

        let loads: Vec<_> = plan.exercises.iter().map(|e| (e.weight, e.reps)).collect();
        assert_eq!(loads, vec![(12, 18), (12, 15), (8, 12), (12, 15)]);
    }

    #[tokio::test]
    async fn test_body_only_without_gym() {
        let mut exercises = tier_zero_catalog(3);
        exercises.push(candidate("Crunch", "abdominals", BODY_ONLY));
        exercises.push(candidate("Superman", "lower_back", BODY_ONLY));
        let engine = engine_with(exercises);
        engine.create_user("alice").await.unwrap();
        engine.set_gym_access("alice", false).await.unwrap();

        let plan = engine.compute_recommendation("alice", 4, strength_day()).await.unwrap();

        let names: Vec<_> = plan.exercises.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Crunch", "Superman"]);
        assert!(plan.exercises.iter().all(|e| e.weight == 0 && e.reps == 15));
    }

    #[tokio::test]
    async fn test_cardio_day_zeroes_loads() {
        let engine = engine_with(vec![cardio("Running"), cardio("Rowing")]);
        engine.create_user("alice").await.unwrap();
        engine.set_goal("alice", Goal::WeightLoss).await.unwrap();

        let plan = engine.compute_recommendation("alice", 5, strength_day()).await.unwrap();

        assert_eq!(plan.exercises.len(), 2);
        assert!(plan.exercises.iter().all(|e| e.weight == 0 && e.reps == 0));
        let stats = engine.stats("alice").unwrap();
        assert_eq!((stats.total_weight, stats.total_reps, stats.total_days), (0, 0, 1));
    }

    #[tokio::test]
    async fn test_missing_muscle_group_still_fills_plan() {
        let exercises: Vec<_> = STRENGTH_TIERS[0][1..]
            .iter()
            .flat_map(|muscle| muscle_candidates(muscle, 5))
            .collect();
        let engine = engine_with(exercises);
        engine.create_user("alice").await.unwrap();

        let plan = engine.compute_recommendation("alice", 8, strength_day()).await.unwrap();

        assert_eq!(plan.exercises.len(), 8);
        assert!(plan.exercises.iter().all(|e| e.muscle != "abdominals"));
    }

    #[tokio::test]
    async fn test_short_catalog_returns_short_plan() {
        let engine = engine_with(tier_zero_catalog(1));
        engine.create_user("alice").await.unwrap();

        let plan = engine.compute_recommendation("alice", 10, strength_day()).await.unwrap();

        assert_eq!(plan.exercises.len(), 4);
    }

    #[rstest]
    #[case(usize::MAX)]
    #[case(usize::MAX / 10)]
    #[tokio::test]
    async fn test_huge_count_returns_whole_catalog(#[case] requested_count: usize) {
        let engine = engine_with(vec![
            candidate("X", "abdominals", "dumbbell"),
            candidate("Y", "lower_back", "dumbbell"),
            candidate("Z", "middle_back", "dumbbell"),
        ]);
        engine.create_user("alice").await.unwrap();

        let plan = engine
            .compute_recommendation("alice", requested_count, strength_day())
            .await
            .unwrap();

        assert_eq!(plan.exercises.len(), 3);
    }

    #[tokio::test]
    async fn test_user_locks_released() {
        let engine = engine_with(tier_zero_catalog(2));
        engine.create_user("alice").await.unwrap();
        engine.create_user("bob").await.unwrap();

        let (alice, bob, rating) = tokio::join!(
            engine.compute_recommendation("alice", 4, strength_day()),
            engine.compute_recommendation("bob", 4, strength_day()),
            engine.record_rating("alice", "Squat", Rating::Good),
        );
        alice.unwrap();
        bob.unwrap();
        rating.unwrap();
        engine.record_difficulty("ghost", "Squat", Difficulty::Hard).await.unwrap_err();

        assert!(engine.user_locks.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rating_drifts_score() {
        let engine = engine_with(vec![]);
        engine.create_user("alice").await.unwrap();

        assert_approx_eq!(engine.record_rating("alice", "Bench Press", Rating::Good).await.unwrap(), 1.2);
        assert_approx_eq!(engine.record_rating("alice", "BenchPress", Rating::Good).await.unwrap(), 1.44);
        assert_approx_eq!(engine.record_rating("alice", "Squat", Rating::Bad).await.unwrap(), 0.8);

        let profile = engine.store().get("alice").unwrap().unwrap();
        assert_eq!(profile.exercise_scores.len(), 2);
    }

    #[tokio::test]
    async fn test_setters_update_profile() {
        let engine = engine_with(vec![]);
        engine.create_user("alice").await.unwrap();

        engine.set_goal("alice", Goal::WeightLoss).await.unwrap();
        engine.set_proficiency("alice", Some(Proficiency::Expert)).await.unwrap();
        engine.set_gym_access("alice", false).await.unwrap();

        let profile = engine.store().get("alice").unwrap().unwrap();
        assert_eq!(profile.goal, Goal::WeightLoss);
        assert_eq!(profile.proficiency, Some(Proficiency::Expert));
        assert!(!profile.gym_access);
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let engine = engine_with(tier_zero_catalog(1));

        let results = [
            engine.compute_recommendation("ghost", 3, strength_day()).await.err(),
            engine.record_difficulty("ghost", "Squat", Difficulty::Hard).await.err(),
            engine.record_rating("ghost", "Squat", Rating::Good).await.err(),
            engine.set_goal("ghost", Goal::Strength).await.err(),
            engine.set_gym_access("ghost", true).await.err(),
            engine.stats("ghost").err(),
        ];

        for result in results {
            assert!(matches!(result, Some(EngineError::NotFound(_))), "{result:?}");
        }
        assert_eq!(engine.catalog().queries(), 0);
    }

    #[tokio::test]
    async fn test_create_user_twice_conflicts() {
        let engine = engine_with(vec![]);
        engine.create_user("alice").await.unwrap();
        assert!(matches!(
            engine.create_user("alice").await,
            Err(EngineError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_history_lists_days() {
        let engine = engine_with(tier_zero_catalog(2));
        engine.create_user("alice").await.unwrap();
        let day = strength_day();

        engine.compute_recommendation("alice", 2, day).await.unwrap();
        engine.compute_recommendation("alice", 2, day + chrono::Days::new(1)).await.unwrap();

        let history = engine.workout_history("alice").unwrap();
        assert_eq!(history.keys().copied().collect::<Vec<_>>(), vec![day, day + chrono::Days::new(1)]);
    }
}
