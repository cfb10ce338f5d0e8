//! One plan per user per calendar day

use chrono::NaiveDate;
use tracing::debug;

use crate::db::ProfileStore;
use crate::error::EngineError;
use crate::profile::{ProfilePatch, UserProfile, WorkoutPlan};

/// Result of a fresh computation: the plan and the state to persist with it
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedPlan {
    pub plan: WorkoutPlan,
    pub patch: ProfilePatch,
}

pub struct DailyPlanCache<'a, S> {
    store: &'a S,
}

impl<'a, S: ProfileStore> DailyPlanCache<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Return the stored plan for `date`, or run `compute` once and store
    /// its plan together with its patch.
    pub async fn get_or_compute<F>(&self, user: &str, date: NaiveDate, compute: F) -> Result<WorkoutPlan, EngineError>
    where
        F: AsyncFnOnce(&UserProfile) -> Result<ComputedPlan, EngineError>,
    {
        let profile = self
            .store
            .get(user)?
            .ok_or_else(|| EngineError::NotFound(user.to_string()))?;

        if let Some(plan) = profile.workouts.get(&date) {
            debug!("Serving stored plan for {} on {}", user, date);
            return Ok(plan.clone());
        }

        let ComputedPlan { plan, mut patch } = compute(&profile).await?;
        patch.workouts.insert(date, plan.clone());
        self.store.update(user, &patch)?;
        Ok(plan)
    }
}
