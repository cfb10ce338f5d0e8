//! Goal-driven daily rotation and the final exercise draw

use std::collections::{HashSet, VecDeque};

use chrono::{Datelike, NaiveDate};

use super::scoring::{ScoredExercise, rank};
use crate::catalog::{Catalog, CatalogFetcher, CatalogQuery, Target};
use crate::exercises::{CARDIO, STRENGTH_TIERS, WEIGHT_LOSS_ROTATION, canonical_key};
use crate::profile::{Goal, UserProfile};

/// What today's plan is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayFocus {
    /// Strength day: four muscle groups drawn round-robin
    Split([&'static str; 4]),
    /// Weight-loss day on a single muscle group
    Muscle(&'static str),
    /// Weight-loss cardio day
    Cardio,
}

/// Exercise picked for today, before loads are assigned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedExercise {
    pub name: String,
    pub muscle: String,
    pub body_only: bool,
    pub cardio: bool,
}

impl SelectedExercise {
    fn from_scored(scored: ScoredExercise, cardio: bool) -> Self {
        Self {
            body_only: scored.candidate.is_body_only(),
            name: scored.candidate.name,
            muscle: scored.candidate.muscle,
            cardio,
        }
    }

    pub fn key(&self) -> String {
        canonical_key(&self.name)
    }
}

pub fn strength_tier(day_of_month: u32) -> [&'static str; 4] {
    STRENGTH_TIERS[day_of_month as usize % STRENGTH_TIERS.len()]
}

pub fn weight_loss_slot(day_of_month: u32) -> &'static str {
    WEIGHT_LOSS_ROTATION[day_of_month as usize % WEIGHT_LOSS_ROTATION.len()]
}

/// Today's focus, keyed on the day of the month
pub fn focus_for(goal: Goal, date: NaiveDate) -> DayFocus {
    let day = date.day();
    match goal {
        Goal::Strength => DayFocus::Split(strength_tier(day)),
        Goal::WeightLoss => match weight_loss_slot(day) {
            CARDIO => DayFocus::Cardio,
            muscle => DayFocus::Muscle(muscle),
        },
    }
}

/// Pop entries until one with an unseen name turns up
fn next_unseen(queue: &mut VecDeque<ScoredExercise>, seen: &mut HashSet<String>) -> Option<ScoredExercise> {
    while let Some(scored) = queue.pop_front() {
        if seen.insert(scored.candidate.name.clone()) {
            return Some(scored);
        }
    }
    None
}

/// Draw the head of each list in turn until `count` are picked or all lists
/// are exhausted. Exhausted lists leave the rotation.
pub fn round_robin(lists: Vec<Vec<ScoredExercise>>, count: usize) -> Vec<ScoredExercise> {
    let mut queues: Vec<VecDeque<ScoredExercise>> = lists.into_iter().map(VecDeque::from).collect();
    let mut live: Vec<usize> = (0..queues.len()).collect();
    let mut seen = HashSet::new();
    let mut picked = Vec::new();
    let mut cursor = 0;

    while picked.len() < count && !live.is_empty() {
        match next_unseen(&mut queues[live[cursor]], &mut seen) {
            Some(scored) => {
                picked.push(scored);
                cursor += 1;
            }
            None => {
                live.remove(cursor);
            }
        }
        if cursor >= live.len() {
            cursor = 0;
        }
    }

    picked
}

/// Pick today's exercises for the profile
pub async fn select<C: Catalog>(
    fetcher: &CatalogFetcher<C>,
    profile: &UserProfile,
    count: usize,
    date: NaiveDate,
) -> Vec<SelectedExercise> {
    let query = |target| CatalogQuery::for_user(profile.gym_access, profile.proficiency, target);
    let scores = &profile.exercise_scores;

    let (target, cardio) = match focus_for(profile.goal, date) {
        DayFocus::Split(tier) => {
            let mut lists = Vec::with_capacity(tier.len());
            for muscle in tier {
                let candidates = fetcher.fetch(&query(Target::Muscle(muscle.to_string())), count).await;
                lists.push(rank(candidates, profile.gym_access, scores));
            }
            return round_robin(lists, count)
                .into_iter()
                .map(|scored| SelectedExercise::from_scored(scored, false))
                .collect();
        }
        DayFocus::Muscle(muscle) => (Target::Muscle(muscle.to_string()), false),
        DayFocus::Cardio => (Target::Type(CARDIO.to_string()), true),
    };

    let candidates = fetcher.fetch(&query(target), count).await;
    rank(candidates, profile.gym_access, scores)
        .into_iter()
        .take(count)
        .map(|scored| SelectedExercise::from_scored(scored, cardio))
        .collect()
}
