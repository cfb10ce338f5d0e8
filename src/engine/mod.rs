//! Recommendation and progression engine
//!
//! - Candidate scoring against equipment access and preference weights
//! - Goal-driven daily rotation and round-robin selection
//! - Progressive overload from difficulty feedback
//! - One plan per user per calendar day

pub mod cache;
pub mod feedback;
pub mod progression;
pub mod recommender;
pub mod scoring;
pub mod selection;

pub use cache::{ComputedPlan, DailyPlanCache};
pub use recommender::Engine;
pub use scoring::ScoredExercise;
pub use selection::{DayFocus, SelectedExercise};

/// Multiplier for a boost: novel or body-weight exercises, good ratings, progression
pub const INC: f64 = 1.2;

/// Multiplier for a penalty: equipment without gym access, bad ratings, deload
pub const DEC: f64 = 0.8;

/// Weight assigned the first time an exercise is planned
pub const DEFAULT_WEIGHT: i64 = 10;

/// Reps assigned the first time an exercise is planned
pub const DEFAULT_REPS: i64 = 15;
