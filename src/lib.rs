//! overload - daily workout recommender
//!
//! Picks today's exercises from an external catalog and adapts weight/rep
//! targets from the user's feedback.

pub mod catalog;
pub mod db;
pub mod engine;
pub mod error;
pub mod exercises;
pub mod profile;

pub use db::{Database, ProfileStore};
pub use engine::Engine;
pub use error::EngineError;
