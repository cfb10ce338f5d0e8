//! Preference weights from like/dislike ratings

use super::{DEC, INC};
use crate::profile::Rating;

/// Score before any rating
pub const NEUTRAL_SCORE: f64 = 1.0;

/// New preference weight after one rating. Scores are not clamped.
pub fn rated_score(current: Option<f64>, rating: Rating) -> f64 {
    let score = current.unwrap_or(NEUTRAL_SCORE);
    match rating {
        Rating::Good => score * INC,
        Rating::Bad => score * DEC,
    }
}
