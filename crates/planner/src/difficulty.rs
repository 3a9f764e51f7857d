//! Difficulty estimation from session position and topic mastery.

use studyplan_core::{Difficulty, SessionProgress, TopicId, UserProgress};

/// Difficulty for one exercise on `topic`.
///
/// The base comes from the session's place in the plan (2 early, 3 in the
/// middle, 4 late). A correct rate below 0.4 lowers it by one, above 0.8
/// raises it by one. Topics with no recorded answers keep the base.
pub fn calculate_difficulty(
    progress: Option<&UserProgress>,
    topic: &TopicId,
    session: SessionProgress,
) -> Difficulty {
    let fraction = session.fraction();
    let base = if fraction < 0.3 {
        Difficulty::clamped(2)
    } else if fraction < 0.7 {
        Difficulty::clamped(3)
    } else {
        Difficulty::clamped(4)
    };

    let rate = progress
        .and_then(|p| p.mastery(topic))
        .and_then(|m| m.correct_rate());

    match rate {
        Some(rate) if rate < 0.4 => base.easier(),
        Some(rate) if rate > 0.8 => base.harder(),
        _ => base,
    }
}
