use crate::models::Difficulty;

const LIKE_WEIGHT: f64 = 0.5;
const COMMENT_WEIGHT: f64 = 0.3;
const VIEW_WEIGHT: f64 = 0.2;

const INTERMEDIATE_VIEW_THRESHOLD: u64 = 50_000;

/// Weighted engagement used for ordering results. Not clamped; raw view counts
/// dominate in practice.
pub fn calculate_score(views: u64, likes: u64, comments: u64) -> f64 {
    (likes as f64 * LIKE_WEIGHT + comments as f64 * COMMENT_WEIGHT + views as f64 * VIEW_WEIGHT)
        / 1000.0
}

/// Coarse difficulty from the title, falling back to popularity.
/// Title markers for advanced content take precedence over view count.
pub fn estimate_difficulty(title: &str, views: u64) -> Difficulty {
    let title = title.to_lowercase();

    if ["advanced", "deep dive", "expert"]
        .iter()
        .any(|marker| title.contains(marker))
    {
        Difficulty::Advanced
    } else if title.contains("intermediate") || views > INTERMEDIATE_VIEW_THRESHOLD {
        Difficulty::Intermediate
    } else {
        Difficulty::Beginner
    }
}
