use crate::contract::model::RatingSummary;

pub const MIN_STARS: i64 = 1;
pub const MAX_STARS: i64 = 5;

pub fn stars_in_range(stars: i64) -> bool {
    (MIN_STARS..=MAX_STARS).contains(&stars)
}

/// Mean of `stars` rounded to one decimal place; 0 for an empty slice.
pub fn summarize(stars: &[i32]) -> RatingSummary {
    if stars.is_empty() {
        return RatingSummary {
            average_rating: 0.0,
            total_reviews: 0,
        };
    }
    let total: i64 = stars.iter().map(|s| i64::from(*s)).sum();
    let mean = total as f64 / stars.len() as f64;
    RatingSummary {
        average_rating: (mean * 10.0).round() / 10.0,
        total_reviews: stars.len() as u64,
    }
}
