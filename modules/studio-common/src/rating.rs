//! Star ratings for testimonials and downloadable resources.

use serde::{Deserialize, Serialize};

use crate::error::{StudioError, StudioResult};

pub const MAX_STARS: u8 = 5;

/// A rating of one to five stars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct StarRating(u8);

impl StarRating {
    pub fn new(value: i64) -> StudioResult<Self> {
        if (1..=MAX_STARS as i64).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(StudioError::Validation(format!(
                "rating must be between 1 and {MAX_STARS}, got {value}"
            )))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// Filled then hollow stars, always five characters.
    pub fn stars(&self) -> String {
        let filled = self.0 as usize;
        "★".repeat(filled) + &"☆".repeat(MAX_STARS as usize - filled)
    }
}

impl Default for StarRating {
    fn default() -> Self {
        Self(MAX_STARS)
    }
}

impl TryFrom<i64> for StarRating {
    type Error = StudioError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        StarRating::new(value)
    }
}

impl From<StarRating> for i64 {
    fn from(rating: StarRating) -> Self {
        rating.0 as i64
    }
}

/// Running total of the ratings an item has received.
///
/// The average is derived from the stored sum so repeated updates never drift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingSummary {
    pub total: i64,
    pub count: i64,
}

impl RatingSummary {
    pub fn with(self, rating: StarRating) -> Self {
        Self {
            total: self.total + rating.value() as i64,
            count: self.count + 1,
        }
    }

    /// Replace one earlier rating with another without changing the count.
    pub fn replace(self, old: StarRating, new: StarRating) -> Self {
        Self {
            total: self.total - old.value() as i64 + new.value() as i64,
            count: self.count,
        }
    }

    /// Mean rating to two decimals, 0.0 when nothing has been rated.
    pub fn average(&self) -> f64 {
        if self.count <= 0 {
            return 0.0;
        }
        let mean = self.total as f64 / self.count as f64;
        (mean * 100.0).round() / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stars(n: i64) -> StarRating {
        StarRating::new(n).unwrap()
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(StarRating::new(0).is_err());
        assert!(StarRating::new(6).is_err());
        assert_eq!(stars(3).value(), 3);
        assert!(serde_json::from_str::<StarRating>("9").is_err());
    }

    #[test]
    fn renders_five_characters() {
        assert_eq!(stars(4).stars(), "★★★★☆");
        assert_eq!(stars(1).stars().chars().count(), 5);
        assert_eq!(StarRating::default().stars(), "★★★★★");
    }

    #[test]
    fn first_rating_counts_once() {
        let summary = RatingSummary::default().with(stars(4));
        assert_eq!(summary, RatingSummary { total: 4, count: 1 });
        assert_eq!(summary.average(), 4.0);
    }

    #[test]
    fn average_is_the_mean_of_all_ratings() {
        let summary = [5, 4, 4].into_iter().fold(RatingSummary::default(), |s, n| s.with(stars(n)));
        assert_eq!(summary.count, 3);
        assert_eq!(summary.average(), 4.33);

        let changed = summary.replace(stars(5), stars(2));
        assert_eq!(changed.count, 3);
        assert_eq!(changed.average(), 3.33);
    }

    #[test]
    fn empty_summary_averages_zero() {
        assert_eq!(RatingSummary::default().average(), 0.0);
    }
}
