//! Product average rating, the one derived field in the catalog.
//!
//! `product.avg_rating` is the mean of the product's review ratings rounded
//! half away from zero to two decimals, or `0` when the product has no
//! reviews. PostgreSQL computes it with [`RECOMPUTE_AVG_RATING_SQL`]; the
//! in-memory store uses [`average_rating`], which yields the same value.

/// Lowest accepted review rating.
pub const MIN_RATING: i16 = 1;

/// Highest accepted review rating.
pub const MAX_RATING: i16 = 5;

/// Recompute and store the average for product `$1`, returning its id.
///
/// Must run inside the transaction that changed the product's reviews, after
/// the product row has been locked.
pub const RECOMPUTE_AVG_RATING_SQL: &str = r#"
    UPDATE product
    SET avg_rating = COALESCE(
        (SELECT ROUND(AVG(rating)::numeric, 2) FROM review WHERE prod_id = $1),
        0
    )
    WHERE pid = $1
    RETURNING pid AS id
"#;

/// Mean of `ratings` rounded half away from zero to two decimals; `0.0` when empty.
///
/// Works in integer hundredths so the result matches PostgreSQL's
/// `ROUND(AVG(..)::numeric, 2)` exactly, then converts once.
pub fn average_rating(ratings: impl IntoIterator<Item = i16>) -> f64 {
    let (sum, count) = ratings
        .into_iter()
        .fold((0_i64, 0_i64), |(sum, count), r| (sum + i64::from(r), count + 1));

    if count == 0 {
        return 0.0;
    }

    // round(100 * sum / count), ratings are positive so flooring after +0.5 is half-up
    let hundredths = (200 * sum + count) / (2 * count);
    hundredths as f64 / 100.0
}

/// Round an arbitrary value to the two-decimal grid `avg_rating` is stored on.
pub fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_of_nothing_is_zero() {
        assert_eq!(average_rating(Vec::<i16>::new()), 0.0);
    }

    #[test]
    fn test_single_review_average_is_its_rating() {
        for rating in MIN_RATING..=MAX_RATING {
            assert_eq!(average_rating([rating]), f64::from(rating));
        }
    }

    #[test]
    fn test_average_examples() {
        assert_eq!(average_rating([4, 2]), 3.0);
        assert_eq!(average_rating([4]), 4.0);
        assert_eq!(average_rating([1, 2, 2]), 1.67);
        assert_eq!(average_rating([5, 4, 4]), 4.33);
    }

    #[test]
    fn test_average_rounds_half_away_from_zero() {
        // 9 / 8 = 1.125
        assert_eq!(average_rating([1, 1, 1, 1, 1, 1, 1, 2]), 1.13);
        // 19 / 8 = 2.375
        assert_eq!(average_rating([2, 2, 2, 2, 2, 2, 2, 5]), 2.38);
    }

    #[test]
    fn test_average_stays_within_rating_bounds() {
        let ratings: Vec<i16> = (0..1000).map(|i| (i % 5 + 1) as i16).collect();
        let avg = average_rating(ratings);
        assert!((1.0..=5.0).contains(&avg));
        assert_eq!(avg, 3.0);
    }

    #[test]
    fn test_round_to_hundredths() {
        assert_eq!(round_to_hundredths(3.666), 3.67);
        assert_eq!(round_to_hundredths(4.0), 4.0);
        assert_eq!(round_to_hundredths(1.674), 1.67);
    }
}
