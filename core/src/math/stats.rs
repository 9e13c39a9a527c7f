pub struct StatsHelper;

impl StatsHelper {
    /// Smallest and largest sample, `None` for an empty slice.
    pub fn min_max(samples: &[i32]) -> Option<(i32, i32)> {
        let first = *samples.first()?;
        Some(
            samples
                .iter()
                .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
        )
    }

    /// Integer mean truncated towards zero. Sums in i64 so long windows of
    /// 16-bit samples cannot overflow.
    pub fn truncated_mean(samples: &[i32]) -> Option<i32> {
        if samples.is_empty() {
            return None;
        }
        let sum: i64 = samples.iter().map(|&v| v as i64).sum();
        Some((sum / samples.len() as i64) as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_max_of_empty_sequence_is_none() {
        assert_eq!(StatsHelper::min_max(&[]), None);
    }

    #[test]
    fn min_max_handles_single_value() {
        assert_eq!(StatsHelper::min_max(&[4]), Some((4, 4)));
        assert_eq!(StatsHelper::min_max(&[3, -7, 12, 0]), Some((-7, 12)));
    }

    #[test]
    fn truncated_mean_rounds_towards_zero() {
        assert_eq!(StatsHelper::truncated_mean(&[1, 2]), Some(1));
        assert_eq!(StatsHelper::truncated_mean(&[-1, -2]), Some(-1));
        assert_eq!(StatsHelper::truncated_mean(&[]), None);
    }
}
