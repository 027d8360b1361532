//! Jitter for retry delays, so repeated fetches against the same host do not
//! line up exactly.

use std::time::Duration;

/// Random jitter between 0 and `max_jitter_ms` (inclusive)
pub fn generate_jitter_ms(max_jitter_ms: u64) -> u64 {
    if max_jitter_ms == 0 {
        return 0;
    }
    fastrand::u64(0..=max_jitter_ms)
}

/// Random jitter up to `jitter_percent` of `base_value`
///
/// ```
/// use m3u_curator::utils::jitter::generate_jitter_percent;
///
/// let jitter = generate_jitter_percent(1000, 25);
/// assert!(jitter <= 250);
/// ```
pub fn generate_jitter_percent(base_value: u64, jitter_percent: u8) -> u64 {
    if jitter_percent == 0 || base_value == 0 {
        return 0;
    }
    let max_jitter = (base_value * jitter_percent as u64) / 100;
    generate_jitter_ms(max_jitter)
}

/// `base` plus up to 25% jitter
pub fn with_jitter(base: Duration) -> Duration {
    let base_ms = base.as_millis().min(u64::MAX as u128) as u64;
    base + Duration::from_millis(generate_jitter_percent(base_ms, 25))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_jitter_ms() {
        assert_eq!(generate_jitter_ms(0), 0);
        for _ in 0..100 {
            assert!(generate_jitter_ms(50) <= 50);
        }
    }

    #[test]
    fn test_generate_jitter_percent() {
        assert_eq!(generate_jitter_percent(1000, 0), 0);
        assert_eq!(generate_jitter_percent(0, 25), 0);
        for _ in 0..100 {
            assert!(generate_jitter_percent(1000, 10) <= 100);
        }
    }

    #[test]
    fn test_with_jitter_bounds() {
        let base = Duration::from_millis(400);
        for _ in 0..50 {
            let d = with_jitter(base);
            assert!(d >= base && d <= Duration::from_millis(500));
        }
        assert_eq!(with_jitter(Duration::ZERO), Duration::ZERO);
    }
}
