//! Property-based tests for the rolling window.

use meterwatch::window::{advance, WINDOW_CAPACITY};
use proptest::prelude::*;

fn window_strategy() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(any::<u32>(), 0..60)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn length_is_bounded(existing in window_strategy(), reading in any::<u32>()) {
        let expected = (existing.len() + 1).min(WINDOW_CAPACITY);
        let next = advance(existing, reading);
        prop_assert_eq!(next.len(), expected);
    }

    #[test]
    fn newest_reading_is_last(existing in window_strategy(), reading in any::<u32>()) {
        let next = advance(existing, reading);
        prop_assert_eq!(next.last(), Some(&reading));
    }

    #[test]
    fn survivors_are_the_most_recent_in_order(existing in window_strategy(), reading in any::<u32>()) {
        let mut combined = existing.clone();
        combined.push(reading);
        let tail = combined[combined.len().saturating_sub(WINDOW_CAPACITY)..].to_vec();

        prop_assert_eq!(advance(existing, reading), tail);
    }

    #[test]
    fn repeated_advances_never_exceed_capacity(readings in prop::collection::vec(any::<u32>(), 1..100)) {
        let mut window = Vec::new();
        for reading in &readings {
            window = advance(window, *reading);
            prop_assert!(window.len() <= WINDOW_CAPACITY);
        }
        let start = readings.len().saturating_sub(WINDOW_CAPACITY);
        prop_assert_eq!(window, readings[start..].to_vec());
    }
}
