//! Property tests for difference detection.

use proptest::prelude::*;

use filemirror::find_differences;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Corrupting one contiguous region yields exactly that region.
    #[test]
    fn property_single_region_is_found_exactly(
        source in proptest::collection::vec(any::<u8>(), 1..512),
        start_frac in 0.0f64..1.0,
        len in 1usize..64,
    ) {
        let start = ((source.len() as f64) * start_frac) as usize;
        let end = (start + len).min(source.len());
        let mut replica = source.clone();
        for b in &mut replica[start..end] {
            *b = !*b;
        }

        prop_assert_eq!(find_differences(&replica, &source), (start..end).collect::<Vec<_>>());
    }

    /// PROPERTY: Every index in the length mismatch is reported, in order.
    #[test]
    fn property_length_mismatch_reports_tail(
        common in proptest::collection::vec(any::<u8>(), 0..128),
        extra in proptest::collection::vec(any::<u8>(), 0..64),
    ) {
        let mut longer = common.clone();
        longer.extend(&extra);

        let expected: Vec<usize> = (common.len()..longer.len()).collect();
        prop_assert_eq!(find_differences(&common, &longer), expected.clone());
        prop_assert_eq!(find_differences(&longer, &common), expected);
    }

    /// PROPERTY: Differences are symmetric and strictly increasing.
    #[test]
    fn property_symmetric_and_sorted(
        a in proptest::collection::vec(any::<u8>(), 0..256),
        b in proptest::collection::vec(any::<u8>(), 0..256),
    ) {
        let ab = find_differences(&a, &b);
        prop_assert_eq!(&ab, &find_differences(&b, &a));
        prop_assert!(ab.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(ab.is_empty(), a == b);
    }
}
