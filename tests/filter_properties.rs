// tests/filter_properties.rs

use proptest::prelude::*;
use procrun::capture::{LineFilter, decode_line};
use procrun::DEFAULT_ENCODING;

fn pattern_strategy() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(
        prop_oneof![
            Just("a".to_string()),
            Just(".*b".to_string()),
            Just("[0-9]+".to_string()),
            Just("\\s".to_string()),
            "[a-z]{1,3}",
        ],
        0..4,
    )
}

proptest! {
    #[test]
    fn filtering_twice_equals_filtering_once(
        line in "[ -~]{0,24}",
        patterns in pattern_strategy(),
    ) {
        let filter = LineFilter::new(&patterns).unwrap();
        let once = filter.keep(&line);
        let twice = once.and_then(|l| filter.keep(l));
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn decoding_without_filters_only_trims(text in "\\PC{0,32}[ \t\r\n]{0,3}") {
        let decoded = decode_line(text.as_bytes(), DEFAULT_ENCODING, &LineFilter::none());
        prop_assert_eq!(decoded.as_deref(), Some(text.trim_end()));
    }

    #[test]
    fn kept_lines_match_no_pattern_at_start(
        line in "[ -~]{0,24}",
        patterns in pattern_strategy(),
    ) {
        let filter = LineFilter::new(&patterns).unwrap();
        if filter.keep(&line).is_some() {
            for pat in &patterns {
                let anchored = regex::Regex::new(&format!("^(?:{pat})")).unwrap();
                prop_assert!(!anchored.is_match(&line));
            }
        }
    }
}
