// Property-based tests for schedule expression validation

use common::schedule::{normalize_expression, upcoming, validate_expression};
use proptest::prelude::*;

/// Generate a syntactically valid five-field cron expression from numeric
/// field values.
fn five_field_expression() -> impl Strategy<Value = String> {
    (0u8..60, 0u8..24, 1u8..29, 1u8..13, 0u8..7).prop_map(|(m, h, dom, mon, dow)| {
        format!("{} {} {} {} {}", m, h, dom, mon, dow)
    })
}

proptest! {
    /// *For any* five-field expression built from in-range numeric fields,
    /// validation accepts it.
    #[test]
    fn property_valid_five_field_expressions_are_accepted(expr in five_field_expression()) {
        prop_assert!(validate_expression(&expr).is_ok(), "rejected: {}", expr);
    }

    /// *For any* in-range numeric fields, normalization prefixes exactly one
    /// seconds field and never alters the minute through month fields.
    #[test]
    fn property_normalization_only_prepends_seconds(expr in five_field_expression()) {
        let normalized = normalize_expression(&expr).unwrap();
        let fields: Vec<&str> = normalized.split_whitespace().collect();
        let original: Vec<&str> = expr.split_whitespace().collect();

        prop_assert_eq!(fields.len(), 6);
        prop_assert_eq!(fields[0], "0");
        prop_assert_eq!(&fields[1..5], &original[..4]);
    }

    /// *For any* valid expression, the upcoming occurrences are strictly
    /// increasing.
    #[test]
    fn property_upcoming_occurrences_are_ordered(expr in five_field_expression()) {
        let times = upcoming(&expr, 4).unwrap();
        for pair in times.windows(2) {
            prop_assert!(pair[0] < pair[1]);
        }
    }

    /// *For any* expression with too few or too many fields, validation
    /// rejects it before the parser ever sees it.
    #[test]
    fn property_wrong_field_counts_are_rejected(
        count in prop::sample::select(vec![1usize, 2, 3, 4, 8, 9]),
    ) {
        let expr = vec!["*"; count].join(" ");
        prop_assert!(validate_expression(&expr).is_err(), "accepted: {}", expr);
    }
}
