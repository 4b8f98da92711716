use patmine_model::{Complexity, PatternCandidate, PatternOrigin, RuleMetrics};
use patmine_score::{PatternScorer, score_and_rank};
use proptest::prelude::*;

fn arb_complexity() -> impl Strategy<Value = Complexity> {
    proptest::sample::select(Complexity::ALL.to_vec())
}

fn arb_percent() -> impl Strategy<Value = Option<f64>> {
    proptest::option::of(prop_oneof![
        -50.0f64..600.0,
        Just(f64::NAN),
        Just(f64::INFINITY),
        Just(0.0),
        Just(100.0),
    ])
}

fn arb_rule_metrics() -> impl Strategy<Value = Option<RuleMetrics>> {
    proptest::option::of(
        (0.0f64..=1.0, 0.0f64..=1.0, 0.0f64..50.0, proptest::option::of(0.0f64..100.0)).prop_map(
            |(support, confidence, lift, conviction)| RuleMetrics {
                support,
                confidence,
                lift,
                conviction,
            },
        ),
    )
}

prop_compose! {
    fn arb_candidate()(
        id in "[a-z]{1,8}",
        impact in arb_percent(),
        confidence in arb_percent(),
        complexity in arb_complexity(),
        variable_count in 0usize..15,
        rule_metrics in arb_rule_metrics(),
    ) -> PatternCandidate {
        let mut candidate = PatternCandidate::new(id, "title", "description", PatternOrigin::Domain)
            .with_complexity(complexity)
            .with_variables((0..variable_count).map(|i| format!("field_{i}")));
        candidate.impact = impact;
        candidate.confidence = confidence;
        candidate.rule_metrics = rule_metrics;
        candidate
    }
}

proptest! {
    #[test]
    fn every_component_and_overall_lies_in_unit_interval(candidate in arb_candidate()) {
        let score = PatternScorer::new().score(&candidate);
        for component in score.components().as_array() {
            prop_assert!((0.0..=1.0).contains(&component), "component {component}");
        }
        prop_assert!((0.0..=1.0).contains(&score.overall_score));
        prop_assert!(score.lift.is_finite() && score.lift >= 0.0);
        prop_assert!(score.conviction.is_finite() && score.conviction >= 0.0);
    }

    #[test]
    fn ranking_respects_thresholds_and_bound(
        candidates in proptest::collection::vec(arb_candidate(), 0..20),
        max_results in 0usize..10,
        min_confidence in 0.0f64..1.0,
        min_support in 0.0f64..0.5,
    ) {
        let ranked = score_and_rank(&candidates, max_results, min_confidence, min_support);
        prop_assert!(ranked.len() <= max_results);
        for pattern in &ranked {
            prop_assert!(pattern.scores.confidence >= min_confidence);
            prop_assert!(pattern.scores.support >= min_support);
            prop_assert_eq!(&pattern.scores.pattern_id, &pattern.pattern.id);
        }
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].overall_score() >= pair[1].overall_score());
        }
    }
}
