use patmine_core::{Stage, StageEvent, analyze, analyze_with_progress};
use patmine_model::{AnalysisConfig, AnalysisError, DataSource, Record, SourceKind, Value};
use proptest::prelude::*;

fn crm_source() -> DataSource {
    let rows = [
        ("energy", "won", 100_000.0, "2024-01-20", 5.0),
        ("energy", "won", 120_000.0, "2024-02-18", 6.0),
        ("energy", "won", 110_000.0, "2024-03-22", 5.0),
        ("health", "lost", 40_000.0, "2024-04-03", 3.0),
        ("health", "lost", 45_000.0, "2024-05-06", 3.0),
        ("energy", "won", 130_000.0, "2024-06-25", 6.0),
        ("health", "won", 60_000.0, "2024-07-04", 4.0),
        ("energy", "won", 125_000.0, "2024-08-19", 5.0),
        ("health", "lost", 42_000.0, "2024-09-02", 3.0),
        ("energy", "won", 140_000.0, "2024-10-21", 6.0),
    ];
    let records = rows
        .into_iter()
        .map(|(sector, status, value, date, team)| {
            [
                ("sector", Value::from(sector)),
                ("status", Value::from(status)),
                ("deal_value", Value::from(value)),
                ("submission_date", Value::from(date)),
                ("team_size", Value::from(team)),
            ]
            .into_iter()
            .collect::<Record>()
        })
        .collect();
    DataSource::new("crm", SourceKind::Crm, records)
}

fn erp_source() -> DataSource {
    let records = (0..2)
        .map(|i| {
            [
                ("project_type", Value::from("migration")),
                ("budget", Value::from(50_000.0 + f64::from(i))),
            ]
            .into_iter()
            .collect::<Record>()
        })
        .collect();
    DataSource::new("erp", SourceKind::Erp, records)
}

#[test]
fn merged_totals_cover_every_source() {
    let sources = vec![crm_source(), erp_source()];
    let result = analyze(&sources, &AnalysisConfig::default()).expect("analysis succeeds");
    assert_eq!(result.analysis_metadata.total_records, 12);
    assert_eq!(result.analysis_metadata.data_source_count, 2);
    assert!(result.patterns.len() <= 8);
    assert_eq!(
        result.statistics.validation.valid_count + result.statistics.validation.invalid_count,
        result.patterns.len()
    );
    assert_eq!(result.statistics.scoring.total_patterns, result.patterns.len());
}

#[test]
fn ranked_patterns_honour_thresholds() {
    let config = AnalysisConfig::default()
        .with_max_patterns(3)
        .with_min_confidence(0.7)
        .with_min_support(0.2);
    let result = analyze(&[crm_source()], &config).expect("analysis succeeds");
    assert!(!result.patterns.is_empty());
    assert!(result.patterns.len() <= 3);
    for pattern in &result.patterns {
        assert!(pattern.scores.confidence >= 0.7);
        assert!(pattern.scores.support >= 0.2);
        assert!((0.0..=1.0).contains(&pattern.scores.overall_score));
    }
    for pair in result.patterns.windows(2) {
        assert!(pair[0].overall_score() >= pair[1].overall_score());
    }
    let confidence = result.analysis_metadata.overall_confidence_percent;
    assert!((70.0..=100.0).contains(&confidence));
}

#[test]
fn missing_detector_fields_never_reach_the_ranking() {
    let result = analyze(&[crm_source()], &AnalysisConfig::default()).expect("analysis succeeds");
    let skipped: Vec<&str> = result
        .skipped_detectors
        .iter()
        .map(|d| d.id.as_str())
        .collect();
    assert!(skipped.contains(&"certification_density"));
    assert!(skipped.contains(&"geographic_inefficiency"));
    assert!(!result.pattern_ids().contains(&"certification_density"));
}

#[test]
fn reruns_are_identical() {
    let sources = vec![crm_source(), erp_source()];
    let config = AnalysisConfig::default().with_min_confidence(0.3).with_min_support(0.05);
    let first = analyze(&sources, &config).expect("first run");
    let second = analyze(&sources, &config).expect("second run");
    assert_eq!(first.patterns, second.patterns);
    assert_eq!(first.statistics, second.statistics);
    assert_eq!(first.skipped_detectors, second.skipped_detectors);
}

#[test]
fn every_stage_is_reported_in_order() {
    let mut events: Vec<StageEvent> = Vec::new();
    analyze_with_progress(&[crm_source()], &AnalysisConfig::default(), |event| {
        events.push(event);
    })
    .expect("analysis succeeds");
    let stages: Vec<Stage> = events.iter().map(|e| e.stage).collect();
    assert_eq!(stages, Stage::ALL.to_vec());
    assert!(events.iter().all(|e| e.total == 8));
    assert_eq!(events.last().map(|e| e.completed), Some(8));
}

#[test]
fn empty_source_list_is_rejected() {
    assert_eq!(
        analyze(&[], &AnalysisConfig::default()),
        Err(AnalysisError::EmptySources)
    );
}

#[test]
fn every_source_violation_is_listed() {
    let sources = vec![
        DataSource::new("", SourceKind::Crm, vec![Record::new()]),
        DataSource::new("erp", SourceKind::Erp, Vec::new()),
    ];
    let mut events = 0;
    let error = analyze_with_progress(&sources, &AnalysisConfig::default(), |_| events += 1)
        .expect_err("invalid sources");
    assert_eq!(events, 0);
    let violations = error.violations();
    assert_eq!(violations.len(), 2);
    assert!(error.to_string().contains("no records"));
}

#[test]
fn skipped_detectors_serialize_their_needs() {
    let result = analyze(&[crm_source()], &AnalysisConfig::default()).expect("analysis succeeds");
    let geographic = result
        .skipped_detectors
        .iter()
        .find(|d| d.id == "geographic_inefficiency")
        .expect("extension point is skipped");
    insta::assert_json_snapshot!(geographic, @r#"
    {
      "id": "geographic_inefficiency",
      "title": "The Geographic Inefficiency Pattern",
      "requiredFields": [
        "region",
        "travel_cost",
        "profit_margin"
      ]
    }
    "#);
}

#[test]
fn result_serializes_with_camel_case_sections() {
    let result = analyze(&[crm_source()], &AnalysisConfig::default()).expect("analysis succeeds");
    let json = serde_json::to_value(&result).expect("serialize result");
    for key in ["patterns", "analysisMetadata", "statistics", "skippedDetectors"] {
        assert!(json.get(key).is_some(), "missing {key}");
    }
    let metadata = &json["analysisMetadata"];
    assert_eq!(metadata["totalRecords"], 10);
    assert_eq!(metadata["dataSourceCount"], 1);
    assert!(metadata["processingTimeMs"].is_u64());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn any_thresholds_bound_the_ranking(
        max_patterns in 0usize..10,
        min_confidence in 0.0f64..=1.0,
        min_support in 0.0f64..=1.0,
    ) {
        let config = AnalysisConfig::default()
            .with_max_patterns(max_patterns)
            .with_min_confidence(min_confidence)
            .with_min_support(min_support);
        let result = analyze(&[crm_source()], &config).expect("analysis succeeds");
        prop_assert!(result.patterns.len() <= max_patterns);
        for pattern in &result.patterns {
            prop_assert!(pattern.scores.confidence >= min_confidence);
            prop_assert!(pattern.scores.support >= min_support);
        }
    }
}
