use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use patmine_model::{ColumnTypeInference, Complexity, RankedPattern};

use crate::types::AnalyzeOutcome;

pub fn print_summary(outcome: &AnalyzeOutcome) {
    print_sources(outcome);
    let result = &outcome.result;
    let metadata = &result.analysis_metadata;
    println!(
        "Records: {} from {} sources, {} candidates, {} ranked, {:.1}% mean confidence, {} ms",
        metadata.total_records,
        metadata.data_source_count,
        metadata.patterns_detected,
        result.patterns.len(),
        metadata.overall_confidence_percent,
        metadata.processing_time_ms,
    );
    if let Some(path) = &outcome.export {
        println!("Export: {}", path.display());
    }
    if result.patterns.is_empty() {
        println!("No pattern passed the confidence and support thresholds.");
    } else {
        print_ranking(&result.patterns);
        print_statistics(outcome);
    }
    if !result.skipped_detectors.is_empty() {
        println!();
        println!("Skipped detectors (insufficient data):");
        for skipped in &result.skipped_detectors {
            println!(
                "- {} ({}): needs {}",
                skipped.title,
                skipped.id,
                skipped.required_fields.join(", ")
            );
        }
    }
}

fn print_sources(outcome: &AnalyzeOutcome) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source"),
        header_cell("Kind"),
        header_cell("Records"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for source in &outcome.sources {
        table.add_row(vec![
            Cell::new(&source.name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(source.kind),
            Cell::new(source.records),
        ]);
    }
    println!("{table}");
}

fn print_ranking(patterns: &[RankedPattern]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Pattern"),
        header_cell("Complexity"),
        header_cell("Support"),
        header_cell("Confidence"),
        header_cell("Lift"),
        header_cell("Impact"),
        header_cell("Score"),
    ]);
    apply_ranking_table_style(&mut table);
    for index in [0, 3, 4, 5, 6, 7] {
        align_column(&mut table, index, CellAlignment::Right);
    }
    align_column(&mut table, 2, CellAlignment::Center);
    for (rank, ranked) in patterns.iter().enumerate() {
        let scores = &ranked.scores;
        table.add_row(vec![
            dim_cell(rank + 1),
            Cell::new(&ranked.pattern.title).add_attribute(Attribute::Bold),
            complexity_cell(ranked.pattern.complexity),
            Cell::new(percent(scores.support)),
            Cell::new(percent(scores.confidence)),
            Cell::new(format!("{:.2}", scores.lift)),
            Cell::new(percent(scores.impact)),
            score_cell(scores.overall_score),
        ]);
    }
    println!();
    println!("{table}");
}

fn print_statistics(outcome: &AnalyzeOutcome) {
    let statistics = &outcome.result.statistics;
    let scoring = &statistics.scoring;
    let averages = &scoring.average_scores;
    let bands = &scoring.score_distribution;
    let complexity = &scoring.complexity_distribution;

    let mut table = Table::new();
    table.set_header(vec![header_cell("Statistic"), header_cell("Value")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    let rows: [(&str, String); 9] = [
        ("Mean overall score", format!("{:.3}", averages.overall)),
        ("Mean support", percent(averages.support)),
        ("Mean confidence", percent(averages.confidence)),
        ("Mean impact", percent(averages.impact)),
        (
            "Score bands (excellent/good/fair/poor)",
            format!(
                "{}/{}/{}/{}",
                bands.excellent, bands.good, bands.fair, bands.poor
            ),
        ),
        (
            "Complexity (low/medium/high/very high)",
            format!(
                "{}/{}/{}/{}",
                complexity.low, complexity.medium, complexity.high, complexity.very_high
            ),
        ),
        ("Valid patterns", statistics.validation.valid_count.to_string()),
        ("Invalid patterns", statistics.validation.invalid_count.to_string()),
        (
            "Skipped detectors",
            outcome.result.skipped_detectors.len().to_string(),
        ),
    ];
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    println!();
    println!("{table}");
}

pub fn print_columns(source: &str, inferences: &[ColumnTypeInference]) {
    println!("Source: {source}");
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Type"),
        header_cell("Confidence"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for inference in inferences {
        let confidence = Cell::new(format!("{:.2}", inference.confidence));
        table.add_row(vec![
            Cell::new(&inference.column),
            Cell::new(inference.inferred_type),
            if inference.confidence > 0.7 {
                confidence
            } else {
                confidence.fg(Color::DarkGrey)
            },
        ]);
    }
    println!("{table}");
}

pub fn print_detectors(catalog: &[(&str, &str, String)]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Detector"),
        header_cell("Title"),
        header_cell("Required fields"),
    ]);
    apply_table_style(&mut table);
    for (id, title, fields) in catalog {
        table.add_row(vec![
            Cell::new(id).fg(Color::Blue),
            Cell::new(title),
            Cell::new(fields),
        ]);
    }
    println!("{table}");
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_ranking_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
    if table.column_count() >= 8 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Fixed(4)),
            ColumnConstraint::UpperBoundary(Width::Percentage(45)),
            ColumnConstraint::LowerBoundary(Width::Fixed(10)),
            ColumnConstraint::LowerBoundary(Width::Fixed(8)),
            ColumnConstraint::LowerBoundary(Width::Fixed(10)),
            ColumnConstraint::LowerBoundary(Width::Fixed(6)),
            ColumnConstraint::LowerBoundary(Width::Fixed(8)),
            ColumnConstraint::LowerBoundary(Width::Fixed(7)),
        ]);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn percent(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

fn score_cell(score: f64) -> Cell {
    let color = if score >= 0.8 {
        Color::Green
    } else if score >= 0.6 {
        Color::Cyan
    } else if score >= 0.4 {
        Color::Yellow
    } else {
        Color::Red
    };
    Cell::new(format!("{score:.3}"))
        .fg(color)
        .add_attribute(Attribute::Bold)
}

fn complexity_cell(complexity: Complexity) -> Cell {
    let cell = Cell::new(complexity.label());
    match complexity {
        Complexity::Low => cell.fg(Color::Green),
        Complexity::Medium => cell,
        Complexity::High => cell.fg(Color::Yellow),
        Complexity::VeryHigh => cell.fg(Color::Red),
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
