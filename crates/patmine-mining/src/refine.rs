//! Business framing of mined association rules.

use patmine_model::{
    AssociationRule, Complexity, PatternCandidate, PatternOrigin, StableId, token_field,
};

/// Impact percent never exceeds this for mined rules.
const MAX_RULE_IMPACT: f64 = 95.0;

/// Business category of a rule, chosen from keywords in its tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleCategory {
    Paradox,
    TimingTrap,
    Amplification,
    Hierarchy,
    Optimization,
}

const CATEGORY_KEYWORDS: [(RuleCategory, &[&str]); 4] = [
    (RuleCategory::Paradox, &["certification", "team", "experience"]),
    (
        RuleCategory::TimingTrap,
        &["date", "month", "quarter", "time", "year", "day"],
    ),
    (RuleCategory::Amplification, &["industry", "sector", "domain"]),
    (RuleCategory::Hierarchy, &["channel", "source", "method"]),
];

impl RuleCategory {
    pub fn classify(rule: &AssociationRule) -> Self {
        let text = rule.tokens().collect::<Vec<_>>().join(" ").to_lowercase();
        CATEGORY_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|keyword| text.contains(keyword)))
            .map_or(Self::Optimization, |(category, _)| *category)
    }

    pub fn complexity(self) -> Complexity {
        match self {
            Self::Paradox | Self::Amplification => Complexity::VeryHigh,
            Self::TimingTrap | Self::Hierarchy => Complexity::High,
            Self::Optimization => Complexity::Medium,
        }
    }

    fn title(self, variable: &str) -> String {
        match self {
            Self::Paradox => format!("The {variable} Paradox"),
            Self::TimingTrap => format!("The {variable} Trap"),
            Self::Amplification => format!("The {variable} Amplification Effect"),
            Self::Hierarchy => format!("The {variable} Hierarchy"),
            Self::Optimization => format!("The {variable} Optimization Opportunity"),
        }
    }

    fn description(self, variables: &[String], lift: f64, confidence: f64) -> String {
        let lift_pct = lift * 100.0;
        let confidence_pct = confidence * 100.0;
        let first = variables.first().map_or("performance", String::as_str);
        let second = variables.get(1).map_or("outcomes", String::as_str);
        match self {
            Self::Paradox => format!(
                "Records with mixed {first} levels show {lift_pct:.1}% of the expected co-occurrence \
                 with {second}, a counterintuitive link between composition and results."
            ),
            Self::TimingTrap => format!(
                "Activity timed by {first} co-occurs with {second} at {lift_pct:.1}% of the \
                 independent rate ({confidence_pct:.1}% confidence); gains in one period may \
                 cost efficiency in another."
            ),
            Self::Amplification => format!(
                "When {first} is aligned with {second}, the joint outcome appears {lift:.2}x as \
                 often as independence predicts."
            ),
            Self::Hierarchy => format!(
                "Different {first} values behave predictably once combined with {second} \
                 (lift {lift:.2}, {confidence_pct:.1}% confidence)."
            ),
            Self::Optimization => format!(
                "Analysis reveals {lift_pct:.1}% improvement potential through {first} \
                 strategies, with {confidence_pct:.1}% statistical confidence."
            ),
        }
    }
}

/// `deal_value` -> `Deal Value`.
pub fn title_case(field: &str) -> String {
    field
        .split(['_', ' ', '-'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Distinct field names of the rule's tokens, antecedent first.
pub fn rule_variables(rule: &AssociationRule) -> Vec<String> {
    let mut variables: Vec<String> = Vec::new();
    for token in rule.tokens() {
        let field = token_field(token);
        if !variables.iter().any(|known| known == field) {
            variables.push(field.to_string());
        }
    }
    variables
}

/// Deterministic `rule-<hex>` id from the rule's sides.
pub fn rule_id(rule: &AssociationRule) -> String {
    let parts = rule
        .antecedent
        .iter()
        .map(String::as_str)
        .chain(std::iter::once("=>"))
        .chain(rule.consequent.iter().map(String::as_str));
    StableId::from_parts(parts).with_prefix("rule")
}

/// Frame `rule` as a pattern candidate that keeps its raw metrics.
pub fn rule_to_candidate(rule: &AssociationRule) -> PatternCandidate {
    let category = RuleCategory::classify(rule);
    let variables = rule_variables(rule);
    let lead = variables
        .first()
        .map_or_else(|| "Pattern".to_string(), |field| title_case(field));
    let lift = rule.lift();
    let confidence = rule.confidence();
    let lift_pct = lift * 100.0;
    let confidence_pct = confidence * 100.0;

    PatternCandidate::new(
        rule_id(rule),
        category.title(&lead),
        category.description(&variables, lift, confidence),
        PatternOrigin::Association,
    )
    .with_impact((lift * 50.0).min(MAX_RULE_IMPACT))
    .with_confidence(confidence_pct)
    .with_complexity(category.complexity())
    .with_business_value([
        format!("{lift_pct:.1}% improvement in key metrics"),
        format!("{confidence_pct:.1}% confidence in predictions"),
        "Optimized resource allocation potential".to_string(),
        "Risk reduction through pattern awareness".to_string(),
    ])
    .with_implementation_steps([
        "Phase 1: Validate pattern with historical data",
        "Phase 2: Implement monitoring and tracking",
        "Phase 3: Develop optimization strategies",
        "Phase 4: Scale successful approaches",
    ])
    .with_metrics([
        format!("{lead} effectiveness tracking"),
        "Performance correlation analysis".to_string(),
        "Impact measurement and validation".to_string(),
        "Success rate monitoring".to_string(),
    ])
    .with_variables(variables)
    .with_rule_metrics(rule.metrics)
}
