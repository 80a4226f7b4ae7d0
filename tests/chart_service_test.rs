//! Tests for the chart build pipeline

use std::collections::BTreeMap;
use std::sync::Arc;

use orgchart::application::services::ChartService;
use orgchart::application::ApplicationError;
use orgchart::config::Settings;
use orgchart::domain::{
    count_nodes, IssueKind, OrphanPolicy, RoleRecord, ScenarioKind, ScenarioPolicy,
};
use orgchart::util::testing;

fn service(settings: Settings) -> ChartService {
    testing::init_test_setup();
    ChartService::new(Arc::new(settings))
}

fn roles() -> Vec<RoleRecord> {
    vec![
        RoleRecord::new("A", "CEO", 1.0, None),
        RoleRecord::new("B", "Manager", 1.0, Some("A")),
        RoleRecord::new("C", "Analyst", 1.0, Some("B")),
    ]
}

#[test]
fn given_valid_roles_when_building_chart_then_tree_costed_and_scenarios_set() {
    // Arrange
    let chart = service(Settings::default());

    // Act
    let result = chart.build_chart(&roles(), None).unwrap();

    // Assert
    assert_eq!(result.tree.len(), 1);
    assert_eq!(result.tree[0].annual_cost, Some(300_000));
    assert!(result.issues.is_empty());
    assert_eq!(result.scenarios.baseline.total_cost, 460_000);
    assert_eq!(result.scenarios.moderate.total_cost, 300_000);
    assert_eq!(result.scenarios.aggressive.total_cost, 300_000);
}

#[test]
fn given_oversized_fte_when_building_chart_then_costs_saturate_and_issue_reported() {
    // Arrange
    let chart = service(Settings::default());
    let input = vec![
        RoleRecord::new("A", "CEO", 1e14, None),
        RoleRecord::new("B", "CEO", 1e14, None),
    ];

    // Act
    let result = chart.build_chart(&input, None).unwrap();

    // Assert
    assert_eq!(result.tree[0].annual_cost, Some(i64::MAX));
    assert_eq!(result.scenarios.baseline.total_cost, i64::MAX);
    assert!(result.issues.iter().all(|i| i.kind == IssueKind::InvalidFte));
    assert_eq!(result.issues.len(), 2);
    for variant in [&result.scenarios.moderate, &result.scenarios.aggressive] {
        assert!(variant.savings_vs_baseline.unwrap() >= 0);
        assert!(variant.savings_percentage.unwrap().is_finite());
    }
}

#[test]
fn given_huge_custom_rate_when_building_chart_then_total_saturates() {
    // Arrange
    let chart = service(Settings::default());
    let input = vec![
        RoleRecord::new("A", "CEO", 1.0, None),
        RoleRecord::new("B", "CEO", 1.0, None),
    ];
    let custom = BTreeMap::from([("CEO".to_string(), 1e19)]);

    // Act
    let result = chart.build_chart(&input, Some(&custom)).unwrap();

    // Assert
    assert!(result.issues.is_empty());
    assert_eq!(result.scenarios.baseline.total_cost, i64::MAX);
    let moderate = &result.scenarios.moderate;
    assert_eq!(
        moderate.savings_vs_baseline,
        Some(i64::MAX - moderate.total_cost)
    );
}

#[test]
fn given_structural_issues_when_building_chart_then_reported_but_build_succeeds() {
    // Arrange
    let chart = service(Settings::default());
    let mut input = roles();
    input.push(RoleRecord::new("C", "Analyst", 5.0, Some("B")));

    // Act
    let result = chart.build_chart(&input, None).unwrap();

    // Assert
    let kinds: Vec<_> = result.issues.iter().map(|i| i.kind).collect();
    assert_eq!(kinds, vec![IssueKind::DuplicateId, IssueKind::InvalidFte]);
    assert_eq!(count_nodes(&result.tree), 4);
}

#[test]
fn given_malformed_role_when_building_chart_then_build_error_wraps_cause() {
    // Arrange
    let chart = service(Settings::default());
    let input = vec![RoleRecord::new("", "CEO", 1.0, None)];

    // Act
    let err = chart.build_chart(&input, None).unwrap_err();

    // Assert
    assert!(matches!(err, ApplicationError::Build(_)));
    assert!(err.to_string().starts_with("failed to build org chart: "));
}

#[test]
fn given_custom_rates_when_building_chart_then_override_configured_rates() {
    // Arrange
    let settings = Settings {
        rates: BTreeMap::from([("Manager".to_string(), 90_000.0)]),
        ..Settings::default()
    };
    let chart = service(settings);
    let custom = BTreeMap::from([("Analyst".to_string(), 70_000.0)]);

    // Act
    let result = chart.build_chart(&roles(), Some(&custom)).unwrap();

    // Assert
    assert_eq!(result.tree[0].children[0].annual_cost, Some(90_000));
    assert_eq!(result.tree[0].children[0].children[0].annual_cost, Some(70_000));
    assert_eq!(result.scenarios.baseline.total_cost, 460_000);
}

#[test]
fn given_reattach_policy_when_building_chart_then_moderate_keeps_analyst() {
    // Arrange
    let chart = service(Settings {
        scenarios: ScenarioPolicy {
            orphans: OrphanPolicy::Reattach,
            ..ScenarioPolicy::default()
        },
        ..Settings::default()
    });

    // Act
    let result = chart.build_chart(&roles(), None).unwrap();
    let moderate = chart.scenario_tree(&result, ScenarioKind::Moderate);

    // Assert
    assert_eq!(result.scenarios.moderate.total_cost, 65_000);
    assert_eq!(moderate.len(), 1);
    assert_eq!(moderate[0].id, "C");
}

#[test]
fn given_result_when_serializing_then_round_trips() {
    let chart = service(Settings::default());
    let result = chart.build_chart(&roles(), None).unwrap();

    let json = serde_json::to_string(&result).unwrap();
    let parsed: orgchart::application::services::ChartBuildResult =
        serde_json::from_str(&json).unwrap();

    assert_eq!(parsed, result);
}
