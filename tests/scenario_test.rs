//! Tests for scenario generation and pruning

use proptest::prelude::*;
use rstest::{fixture, rstest};

use orgchart::domain::{
    build_org_tree, build_scenarios, count_nodes, estimate_cost, prune_tree, summarize_tree, walk,
    OrgNode, OrphanPolicy, RateTable, RoleRecord, ScenarioKind, ScenarioPolicy,
};

fn costed(roles: &[RoleRecord]) -> Vec<OrgNode> {
    estimate_cost(build_org_tree(roles).unwrap(), &RateTable::default())
}

fn reattach() -> ScenarioPolicy {
    ScenarioPolicy {
        orphans: OrphanPolicy::Reattach,
        ..ScenarioPolicy::default()
    }
}

/// CEO -> Manager -> Analyst
#[fixture]
fn three_level() -> Vec<OrgNode> {
    costed(&[
        RoleRecord::new("A", "CEO", 1.0, None),
        RoleRecord::new("B", "Manager", 1.0, Some("A")),
        RoleRecord::new("C", "Analyst", 1.0, Some("B")),
    ])
}

/// CEO -> Manager -> 10 Analysts
fn wide_team() -> Vec<OrgNode> {
    let mut roles = vec![
        RoleRecord::new("ceo", "CEO", 1.0, None),
        RoleRecord::new("mgr", "Manager", 1.0, Some("ceo")),
    ];
    roles.extend((0..10).map(|i| RoleRecord::new(format!("a{i}"), "Analyst", 1.0, Some("mgr"))));
    costed(&roles)
}

#[rstest]
fn given_three_levels_when_building_baseline_then_sums_everything(three_level: Vec<OrgNode>) {
    // Act
    let scenarios = build_scenarios(&three_level, &ScenarioPolicy::default());

    // Assert
    let baseline = &scenarios.baseline;
    assert_eq!(baseline.name, "Baseline");
    assert_eq!(baseline.total_cost, 460_000);
    assert_eq!(baseline.position_count, 3);
    assert_eq!(baseline.total_fte, 3.0);
    assert_eq!(baseline.avg_span_of_control, 1.0);
    assert_eq!(baseline.savings_vs_baseline, None);
    assert_eq!(baseline.savings_percentage, None);
}

#[rstest]
fn given_three_levels_with_drop_when_moderate_then_only_ceo_survives(three_level: Vec<OrgNode>) {
    // Act
    let scenarios = build_scenarios(&three_level, &ScenarioPolicy::default());

    // Assert
    let moderate = &scenarios.moderate;
    assert_eq!(moderate.name, "Moderate Restructuring");
    assert_eq!(moderate.total_cost, 300_000);
    assert_eq!(moderate.position_count, 1);
    assert_eq!(moderate.avg_span_of_control, 0.0);
    assert_eq!(moderate.savings_vs_baseline, Some(160_000));
    let pct = moderate.savings_percentage.unwrap();
    assert!((pct - 160_000.0 / 460_000.0 * 100.0).abs() < 1e-9);
}

#[rstest]
fn given_three_levels_with_reattach_when_moderate_then_only_analyst_survives(
    three_level: Vec<OrgNode>,
) {
    // Act
    let pruned = prune_tree(three_level.clone(), ScenarioKind::Moderate, &reattach());
    let scenarios = build_scenarios(&three_level, &reattach());

    // Assert
    assert_eq!(pruned.len(), 1);
    assert_eq!(pruned[0].id, "C");
    assert_eq!(pruned[0].parent_id, None);
    assert_eq!(scenarios.moderate.total_cost, 65_000);
}

#[rstest]
fn given_three_levels_when_aggressive_then_mid_manager_removed(three_level: Vec<OrgNode>) {
    // Act
    let pruned = prune_tree(three_level, ScenarioKind::Aggressive, &ScenarioPolicy::default());

    // Assert
    assert_eq!(pruned.len(), 1);
    assert_eq!(pruned[0].id, "A");
    assert!(pruned[0].children.is_empty());
}

#[test]
fn given_wide_team_when_comparing_then_aggressive_can_exceed_moderate() {
    // Arrange
    let tree = wide_team();

    // Act
    let scenarios = build_scenarios(&tree, &ScenarioPolicy::default());

    // Assert: moderate cuts the single-report CEO and its whole subtree,
    // aggressive promotes the manager into the CEO's place instead
    assert_eq!(scenarios.moderate.total_cost, 0);
    assert_eq!(scenarios.aggressive.total_cost, 95_000 + 10 * 65_000);
    assert!(scenarios.aggressive.total_cost > scenarios.moderate.total_cost);
}

#[test]
fn given_single_child_chain_when_aggressive_then_child_takes_parent_slot() {
    // Arrange
    let tree = wide_team();

    // Act
    let pruned = prune_tree(tree, ScenarioKind::Aggressive, &ScenarioPolicy::default());

    // Assert
    assert_eq!(pruned.len(), 1);
    assert_eq!(pruned[0].id, "mgr");
    assert_eq!(pruned[0].parent_id, None);
    assert_eq!(pruned[0].children.len(), 10);
}

#[test]
fn given_leaves_only_when_pruning_then_kept_in_every_scenario() {
    // Arrange
    let tree = costed(&[
        RoleRecord::new("x", "Analyst", 1.0, None),
        RoleRecord::new("y", "Analyst", 1.0, None),
    ]);

    // Act & Assert
    for kind in [ScenarioKind::Moderate, ScenarioKind::Aggressive] {
        let pruned = prune_tree(tree.clone(), kind, &ScenarioPolicy::default());
        assert_eq!(count_nodes(&pruned), 2, "{kind}");
    }
}

#[test]
fn given_baseline_kind_when_pruning_then_tree_unchanged() {
    let tree = wide_team();
    let pruned = prune_tree(tree.clone(), ScenarioKind::Baseline, &ScenarioPolicy::default());
    assert_eq!(pruned, tree);
}

#[test]
fn given_empty_tree_when_building_scenarios_then_zeroes_without_nan() {
    // Act
    let scenarios = build_scenarios(&[], &ScenarioPolicy::default());

    // Assert
    for summary in scenarios.iter() {
        assert_eq!(summary.total_cost, 0);
        assert_eq!(summary.position_count, 0);
        assert_eq!(summary.avg_span_of_control, 0.0);
    }
    assert_eq!(scenarios.moderate.savings_percentage, Some(0.0));
}

#[test]
fn given_lower_moderate_threshold_when_pruning_then_small_teams_survive() {
    // Arrange
    let tree = costed(&[
        RoleRecord::new("m", "Manager", 1.0, None),
        RoleRecord::new("a", "Analyst", 1.0, Some("m")),
        RoleRecord::new("b", "Analyst", 1.0, Some("m")),
    ]);
    let policy = ScenarioPolicy {
        moderate_min_span: 2,
        ..ScenarioPolicy::default()
    };

    // Act
    let pruned = prune_tree(tree, ScenarioKind::Moderate, &policy);

    // Assert
    assert_eq!(count_nodes(&pruned), 3);
}

#[test]
fn given_summary_when_fte_fractional_then_rounded_to_one_decimal() {
    let tree = costed(&[
        RoleRecord::new("a", "Lead", 0.33, None),
        RoleRecord::new("b", "Lead", 0.33, None),
    ]);
    let summary = summarize_tree(&tree, "x");
    assert_eq!(summary.total_fte, 0.7);
}

/// Random forest: `parents[i]` picks an earlier node as parent or none.
fn arb_roles() -> impl Strategy<Value = Vec<RoleRecord>> {
    let titles = prop::sample::select(vec!["CEO", "VP", "Manager", "Lead", "Analyst", "Intern"]);
    let spec = (
        any::<prop::sample::Index>(),
        prop::bool::weighted(0.1),
        titles,
        1u32..=20,
    );
    prop::collection::vec(spec, 1..40).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (pick, is_root, title, tenths))| {
                let parent = (i > 0 && !is_root).then(|| format!("n{}", pick.index(i)));
                let fte = f64::from(tenths) / 10.0;
                RoleRecord::new(format!("n{i}"), title, fte, parent.as_deref())
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn variants_never_cost_more_than_baseline(
        roles in arb_roles(),
        reattach_orphans in any::<bool>()
    ) {
        let tree = costed(&roles);
        let policy = ScenarioPolicy {
            orphans: if reattach_orphans { OrphanPolicy::Reattach } else { OrphanPolicy::Drop },
            ..ScenarioPolicy::default()
        };

        let scenarios = build_scenarios(&tree, &policy);

        prop_assert!(scenarios.moderate.total_cost <= scenarios.baseline.total_cost);
        prop_assert!(scenarios.aggressive.total_cost <= scenarios.baseline.total_cost);
        for variant in [&scenarios.moderate, &scenarios.aggressive] {
            let savings = scenarios.baseline.total_cost - variant.total_cost;
            prop_assert_eq!(variant.savings_vs_baseline, Some(savings));
            let expected_pct = if scenarios.baseline.total_cost == 0 {
                0.0
            } else {
                savings as f64 / scenarios.baseline.total_cost as f64 * 100.0
            };
            let pct = variant.savings_percentage.unwrap_or(f64::NAN);
            prop_assert!((expected_pct - pct).abs() < 1e-9);
        }
    }

    #[test]
    fn pruning_never_duplicates_nodes(roles in arb_roles()) {
        let tree = costed(&roles);

        for kind in [ScenarioKind::Moderate, ScenarioKind::Aggressive] {
            let pruned = prune_tree(tree.clone(), kind, &reattach());
            let mut ids: Vec<_> = walk(&pruned).map(|(n, _)| n.id.clone()).collect();
            let total = ids.len();
            ids.sort();
            ids.dedup();
            prop_assert_eq!(ids.len(), total);
            prop_assert!(total <= roles.len());
        }
    }

    #[test]
    fn building_scenarios_leaves_input_untouched(roles in arb_roles()) {
        let tree = costed(&roles);
        let before = tree.clone();

        let _ = build_scenarios(&tree, &ScenarioPolicy::default());

        prop_assert_eq!(tree, before);
    }
}
