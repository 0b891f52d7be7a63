mod common;

use chrono::Duration;
use common::{diamond_with_tail, id, ids, ms, six_path_graph, unit};
use schedule_tracks::{IsolatedDependencyChain, LayoutError, TaskGraph};

fn pair(h_start: i64, h_end: i64) -> TaskGraph {
    TaskGraph::build(vec![unit("L", 0, 1000, &[]), unit("H", h_start, h_end, &["L"])]).unwrap()
}

#[test]
fn density_with_gap_between_units() {
    let graph = pair(2000, 3000);
    let chain = IsolatedDependencyChain::new(&graph, &ids(&["H", "L"])).unwrap();

    assert_eq!(chain.id(), &id("H"));
    assert_eq!(chain.last_unit().id(), &id("L"));
    assert_eq!(chain.end_date(), ms(3000));
    assert_eq!(chain.anticipated_start_date(), ms(0));
    assert_eq!(chain.presence_time(), Duration::milliseconds(2000));
    assert_eq!(chain.time_span(), Duration::milliseconds(3000));
    assert!((chain.visual_density() - 2.0 / 3.0).abs() < 1e-12);
}

#[test]
fn density_above_one_when_units_overlap() {
    let graph = pair(600, 1600);
    let chain = IsolatedDependencyChain::new(&graph, &ids(&["H", "L"])).unwrap();

    assert!((chain.visual_density() - 1.25).abs() < 1e-12);
}

#[test]
fn zero_span_counts_as_dense() {
    let graph = TaskGraph::build(vec![unit("A", 500, 500, &[])]).unwrap();
    let chain = IsolatedDependencyChain::new(&graph, &ids(&["A"])).unwrap();

    assert_eq!(chain.visual_density(), 1.0);
}

#[test]
fn units_must_be_ordered_head_first() {
    let graph = pair(2000, 3000);
    let err = IsolatedDependencyChain::new(&graph, &ids(&["L", "H"])).unwrap_err();
    assert!(matches!(err, LayoutError::OrderingViolation(_)));

    let unrelated = TaskGraph::build(vec![unit("X", 0, 10, &[]), unit("Y", 0, 10, &[])]).unwrap();
    let err = IsolatedDependencyChain::new(&unrelated, &ids(&["X", "Y"])).unwrap_err();
    assert!(matches!(err, LayoutError::OrderingViolation(_)));
}

#[test]
fn transitive_link_is_not_enough() {
    let graph = diamond_with_tail();
    let err = IsolatedDependencyChain::new(&graph, &ids(&["F", "D"])).unwrap_err();
    assert!(matches!(err, LayoutError::OrderingViolation(_)));
}

#[test]
fn empty_chain_is_rejected() {
    let graph = pair(2000, 3000);
    let err = IsolatedDependencyChain::new(&graph, &[]).unwrap_err();
    assert!(matches!(err, LayoutError::StructuralRange(_)));
}

#[test]
fn unknown_unit_is_rejected() {
    let graph = pair(2000, 3000);
    let err = IsolatedDependencyChain::new(&graph, &ids(&["Q"])).unwrap_err();
    assert_eq!(err, LayoutError::UnitNotFound(id("Q")));
}

#[test]
fn counts_paths_to_other_chains() {
    let graph = diamond_with_tail();
    let top = IsolatedDependencyChain::new(&graph, &ids(&["F", "E"])).unwrap();
    let chain_of = |x: &str| IsolatedDependencyChain::new(&graph, &ids(&[x])).unwrap();

    assert_eq!(top.get_number_of_paths_to_dependency(&chain_of("A")), 2);
    assert_eq!(top.get_number_of_paths_to_dependency(&chain_of("B")), 1);
    assert_eq!(top.get_number_of_paths_to_dependency(&chain_of("C")), 1);
    assert_eq!(top.get_number_of_paths_to_dependency(&chain_of("D")), 1);
    assert_eq!(chain_of("A").get_number_of_paths_to_dependency(&top), 0);
}

#[test]
fn direct_dependency_goes_through_last_unit() {
    let graph = diamond_with_tail();
    let top = IsolatedDependencyChain::new(&graph, &ids(&["F", "E"])).unwrap();
    let d = IsolatedDependencyChain::new(&graph, &ids(&["D"])).unwrap();
    let a = IsolatedDependencyChain::new(&graph, &ids(&["A"])).unwrap();

    assert!(top.is_directly_dependent_on(&d));
    assert!(!top.is_directly_dependent_on(&a));
    assert_eq!(top.attachment_to_dependencies(), 2);
}

#[test]
fn external_dependencies_drop_implied_units() {
    let graph = TaskGraph::build(vec![
        unit("Q", 0, 1000, &[]),
        unit("P", 1000, 2000, &["Q"]),
        unit("H1", 1000, 2000, &["Q"]),
        unit("H2", 2000, 3000, &["H1", "P"]),
    ])
    .unwrap();
    let chain = IsolatedDependencyChain::new(&graph, &ids(&["H2", "H1"])).unwrap();

    assert_eq!(
        chain.get_external_dependencies().iter().cloned().collect::<Vec<_>>(),
        ids(&["P"])
    );
    assert!(chain.contains(&id("H1")));
    assert_eq!(chain.len(), 2);
}

#[test]
fn paths_to_another_chain_end_at_its_last_unit() {
    let graph = six_path_graph();
    let a = IsolatedDependencyChain::new(&graph, &ids(&["a2", "a1"])).unwrap();
    let b = IsolatedDependencyChain::new(&graph, &ids(&["b2", "b1"])).unwrap();

    // b2 enters A at a2 and b1 enters it at a1; both reach a1.
    assert_eq!(b.get_number_of_paths_to_dependency(&a), 2);
    assert_eq!(a.get_number_of_paths_to_dependency(&b), 0);
}
