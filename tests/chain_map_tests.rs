mod common;

use std::collections::BTreeSet;

use common::{diamond, diamond_ladder, forked, id, ids};
use schedule_tracks::{IsolatedDependencyChain, LayoutError, SimpleChainMap, UnitId, UnitPathMatrix};

fn heads_of(chains: &[&IsolatedDependencyChain<'_>]) -> Vec<UnitId> {
    chains.iter().map(|c| c.id().clone()).collect()
}

fn units_of(chain: &IsolatedDependencyChain<'_>) -> Vec<UnitId> {
    chain.unit_ids().cloned().collect()
}

#[test]
fn forked_graph_decomposes_round_by_round() {
    let graph = forked();
    let map = SimpleChainMap::new(&graph, &graph.heads()).unwrap();

    let chains: Vec<Vec<UnitId>> = map.chains().iter().map(units_of).collect();
    assert_eq!(
        chains,
        vec![
            ids(&["G", "F", "D"]),
            ids(&["H", "E"]),
            ids(&["I"]),
            ids(&["C", "B"]),
            ids(&["A"]),
        ]
    );
}

#[test]
fn every_unit_belongs_to_exactly_one_chain() {
    let graph = forked();
    let map = SimpleChainMap::new(&graph, &graph.heads()).unwrap();

    let mut seen = BTreeSet::new();
    for chain in map.chains() {
        for unit in chain.unit_ids() {
            assert!(seen.insert(unit.clone()), "{unit} covered twice");
        }
    }
    assert_eq!(&seen, map.closure());
    assert_eq!(seen.len(), graph.len());

    assert_eq!(map.get_chain_of_unit(&id("F")).unwrap().id(), &id("G"));
    assert_eq!(map.get_chain_of_unit(&id("B")).unwrap().id(), &id("C"));
    assert_eq!(
        map.get_chain_of_unit(&id("Z")).unwrap_err(),
        LayoutError::UnitNotFound(id("Z"))
    );
}

#[test]
fn diamond_splits_at_every_fork_and_join() {
    let graph = diamond();
    let map = SimpleChainMap::new(&graph, &ids(&["D"])).unwrap();

    let chains: Vec<Vec<UnitId>> = map.chains().iter().map(units_of).collect();
    assert_eq!(chains, vec![ids(&["D"]), ids(&["B"]), ids(&["C"]), ids(&["A"])]);
}

#[test]
fn decomposition_is_relative_to_the_closure() {
    let graph = forked();
    let map = SimpleChainMap::new(&graph, &ids(&["H"])).unwrap();

    assert_eq!(map.chains().len(), 1);
    assert_eq!(units_of(&map.chains()[0]), ids(&["H", "E", "C", "B", "A"]));
}

#[test]
fn connectivity_is_symmetric() {
    let graph = forked();
    let map = SimpleChainMap::new(&graph, &graph.heads()).unwrap();
    let g = map.get_chain_by_id(&id("G")).unwrap();
    let h = map.get_chain_by_id(&id("H")).unwrap();
    let c = map.get_chain_by_id(&id("C")).unwrap();

    assert!(map.chains_are_connected(g, c));
    assert!(map.chains_are_connected(c, g));
    assert!(!map.chains_are_connected(g, h));
    assert!(!map.chains_are_connected(h, g));

    for a in map.chains() {
        for b in map.chains() {
            assert_eq!(map.chains_are_connected(a, b), map.chains_are_connected(b, a));
        }
    }
}

#[test]
fn chain_neighbourhood_queries() {
    let graph = forked();
    let map = SimpleChainMap::new(&graph, &graph.heads()).unwrap();
    let chain = |x: &str| map.get_chain_by_id(&id(x)).unwrap();

    assert_eq!(
        heads_of(&map.get_chains_connected_to_chain(chain("C")).unwrap()),
        ids(&["A", "G", "H"])
    );
    assert_eq!(
        heads_of(&map.get_direct_dependencies_of_chain(chain("G")).unwrap()),
        ids(&["C"])
    );
    assert_eq!(
        heads_of(&map.get_all_dependencies_of_chain(chain("G")).unwrap()),
        ids(&["A", "C"])
    );
    assert_eq!(
        heads_of(&map.get_direct_dependents_of_chain(chain("A")).unwrap()),
        ids(&["C", "I"])
    );
    assert!(map.get_direct_dependents_of_chain(chain("G")).unwrap().is_empty());
    assert_eq!(heads_of(&map.get_head_chains()), ids(&["G", "H", "I"]));
}

#[test]
fn paths_to_units_from_heads() {
    let graph = forked();
    let map = SimpleChainMap::new(&graph, &graph.heads()).unwrap();

    assert_eq!(map.get_number_of_paths_to_unit(&id("A")).unwrap(), 3);
    assert_eq!(map.get_number_of_paths_to_unit(&id("C")).unwrap(), 2);
    assert_eq!(map.get_number_of_paths_to_unit(&id("G")).unwrap(), 1);

    let matrix = map.unit_path_matrix();
    assert_eq!(matrix.get_number_of_inbound_paths(&id("G")).unwrap(), 0);
    assert_eq!(matrix.get_number_of_paths_between(&id("G"), &id("A")).unwrap(), 1);
    assert_eq!(matrix.get_number_of_paths_between(&id("A"), &id("G")).unwrap(), 0);
    assert!(matrix.get_number_of_paths_between(&id("Z"), &id("A")).is_err());
}

#[test]
fn path_counts_match_walks_through_the_graph() {
    let graph = diamond();
    let all: BTreeSet<UnitId> = ids(&["A", "B", "C", "D"]).into_iter().collect();
    let matrix = UnitPathMatrix::new(&graph, &all).unwrap();

    assert_eq!(matrix.get_number_of_paths_between(&id("D"), &id("A")).unwrap(), 2);
    assert_eq!(matrix.get_number_of_paths_between(&id("D"), &id("B")).unwrap(), 1);
    assert_eq!(matrix.get_number_of_paths_between(&id("B"), &id("C")).unwrap(), 0);
    assert_eq!(matrix.get_number_of_inbound_paths(&id("A")).unwrap(), 2);

    let ladder = diamond_ladder(10);
    let units: BTreeSet<UnitId> = ladder.units().map(|u| u.id().clone()).collect();
    let matrix = UnitPathMatrix::new(&ladder, &units).unwrap();
    assert_eq!(matrix.get_number_of_paths_between(&id("a10"), &id("a00")).unwrap(), 1 << 10);
    assert_eq!(matrix.get_number_of_paths_between(&id("a10"), &id("b03")).unwrap(), 1 << 6);
}

#[test]
fn unit_sets_must_be_closed_under_dependency() {
    let graph = diamond();
    let open: BTreeSet<UnitId> = ids(&["B", "D"]).into_iter().collect();

    let err = UnitPathMatrix::new(&graph, &open).unwrap_err();
    assert!(matches!(err, LayoutError::StructuralRange(_)));
}

#[test]
fn frontier_after_consuming_units() {
    let graph = forked();
    let map = SimpleChainMap::new(&graph, &graph.heads()).unwrap();
    let matrix = map.unit_path_matrix();

    assert_eq!(matrix.get_head_units_without_isolated_units(&BTreeSet::new()), ids(&["G", "H", "I"]));
    let consumed: BTreeSet<UnitId> = ids(&["G", "F", "D", "H", "E", "I"]).into_iter().collect();
    assert_eq!(matrix.get_head_units_without_isolated_units(&consumed), ids(&["C"]));
}

#[test]
fn empty_roots_are_rejected() {
    let graph = forked();
    assert!(matches!(
        SimpleChainMap::new(&graph, &[]),
        Err(LayoutError::StructuralRange(_))
    ));
}

#[test]
fn foreign_chains_are_not_resolved() {
    let graph = forked();
    let full = SimpleChainMap::new(&graph, &graph.heads()).unwrap();
    let partial = SimpleChainMap::new(&graph, &ids(&["H"])).unwrap();

    let foreign = &partial.chains()[0];
    assert_eq!(
        full.get_chains_connected_to_chain(foreign).unwrap_err(),
        LayoutError::ChainNotFound("H".into())
    );
    assert!(full.get_chain_by_id(&id("E")).is_err());
}

#[test]
fn explicit_chains_are_validated() {
    let graph = forked();
    let valid = vec![
        ids(&["G", "F", "D"]),
        ids(&["H", "E"]),
        ids(&["I"]),
        ids(&["C", "B"]),
        ids(&["A"]),
    ];
    let map = SimpleChainMap::from_chains(&graph, &valid).unwrap();
    assert_eq!(map.chains().len(), 5);

    let reversed = vec![ids(&["A"]), ids(&["B", "C"])];
    assert!(matches!(
        SimpleChainMap::from_chains(&graph, &reversed),
        Err(LayoutError::OrderingViolation(_))
    ));

    let missing = vec![ids(&["C", "B"])];
    assert!(matches!(
        SimpleChainMap::from_chains(&graph, &missing),
        Err(LayoutError::StructuralRange(_))
    ));

    let overlapping = vec![ids(&["C", "B"]), ids(&["B", "A"])];
    assert!(matches!(
        SimpleChainMap::from_chains(&graph, &overlapping),
        Err(LayoutError::StructuralRange(_))
    ));
}
