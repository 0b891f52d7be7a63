#![allow(dead_code)]

use std::sync::Once;

use chrono::{DateTime, Utc};
use schedule_tracks::{TaskGraph, TaskRecord, UnitId};
use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Capture tracing output per test; shown only for failing tests.
/// Raise the level with `RUST_LOG=debug`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

pub fn ms(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap()
}

pub fn id(value: &str) -> UnitId {
    UnitId::from(value)
}

pub fn ids(values: &[&str]) -> Vec<UnitId> {
    values.iter().map(|v| UnitId::from(*v)).collect()
}

pub fn unit(id: &str, start: i64, end: i64, deps: &[&str]) -> TaskRecord {
    TaskRecord::new(id, format!("Task {id}"), ms(start), ms(end)).with_dependencies(deps.iter().copied())
}

/// A feeds B and C, which both feed D.
pub fn diamond() -> TaskGraph {
    TaskGraph::build(vec![
        unit("A", 0, 1000, &[]),
        unit("B", 1000, 2000, &["A"]),
        unit("C", 1000, 2000, &["A"]),
        unit("D", 2000, 3000, &["B", "C"]),
    ])
    .unwrap()
}

/// Diamond extended upward by E (on D) and F (on E).
pub fn diamond_with_tail() -> TaskGraph {
    TaskGraph::build(vec![
        unit("A", 0, 1000, &[]),
        unit("B", 1000, 2000, &["A"]),
        unit("C", 1000, 2000, &["A"]),
        unit("D", 2000, 3000, &["B", "C"]),
        unit("E", 3000, 4000, &["D"]),
        unit("F", 4000, 5000, &["E"]),
    ])
    .unwrap()
}

/// C forks into D and E; A is shared by B and I.
///
/// Decomposes into chains [G,F,D], [H,E], [I], [C,B], [A].
pub fn forked() -> TaskGraph {
    TaskGraph::build(vec![
        unit("A", 0, 1000, &[]),
        unit("B", 1000, 2000, &["A"]),
        unit("C", 2000, 3000, &["B"]),
        unit("D", 3000, 4000, &["C"]),
        unit("E", 3000, 4000, &["C"]),
        unit("F", 4000, 5000, &["D"]),
        unit("G", 5000, 6000, &["F"]),
        unit("H", 4000, 5000, &["E"]),
        unit("I", 1000, 2000, &["A"]),
    ])
    .unwrap()
}

/// Units for six single-chain paths A-F:
/// A=[a2,a1] B=[b2,b1] C=[c1] D=[d2,d1] E=[e1] F=[f1].
pub fn six_path_graph() -> TaskGraph {
    TaskGraph::build(vec![
        unit("a1", 0, 1000, &[]),
        unit("a2", 1000, 2000, &["a1"]),
        unit("b1", 1000, 2000, &["a1"]),
        unit("b2", 2000, 3000, &["b1", "a2"]),
        unit("c1", 3000, 4000, &["b2"]),
        unit("d1", 4000, 5000, &["c1"]),
        unit("d2", 5000, 6000, &["d1"]),
        unit("e1", 4000, 5000, &["c1"]),
        unit("f1", 6000, 7000, &["d2", "e1"]),
    ])
    .unwrap()
}

pub const SIX_PATH_CHAINS: [(&str, &[&str]); 6] = [
    ("A", &["a2", "a1"]),
    ("B", &["b2", "b1"]),
    ("C", &["c1"]),
    ("D", &["d2", "d1"]),
    ("E", &["e1"]),
    ("F", &["f1"]),
];

/// `rungs` stacked diamonds: `b{i}` and `c{i}` both sit on `a{i}`, and
/// `a{i+1}` sits on both. Ids are zero-padded so they sort by rung.
pub fn diamond_ladder(rungs: usize) -> TaskGraph {
    let step = 1000;
    let mut records = vec![unit("a00", 0, step, &[])];
    for i in 0..rungs {
        let base = 2 * step * i as i64;
        let (a, b, c, next) = (
            format!("a{i:02}"),
            format!("b{i:02}"),
            format!("c{i:02}"),
            format!("a{:02}", i + 1),
        );
        records.push(unit(&b, base + step, base + 2 * step, &[a.as_str()]));
        records.push(unit(&c, base + step, base + 2 * step, &[a.as_str()]));
        records.push(unit(&next, base + 2 * step, base + 3 * step, &[b.as_str(), c.as_str()]));
    }
    TaskGraph::build(records).unwrap()
}
