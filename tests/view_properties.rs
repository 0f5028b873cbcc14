//! Property-based tests for view membership and the scoped indices.
//!
//! Random mutation sequences are applied to a store and one of its views;
//! after every step the view counters must agree with a recount of its
//! members, and the timestamp bounds must agree with a brute-force scan.

use dense_graph_store::{EdgeId, GraphStore, NodeId, Scope, ViewId};
use proptest::prelude::*;

const NODES: u32 = 8;

#[derive(Debug, Clone)]
enum Op {
    AddNode(u32),
    RemoveNode(u32),
    AddEdge(usize),
    RemoveEdge(usize),
    StoreAddEdge(u32, u32, u16),
    StoreRemoveEdge(usize),
    Fill,
    ClearEdges,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..NODES).prop_map(Op::AddNode),
        (0..NODES).prop_map(Op::RemoveNode),
        (0usize..64).prop_map(Op::AddEdge),
        (0usize..64).prop_map(Op::RemoveEdge),
        (0..NODES, 0..NODES, 0u16..3).prop_map(|(s, t, ty)| Op::StoreAddEdge(s, t, ty)),
        (0usize..64).prop_map(Op::StoreRemoveEdge),
        Just(Op::Fill),
        Just(Op::ClearEdges),
    ]
}

fn store_with_types() -> (GraphStore, Vec<NodeId>) {
    let mut g = GraphStore::new();
    g.add_edge_type("knows").unwrap();
    g.add_edge_type("likes").unwrap();
    let nodes = (0..NODES).map(|i| g.add_node(format!("n{}", i)).unwrap()).collect();
    (g, nodes)
}

fn pick_edge(g: &GraphStore, i: usize) -> Option<EdgeId> {
    let edges: Vec<_> = g.elements().edges().collect();
    if edges.is_empty() {
        None
    } else {
        Some(edges[i % edges.len()])
    }
}

fn apply(g: &mut GraphStore, view: ViewId, nodes: &[NodeId], op: &Op) {
    // Rejected operations are part of the input space; only state matters here
    let _ = match *op {
        Op::AddNode(i) => g.view_add_node(view, nodes[i as usize]).map(drop),
        Op::RemoveNode(i) => g.view_remove_node(view, nodes[i as usize]).map(drop),
        Op::AddEdge(i) => match pick_edge(g, i) {
            Some(e) => g.view_add_edge(view, e).map(drop),
            None => Ok(()),
        },
        Op::RemoveEdge(i) => match pick_edge(g, i) {
            Some(e) => g.view_remove_edge(view, e).map(drop),
            None => Ok(()),
        },
        Op::StoreAddEdge(s, t, ty) => g.add_edge(nodes[s as usize], nodes[t as usize], ty).map(drop),
        Op::StoreRemoveEdge(i) => match pick_edge(g, i) {
            Some(e) => g.remove_edge(e),
            None => Ok(()),
        },
        Op::Fill => g.view_fill(view).map(drop),
        Op::ClearEdges => g.view_clear_edges(view),
    };
}

fn check_counters(g: &GraphStore, view: ViewId) -> Result<(), TestCaseError> {
    let v = g.view(view).unwrap();
    prop_assert_eq!(v.node_count(), v.nodes().count());
    prop_assert_eq!(v.edge_count(), v.edges().count());
    prop_assert_eq!(v.edge_count(), v.type_count_total());

    let mut mutual = 0;
    for edge in v.edges() {
        let rec = g.elements().edge(edge).unwrap();
        prop_assert!(v.contains_node(rec.source), "edge {:?} without its source", edge);
        prop_assert!(v.contains_node(rec.target), "edge {:?} without its target", edge);
        if rec.counts_as_mutual() {
            mutual += 1;
        }
    }
    prop_assert_eq!(v.mutual_edge_count(), mutual);
    prop_assert_eq!(v.undirected_edge_count(), v.edge_count() - v.mutual_edge_count());

    for ty in 0..v.tracked_type_count() as u16 {
        let of_type = v.edges().filter(|e| g.elements().edge(*e).unwrap().edge_type == ty).count();
        prop_assert_eq!(v.edge_count_of_type(ty).unwrap(), of_type);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn view_counters_match_members(ops in prop::collection::vec(arb_op(), 1..60)) {
        let (mut g, nodes) = store_with_types();
        let view = g.create_view();
        for op in &ops {
            apply(&mut g, view, &nodes, op);
            check_counters(&g, view)?;
        }
    }

    #[test]
    fn add_then_remove_restores_counts(
        edges in prop::collection::vec((0..NODES, 0..NODES, 0u16..3), 0..30),
        picked in prop::collection::vec(0..NODES, 1..8),
    ) {
        let (mut g, nodes) = store_with_types();
        for (s, t, ty) in edges {
            let _ = g.add_edge(nodes[s as usize], nodes[t as usize], ty);
        }
        let view = g.create_view();
        let outside: Vec<NodeId> = picked.iter().map(|i| nodes[*i as usize]).collect();
        let kept: Vec<NodeId> = nodes.iter().copied().filter(|n| !outside.contains(n)).collect();
        g.view_add_nodes(view, kept.iter().copied()).unwrap();
        for e in g.elements().edges().collect::<Vec<_>>() {
            let _ = g.view_add_edge(view, e);
        }
        let before = {
            let v = g.view(view).unwrap();
            (v.node_count(), v.edge_count(), v.mutual_edge_count())
        };

        g.view_add_nodes(view, outside.iter().copied()).unwrap();
        g.view_remove_nodes(view, outside.iter().copied()).unwrap();

        let v = g.view(view).unwrap();
        prop_assert_eq!((v.node_count(), v.edge_count(), v.mutual_edge_count()), before);
        check_counters(&g, view)?;
    }

    #[test]
    fn timestamp_bounds_match_scan(
        stamps in prop::collection::vec((0..NODES, -50i32..50), 1..40),
        dropped in prop::collection::vec(0..NODES, 0..4),
    ) {
        let (mut g, nodes) = store_with_types();
        for (n, t) in &stamps {
            g.add_node_timestamp(nodes[*n as usize], *t as f64).unwrap();
        }
        let view = g.create_view();
        g.view_fill(view).unwrap();
        g.create_view_index(view).unwrap();
        for n in &dropped {
            g.view_remove_node(view, nodes[*n as usize]).unwrap();
        }

        let in_view = |n: u32| !dropped.contains(&n);
        let scan = |keep: &dyn Fn(u32) -> bool| {
            let ts: Vec<f64> = stamps.iter().filter(|(n, _)| keep(*n)).map(|(_, t)| *t as f64).collect();
            (
                ts.iter().copied().fold(f64::INFINITY, f64::min),
                ts.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            )
        };
        let (lo, hi) = scan(&|_| true);
        let main = g.node_timestamp_index(Scope::Main).unwrap();
        prop_assert_eq!(main.min_timestamp(), lo);
        prop_assert_eq!(main.max_timestamp(), hi);

        let (lo, hi) = scan(&in_view);
        let scoped = g.node_timestamp_index(Scope::View(view)).unwrap();
        if scoped.has_elements() {
            prop_assert_eq!(scoped.min_timestamp(), lo);
            prop_assert_eq!(scoped.max_timestamp(), hi);
        } else {
            prop_assert!(!dropped.is_empty());
            prop_assert_eq!(scoped.min_timestamp(), f64::NEG_INFINITY);
            prop_assert_eq!(scoped.max_timestamp(), f64::INFINITY);
        }

        let hits: Vec<NodeId> = scoped.get(-10.0, 10.0).collect();
        let mut unique = hits.clone();
        unique.sort();
        unique.dedup();
        prop_assert_eq!(hits.len(), unique.len());
        for n in hits {
            prop_assert!(in_view(n.0));
        }
    }
}
