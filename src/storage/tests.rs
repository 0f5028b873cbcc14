use super::*;
use crate::columns::ColumnBuilder;
use crate::core::config::StoreConfig;
use crate::core::error::{Error, GraphError};
use crate::core::types::{EdgeId, ElementKind, NodeId, Scope};
use crate::core::value::{Estimator, ScalarType, Value, ValueType};
use crate::columns::TimestampMap;

fn store() -> GraphStore {
    GraphStore::new()
}

#[test]
fn node_ids_are_dense_and_reused() {
    let mut g = store();
    let a = g.add_node("a").unwrap();
    let b = g.add_node("b").unwrap();
    let c = g.add_node("c").unwrap();
    assert_eq!((a, b, c), (NodeId(0), NodeId(1), NodeId(2)));

    g.remove_node(b).unwrap();
    assert_eq!(g.node_count(), 2);
    assert_eq!(g.node("b"), None);
    let d = g.add_node("d").unwrap();
    assert_eq!(d, NodeId(1));
    assert_eq!(g.elements().node(d).unwrap().label(), "d");
}

#[test]
fn duplicate_label_is_rejected() {
    let mut g = store();
    g.add_node("a").unwrap();
    assert!(matches!(g.add_node("a"), Err(Error::InvalidArgument(_))));
    assert_eq!(g.node_count(), 1);
}

#[test]
fn edges_require_live_endpoints() {
    let mut g = store();
    let a = g.add_node("a").unwrap();
    let err = g.add_edge(a, NodeId(9), 0).unwrap_err();
    assert!(matches!(err, Error::Graph(GraphError::NodeNotInStore(NodeId(9)))));
    assert!(matches!(g.add_edge(a, a, 3), Err(Error::InvalidArgument(_))));
    assert!(matches!(g.add_edge(NodeId::NULL, a, 0), Err(Error::Graph(GraphError::NullElement(ElementKind::Node)))));
    assert_eq!(g.edge_count(), 0);
}

#[test]
fn parallel_edge_of_same_type_is_rejected() {
    let mut g = store();
    let a = g.add_node("a").unwrap();
    let b = g.add_node("b").unwrap();
    let knows = g.add_edge_type("knows").unwrap();
    g.add_edge(a, b, 0).unwrap();
    assert!(g.add_edge(a, b, 0).is_err());
    g.add_edge(a, b, knows).unwrap();
    assert_eq!(g.edge_count(), 2);
    assert_eq!(g.add_edge_type("knows").unwrap(), knows);
}

#[test]
fn reverse_edge_marks_both_mutual() {
    let mut g = store();
    let a = g.add_node("a").unwrap();
    let b = g.add_node("b").unwrap();
    let ab = g.add_edge(a, b, 0).unwrap();
    assert!(!g.elements().edge(ab).unwrap().mutual);
    let ba = g.add_edge(b, a, 0).unwrap();
    assert!(g.elements().edge(ab).unwrap().counts_as_mutual());
    assert!(g.elements().edge(ba).unwrap().mutual);
    assert!(!g.elements().edge(ba).unwrap().counts_as_mutual());

    g.remove_edge(ba).unwrap();
    assert!(!g.elements().edge(ab).unwrap().mutual);
}

#[test]
fn removing_node_removes_incident_edges() {
    let mut g = store();
    let a = g.add_node("a").unwrap();
    let b = g.add_node("b").unwrap();
    let c = g.add_node("c").unwrap();
    g.add_edge(a, b, 0).unwrap();
    g.add_edge(c, a, 0).unwrap();
    let bc = g.add_edge(b, c, 0).unwrap();
    g.add_edge(a, a, 0).unwrap();
    assert_eq!(g.edges_of(a).unwrap().count(), 3);

    g.remove_node(a).unwrap();
    assert_eq!(g.edge_count(), 1);
    assert!(g.elements().contains_edge(bc));
    assert!(g.remove_node(a).is_err());
}

#[test]
fn hub_incident_edges_are_listed_once() {
    let mut g = store();
    let hub = g.add_node("hub").unwrap();
    let spokes: Vec<NodeId> = (0..20).map(|i| g.add_node(format!("s{}", i)).unwrap()).collect();
    for (i, s) in spokes.iter().enumerate() {
        if i % 2 == 0 {
            g.add_edge(hub, *s, 0).unwrap();
        } else {
            g.add_edge(*s, hub, 0).unwrap();
        }
    }
    g.add_edge(spokes[0], hub, 0).unwrap();
    let lp = g.add_edge(hub, hub, 0).unwrap();

    let mut seen: Vec<EdgeId> = g.edges_of(hub).unwrap().collect();
    assert_eq!(seen.len(), 22);
    assert_eq!(seen.iter().filter(|e| **e == lp).count(), 1);
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 22);
    assert!(g.edges_of(NodeId(99)).is_err());

    let view = g.create_view();
    g.view_fill(view).unwrap();
    g.view_remove_node(view, hub).unwrap();
    assert_eq!(g.view(view).unwrap().edge_count(), 0);

    g.remove_node(hub).unwrap();
    assert_eq!(g.edge_count(), 0);
    assert_eq!(g.elements().node(spokes[0]).unwrap().outgoing().len(), 0);
}

#[test]
fn attribute_defaults_and_writes() {
    let mut g = store();
    let a = g.add_node("a").unwrap();
    g.create_column(
        ElementKind::Node,
        ColumnBuilder::new("Age").value_type(ValueType::Int).default_value(Value::Int(18)),
    )
    .unwrap();
    assert_eq!(g.attribute(a, "age").unwrap(), Value::Int(18));

    let old = g.set_attribute(a, "age", Value::Int(40)).unwrap();
    assert_eq!(old, Value::Int(18));
    assert_eq!(g.attribute(a, "AGE").unwrap(), Value::Int(40));
    assert_eq!(g.table(ElementKind::Node).column("age").unwrap().version(), 1);

    assert!(matches!(g.set_attribute(a, "age", Value::string("x")), Err(Error::InvalidArgument(_))));
    assert!(matches!(g.attribute(a, "missing"), Err(Error::InvalidArgument(_))));
    assert!(matches!(g.attribute(NodeId(5), "age"), Err(Error::Graph(GraphError::NodeNotInStore(_)))));
}

#[test]
fn large_long_values_keep_index_bounds() {
    let big = 1i64 << 53;
    let mut g = store();
    let a = g.add_node("a").unwrap();
    let b = g.add_node("b").unwrap();
    g.create_column(
        ElementKind::Node,
        ColumnBuilder::new("stamp").value_type(ValueType::Long).default_value(Value::Long(big)).indexed(true),
    )
    .unwrap();
    g.set_attribute(b, "stamp", Value::Long(big + 1)).unwrap();
    g.set_attribute(a, "stamp", Value::Long(big + 1)).unwrap();

    let index = g.node_index(Scope::Main).unwrap();
    assert_eq!(index.count("stamp", &Value::Long(big + 1)).unwrap(), 2);
    assert!(index.min_value("stamp").unwrap().is_some());
    assert!(index.max_value("stamp").unwrap().is_some());
}

#[test]
fn read_only_column_rejects_writes() {
    let mut g = store();
    let a = g.add_node("a").unwrap();
    g.create_column(ElementKind::Node, ColumnBuilder::new("id").value_type(ValueType::String).read_only(true))
        .unwrap();
    let err = g.set_attribute(a, "id", Value::string("x")).unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));
    assert_eq!(g.attribute(a, "id").unwrap(), Value::Null);
}

#[test]
fn value_index_follows_writes_and_removals() {
    let mut g = store();
    let nodes: Vec<_> = (0..4).map(|i| g.add_node(format!("n{}", i)).unwrap()).collect();
    g.create_column(ElementKind::Node, ColumnBuilder::new("score").value_type(ValueType::Double).indexed(true))
        .unwrap();
    {
        let index = g.node_index(Scope::Main).unwrap();
        assert_eq!(index.count("score", &Value::Null).unwrap(), 4);
        assert_eq!(index.min_value("score").unwrap(), None);
    }

    g.set_attribute(nodes[0], "score", Value::double(1.5)).unwrap();
    g.set_attribute(nodes[1], "score", Value::double(9.0)).unwrap();
    g.set_attribute(nodes[2], "score", Value::double(1.5)).unwrap();
    {
        let index = g.node_index(Scope::Main).unwrap();
        assert_eq!(index.count("score", &Value::double(1.5)).unwrap(), 2);
        assert_eq!(index.count("score", &Value::Null).unwrap(), 1);
        assert_eq!(index.min_value("score").unwrap(), Some(1.5));
        assert_eq!(index.max_value("score").unwrap(), Some(9.0));
    }

    g.remove_node(nodes[1]).unwrap();
    let index = g.node_index(Scope::Main).unwrap();
    assert_eq!(index.max_value("score").unwrap(), Some(1.5));
    assert_eq!(index.entries("score").unwrap().count(), 3);
}

#[test]
fn new_elements_enter_index_with_default() {
    let mut g = store();
    g.create_column(
        ElementKind::Edge,
        ColumnBuilder::new("weight")
            .value_type(ValueType::Double)
            .default_value(Value::double(1.0))
            .indexed(true),
    )
    .unwrap();
    let a = g.add_node("a").unwrap();
    let b = g.add_node("b").unwrap();
    let e = g.add_edge(a, b, 0).unwrap();
    let index = g.edge_index(Scope::Main).unwrap();
    assert_eq!(index.get("weight", &Value::double(1.0)).unwrap().collect::<Vec<_>>(), vec![e]);
}

#[test]
fn disabled_node_index_rejects_queries() {
    let mut config = StoreConfig::default();
    config.index.nodes = false;
    let mut g = GraphStore::with_config(config).unwrap();
    g.add_node("a").unwrap();
    g.create_column(ElementKind::Node, ColumnBuilder::new("x").value_type(ValueType::Int).indexed(true))
        .unwrap();
    let index = g.node_index(Scope::Main).unwrap();
    assert!(matches!(index.count("x", &Value::Null), Err(Error::InvalidArgument(_))));
}

#[test]
fn removing_column_clears_values() {
    let mut g = store();
    let a = g.add_node("a").unwrap();
    g.create_column(ElementKind::Node, ColumnBuilder::new("x").value_type(ValueType::Int).indexed(true))
        .unwrap();
    g.set_attribute(a, "x", Value::Int(3)).unwrap();
    let removed = g.remove_column(ElementKind::Node, "x").unwrap();
    assert_eq!(removed.id(), "x");
    assert!(g.attribute(a, "x").is_err());

    g.create_column(ElementKind::Node, ColumnBuilder::new("y").value_type(ValueType::Int).indexed(true))
        .unwrap();
    assert_eq!(g.attribute(a, "y").unwrap(), Value::Null);
    assert_eq!(g.node_index(Scope::Main).unwrap().count("y", &Value::Int(3)).unwrap(), 0);
}

#[test]
fn dynamic_values_estimate_and_share_catalog() {
    let mut g = store();
    let a = g.add_node("a").unwrap();
    g.create_column(ElementKind::Node, ColumnBuilder::new("w").value_type(ValueType::Dynamic(ScalarType::Double)))
        .unwrap();
    let map = TimestampMap::from_pairs(ScalarType::Double, [(1.0, Value::double(2.0)), (3.0, Value::double(6.0))])
        .unwrap();
    g.set_attribute(a, "w", Value::Dynamic(map)).unwrap();
    assert_eq!(g.estimate(a, "w").unwrap(), Value::double(2.0));

    g.set_estimator(ElementKind::Node, "w", Estimator::Average).unwrap();
    assert_eq!(g.estimate(a, "w").unwrap(), Value::double(4.0));
    assert!(matches!(
        g.set_estimator(ElementKind::Edge, "w", Estimator::Max),
        Err(Error::InvalidArgument(_))
    ));

    g.add_node_timestamp(a, 3.0).unwrap();
    let catalog = g.node_attributes().timestamps().catalog();
    assert_eq!(catalog.ref_count(1.0), 1);
    assert_eq!(catalog.ref_count(3.0), 2);
    let ordinal = catalog.ordinal(3.0);

    g.remove_node(a).unwrap();
    let catalog = g.node_attributes().timestamps().catalog();
    assert!(catalog.is_empty());
    assert!(ordinal.is_some());
}

#[test]
fn dynamic_column_type_mismatch_is_rejected() {
    let mut g = store();
    let a = g.add_node("a").unwrap();
    g.create_column(ElementKind::Node, ColumnBuilder::new("w").value_type(ValueType::Dynamic(ScalarType::Int)))
        .unwrap();
    let map = TimestampMap::from_pairs(ScalarType::Double, [(1.0, Value::double(2.0))]).unwrap();
    assert!(matches!(g.set_attribute(a, "w", Value::Dynamic(map)), Err(Error::InvalidArgument(_))));
    assert!(g.node_attributes().timestamps().catalog().is_empty());
}

#[test]
fn element_timestamps_feed_main_index() {
    let mut g = store();
    let a = g.add_node("a").unwrap();
    let b = g.add_node("b").unwrap();
    assert!(g.add_node_timestamp(a, 1.0).unwrap());
    assert!(!g.add_node_timestamp(a, 1.0).unwrap());
    g.add_node_timestamp(b, 2.0).unwrap();
    assert_eq!(g.node_timestamps(a).unwrap(), vec![1.0]);
    {
        let index = g.node_timestamp_index(Scope::Main).unwrap();
        assert_eq!(index.min_timestamp(), 1.0);
        assert_eq!(index.max_timestamp(), 2.0);
    }
    assert!(g.remove_node_timestamp(a, 1.0).unwrap());
    assert!(!g.remove_node_timestamp(a, 1.0).unwrap());
    assert_eq!(g.node_timestamp_index(Scope::Main).unwrap().min_timestamp(), 2.0);

    let e = g.add_edge(a, b, 0).unwrap();
    g.add_edge_timestamp(e, 7.5).unwrap();
    assert_eq!(g.edge_timestamp_index(Scope::Main).unwrap().get(7.0, 8.0).collect::<Vec<_>>(), vec![e]);
    g.remove_edge(e).unwrap();
    assert!(!g.edge_timestamp_index(Scope::Main).unwrap().has_elements());
    assert!(g.add_node_timestamp(a, f64::NAN).is_err());
}

#[test]
fn metrics_count_operations() {
    let mut g = store();
    let a = g.add_node("a").unwrap();
    let b = g.add_node("b").unwrap();
    let e = g.add_edge(a, b, 0).unwrap();
    g.remove_edge(e).unwrap();
    let view = g.create_view();
    g.destroy_view(view).unwrap();

    let m = g.metrics().unwrap();
    assert_eq!(m.operations.nodes_added.get(), 2);
    assert_eq!(m.operations.edges_added.get(), 1);
    assert_eq!(m.operations.edges_removed.get(), 1);
    assert_eq!(m.size.live_nodes.get(), 2);
    assert_eq!(m.views.views_created.get(), 1);
    assert_eq!(m.size.live_views.get(), 0);
    let text = g.render_metrics().unwrap();
    assert!(text.contains("dgs_nodes_added_total 2"));
}

#[test]
fn metrics_can_be_disabled() {
    let config = StoreConfig::from_toml_str("[metrics]\nenabled = false\n").unwrap();
    let g = GraphStore::with_config(config).unwrap();
    assert!(g.metrics().is_none());
    assert!(g.render_metrics().is_err());
}

#[test]
fn invalid_config_is_rejected() {
    let mut config = StoreConfig::default();
    config.view.growing_factor = 0.5;
    assert!(matches!(GraphStore::with_config(config), Err(Error::Config(_))));
    assert!(StoreConfig::from_toml_str("[view]\ndefault_type_count = 0\n").is_err());
    let parsed = StoreConfig::from_toml_str("[observers]\nenabled = false\n").unwrap();
    assert!(!parsed.observers.enabled);
    assert_eq!(parsed.view.growing_factor, 1.1);
}

#[test]
fn observers_follow_config() {
    let config = StoreConfig::from_toml_str("[observers]\nenabled = false\n").unwrap();
    let mut g = GraphStore::with_config(config).unwrap();
    g.create_column(ElementKind::Node, ColumnBuilder::new("x").value_type(ValueType::Int)).unwrap();
    assert!(g.table(ElementKind::Node).column("x").unwrap().create_observer().is_none());

    let mut g = store();
    let a = g.add_node("a").unwrap();
    g.create_column(ElementKind::Node, ColumnBuilder::new("x").value_type(ValueType::Int)).unwrap();
    let mut obs = g.table(ElementKind::Node).column("x").unwrap().create_observer().unwrap();
    g.set_attribute(a, "x", Value::Int(1)).unwrap();
    assert!(obs.has_column_changed());
}
