use super::*;
use crate::core::types::{NodeId, ViewId};

fn sorted(mut v: Vec<NodeId>) -> Vec<NodeId> {
    v.sort();
    v
}

fn store_with(pairs: &[(f64, u32)]) -> TimestampIndexStore<NodeId> {
    let mut store = TimestampIndexStore::new();
    for &(t, n) in pairs {
        store.add(t, NodeId(n), std::iter::empty()).unwrap();
    }
    store
}

#[test]
fn empty_index_reports_infinite_bounds() {
    let store = TimestampIndexStore::<NodeId>::new();
    let main = store.main();
    assert_eq!(main.min_timestamp(), f64::NEG_INFINITY);
    assert_eq!(main.max_timestamp(), f64::INFINITY);
    assert!(!main.has_elements());
    assert_eq!(main.get(f64::NEG_INFINITY, f64::INFINITY).count(), 0);
}

#[test]
fn bounds_follow_adds_and_removes() {
    let mut store = store_with(&[(1.0, 0), (2.0, 1), (3.0, 2)]);
    assert_eq!(store.main().min_timestamp(), 1.0);
    assert_eq!(store.main().max_timestamp(), 3.0);

    assert!(store.remove(1.0, NodeId(0)));
    assert_eq!(store.main().min_timestamp(), 2.0);
    assert!(store.remove(3.0, NodeId(2)));
    assert_eq!(store.main().max_timestamp(), 2.0);
    assert!(store.remove(2.0, NodeId(1)));
    assert_eq!(store.main().min_timestamp(), f64::NEG_INFINITY);
    assert_eq!(store.main().max_timestamp(), f64::INFINITY);
    assert!(store.catalog().is_empty());
}

#[test]
fn bound_survives_while_another_element_holds_it() {
    let mut store = store_with(&[(1.0, 0), (1.0, 1), (4.0, 1)]);
    store.remove(1.0, NodeId(0));
    assert_eq!(store.main().min_timestamp(), 1.0);
    store.remove(1.0, NodeId(1));
    assert_eq!(store.main().min_timestamp(), 4.0);
}

#[test]
fn interval_queries_are_closed() {
    let store = store_with(&[(1.0, 0), (1.0, 1), (2.0, 2)]);
    let main = store.main();
    assert_eq!(sorted(main.get(1.0, 1.0).collect()), vec![NodeId(0), NodeId(1)]);
    assert_eq!(sorted(main.get(-1.0, 1.9).collect()), vec![NodeId(0), NodeId(1)]);
    assert_eq!(main.get(-1.0, 2.0).count(), 3);
    assert_eq!(main.get(2.0, 2.0).collect::<Vec<_>>(), vec![NodeId(2)]);
    assert_eq!(main.get(2.0, 3.5).count(), 1);
    assert_eq!(main.get(2.5, 3.5).count(), 0);
    assert_eq!(main.get(3.0, 1.0).count(), 0);
    assert_eq!(main.get(f64::NAN, 1.0).count(), 0);
}

#[test]
fn element_reported_once_per_query() {
    let store = store_with(&[(1.0, 7), (2.0, 7), (3.0, 7), (2.0, 8)]);
    let hits = store.main().get(0.0, 10.0).collect::<Vec<_>>();
    assert_eq!(sorted(hits), vec![NodeId(7), NodeId(8)]);
    assert_eq!(store.main().association_count(), 4);
}

#[test]
fn duplicate_association_is_ignored() {
    let mut store = store_with(&[(1.0, 0)]);
    assert!(!store.add(1.0, NodeId(0), std::iter::empty()).unwrap());
    assert_eq!(store.catalog().ref_count(1.0), 1);
    assert!(!store.remove(5.0, NodeId(0)));
    assert!(!store.remove(1.0, NodeId(3)));
}

#[test]
fn nan_timestamp_is_rejected() {
    let mut store = TimestampIndexStore::<NodeId>::new();
    assert!(store.add(f64::NAN, NodeId(0), std::iter::empty()).is_err());
    assert!(!store.main().has_elements());
}

#[test]
fn clearing_a_view_scope_keeps_main_and_catalog() {
    let mut store = store_with(&[(1.0, 0), (2.0, 1)]);
    let view = ViewId(0);
    store.create_view_index(view, |_| true);
    assert!(store.view(view).unwrap().has_elements());

    store.clear_view(view).unwrap();
    let scoped = store.view(view).unwrap();
    assert!(!scoped.has_elements());
    assert_eq!(scoped.min_timestamp(), f64::NEG_INFINITY);
    assert!(store.main().has_elements());
    assert_eq!(store.catalog().ref_count(1.0), 1);
    assert_eq!(store.catalog().len(), 2);
    assert!(store.clear_view(ViewId(4)).is_err());
}

#[test]
fn catalog_recycles_ordinals() {
    let mut catalog = TimestampCatalog::new();
    let a = catalog.acquire(5.0).unwrap();
    let b = catalog.acquire(1.0).unwrap();
    assert_ne!(a, b);
    assert_eq!(catalog.release(5.0, 1), Some(a));
    assert_eq!(catalog.timestamp(a), None);
    let c = catalog.acquire(9.0).unwrap();
    assert_eq!(c, a);
    assert_eq!(catalog.iter().map(|(t, _)| t).collect::<Vec<_>>(), vec![1.0, 9.0]);
    assert_eq!(catalog.down_from(8.0).map(|(t, _)| t).collect::<Vec<_>>(), vec![1.0]);
}

#[test]
fn view_index_tracks_membership() {
    let mut store = store_with(&[(1.0, 1), (5.0, 1), (2.0, 2), (3.0, 2)]);
    let view = ViewId(0);
    store.create_view_index(view, |_| true);
    {
        let scoped = store.view(view).unwrap();
        assert_eq!(scoped.min_timestamp(), 1.0);
        assert_eq!(scoped.max_timestamp(), 5.0);
    }

    store.view_remove_element(view, NodeId(1), [1.0, 5.0]);
    let scoped = store.view(view).unwrap();
    assert_eq!(scoped.min_timestamp(), 2.0);
    assert_eq!(scoped.max_timestamp(), 3.0);
    assert_eq!(store.main().min_timestamp(), 1.0);

    store.view_add_element(view, NodeId(1), [5.0]);
    assert_eq!(store.view(view).unwrap().max_timestamp(), 5.0);
}

#[test]
fn view_index_built_from_filter() {
    let mut store = store_with(&[(1.0, 1), (2.0, 2)]);
    let view = ViewId(3);
    store.create_view_index(view, |n| n == NodeId(2));
    assert_eq!(store.view(view).unwrap().get(0.0, 10.0).collect::<Vec<_>>(), vec![NodeId(2)]);

    store.add(4.0, NodeId(2), [view]).unwrap();
    store.add(0.5, NodeId(1), std::iter::empty()).unwrap();
    let scoped = store.view(view).unwrap();
    assert_eq!(scoped.max_timestamp(), 4.0);
    assert_eq!(scoped.min_timestamp(), 2.0);

    store.remove(4.0, NodeId(2));
    assert_eq!(store.view(view).unwrap().max_timestamp(), 2.0);

    store.clear_view(view).unwrap();
    assert!(!store.view(view).unwrap().has_elements());
    assert!(store.main().has_elements());
    assert!(store.destroy_view_index(view));
    assert!(store.view(view).is_none());
    assert!(store.clear_view(view).is_err());
}
