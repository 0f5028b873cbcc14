use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dense_graph_store::{GraphStore, Scope};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn timed_graph(nodes: usize, stamps_per_node: usize) -> GraphStore {
    let mut rng = StdRng::seed_from_u64(3);
    let mut g = GraphStore::new();
    for i in 0..nodes {
        let n = g.add_node(i.to_string()).unwrap();
        for _ in 0..stamps_per_node {
            g.add_node_timestamp(n, rng.random_range(0..1_000) as f64).unwrap();
        }
    }
    g
}

fn bench_range_query(c: &mut Criterion) {
    let g = timed_graph(10_000, 4);
    c.bench_function("timestamp_range_100", |b| {
        b.iter(|| {
            let index = g.node_timestamp_index(Scope::Main).unwrap();
            black_box(index.get(450.0, 550.0).count())
        })
    });
}

fn bench_bound_maintenance(c: &mut Criterion) {
    let mut g = timed_graph(1_000, 2);
    let n = g.node("0").unwrap();
    c.bench_function("timestamp_add_remove_extreme", |b| {
        b.iter(|| {
            g.add_node_timestamp(n, -1.0).unwrap();
            g.remove_node_timestamp(n, -1.0).unwrap();
            black_box(g.node_timestamp_index(Scope::Main).unwrap().min_timestamp())
        })
    });
}

fn bench_view_index(c: &mut Criterion) {
    let mut g = timed_graph(5_000, 3);
    let view = g.create_view();
    g.view_fill(view).unwrap();
    g.create_view_index(view).unwrap();
    let n = g.node("42").unwrap();
    c.bench_function("timestamp_view_leave_join", |b| {
        b.iter(|| {
            g.view_remove_node(view, n).unwrap();
            g.view_add_node(view, n).unwrap();
            black_box(g.node_timestamp_index(Scope::View(view)).unwrap().max_timestamp())
        })
    });
}

criterion_group!(benches, bench_range_query, bench_bound_maintenance, bench_view_index);
criterion_main!(benches);
