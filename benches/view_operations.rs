use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use dense_graph_store::{GraphStore, NodeId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_graph(nodes: usize, edges: usize) -> (GraphStore, Vec<NodeId>) {
    let mut rng = StdRng::seed_from_u64(7);
    let mut g = GraphStore::new();
    let ids: Vec<NodeId> = (0..nodes).map(|i| g.add_node(i.to_string()).unwrap()).collect();
    let mut added = 0;
    while added < edges {
        let s = ids[rng.random_range(0..nodes)];
        let t = ids[rng.random_range(0..nodes)];
        if g.add_edge(s, t, 0).is_ok() {
            added += 1;
        }
    }
    (g, ids)
}

fn bench_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("view_fill");
    for &size in &[1_000usize, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter_batched(
                || {
                    let (mut g, _) = random_graph(size, size * 4);
                    let v = g.create_view();
                    (g, v)
                },
                |(mut g, v)| black_box(g.view_fill(v).unwrap()),
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

fn bench_node_churn(c: &mut Criterion) {
    let (mut g, ids) = random_graph(5_000, 20_000);
    let view = g.create_view();
    g.view_fill(view).unwrap();
    let mut rng = StdRng::seed_from_u64(11);
    c.bench_function("view_remove_add_node", |b| {
        b.iter(|| {
            let n = ids[rng.random_range(0..ids.len())];
            g.view_remove_node(view, n).unwrap();
            black_box(g.view_add_node(view, n).unwrap())
        })
    });
}

fn bench_counts(c: &mut Criterion) {
    let (mut g, _) = random_graph(5_000, 20_000);
    let view = g.create_view();
    g.view_fill(view).unwrap();
    c.bench_function("view_undirected_edge_count", |b| {
        b.iter(|| black_box(g.view(view).unwrap().undirected_edge_count()))
    });
}

criterion_group!(benches, bench_fill, bench_node_churn, bench_counts);
criterion_main!(benches);
